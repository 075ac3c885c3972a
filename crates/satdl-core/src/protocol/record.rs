//! Frame records: one link-layer frame as a hex digit string.

use std::fmt;
use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

/// One decoded link-layer frame, two hex digits per byte.
///
/// Records coming from text captures are taken as-is and may contain
/// anything; every accessor returns `None` instead of panicking when the
/// requested digits are missing or are not hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameRecord(String);

impl FrameRecord {
    pub fn new(digits: impl Into<String>) -> Self {
        Self(digits.into())
    }

    /// Hex-encode raw frame bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(hex::encode(data))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in hex digits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Digits `[start, end)`, with `end` clamped to the record length.
    ///
    /// Returns an empty string when `start` lies past the clamped end.
    pub fn digits(&self, start: usize, end: usize) -> Option<&str> {
        let end = end.min(self.0.len());
        if start >= end {
            return Some("");
        }
        self.0.get(start..end)
    }

    /// Decode `len` bytes starting at digit `offset`.
    pub fn bytes_at(&self, offset: usize, len: usize) -> Option<Vec<u8>> {
        let field = self.0.get(offset..offset.checked_add(len * 2)?)?;
        hex::decode(field).ok()
    }

    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes_at(offset, 1).map(|b| b[0])
    }

    /// Two bytes read in record order, e.g. `"240C"` is `0x240C`.
    pub fn code_at(&self, offset: usize) -> Option<u16> {
        let bytes = self.bytes_at(offset, 2)?;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Little-endian unsigned integer of `nbytes` (1..=8) at digit `offset`.
    pub fn le_uint_at(&self, offset: usize, nbytes: usize) -> Option<u64> {
        if !(1..=8).contains(&nbytes) {
            return None;
        }
        let bytes = self.bytes_at(offset, nbytes)?;
        Cursor::new(bytes).read_uint::<LittleEndian>(nbytes).ok()
    }

    /// Whether the bytes at digit `offset` equal `expected`.
    pub fn has_bytes_at(&self, offset: usize, expected: &[u8]) -> bool {
        self.bytes_at(offset, expected.len())
            .is_some_and(|b| b == expected)
    }
}

impl fmt::Display for FrameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FrameRecord {
    fn from(digits: String) -> Self {
        Self(digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_lowercase() {
        let record = FrameRecord::from_bytes(&[0x02, 0x00, 0xAB]);
        assert_eq!(record.as_str(), "0200ab");
        assert_eq!(record.len(), 6);
    }

    #[test]
    fn test_code_case_insensitive() {
        assert_eq!(FrameRecord::new("240C").code_at(0), Some(0x240C));
        assert_eq!(FrameRecord::new("240c").code_at(0), Some(0x240C));
    }

    #[test]
    fn test_le_uint() {
        let record = FrameRecord::new("xx00100000");
        assert_eq!(record.le_uint_at(2, 4), Some(0x1000));
        assert_eq!(record.le_uint_at(2, 3), Some(0x1000));
        assert_eq!(FrameRecord::new("563412").le_uint_at(0, 3), Some(0x123456));
    }

    #[test]
    fn test_short_or_garbage_fields() {
        let record = FrameRecord::new("0200zz");
        assert_eq!(record.code_at(0), Some(0x0200));
        assert_eq!(record.byte_at(4), None);
        assert_eq!(record.le_uint_at(4, 4), None);
        assert_eq!(record.code_at(100), None);
    }

    #[test]
    fn test_digits_clamped() {
        let record = FrameRecord::new("00112233");
        assert_eq!(record.digits(2, 100), Some("112233"));
        assert_eq!(record.digits(10, 20), Some(""));
        assert_eq!(record.digits(6, 4), Some(""));
    }

    #[test]
    fn test_non_ascii_does_not_panic() {
        let record = FrameRecord::new("0é00");
        assert_eq!(record.byte_at(1), None);
        assert_eq!(record.digits(0, 2), None);
    }
}
