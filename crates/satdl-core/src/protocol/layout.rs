//! Declarative frame layouts for the image downlink protocols.
//!
//! A [`FrameLayout`] tells the shared reassembly code where the command
//! code, address and payload live inside a [`FrameRecord`]. Adding a
//! protocol variant means adding a layout, not new control flow.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::constants::*;
use super::record::FrameRecord;

/// How far the payload of a record extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadRule {
    /// Everything after the payload offset.
    Remainder,
    /// A length byte at `length_offset` gives the frame end in hex digits
    /// as `(declared + 2) * 2`, clamped to the record.
    DeclaredFrameLength { length_offset: usize },
}

/// Which text lines are frame records for a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// Exactly this many hex digits.
    ExactLen(usize),
    /// At least `min_len` digits with the given code at digit `offset`.
    CodeAt { min_len: usize, offset: usize, code: u16 },
}

impl RecordShape {
    pub fn accepts(&self, record: &FrameRecord) -> bool {
        match *self {
            RecordShape::ExactLen(len) => record.len() == len,
            RecordShape::CodeAt {
                min_len,
                offset,
                code,
            } => record.len() >= min_len && record.code_at(offset) == Some(code),
        }
    }
}

/// Header field signalling a high resolution capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionFlag {
    pub offset: usize,
    pub high_resolution: u16,
}

/// Field layout of one image protocol variant. All offsets are in hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub name: &'static str,
    pub command_offset: usize,
    /// Command code of image data frames
    pub image_command: u16,
    pub address_offset: usize,
    /// Little-endian address width in bytes
    pub address_bytes: usize,
    pub payload_offset: usize,
    pub payload_rule: PayloadRule,
    pub shape: RecordShape,
    pub resolution_flag: Option<ResolutionFlag>,
    /// Payload bytes per image block, used for completeness checking
    pub block_size: u64,
}

/// SIREN generic image protocol.
pub static SIREN_LAYOUT: FrameLayout = FrameLayout {
    name: "SIREN",
    command_offset: SIREN_CMD_OFFSET,
    image_command: SIREN_IMAGE_CMD,
    address_offset: SIREN_ADDR_OFFSET,
    address_bytes: SIREN_ADDR_BYTES,
    payload_offset: SIREN_PAYLOAD_OFFSET,
    payload_rule: PayloadRule::Remainder,
    shape: RecordShape::CodeAt {
        min_len: SIREN_MIN_LINE_LEN,
        offset: SIREN_CMD_OFFSET,
        code: SIREN_IMAGE_CMD,
    },
    resolution_flag: None,
    block_size: SIREN_BLOCK_SIZE,
};

/// Stratosat-TK1 image protocol with explicit length field.
pub static STRATOSAT_LAYOUT: FrameLayout = FrameLayout {
    name: "Stratosat-TK1",
    command_offset: STRATOSAT_CMD_OFFSET,
    image_command: STRATOSAT_IMAGE_CMD,
    address_offset: STRATOSAT_ADDR_OFFSET,
    address_bytes: STRATOSAT_ADDR_BYTES,
    payload_offset: STRATOSAT_PAYLOAD_OFFSET,
    payload_rule: PayloadRule::DeclaredFrameLength {
        length_offset: STRATOSAT_LEN_OFFSET,
    },
    shape: RecordShape::ExactLen(STRATOSAT_LINE_LEN),
    resolution_flag: Some(ResolutionFlag {
        offset: STRATOSAT_RES_OFFSET,
        high_resolution: STRATOSAT_HIGH_RES,
    }),
    block_size: STRATOSAT_BLOCK_SIZE,
};

impl FrameLayout {
    pub fn command_code(&self, record: &FrameRecord) -> Option<u16> {
        record.code_at(self.command_offset)
    }

    pub fn address(&self, record: &FrameRecord) -> Option<u64> {
        record.le_uint_at(self.address_offset, self.address_bytes)
    }

    /// Address relative to `base_offset`; may be negative.
    pub fn relative_address(&self, record: &FrameRecord, base_offset: u64) -> Option<i64> {
        let address = i64::try_from(self.address(record)?).ok()?;
        let base = i64::try_from(base_offset).ok()?;
        Some(address - base)
    }

    /// Payload digits of a record.
    pub fn payload_digits<'a>(&self, record: &'a FrameRecord) -> Option<&'a str> {
        let end = match self.payload_rule {
            PayloadRule::Remainder => record.len(),
            PayloadRule::DeclaredFrameLength { length_offset } => {
                (usize::from(record.byte_at(length_offset)?) + 2) * 2
            }
        };
        record.digits(self.payload_offset, end)
    }

    /// Decoded payload, `None` if the digits are not valid hex.
    pub fn payload(&self, record: &FrameRecord) -> Option<Vec<u8>> {
        hex::decode(self.payload_digits(record)?).ok()
    }

    pub fn is_image_frame(&self, record: &FrameRecord) -> bool {
        self.command_code(record) == Some(self.image_command)
    }

    /// Image offset of a record that belongs in the image: an image frame
    /// whose address does not precede the calibrated base.
    pub fn qualifies(&self, record: &FrameRecord, base_offset: u64) -> Option<u64> {
        if !self.is_image_frame(record) {
            return None;
        }
        let relative = self.relative_address(record, base_offset)?;
        u64::try_from(relative).ok()
    }

    /// Whether the payload opens with the JPEG start-of-image marker.
    pub fn starts_image(&self, record: &FrameRecord) -> bool {
        record.has_bytes_at(self.payload_offset, &JPEG_SOI)
    }

    pub fn high_resolution(&self, record: &FrameRecord) -> bool {
        self.resolution_flag
            .is_some_and(|flag| record.code_at(flag.offset) == Some(flag.high_resolution))
    }

    /// Whether a cleaned text line is a frame record for this layout.
    pub fn accepts_line(&self, record: &FrameRecord) -> bool {
        self.shape.accepts(record)
    }
}

impl fmt::Display for FrameLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Image protocol variant, chosen by the operator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Siren,
    #[default]
    Stratosat,
}

impl Protocol {
    pub fn layout(self) -> &'static FrameLayout {
        match self {
            Protocol::Siren => &SIREN_LAYOUT,
            Protocol::Stratosat => &STRATOSAT_LAYOUT,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Siren => write!(f, "siren"),
            Protocol::Stratosat => write!(f, "stratosat"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stratosat_frame(declared_len: u8, flag: &str, addr: &str, payload: &str) -> FrameRecord {
        let mut digits = format!("0200{:02x}{}{}{}", declared_len, flag, addr, payload);
        while digits.len() < STRATOSAT_LINE_LEN {
            digits.push('0');
        }
        FrameRecord::new(digits)
    }

    #[test]
    fn test_stratosat_fields() {
        let record = stratosat_frame(0x3E, "2098", "381200", "ffd8ffe0");
        let layout = &STRATOSAT_LAYOUT;

        assert_eq!(layout.command_code(&record), Some(0x0200));
        assert_eq!(layout.address(&record), Some(0x1238));
        assert!(layout.starts_image(&record));
        assert!(layout.high_resolution(&record));
        assert_eq!(layout.payload(&record).map(|p| p.len()), Some(56));
    }

    #[test]
    fn test_stratosat_declared_length_shortens_payload() {
        let record = stratosat_frame(0x0A, "0000", "000000", "");
        // (10 + 2) * 2 = 24 digits, payload starts at 16
        assert_eq!(STRATOSAT_LAYOUT.payload(&record).map(|p| p.len()), Some(4));
        assert!(!STRATOSAT_LAYOUT.high_resolution(&record));
    }

    #[test]
    fn test_siren_payload_is_remainder() {
        let mut digits = "0".repeat(SIREN_CMD_OFFSET);
        digits.push_str("240C");
        digits.push_str(&"0".repeat(SIREN_ADDR_OFFSET - digits.len()));
        digits.push_str("76010000");
        digits.push_str("AABBCC");
        let record = FrameRecord::new(digits);

        assert!(SIREN_LAYOUT.accepts_line(&record));
        assert_eq!(SIREN_LAYOUT.address(&record), Some(374));
        assert_eq!(SIREN_LAYOUT.payload(&record), Some(vec![0xAA, 0xBB, 0xCC]));
        assert!(!SIREN_LAYOUT.high_resolution(&record));
    }

    #[test]
    fn test_qualifies_rejects_negative_and_wrong_command() {
        let record = stratosat_frame(0x3E, "0000", "100000", "");
        assert_eq!(STRATOSAT_LAYOUT.qualifies(&record, 0x10), Some(0));
        assert_eq!(STRATOSAT_LAYOUT.qualifies(&record, 0x08), Some(8));
        assert_eq!(STRATOSAT_LAYOUT.qualifies(&record, 0x11), None);
        assert_eq!(STRATOSAT_LAYOUT.relative_address(&record, 0x11), Some(-1));

        let telemetry = FrameRecord::new("848a82869e9c".to_string() + &"0".repeat(116));
        assert_eq!(STRATOSAT_LAYOUT.qualifies(&telemetry, 0), None);
    }

    #[test]
    fn test_shapes() {
        assert!(STRATOSAT_LAYOUT.accepts_line(&FrameRecord::new("0".repeat(128))));
        assert!(!STRATOSAT_LAYOUT.accepts_line(&FrameRecord::new("0".repeat(126))));
        assert!(!SIREN_LAYOUT.accepts_line(&FrameRecord::new("0".repeat(200))));
        assert!(!SIREN_LAYOUT.accepts_line(&FrameRecord::new("0".repeat(32) + "240C")));
    }

    #[test]
    fn test_protocol_layouts() {
        assert_eq!(Protocol::Siren.layout().block_size, 374);
        assert_eq!(Protocol::Stratosat.layout().block_size, 56);
        assert_eq!(Protocol::default(), Protocol::Stratosat);
    }
}
