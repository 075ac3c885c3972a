//! Base address calibration.
//!
//! The satellite numbers image blocks by their address in its own memory.
//! The first frame whose payload opens with the JPEG SOI marker is image
//! byte 0, so its address becomes the base subtracted from every frame.

use crate::protocol::{FrameLayout, FrameRecord};

/// Result of the calibration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalibrationResult {
    pub base_offset: u64,
    pub high_resolution: bool,
    /// Index of the calibrating record, `None` when no SOI frame was seen.
    pub record_index: Option<usize>,
}

impl CalibrationResult {
    pub fn is_calibrated(&self) -> bool {
        self.record_index.is_some()
    }
}

/// Find the base offset. Only the first SOI frame is considered; without
/// one, or when its address is unreadable, the base is 0.
pub fn calibrate(layout: &FrameLayout, records: &[FrameRecord]) -> CalibrationResult {
    let Some(index) = records.iter().position(|record| layout.starts_image(record)) else {
        return CalibrationResult::default();
    };
    let record = &records[index];
    match layout.address(record) {
        Some(base_offset) => CalibrationResult {
            base_offset,
            high_resolution: layout.high_resolution(record),
            record_index: Some(index),
        },
        None => CalibrationResult::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{SIREN_LAYOUT, STRATOSAT_LAYOUT};

    fn stratosat(flag: &str, addr: &str, payload: &str) -> FrameRecord {
        let digits = format!("02003e{}{}{}", flag, addr, payload);
        FrameRecord::new(format!("{:0<128}", digits))
    }

    #[test]
    fn test_base_from_soi_frame() {
        let records = vec![
            stratosat("0000", "000000", "0102"),
            stratosat("2098", "001000", "FFD8FFE0"),
        ];
        let cal = calibrate(&STRATOSAT_LAYOUT, &records);
        assert_eq!(cal.base_offset, 0x1000);
        assert!(cal.high_resolution);
        assert_eq!(cal.record_index, Some(1));
    }

    #[test]
    fn test_first_match_wins() {
        let records = vec![
            stratosat("0000", "380000", "ffd8ff"),
            stratosat("2098", "000000", "ffd8ff"),
        ];
        let cal = calibrate(&STRATOSAT_LAYOUT, &records);
        assert_eq!(cal.base_offset, 0x38);
        assert!(!cal.high_resolution);
    }

    #[test]
    fn test_siren_four_byte_address() {
        let mut digits = "0".repeat(32) + "240C";
        digits.push_str(&"0".repeat(14));
        digits.push_str("00100000");
        digits.push_str("FFD8FFDB");
        let cal = calibrate(&SIREN_LAYOUT, &[FrameRecord::new(digits)]);
        assert_eq!(cal.base_offset, 0x1000);
        assert!(cal.is_calibrated());
    }

    #[test]
    fn test_missing_soi_defaults_to_zero() {
        let records = vec![stratosat("2098", "001000", "00d8ff")];
        let cal = calibrate(&STRATOSAT_LAYOUT, &records);
        assert_eq!(cal, CalibrationResult::default());
        assert!(!cal.is_calibrated());
        assert_eq!(calibrate(&STRATOSAT_LAYOUT, &[]).base_offset, 0);
    }

    #[test]
    fn test_unreadable_first_soi_address_is_not_skipped() {
        let records = vec![
            stratosat("0000", "zz0000", "ffd8ff"),
            stratosat("2098", "001000", "ffd8ff"),
        ];
        let cal = calibrate(&STRATOSAT_LAYOUT, &records);
        assert_eq!(cal, CalibrationResult::default());
        assert_eq!(cal.base_offset, 0);
    }
}
