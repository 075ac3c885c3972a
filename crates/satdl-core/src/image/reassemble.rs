//! Address-driven image reassembly.

use std::collections::BTreeSet;

use tracing::{debug, trace, warn};

use super::buffer::ImageBuffer;
use super::completeness::{CompletenessReport, check_completeness};
use crate::protocol::{FrameLayout, FrameRecord};

/// Assembled image plus bookkeeping from the write pass.
#[derive(Debug, Clone)]
pub struct Reassembly {
    pub image: ImageBuffer,
    /// Relative addresses that received a write
    pub blocks: BTreeSet<u64>,
    /// Records written into the image
    pub frames_written: usize,
    /// Records that were not image frames or lay before the base
    pub frames_skipped: usize,
    /// Image frames dropped for malformed payload or size limit
    pub frames_rejected: usize,
}

impl Reassembly {
    pub fn completeness(&self, block_size: u64) -> CompletenessReport {
        check_completeness(&self.blocks, block_size)
    }
}

/// Write every qualifying record's payload at its address relative to
/// `base_offset`, in record order.
///
/// Non-qualifying records leave the image untouched. Later records
/// overwrite earlier ones at the same address. With `max_image_size`
/// set, writes ending past it are dropped; without it the image grows
/// to whatever the addresses demand.
pub fn reassemble(
    layout: &FrameLayout,
    records: &[FrameRecord],
    base_offset: u64,
    max_image_size: Option<usize>,
) -> Reassembly {
    let mut image = match max_image_size {
        Some(limit) => ImageBuffer::with_limit(limit),
        None => ImageBuffer::new(),
    };
    let mut blocks = BTreeSet::new();
    let mut frames_written = 0;
    let mut frames_skipped = 0;
    let mut frames_rejected = 0;

    for (index, record) in records.iter().enumerate() {
        let Some(address) = layout.qualifies(record, base_offset) else {
            trace!(index, "Frame skipped");
            frames_skipped += 1;
            continue;
        };
        let Some(payload) = layout.payload(record) else {
            debug!(index, "Malformed payload, frame dropped");
            frames_rejected += 1;
            continue;
        };

        image.seek(address);
        if let Err(e) = image.write(&payload) {
            warn!(index, address, error = %e, "Frame dropped");
            frames_rejected += 1;
            continue;
        }
        trace!(index, address, len = payload.len(), "Block written");
        blocks.insert(address);
        frames_written += 1;
    }

    Reassembly {
        image,
        blocks,
        frames_written,
        frames_skipped,
        frames_rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::STRATOSAT_LAYOUT;

    fn frame(addr: u32, payload: &[u8]) -> FrameRecord {
        let addr = addr.to_le_bytes();
        let digits = format!(
            "02003e0000{}{}",
            hex::encode(&addr[..3]),
            hex::encode(payload)
        );
        FrameRecord::new(format!("{:0<128}", digits))
    }

    fn run(records: &[FrameRecord], base: u64) -> Reassembly {
        reassemble(&STRATOSAT_LAYOUT, records, base, None)
    }

    #[test]
    fn test_blocks_placed_by_address() {
        let records = vec![frame(0x1038, &[2; 56]), frame(0x1000, &[1; 56])];
        let result = run(&records, 0x1000);

        assert_eq!(result.image.len(), 112);
        assert_eq!(&result.image.as_bytes()[..56], &[1; 56]);
        assert_eq!(&result.image.as_bytes()[56..], &[2; 56]);
        assert_eq!(result.blocks, BTreeSet::from([0, 56]));
        assert!(result.completeness(56).is_complete());
    }

    #[test]
    fn test_last_write_wins() {
        let records = vec![frame(0, &[0xAA; 56]), frame(0, &[0xBB; 56])];
        let result = run(&records, 0);
        assert_eq!(result.image.as_bytes(), &[0xBB; 56]);
        assert_eq!(result.frames_written, 2);
        assert_eq!(result.blocks.len(), 1);
    }

    #[test]
    fn test_non_qualifying_records_ignored() {
        let telemetry = FrameRecord::new(format!("{:0<128}", "848a82869e9c"));
        let noise = FrameRecord::new("0200");
        let before_base = frame(0x10, &[5; 56]);

        let result = run(&[telemetry, noise, before_base], 0x20);
        assert!(result.image.is_empty());
        assert!(result.blocks.is_empty());
        assert_eq!(result.frames_skipped, 3);
    }

    #[test]
    fn test_malformed_payload_rejected() {
        let mut bad = frame(0, &[1; 56]).as_str().to_string();
        bad.replace_range(20..22, "zz");
        let result = run(&[FrameRecord::new(bad)], 0);
        assert!(result.image.is_empty());
        assert_eq!(result.frames_rejected, 1);
    }

    #[test]
    fn test_size_limit_drops_frame() {
        let records = vec![frame(0, &[1; 56]), frame(0xFF_FFFF, &[2; 56])];
        let result = reassemble(&STRATOSAT_LAYOUT, &records, 0, Some(4096));
        assert_eq!(result.image.len(), 56);
        assert_eq!(result.frames_rejected, 1);
        assert_eq!(result.blocks, BTreeSet::from([0]));
    }

    #[test]
    fn test_uncalibrated_frame_at_top_of_address_range() {
        let records = vec![frame(0xFF_FFE0, &[4; 56])];
        let result = run(&records, 0);

        assert_eq!(result.image.len(), 16_777_240);
        assert_eq!(&result.image.as_bytes()[0xFF_FFE0..], &[4; 56]);
        assert_eq!(result.blocks, BTreeSet::from([0xFF_FFE0]));
        assert_eq!(result.frames_written, 1);
        assert_eq!(result.frames_rejected, 0);
    }
}
