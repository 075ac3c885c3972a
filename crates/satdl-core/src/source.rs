//! Capture normalization.
//!
//! Ground-station software logs frames either as hex text, one frame per
//! line and optionally prefixed with `timestamp | metadata |`, or as a raw
//! KISS byte stream. Both become an ordered list of [`FrameRecord`]s.

use std::fmt;

use tracing::debug;

use crate::protocol::kiss;
use crate::protocol::{FrameRecord, RecordShape};

/// Detected capture encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// UTF-8 text, one hex frame per line
    HexText,
    /// Binary KISS log
    Kiss,
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::HexText => write!(f, "hex text"),
            InputFormat::Kiss => write!(f, "KISS"),
        }
    }
}

/// Frame records of one capture, in capture order.
#[derive(Debug, Clone)]
pub struct NormalizedInput {
    pub format: InputFormat,
    pub records: Vec<FrameRecord>,
}

/// Normalize a capture.
///
/// Input that decodes as UTF-8 is read as hex text and only lines matching
/// `shape` are kept. Anything else is parsed as KISS, where every data
/// frame becomes a record regardless of shape.
pub fn normalize(input: &[u8], shape: &RecordShape) -> NormalizedInput {
    match std::str::from_utf8(input) {
        Ok(text) => NormalizedInput {
            format: InputFormat::HexText,
            records: parse_hex_text(text, shape),
        },
        Err(e) => {
            debug!(error = %e, "Input is not text, parsing as KISS");
            NormalizedInput {
                format: InputFormat::Kiss,
                records: parse_kiss(input),
            }
        }
    }
}

/// Hex-per-line text.
pub fn parse_hex_text(text: &str, shape: &RecordShape) -> Vec<FrameRecord> {
    text.lines()
        .filter_map(|line| {
            let cleaned: String = line.chars().filter(|c| !c.is_whitespace()).collect();
            // Loggers put timestamps and metadata before the last '|'
            let digits = cleaned.rsplit('|').next().unwrap_or_default();
            let record = FrameRecord::new(digits);
            shape.accepts(&record).then_some(record)
        })
        .collect()
}

/// Binary KISS log.
pub fn parse_kiss(stream: &[u8]) -> Vec<FrameRecord> {
    kiss::data_frames(stream)
        .iter()
        .map(|frame| FrameRecord::from_bytes(frame))
        .collect()
}
