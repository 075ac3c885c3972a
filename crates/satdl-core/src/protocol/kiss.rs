//! KISS framing codec.
//!
//! Ground-station TNCs log received frames as `FEND <type> <data> FEND`,
//! with `FEND`/`FESC` inside the data replaced by two-byte escape sequences.

use super::constants::{FEND, FESC, KISS_DATA_FRAME, TFEND, TFESC};

/// Reverse KISS byte stuffing.
///
/// `FESC TFEND` becomes `FEND`, `FESC TFESC` becomes `FESC`. A `FESC` that is
/// not followed by a valid escape code (including one at the very end of the
/// data) is kept as a literal byte.
pub fn unescape(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        let byte = data[i];
        if byte == FESC {
            match data.get(i + 1) {
                Some(&TFEND) => {
                    out.push(FEND);
                    i += 2;
                    continue;
                }
                Some(&TFESC) => {
                    out.push(FESC);
                    i += 2;
                    continue;
                }
                _ => {}
            }
        }
        out.push(byte);
        i += 1;
    }
    out
}

/// Apply KISS byte stuffing.
pub fn escape(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 2);
    for &byte in data {
        match byte {
            FEND => out.extend_from_slice(&[FESC, TFEND]),
            FESC => out.extend_from_slice(&[FESC, TFESC]),
            _ => out.push(byte),
        }
    }
    out
}

/// Wrap `data` as a port-0 data frame.
pub fn encode_frame(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 4);
    out.push(FEND);
    out.push(KISS_DATA_FRAME);
    out.extend(escape(data));
    out.push(FEND);
    out
}

/// Split a KISS log into unescaped data frames, in stream order.
///
/// Empty segments and command frames (type byte other than 0) are dropped.
/// The type byte is removed from the returned frames.
pub fn data_frames(stream: &[u8]) -> Vec<Vec<u8>> {
    stream
        .split(|&b| b == FEND)
        .filter_map(|segment| match segment.split_first() {
            Some((&KISS_DATA_FRAME, body)) => Some(unescape(body)),
            _ => None,
        })
        .collect()
}
