//! Growable image arena with seek-and-write access.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BufferError {
    #[error("Write at offset {offset} of {len} bytes exceeds limit of {limit} bytes")]
    LimitExceeded {
        offset: u64,
        len: usize,
        limit: usize,
    },
    #[error("Write at offset {offset} is not addressable")]
    OffsetOverflow { offset: u64 },
}

/// Byte buffer addressed from 0.
///
/// Writes past the current end grow the buffer and zero-fill any gap.
/// Overlapping writes overwrite, so the last write to an offset wins.
#[derive(Debug, Clone, Default)]
pub struct ImageBuffer {
    data: Vec<u8>,
    position: u64,
    limit: Option<usize>,
}

impl ImageBuffer {
    /// Empty, unbounded buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty buffer that refuses to grow beyond `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Move the write cursor. Seeking never grows the buffer.
    pub fn seek(&mut self, position: u64) {
        self.position = position;
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Write `bytes` at the cursor and advance it.
    ///
    /// Fails without modifying the buffer when the write would end past
    /// the size limit, if one is set.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        if bytes.is_empty() {
            return Ok(());
        }
        let overflow = BufferError::OffsetOverflow {
            offset: self.position,
        };
        let start = usize::try_from(self.position).map_err(|_| overflow)?;
        let end = start
            .checked_add(bytes.len())
            .ok_or(BufferError::OffsetOverflow {
                offset: self.position,
            })?;
        if let Some(limit) = self.limit
            && end > limit
        {
            return Err(BufferError::LimitExceeded {
                offset: self.position,
                len: bytes.len(),
                limit,
            });
        }

        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(bytes);
        self.position = end as u64;
        Ok(())
    }

    /// Current extent in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
