//! Block completeness diagnostics.

use std::collections::BTreeSet;

/// Outcome of walking the written block addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletenessReport {
    /// First block address, counting from 0, that was never written.
    pub first_missing: Option<u64>,
    /// Highest written block address.
    pub max_address: Option<u64>,
}

impl CompletenessReport {
    pub fn is_complete(&self) -> bool {
        self.first_missing.is_none()
    }
}

/// Walk from 0 in `block_size` steps until every written address has been
/// visited, reporting the first step with no write.
///
/// Addresses that are not multiples of `block_size` can never be visited, so
/// their presence always yields a missing block. A zero block size skips
/// the walk.
pub fn check_completeness(blocks: &BTreeSet<u64>, block_size: u64) -> CompletenessReport {
    let max_address = blocks.last().copied();
    let mut first_missing = None;

    if block_size > 0 {
        let mut remaining = blocks.len();
        let mut address = 0u64;
        while remaining > 0 {
            if !blocks.contains(&address) {
                first_missing = Some(address);
                break;
            }
            remaining -= 1;
            address += block_size;
        }
    }

    CompletenessReport {
        first_missing,
        max_address,
    }
}
