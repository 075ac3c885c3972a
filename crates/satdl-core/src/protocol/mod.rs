//! Protocol module - downlink frame definitions.

pub mod constants;
pub mod kiss;
pub mod layout;
pub mod record;

pub use constants::*;
pub use layout::{
    FrameLayout, PayloadRule, Protocol, RecordShape, ResolutionFlag, SIREN_LAYOUT,
    STRATOSAT_LAYOUT,
};
pub use record::FrameRecord;
