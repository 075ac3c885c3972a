//! Image reassembly.
//!
//! Calibrates the base address, writes frame payloads into an
//! [`ImageBuffer`] by address and checks the result for missing blocks.

pub mod buffer;
pub mod calibrate;
pub mod completeness;
pub mod reassemble;

pub use buffer::{BufferError, ImageBuffer};
pub use calibrate::{CalibrationResult, calibrate};
pub use completeness::{CompletenessReport, check_completeness};
pub use reassemble::{Reassembly, reassemble};
