//! satdl-core: downlink decoding for small-satellite captures.
//!
//! Turns ground-station captures (hex text or KISS logs) into the JPEG
//! images and housekeeping telemetry the satellites send down.
//!
//! # Architecture
//!
//! The crate is organized into layers:
//!
//! - **Protocol**: Constants, KISS codec, frame records and per-variant layouts
//! - **Source**: Capture format detection and normalization
//! - **Image**: Base calibration, address-driven reassembly, completeness checks
//! - **Telemetry**: Stratosat-TK1 housekeeping decoder
//! - **Events**: Observer pattern for UI decoupling
//! - **Session**: High-level orchestrator
//!
//! # Example
//!
//! ```no_run
//! use satdl_core::{DecodeSession, Protocol, SessionConfig};
//!
//! let config = SessionConfig {
//!     input_path: Some("stratosat_pass.txt".to_string()),
//!     protocol: Protocol::Stratosat,
//!     ..Default::default()
//! };
//!
//! let outcome = DecodeSession::new(config).run().expect("decode failed");
//! println!("{} bytes", outcome.image.len());
//! ```

pub mod events;
pub mod image;
pub mod protocol;
pub mod session;
pub mod source;
pub mod telemetry;

// Re-exports for convenience
pub use events::{DecodeEvent, DecodeObserver, DecodePhase, NullObserver, TracingObserver};
pub use image::{
    CalibrationResult, CompletenessReport, ImageBuffer, Reassembly, calibrate,
    check_completeness, reassemble,
};
pub use protocol::{FrameLayout, FrameRecord, Protocol, SIREN_LAYOUT, STRATOSAT_LAYOUT};
pub use session::{DecodeSession, ImageOutcome, SessionConfig, SessionError};
pub use source::{InputFormat, NormalizedInput, normalize};
pub use telemetry::{TelemetryRecord, is_telemetry_frame};
