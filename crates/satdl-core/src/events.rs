//! Event system for UI decoupling.
//!
//! Lets the CLI (or any other front end) follow a decode run without the
//! core printing anything itself.

use std::fmt;
use std::path::PathBuf;

use crate::source::InputFormat;

/// Decode run phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePhase {
    /// Reading and normalizing the capture.
    Loading,
    /// Searching for the image start frame.
    Calibrating,
    /// Writing payloads into the image.
    Reassembling,
    /// Checking for missing blocks.
    Verifying,
    /// Decoding housekeeping frames.
    Telemetry,
    /// Run finished.
    Complete,
}

impl fmt::Display for DecodePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodePhase::Loading => write!(f, "Loading"),
            DecodePhase::Calibrating => write!(f, "Calibrating"),
            DecodePhase::Reassembling => write!(f, "Reassembling"),
            DecodePhase::Verifying => write!(f, "Verifying"),
            DecodePhase::Telemetry => write!(f, "Telemetry"),
            DecodePhase::Complete => write!(f, "Complete"),
        }
    }
}

/// Events emitted by a decode session.
#[derive(Debug, Clone)]
pub enum DecodeEvent {
    /// Phase changed.
    PhaseChanged { from: DecodePhase, to: DecodePhase },
    /// Capture loaded and normalized.
    InputLoaded {
        path: PathBuf,
        format: InputFormat,
        records: usize,
    },
    /// Base address found.
    Calibrated {
        base_offset: u64,
        record_index: usize,
    },
    /// No image start frame; addresses are used unshifted.
    CalibrationMissing,
    /// Image was captured in high resolution mode.
    HighResolution,
    /// Write pass finished.
    Reassembled {
        written: usize,
        skipped: usize,
        rejected: usize,
        image_len: usize,
    },
    /// Highest block address written.
    MaxAddress { address: u64 },
    /// First block that never arrived.
    MissingBlock { address: u64 },
    /// Image file written.
    ImageWritten { path: PathBuf, len: usize },
    /// Housekeeping frames decoded.
    TelemetryDecoded { frames: usize },
    /// Run finished.
    Complete,
}

/// Observer trait for receiving decode events.
///
/// Implement this trait in your UI layer to receive updates.
pub trait DecodeObserver: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &DecodeEvent);
}

/// No-op observer that discards all events.
pub struct NullObserver;

impl DecodeObserver for NullObserver {
    fn on_event(&self, _event: &DecodeEvent) {}
}

/// Observer that logs events using tracing.
pub struct TracingObserver;

impl DecodeObserver for TracingObserver {
    fn on_event(&self, event: &DecodeEvent) {
        match event {
            DecodeEvent::PhaseChanged { from, to } => {
                tracing::debug!(from = %from, to = %to, "Phase changed");
            }
            DecodeEvent::InputLoaded {
                path,
                format,
                records,
            } => {
                tracing::info!(path = %path.display(), format = %format, records, "Capture loaded");
            }
            DecodeEvent::Calibrated {
                base_offset,
                record_index,
            } => {
                tracing::info!(
                    base = %format!("0x{:06X}", base_offset),
                    record = record_index,
                    "Image start found"
                );
            }
            DecodeEvent::CalibrationMissing => {
                tracing::warn!("No image start frame found, using base address 0");
            }
            DecodeEvent::HighResolution => {
                tracing::warn!("High resolution image");
            }
            DecodeEvent::Reassembled {
                written,
                skipped,
                rejected,
                image_len,
            } => {
                tracing::debug!(written, skipped, rejected, image_len, "Reassembly done");
            }
            DecodeEvent::MaxAddress { address } => {
                tracing::info!(address, "Max address");
            }
            DecodeEvent::MissingBlock { address } => {
                tracing::warn!(address, "Missing block");
            }
            DecodeEvent::ImageWritten { path, len } => {
                tracing::info!(path = %path.display(), len, "Writing image");
            }
            DecodeEvent::TelemetryDecoded { frames } => {
                tracing::info!(frames, "Telemetry decoded");
            }
            DecodeEvent::Complete => {
                tracing::debug!("Decode complete");
            }
        }
    }
}
