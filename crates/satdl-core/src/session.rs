//! Decode Session - High-level orchestrator for one capture file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use crate::events::{DecodeEvent, DecodeObserver, DecodePhase, TracingObserver};
use crate::image::{CalibrationResult, CompletenessReport, ImageBuffer, calibrate, reassemble};
use crate::protocol::{Protocol, RecordShape, STRATOSAT_LAYOUT};
use crate::source::{InputFormat, NormalizedInput, normalize};
use crate::telemetry::{self, TelemetryRecord};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("No input file configured")]
    NoInput,
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration for a decode session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Capture file (hex text or KISS).
    pub input_path: Option<String>,
    /// Image output path. Defaults to the input path with `image_extension`.
    pub output_path: Option<String>,
    /// Image protocol variant.
    pub protocol: Protocol,
    /// Extension given to the image next to the input.
    pub image_extension: String,
    /// Largest image the reassembler may allocate, in bytes. Unbounded
    /// when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_image_size: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            input_path: None,
            output_path: None,
            protocol: Protocol::default(),
            image_extension: "jpg".to_string(),
            max_image_size: None,
        }
    }
}

impl SessionConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SessionConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn input(&self) -> Result<PathBuf, SessionError> {
        self.input_path
            .as_ref()
            .map(PathBuf::from)
            .ok_or(SessionError::NoInput)
    }

    /// Where the image is written.
    pub fn image_path(&self) -> Result<PathBuf, SessionError> {
        match &self.output_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(self.input()?.with_extension(&self.image_extension)),
        }
    }
}

/// Everything learned while rebuilding one image.
#[derive(Debug, Clone)]
pub struct ImageOutcome {
    pub format: InputFormat,
    pub records: usize,
    pub calibration: CalibrationResult,
    pub completeness: CompletenessReport,
    pub frames_written: usize,
    pub image: ImageBuffer,
    /// Set once the image has been saved.
    pub output_path: Option<PathBuf>,
}

/// Decode Session - runs the decoders over a capture file.
pub struct DecodeSession<O: DecodeObserver> {
    config: SessionConfig,
    observer: Arc<O>,
}

impl DecodeSession<TracingObserver> {
    /// Create a new session with default tracing observer.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_observer(config, Arc::new(TracingObserver))
    }
}

impl<O: DecodeObserver> DecodeSession<O> {
    /// Create a new session with a custom observer.
    pub fn with_observer(config: SessionConfig, observer: Arc<O>) -> Self {
        Self { config, observer }
    }

    fn phase(&self, from: DecodePhase, to: DecodePhase) {
        self.observer
            .on_event(&DecodeEvent::PhaseChanged { from, to });
    }

    /// Read and normalize the capture.
    fn load(&self, shape: &RecordShape) -> Result<NormalizedInput> {
        let path = self.config.input()?;
        if !path.exists() {
            return Err(SessionError::InputNotFound(path).into());
        }
        info!(path = %path.display(), "Loading capture");
        let data = std::fs::read(&path).map_err(|source| SessionError::Io {
            path: path.clone(),
            source,
        })?;
        let input = normalize(&data, shape);

        self.observer.on_event(&DecodeEvent::InputLoaded {
            path,
            format: input.format,
            records: input.records.len(),
        });
        Ok(input)
    }

    /// Rebuild the image from already normalized records.
    pub fn assemble(&self, input: &NormalizedInput) -> ImageOutcome {
        let layout = self.config.protocol.layout();

        self.phase(DecodePhase::Loading, DecodePhase::Calibrating);
        let calibration = calibrate(layout, &input.records);
        match calibration.record_index {
            Some(record_index) => self.observer.on_event(&DecodeEvent::Calibrated {
                base_offset: calibration.base_offset,
                record_index,
            }),
            None => self.observer.on_event(&DecodeEvent::CalibrationMissing),
        }
        if calibration.high_resolution {
            self.observer.on_event(&DecodeEvent::HighResolution);
        }

        self.phase(DecodePhase::Calibrating, DecodePhase::Reassembling);
        let reassembly = reassemble(
            layout,
            &input.records,
            calibration.base_offset,
            self.config.max_image_size,
        );
        self.observer.on_event(&DecodeEvent::Reassembled {
            written: reassembly.frames_written,
            skipped: reassembly.frames_skipped,
            rejected: reassembly.frames_rejected,
            image_len: reassembly.image.len(),
        });

        self.phase(DecodePhase::Reassembling, DecodePhase::Verifying);
        let completeness = reassembly.completeness(layout.block_size);
        if let Some(address) = completeness.max_address {
            self.observer.on_event(&DecodeEvent::MaxAddress { address });
        }
        if let Some(address) = completeness.first_missing {
            self.observer.on_event(&DecodeEvent::MissingBlock { address });
        }

        ImageOutcome {
            format: input.format,
            records: input.records.len(),
            calibration,
            completeness,
            frames_written: reassembly.frames_written,
            image: reassembly.image,
            output_path: None,
        }
    }

    /// Rebuild the image from the capture and write it out.
    #[instrument(skip(self), fields(protocol = %self.config.protocol))]
    pub fn run(&self) -> Result<ImageOutcome> {
        let layout = self.config.protocol.layout();
        let input = self.load(&layout.shape)?;
        let mut outcome = self.assemble(&input);

        let path = self.config.image_path()?;
        std::fs::write(&path, outcome.image.as_bytes()).map_err(|source| SessionError::Io {
            path: path.clone(),
            source,
        })?;
        self.observer.on_event(&DecodeEvent::ImageWritten {
            path: path.clone(),
            len: outcome.image.len(),
        });
        outcome.output_path = Some(path);

        self.phase(DecodePhase::Verifying, DecodePhase::Complete);
        self.observer.on_event(&DecodeEvent::Complete);
        Ok(outcome)
    }

    /// Decode every housekeeping frame in the capture.
    #[instrument(skip(self))]
    pub fn run_telemetry(&self) -> Result<Vec<TelemetryRecord>> {
        let input = self.load(&STRATOSAT_LAYOUT.shape)?;

        self.phase(DecodePhase::Loading, DecodePhase::Telemetry);
        let records = telemetry::decode_all(&input.records);
        self.observer.on_event(&DecodeEvent::TelemetryDecoded {
            frames: records.len(),
        });

        self.phase(DecodePhase::Telemetry, DecodePhase::Complete);
        self.observer.on_event(&DecodeEvent::Complete);
        Ok(records)
    }
}
