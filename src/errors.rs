//! Error taxonomy for the pipeline.
//!
//! Two layers, matching the propagation policy: `SensorFault` is an internal,
//! private error used only inside a sensor's own analysis helpers — it never
//! crosses the sensor trait boundary, where a fault becomes an abstention
//! instead. `PipelineError` is the only error type that can reach a caller of
//! [`crate::pipeline::Pipeline::analyze`] or [`crate::config::PipelineConfig::load`].

use thiserror::Error;

/// Internal fault raised by sensor helper functions (FFT, framing, validation).
///
/// Never returned from [`crate::sensors::Sensor::analyze`] — each sensor
/// catches these at its own boundary and converts them into `passed = None`
/// with a reason code, per the sensor contract.
#[derive(Error, Debug)]
pub enum SensorFault {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient data ({0} samples required, got {1})")]
    InsufficientData(usize, usize),

    #[error("invalid sample rate: {0} Hz (expected 4000-192000 Hz)")]
    InvalidSampleRate(u32),
}

impl SensorFault {
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        SensorFault::InvalidInput(msg.into())
    }

    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        SensorFault::InsufficientData(required, actual)
    }

    pub fn invalid_sample_rate(rate: u32) -> Self {
        SensorFault::InvalidSampleRate(rate)
    }
}

/// Result type alias used by internal sensor helpers.
pub type SensorResultType<T> = Result<T, SensorFault>;

/// Errors that reject an `analyze` call or a configuration load outright.
///
/// These are the only errors visible across the public API boundary (§7 of
/// the design: input errors and configuration errors surface, sensor and
/// stage errors are absorbed locally).
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("audio buffer is empty")]
    EmptyAudio,

    #[error("audio buffer contains a non-finite sample at index {0}")]
    NonFiniteSample(usize),

    #[error("audio shorter than the minimum analysis duration (0.25s): got {0:.3}s")]
    AudioTooShort(f64),

    #[error("sample rate {0} Hz outside supported range [4000, 192000] Hz")]
    SampleRateOutOfRange(u32),

    #[error("channel count must be >= 1, got {0}")]
    InvalidChannelCount(u32),

    #[error("configuration missing required key: {0}")]
    ConfigMissingKey(String),

    #[error("stage weights sum to {0:.6}, must sum to 1.0 (+/- 1e-6)")]
    StageWeightsInvalid(f64),

    #[error("veto thresholds invalid: moderate={moderate}, high={high} (require 0 < moderate < high <= 1)")]
    VetoThresholdsInvalid { moderate: f64, high: f64 },

    #[error("profile '{0}' has zero total raw weight")]
    ProfileWeightsInvalid(String),

    #[error("failed to read configuration file {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),
}
