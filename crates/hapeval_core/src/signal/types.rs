//! Core signal type and error taxonomy.

use std::path::PathBuf;

/// A sampled haptic signal, normalized to [-1, 1].
///
/// Samples are stored interleaved (frame-major): for a 2-channel signal
/// the layout is `[L0, R0, L1, R1, ...]`. Every frame has the same
/// channel count, so `samples.len()` is always a multiple of `channels`.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Interleaved samples as f64.
    pub samples: Vec<f64>,
    /// Number of channels (1 for mono).
    pub channels: usize,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl Signal {
    /// Create a new signal from interleaved samples.
    ///
    /// Returns an error if the sample count is not a multiple of the
    /// channel count.
    pub fn new(samples: Vec<f64>, channels: usize, sample_rate: u32) -> SignalResult<Self> {
        if channels == 0 {
            return Err(SignalError::InvalidShape {
                reason: "channel count must be at least 1".to_string(),
            });
        }
        if samples.len() % channels != 0 {
            return Err(SignalError::InvalidShape {
                reason: format!(
                    "{} samples do not divide into {} channels",
                    samples.len(),
                    channels
                ),
            });
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    /// Create a mono signal.
    pub fn mono(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self {
            samples,
            channels: 1,
            sample_rate,
        }
    }

    /// Number of frames (sample positions across all channels).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Check if the signal holds no frames.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Errors raised while loading or comparing signals.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// The two signals have different sample rates. Never recoverable.
    #[error("sample rate mismatch: {a} Hz vs {b} Hz")]
    SampleRateMismatch { a: u32, b: u32 },

    /// The two signals have different channel counts.
    #[error("channel count mismatch: {a} vs {b}")]
    ChannelMismatch { a: usize, b: usize },

    /// Unequal lengths with automatic padding disabled.
    #[error("signals have different lengths ({a} vs {b} frames) and autopad is off")]
    UnalignedLengths { a: usize, b: usize },

    /// Sample buffer does not divide into whole frames.
    #[error("invalid signal shape: {reason}")]
    InvalidShape { reason: String },

    /// A declared input or reference file does not exist on disk.
    #[error("signal file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// WAV decoding or encoding failed.
    #[error("WAV error for {path}: {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// File I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for signal operations.
pub type SignalResult<T> = Result<T, SignalError>;
