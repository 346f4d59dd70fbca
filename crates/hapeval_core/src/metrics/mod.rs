//! Objective quality and rate metrics.

mod bitrate;
mod bjontegaard;
mod psnr;

pub use bitrate::{bitrate_kbps, BitrateMode};
pub use bjontegaard::{bjontegaard, BjontegaardResult};
pub use psnr::{
    meets_psnr_reference, mse, psnr, psnr_files, IDENTICAL_SIGNALS_PSNR_DB,
    PSNR_REGRESSION_TOLERANCE_DB,
};

/// Errors raised by curve-fitting metrics.
#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    /// A degree-2 fit needs at least 3 points per curve.
    #[error("curve has {got} points, Bjontegaard fitting requires at least {required}")]
    TooFewPoints { got: usize, required: usize },

    /// Reference and test curves must pair rates with PSNR values.
    #[error("curve shape mismatch: {rates} rates vs {values} values")]
    ShapeMismatch { rates: usize, values: usize },

    /// Zero-width overlap between the two curves.
    #[error("degenerate {axis} overlap interval between curves")]
    DegenerateInterval { axis: &'static str },

    /// A rate must be strictly positive to take its logarithm.
    #[error("non-positive bitrate {value} in curve")]
    NonPositiveRate { value: f64 },
}

/// Result type for metric computations.
pub type MetricResult<T> = Result<T, MetricError>;
