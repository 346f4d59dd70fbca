//! Peak signal-to-noise ratio between an original and a restored signal.

use std::path::Path;

use crate::signal::{align, read_wav, Signal, SignalResult};

/// PSNR reported for bit-identical signals (MSE of zero).
pub const IDENTICAL_SIGNALS_PSNR_DB: f64 = 100.0;

/// Mean squared error over the flattened interleaved samples.
///
/// Both signals must already be aligned to the same shape.
pub fn mse(a: &Signal, b: &Signal) -> f64 {
    debug_assert_eq!(a.samples.len(), b.samples.len());
    if a.samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = a
        .samples
        .iter()
        .zip(b.samples.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    sum / a.samples.len() as f64
}

/// PSNR in dB between two aligned, equal-shape signals.
///
/// The haptic signal is normalized between -1 and 1, so the full-scale
/// range is fixed at 2. Identical signals yield exactly 100 dB instead
/// of a division by zero.
pub fn psnr(a: &Signal, b: &Signal) -> f64 {
    let err = mse(a, b);
    if err == 0.0 {
        return IDENTICAL_SIGNALS_PSNR_DB;
    }
    let xmax = 1.0;
    let xmin = -1.0;
    let max_val: f64 = xmax - xmin;
    10.0 * ((max_val * max_val) / err).log10()
}

/// Read two WAV files, align them, and compute the PSNR.
pub fn psnr_files(original: &Path, degraded: &Path, autopad: bool) -> SignalResult<f64> {
    let a = read_wav(original)?;
    let b = read_wav(degraded)?;
    let (a, b) = align(&a, &b, autopad)?;
    Ok(psnr(&a, &b))
}

/// Allowed PSNR loss against a stored regression reference, in dB.
pub const PSNR_REGRESSION_TOLERANCE_DB: f64 = 0.1;

/// Check a measured PSNR against a stored per-file reference.
///
/// The measured value is rounded to two decimals before comparison and
/// may fall at most [`PSNR_REGRESSION_TOLERANCE_DB`] below the
/// reference; exactly at the tolerance counts as a regression.
/// Improvements over the reference always pass.
pub fn meets_psnr_reference(measured: f64, reference: f64) -> bool {
    let rounded = (measured * 100.0).round() / 100.0;
    rounded - reference > -PSNR_REGRESSION_TOLERANCE_DB
}
