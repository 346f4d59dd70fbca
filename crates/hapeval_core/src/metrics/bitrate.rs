//! Encoded bitrate from signal duration and artifact byte size.

use crate::signal::Signal;

/// Which bitrate convention to report.
///
/// Both forms exist in the evaluation toolchain: the submission process
/// normalizes by channel count, while the plain-file regression tests
/// divide raw byte size by duration only. Callers pick the form that
/// matches their reporting convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitrateMode {
    /// `(bytes * 8) / duration_s / channels / 1000`
    PerChannel,
    /// `bytes / duration_s / 1000`
    Raw,
}

/// Compute the encoded bitrate in kbps.
///
/// The reference signal provides the duration and (for
/// [`BitrateMode::PerChannel`]) the channel count; the artifact
/// contributes only its byte size.
pub fn bitrate_kbps(reference: &Signal, artifact_bytes: u64, mode: BitrateMode) -> f64 {
    let duration_s = reference.duration_secs();
    match mode {
        BitrateMode::PerChannel => {
            let channels = reference.channels.max(1) as f64;
            (artifact_bytes as f64 * 8.0) / duration_s / channels / 1000.0
        }
        BitrateMode::Raw => artifact_bytes as f64 / duration_s / 1000.0,
    }
}
