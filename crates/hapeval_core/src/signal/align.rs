//! Signal alignment for quality comparison.
//!
//! Signals are assumed start-aligned; only trailing-edge zero padding
//! is ever applied, and the longer signal is never trimmed.

use super::types::{Signal, SignalError, SignalResult};

/// Sample rate expected by the padding step of the synthesizer chain.
pub const EXPECTED_PAD_SAMPLE_RATE: u32 = 8000;

/// Align two signals to equal length for comparison.
///
/// Fails on sample-rate or channel-count mismatch. With `autopad` the
/// shorter signal is zero-padded on the trailing side until both frame
/// counts match; without it, unequal lengths are a fatal comparison
/// error.
pub fn align(a: &Signal, b: &Signal, autopad: bool) -> SignalResult<(Signal, Signal)> {
    if a.sample_rate != b.sample_rate {
        return Err(SignalError::SampleRateMismatch {
            a: a.sample_rate,
            b: b.sample_rate,
        });
    }
    if a.channels != b.channels {
        return Err(SignalError::ChannelMismatch {
            a: a.channels,
            b: b.channels,
        });
    }

    if a.frames() == b.frames() {
        return Ok((a.clone(), b.clone()));
    }

    if !autopad {
        return Err(SignalError::UnalignedLengths {
            a: a.frames(),
            b: b.frames(),
        });
    }

    let target = a.frames().max(b.frames());
    Ok((pad_to_frames(a, target), pad_to_frames(b, target)))
}

/// Zero-pad a signal on the trailing side up to `target` frames.
///
/// Returns a clone when no padding is needed; the input is never
/// mutated or trimmed.
fn pad_to_frames(signal: &Signal, target: usize) -> Signal {
    let pad_frames = target.saturating_sub(signal.frames());
    if pad_frames == 0 {
        return signal.clone();
    }

    tracing::debug!(
        "Adding automatic zero-padding of {} frames to the shorter signal",
        pad_frames
    );

    let mut samples = signal.samples.clone();
    samples.extend(std::iter::repeat(0.0).take(pad_frames * signal.channels));
    Signal {
        samples,
        channels: signal.channels,
        sample_rate: signal.sample_rate,
    }
}

/// Symmetrically zero-pad a signal by `seconds` at head and tail.
///
/// Compensates codec-introduced group delay before PSNR comparison.
/// Warns (non-fatal) when the sample rate differs from the expected
/// 8 kHz of the evaluation chain.
pub fn pad_symmetric(signal: &Signal, seconds: u32) -> Signal {
    if signal.sample_rate != EXPECTED_PAD_SAMPLE_RATE {
        tracing::warn!(
            "Sample rate should be {} Hz, got {} Hz",
            EXPECTED_PAD_SAMPLE_RATE,
            signal.sample_rate
        );
    }

    let pad_frames = signal.sample_rate as usize * seconds as usize;
    let pad_len = pad_frames * signal.channels;
    let mut samples = Vec::with_capacity(signal.samples.len() + 2 * pad_len);
    samples.extend(std::iter::repeat(0.0).take(pad_len));
    samples.extend_from_slice(&signal.samples);
    samples.extend(std::iter::repeat(0.0).take(pad_len));

    Signal {
        samples,
        channels: signal.channels,
        sample_rate: signal.sample_rate,
    }
}
