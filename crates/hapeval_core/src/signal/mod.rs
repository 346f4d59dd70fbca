//! Sampled haptic signals: types, WAV I/O, alignment, padding.

mod align;
mod types;
mod wav;

pub use align::{align, pad_symmetric, EXPECTED_PAD_SAMPLE_RATE};
pub use types::{Signal, SignalError, SignalResult};
pub use wav::{read_wav, write_wav};
