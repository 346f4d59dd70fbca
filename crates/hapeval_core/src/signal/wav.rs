//! WAV reading and writing for reference and restored signals.
//!
//! Reference files and synthesizer output are plain WAV. Integer
//! samples are normalized to [-1, 1] on read; writing always emits
//! 16-bit PCM, matching the padding step of the original toolchain.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::types::{Signal, SignalError, SignalResult};

/// Read a WAV file into a normalized signal.
pub fn read_wav(path: &Path) -> SignalResult<Signal> {
    if !path.exists() {
        return Err(SignalError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = WavReader::open(path).map_err(|source| SignalError::Wav {
        path: path.to_path_buf(),
        source,
    })?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let samples: Vec<f64> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, _) => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<_, _>>()
            .map_err(|source| SignalError::Wav {
                path: path.to_path_buf(),
                source,
            })?,
        (SampleFormat::Int, bits) => {
            // widened shift: 1i32 << 31 would wrap negative for 32-bit PCM
            let scale = (1i64 << (bits - 1)) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| f64::from(v) / scale))
                .collect::<Result<_, _>>()
                .map_err(|source| SignalError::Wav {
                    path: path.to_path_buf(),
                    source,
                })?
        }
    };

    tracing::debug!(
        "Read {} frames x {} ch at {} Hz from {}",
        samples.len() / channels,
        channels,
        spec.sample_rate,
        path.display()
    );

    Signal::new(samples, channels, spec.sample_rate)
}

/// Write a signal as 16-bit PCM WAV.
pub fn write_wav(path: &Path, signal: &Signal) -> SignalResult<()> {
    let spec = WavSpec {
        channels: signal.channels as u16,
        sample_rate: signal.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|source| SignalError::Wav {
        path: path.to_path_buf(),
        source,
    })?;

    for &sample in &signal.samples {
        let quantized = (sample * 32768.0).round().clamp(-32768.0, 32767.0) as i16;
        writer
            .write_sample(quantized)
            .map_err(|source| SignalError::Wav {
                path: path.to_path_buf(),
                source,
            })?;
    }

    writer.finalize().map_err(|source| SignalError::Wav {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn read_rejects_missing_file() {
        let result = read_wav(Path::new("/nonexistent/signal.wav"));
        assert!(matches!(result, Err(SignalError::FileNotFound { .. })));
    }

    #[test]
    fn round_trip_preserves_samples_within_quantization() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let samples: Vec<f64> = (0..800)
            .map(|i| (i as f64 * 0.05).sin() * 0.5)
            .collect();
        let signal = Signal::mono(samples.clone(), 8000);
        write_wav(&path, &signal).unwrap();

        let restored = read_wav(&path).unwrap();
        assert_eq!(restored.channels, 1);
        assert_eq!(restored.sample_rate, 8000);
        assert_eq!(restored.frames(), 800);
        for (a, b) in samples.iter().zip(restored.samples.iter()) {
            // 16-bit quantization error bound
            assert!((a - b).abs() < 1.0 / 32768.0 + 1e-9);
        }
    }

    #[test]
    fn reads_32_bit_pcm_with_correct_sign_and_scale() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deep.wav");

        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        writer.write_sample(i32::MAX / 2).unwrap();
        writer.write_sample(-(i32::MAX / 2)).unwrap();
        writer.finalize().unwrap();

        let signal = read_wav(&path).unwrap();
        assert!((signal.samples[0] - 0.5).abs() < 1e-9);
        assert!((signal.samples[1] + 0.5).abs() < 1e-9);
    }

    #[test]
    fn round_trip_keeps_channel_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");

        // 2 channels, 4 frames, interleaved
        let signal = Signal::new(
            vec![0.1, -0.1, 0.2, -0.2, 0.3, -0.3, 0.4, -0.4],
            2,
            8000,
        )
        .unwrap();
        write_wav(&path, &signal).unwrap();

        let restored = read_wav(&path).unwrap();
        assert_eq!(restored.channels, 2);
        assert_eq!(restored.frames(), 4);
        assert!(restored.samples[0] > 0.0 && restored.samples[1] < 0.0);
    }
}
