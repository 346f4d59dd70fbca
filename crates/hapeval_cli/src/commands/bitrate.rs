//! `hapeval bitrate`: bitrate of an encoded artifact.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use hapeval_core::metrics::{bitrate_kbps, BitrateMode};
use hapeval_core::signal::read_wav;

pub fn run(original: &Path, encoded: &Path) -> Result<()> {
    let reference = read_wav(original)?;
    let artifact_bytes = fs::metadata(encoded)
        .with_context(|| format!("cannot stat {}", encoded.display()))?
        .len();

    let value = bitrate_kbps(&reference, artifact_bytes, BitrateMode::Raw);
    println!("{value}");
    Ok(())
}
