//! `hapeval psnr`: PSNR between two WAV files.

use std::path::Path;

use anyhow::Result;

use hapeval_core::metrics::psnr_files;

pub fn run(original: &Path, degraded: &Path, autopad: bool) -> Result<()> {
    let value = psnr_files(original, degraded, autopad)?;
    println!("{value}");
    Ok(())
}
