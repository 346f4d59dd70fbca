//! `hapeval check-data`: md5 manifest verification.

use std::path::Path;

use anyhow::{bail, Result};

use hapeval_core::integrity::{verify_manifest, FileStatus};

pub fn run(data_dir: &Path, manifest: &Path) -> Result<()> {
    let report = verify_manifest(data_dir, manifest)?;

    for check in report.problems() {
        match &check.status {
            FileStatus::Missing => println!("MISSING  {}", check.path.display()),
            FileStatus::Mismatch { expected, actual } => println!(
                "MISMATCH {} (expected {expected}, got {actual})",
                check.path.display()
            ),
            FileStatus::Ok => {}
        }
    }

    println!("{}/{} files verified", report.ok(), report.checks.len());
    if !report.is_success() {
        bail!("data tree does not match the manifest");
    }
    Ok(())
}
