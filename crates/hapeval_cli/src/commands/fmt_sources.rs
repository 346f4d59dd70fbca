//! `hapeval fmt-sources`: clang-format over tracked C++ sources.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

const CPP_EXTENSIONS: &[&str] = &["cpp", "hpp", "h"];

pub fn run(repo: &Path) -> Result<()> {
    let files = tracked_cpp_files(repo)?;
    tracing::info!("Formatting {} C++ files in {}", files.len(), repo.display());

    // One file per worker, no shared state between them
    let failures: Vec<String> = files
        .par_iter()
        .filter_map(|file| format_file(file).err().map(|e| format!("{}: {e}", file.display())))
        .collect();

    if !failures.is_empty() {
        for failure in &failures {
            tracing::warn!("{failure}");
        }
        bail!("clang-format failed on {} file(s)", failures.len());
    }

    println!("{} files formatted", files.len());
    Ok(())
}

fn tracked_cpp_files(repo: &Path) -> Result<Vec<PathBuf>> {
    let output = Command::new("git")
        .arg("ls-files")
        .current_dir(repo)
        .output()
        .context("failed to run git ls-files")?;
    if !output.status.success() {
        bail!(
            "git ls-files failed in {}: {}",
            repo.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| repo.join(line))
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| CPP_EXTENSIONS.contains(&e))
        })
        .collect())
}

fn format_file(file: &Path) -> Result<()> {
    let status = Command::new("clang-format")
        .arg(file)
        .arg("-style=File")
        .arg("-i")
        .status()
        .context("failed to spawn clang-format")?;
    if !status.success() {
        bail!("exit status {status}");
    }
    Ok(())
}
