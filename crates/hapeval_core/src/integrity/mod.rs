//! Test-data integrity verification.
//!
//! Verifies a data tree against an md5 manifest. Each manifest line is
//! `<32-hex-digest>  <relative path>`, the format `md5sum` emits.

use std::fs;
use std::path::{Path, PathBuf};

/// Verification status of one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Digest matched.
    Ok,
    /// File present but its digest differed.
    Mismatch { expected: String, actual: String },
    /// File listed in the manifest but absent from the tree.
    Missing,
}

/// One verified manifest entry.
#[derive(Debug, Clone)]
pub struct FileCheck {
    /// Path relative to the data directory, as written in the manifest.
    pub path: PathBuf,
    pub status: FileStatus,
}

/// Outcome of verifying a whole manifest.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub checks: Vec<FileCheck>,
}

impl IntegrityReport {
    /// Entries whose digest matched.
    pub fn ok(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == FileStatus::Ok)
            .count()
    }

    /// Whether every listed file was present with the right digest.
    pub fn is_success(&self) -> bool {
        self.ok() == self.checks.len()
    }

    /// Entries that failed, either mismatched or missing.
    pub fn problems(&self) -> impl Iterator<Item = &FileCheck> {
        self.checks.iter().filter(|c| c.status != FileStatus::Ok)
    }
}

/// Errors raised while reading or parsing the manifest.
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    #[error("cannot read manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest line {line}: {content:?}")]
    MalformedLine { line: usize, content: String },

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Verify every file listed in `manifest` below `data_dir`.
///
/// Mismatches and missing files are reported, not fatal; only an
/// unreadable manifest or an I/O failure on an existing file aborts.
pub fn verify_manifest(data_dir: &Path, manifest: &Path) -> Result<IntegrityReport, IntegrityError> {
    let content = fs::read_to_string(manifest).map_err(|source| IntegrityError::Manifest {
        path: manifest.to_path_buf(),
        source,
    })?;

    let mut report = IntegrityReport::default();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (expected, rel_path) = parse_line(index + 1, line)?;
        let full_path = data_dir.join(&rel_path);

        let status = if !full_path.is_file() {
            tracing::warn!("Listed file missing: {}", full_path.display());
            FileStatus::Missing
        } else {
            let bytes = fs::read(&full_path).map_err(|source| IntegrityError::Read {
                path: full_path.clone(),
                source,
            })?;
            let actual = format!("{:x}", md5::compute(&bytes));
            if actual == expected {
                FileStatus::Ok
            } else {
                tracing::warn!(
                    "Digest mismatch for {}: expected {expected}, got {actual}",
                    full_path.display()
                );
                FileStatus::Mismatch {
                    expected: expected.clone(),
                    actual,
                }
            }
        };

        report.checks.push(FileCheck {
            path: rel_path,
            status,
        });
    }

    Ok(report)
}

fn parse_line(line: usize, content: &str) -> Result<(String, PathBuf), IntegrityError> {
    let malformed = || IntegrityError::MalformedLine {
        line,
        content: content.to_string(),
    };

    let (digest, rest) = content.split_once(char::is_whitespace).ok_or_else(malformed)?;
    let path = rest.trim_start();
    if digest.len() != 32 || !digest.chars().all(|c| c.is_ascii_hexdigit()) || path.is_empty() {
        return Err(malformed());
    }
    Ok((digest.to_ascii_lowercase(), PathBuf::from(path)))
}
