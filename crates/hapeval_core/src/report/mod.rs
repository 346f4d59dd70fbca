//! Report accumulation and emission.
//!
//! One evaluation row per test case per test set, with interleaved
//! (bitrate, psnr) pairs in ladder order, plus the Bjontegaard summary
//! table and per-signal rate-distortion plots.

mod plot;

pub use plot::plot_rd_curve;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::metrics::BjontegaardResult;

/// One (bitrate, PSNR) point of a rate-distortion curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateDistortionPoint {
    pub bitrate_kbps: f64,
    pub psnr_db: f64,
}

/// One evaluation row: a test case scored across the bitrate ladder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalRow {
    /// Signal/effect name.
    pub name: String,
    /// Test-set label, e.g. `Test1_2`.
    pub test_set: String,
    /// Type or source extension label.
    pub kind: String,
    /// Points in ladder order.
    pub points: Vec<RateDistortionPoint>,
}

impl EvalRow {
    /// Bitrates of this row's points.
    pub fn rates(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.bitrate_kbps).collect()
    }

    /// PSNR values of this row's points.
    pub fn psnrs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.psnr_db).collect()
    }
}

/// One line of the Bjontegaard summary table.
#[derive(Debug, Clone)]
pub struct BjontegaardRow {
    pub name: String,
    pub kind: String,
    pub result: BjontegaardResult,
}

/// Errors raised while writing or loading report tables.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed report table {path} at line {line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("plot rendering failed: {0}")]
    Plot(String),
}

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Accumulates evaluation rows for one run and emits the report files.
///
/// The only stateful component of the evaluation engine: rows are
/// collected across the whole batch in configuration order.
#[derive(Debug)]
pub struct ReportWriter {
    ladder: Vec<u32>,
    rows: Vec<EvalRow>,
}

impl ReportWriter {
    /// Create a writer for a given bitrate ladder.
    pub fn new(ladder: Vec<u32>) -> Self {
        Self {
            ladder,
            rows: Vec::new(),
        }
    }

    /// The configured bitrate ladder.
    pub fn ladder(&self) -> &[u32] {
        &self.ladder
    }

    /// Append one evaluation row.
    pub fn push_row(&mut self, row: EvalRow) {
        self.rows.push(row);
    }

    /// Rows accumulated so far, in insertion order.
    pub fn rows(&self) -> &[EvalRow] {
        &self.rows
    }

    /// Write the evaluation table (`bitratePSNR.csv` shape).
    pub fn write_eval_csv(&self, path: &Path) -> ReportResult<()> {
        let mut out = String::new();
        out.push_str("File,Test set,Type");
        for bitrate in &self.ladder {
            out.push_str(&format!(",{bitrate}kbps bitrate,{bitrate}kbps psnr"));
        }
        out.push('\n');

        for row in &self.rows {
            out.push_str(&format!("{},{},{}", row.name, row.test_set, row.kind));
            for point in &row.points {
                out.push_str(&format!(",{},{}", point.bitrate_kbps, point.psnr_db));
            }
            out.push('\n');
        }

        write_file(path, &out)
    }

    /// Write the Bjontegaard summary table.
    pub fn write_bjontegaard_csv(path: &Path, rows: &[BjontegaardRow]) -> ReportResult<()> {
        let mut out = String::from("File,Type,PSNR difference,bitrate savings (%)\n");
        for row in rows {
            out.push_str(&format!(
                "{},{},{},{}\n",
                row.name,
                row.kind,
                row.result.avg_psnr_delta_db,
                row.result.avg_bitrate_savings_pct
            ));
        }
        write_file(path, &out)
    }

    /// Load a previously stored table in the evaluation row shape.
    ///
    /// Used for the reference rate-distortion table the Bjontegaard
    /// comparison runs against.
    pub fn load_table(path: &Path) -> ReportResult<Vec<EvalRow>> {
        let content = fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut rows = Vec::new();
        // First line is the header
        for (index, line) in content.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() < 3 {
                return Err(ReportError::Malformed {
                    path: path.to_path_buf(),
                    line: index + 1,
                    reason: format!("expected at least 3 columns, got {}", fields.len()),
                });
            }

            let mut points = Vec::new();
            let mut i = 3;
            while i + 1 < fields.len() {
                let bitrate_kbps = parse_float(path, index + 1, fields[i])?;
                let psnr_db = parse_float(path, index + 1, fields[i + 1])?;
                points.push(RateDistortionPoint {
                    bitrate_kbps,
                    psnr_db,
                });
                i += 2;
            }

            rows.push(EvalRow {
                name: fields[0].to_string(),
                test_set: fields[1].to_string(),
                kind: fields[2].to_string(),
                points,
            });
        }

        Ok(rows)
    }
}

fn parse_float(path: &Path, line: usize, field: &str) -> ReportResult<f64> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|e| ReportError::Malformed {
            path: path.to_path_buf(),
            line,
            reason: format!("bad number {field:?}: {e}"),
        })
}

fn write_file(path: &Path, content: &str) -> ReportResult<()> {
    let mut file = fs::File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(content.as_bytes())
        .map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
}
