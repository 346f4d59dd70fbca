//! Encoder conformance checking.
//!
//! Each conformance case feeds a fixed input to the encoder and
//! compares the diagnostic (stderr) output, line by line, against a
//! literal expected text. The encoder's exit status is deliberately
//! not interpreted: invalid inputs are expected to make it complain,
//! and the complaint is exactly what is being checked.

use tempfile::TempDir;

use crate::config::{ConformanceCase, ConformanceSection, ToolPaths};
use crate::pipeline::{run_tool, PipelineResult};

/// The two recognized conformance categories.
///
/// They are processed identically but reported under separate headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConformanceSet {
    Schemas,
    Semantic,
}

impl ConformanceSet {
    /// Heading label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            ConformanceSet::Schemas => "schemas_checks",
            ConformanceSet::Semantic => "semantic_checks",
        }
    }
}

/// Outcome of one conformance case.
#[derive(Debug, Clone)]
pub enum CaseOutcome {
    /// Diagnostic output matched the expected text exactly.
    Passed,
    /// Diagnostic output differed; both sides kept verbatim.
    Failed { actual: String, expected: String },
    /// Input path declared empty: counted as attempted, not scored.
    NotImplemented,
    /// Input file missing on disk: excluded from the pass count.
    NotFound { path: String },
}

/// Result of one conformance case with its reporting context.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub set: ConformanceSet,
    /// 1-based case number within its set.
    pub ordinal: usize,
    pub name: String,
    pub outcome: CaseOutcome,
}

/// Aggregated results over both conformance sets.
#[derive(Debug, Default)]
pub struct ConformanceReport {
    pub results: Vec<CaseResult>,
}

impl ConformanceReport {
    /// Cases counted as attempted (everything except missing files).
    pub fn attempted(&self) -> usize {
        self.results
            .iter()
            .filter(|r| !matches!(r.outcome, CaseOutcome::NotFound { .. }))
            .count()
    }

    /// Cases whose diagnostics matched.
    pub fn passed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, CaseOutcome::Passed))
            .count()
    }

    /// Whether every attempted case passed.
    pub fn is_success(&self) -> bool {
        self.passed() == self.attempted()
    }

    /// Failed cases, with actual and expected text.
    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, CaseOutcome::Failed { .. }))
    }
}

/// Run both conformance sets against the encoder.
///
/// A failing case never aborts the remaining cases; every case is
/// processed strictly in configuration order.
pub fn run_conformance(
    tools: &ToolPaths,
    section: &ConformanceSection,
) -> PipelineResult<ConformanceReport> {
    let scratch = TempDir::new()?;
    let mut report = ConformanceReport::default();

    for (set, cases) in [
        (ConformanceSet::Schemas, &section.schemas_checks),
        (ConformanceSet::Semantic, &section.semantic_checks),
    ] {
        for (index, case) in cases.iter().enumerate() {
            let outcome = run_case(tools, section, case, scratch.path())?;
            report.results.push(CaseResult {
                set,
                ordinal: index + 1,
                name: case.name.clone(),
                outcome,
            });
        }
    }

    Ok(report)
}

/// Run a single conformance case.
fn run_case(
    tools: &ToolPaths,
    section: &ConformanceSection,
    case: &ConformanceCase,
    scratch: &std::path::Path,
) -> PipelineResult<CaseOutcome> {
    if case.haptic_file_path.is_empty() {
        return Ok(CaseOutcome::NotImplemented);
    }

    let input = section.resolve_input(case);
    if !input.exists() {
        tracing::warn!("Conformance input not found: {}", input.display());
        return Ok(CaseOutcome::NotFound {
            path: input.display().to_string(),
        });
    }

    let artifact = scratch.join("conformance.hjif");
    let args = vec![
        "-f".into(),
        input.as_os_str().to_os_string(),
        "-o".into(),
        artifact.as_os_str().to_os_string(),
    ];
    let captured = run_tool(&tools.encoder, &args)?;

    // Order-sensitive, exact per-line comparison with no normalization
    let matches = captured
        .stderr
        .lines()
        .eq(case.expected_output.lines());

    if matches {
        Ok(CaseOutcome::Passed)
    } else {
        Ok(CaseOutcome::Failed {
            actual: captured.stderr,
            expected: case.expected_output.clone(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "#!/bin/sh\n{body}").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn tools_with_encoder(encoder: PathBuf) -> ToolPaths {
        ToolPaths {
            decoder: encoder.clone(),
            synthesizer: encoder.clone(),
            encoder,
        }
    }

    fn case(name: &str, input: &str, expected: &str) -> ConformanceCase {
        ConformanceCase {
            name: name.to_string(),
            modality: None,
            haptic_file_path: input.to_string(),
            expected_output: expected.to_string(),
        }
    }

    #[test]
    fn matching_diagnostics_pass() {
        let dir = tempdir().unwrap();
        // Encoder that always emits the same two diagnostic lines
        let encoder = write_stub(
            dir.path(),
            "encoder",
            "echo 'line one' >&2; echo 'line two' >&2; exit 1",
        );
        fs::write(dir.path().join("input.ohm"), b"x").unwrap();

        let section = ConformanceSection {
            main_folder: Some(dir.path().to_path_buf()),
            schemas_checks: vec![case("good", "input.ohm", "line one\nline two")],
            semantic_checks: Vec::new(),
        };

        let report = run_conformance(&tools_with_encoder(encoder), &section).unwrap();
        assert_eq!(report.attempted(), 1);
        assert_eq!(report.passed(), 1);
        assert!(report.is_success());
    }

    #[test]
    fn one_line_mismatch_fails_without_aborting_batch() {
        let dir = tempdir().unwrap();
        let encoder = write_stub(dir.path(), "encoder", "echo 'actual text' >&2");
        fs::write(dir.path().join("a.ohm"), b"x").unwrap();
        fs::write(dir.path().join("b.ohm"), b"x").unwrap();

        let section = ConformanceSection {
            main_folder: Some(dir.path().to_path_buf()),
            schemas_checks: vec![
                case("mismatched", "a.ohm", "expected text"),
                case("matched", "b.ohm", "actual text"),
            ],
            semantic_checks: Vec::new(),
        };

        let report = run_conformance(&tools_with_encoder(encoder), &section).unwrap();
        assert_eq!(report.attempted(), 2);
        assert_eq!(report.passed(), 1);
        assert!(!report.is_success());

        let failure = report.failures().next().unwrap();
        assert_eq!(failure.name, "mismatched");
        match &failure.outcome {
            CaseOutcome::Failed { actual, expected } => {
                assert_eq!(actual.trim(), "actual text");
                assert_eq!(expected, "expected text");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_not_yet_implemented() {
        let dir = tempdir().unwrap();
        let encoder = write_stub(dir.path(), "encoder", "exit 0");

        let section = ConformanceSection {
            main_folder: Some(dir.path().to_path_buf()),
            schemas_checks: vec![case("todo", "", "")],
            semantic_checks: Vec::new(),
        };

        let report = run_conformance(&tools_with_encoder(encoder), &section).unwrap();
        assert_eq!(report.attempted(), 1);
        assert_eq!(report.passed(), 0);
        assert!(matches!(
            report.results[0].outcome,
            CaseOutcome::NotImplemented
        ));
    }

    #[test]
    fn missing_input_excluded_from_both_counts() {
        let dir = tempdir().unwrap();
        let encoder = write_stub(dir.path(), "encoder", "echo ok >&2");
        fs::write(dir.path().join("real.ohm"), b"x").unwrap();

        let section = ConformanceSection {
            main_folder: Some(dir.path().to_path_buf()),
            schemas_checks: vec![
                case("ghost", "missing.ohm", "ok"),
                case("real", "real.ohm", "ok"),
            ],
            semantic_checks: Vec::new(),
        };

        let report = run_conformance(&tools_with_encoder(encoder), &section).unwrap();
        assert_eq!(report.attempted(), 1);
        assert_eq!(report.passed(), 1);
        assert!(report.is_success());
        assert!(matches!(
            report.results[0].outcome,
            CaseOutcome::NotFound { .. }
        ));
    }

    #[test]
    fn sets_are_reported_under_their_own_headings() {
        let dir = tempdir().unwrap();
        let encoder = write_stub(dir.path(), "encoder", "echo ok >&2");
        fs::write(dir.path().join("in.ohm"), b"x").unwrap();

        let section = ConformanceSection {
            main_folder: Some(dir.path().to_path_buf()),
            schemas_checks: vec![case("schema case", "in.ohm", "ok")],
            semantic_checks: vec![case("semantic case", "in.ohm", "ok")],
        };

        let report = run_conformance(&tools_with_encoder(encoder), &section).unwrap();
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].set, ConformanceSet::Schemas);
        assert_eq!(report.results[0].ordinal, 1);
        assert_eq!(report.results[1].set, ConformanceSet::Semantic);
        assert_eq!(report.results[1].ordinal, 1);
    }
}
