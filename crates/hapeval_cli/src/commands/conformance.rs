//! `hapeval conformance`: encoder conformance sets.

use std::path::Path;

use anyhow::{bail, Context, Result};

use hapeval_core::config::load_config;
use hapeval_core::conformance::{run_conformance, CaseOutcome, ConformanceSet};

pub fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let section = config
        .conformance_files
        .as_ref()
        .context("config declares no conformance_files section")?;

    let report = run_conformance(&config.tool_paths(), section)?;

    let mut current_set: Option<ConformanceSet> = None;
    for result in &report.results {
        if current_set != Some(result.set) {
            println!("== {} ==", result.set.label());
            current_set = Some(result.set);
        }
        let verdict = match &result.outcome {
            CaseOutcome::Passed => "PASSED".to_string(),
            CaseOutcome::Failed { .. } => "FAILED".to_string(),
            CaseOutcome::NotImplemented => "NOT YET IMPLEMENTED".to_string(),
            CaseOutcome::NotFound { path } => format!("NOT FOUND ({path})"),
        };
        println!("[{}] {}: {}", result.ordinal, result.name, verdict);
    }

    let summary = if report.is_success() { "SUCCESS" } else { "FAIL" };
    println!("\n{summary}: {}/{}", report.passed(), report.attempted());

    for failure in report.failures() {
        if let CaseOutcome::Failed { actual, expected } = &failure.outcome {
            println!("\n--- {} ---", failure.name);
            println!("expected:\n{expected}");
            println!("actual:\n{actual}");
        }
    }

    if !report.is_success() {
        bail!("conformance run failed");
    }
    Ok(())
}
