//! `hapeval submission`: full rate-distortion evaluation run.
//!
//! Drives every configured reference effect through the codec pipeline
//! at each ladder bitrate, scores bitrate and PSNR against the rendered
//! reference, and emits the evaluation table plus (optionally) the
//! Bjontegaard comparison against a stored reference table.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Args, ValueEnum};

use hapeval_core::config::{load_config, OnError, ReferenceEffect, ReferenceSection};
use hapeval_core::metrics::{
    bitrate_kbps, bjontegaard, meets_psnr_reference, psnr_files, BitrateMode,
};
use hapeval_core::pipeline::{CodecPipeline, EncodeOptions, RunOptions, StageOutputs};
use hapeval_core::report::{
    plot_rd_curve, BjontegaardRow, EvalRow, RateDistortionPoint, ReportWriter,
};
use hapeval_core::signal::read_wav;

const TEST_TYPES: &[&str] = &["Test", "Training", "Evaluation"];

#[derive(Args, Debug)]
pub struct SubmissionArgs {
    /// Evaluation config (JSON)
    pub config: PathBuf,

    /// Codec format version tag, embedded in output file names
    pub version: String,

    /// Encoder cutoff frequency in Hz
    #[arg(long, default_value_t = 72.5)]
    pub cutoff: f64,

    /// Output folder (recreated from scratch)
    #[arg(short, long, default_value = "./out")]
    pub output: PathBuf,

    /// Bitrate ladder in kbps
    #[arg(short, long, num_args = 1.., default_values_t = [2u32, 8, 16, 64])]
    pub bitrates: Vec<u32>,

    /// Symmetric padding in seconds applied after synthesis (0 disables)
    #[arg(long, default_value_t = 1)]
    pub padding: u32,

    /// Only process effects whose type matches
    #[arg(long)]
    pub filter_by_type: Option<String>,

    /// Disable the wavelet coding branch
    #[arg(long)]
    pub disable_wavelet: bool,

    /// Disable the vectorial coding branch (ignored with --disable-wavelet)
    #[arg(long)]
    pub disable_vectorial: bool,

    /// Compute Bjontegaard deltas against the stored reference table
    #[arg(long)]
    pub bjontegaard: bool,

    /// What to do when a single case fails
    #[arg(long, value_enum, default_value_t = OnErrorArg::Abort)]
    pub on_error: OnErrorArg,
}

/// Batch continuation policy, exposed as a flag value.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OnErrorArg {
    Abort,
    Skip,
}

impl From<OnErrorArg> for OnError {
    fn from(value: OnErrorArg) -> Self {
        match value {
            OnErrorArg::Abort => OnError::Abort,
            OnErrorArg::Skip => OnError::Skip,
        }
    }
}

pub fn run(args: SubmissionArgs) -> Result<()> {
    println!("[{}] START", Local::now().format("%Hh:%Mm:%Ss"));

    let config = load_config(&args.config)?;
    let on_error: OnError = args.on_error.into();

    generate_output_tree(&args.output)?;

    let Some(refs) = config.reference_files.as_ref() else {
        tracing::warn!("Config declares no reference_files; nothing to evaluate");
        return Ok(());
    };

    let pipeline = CodecPipeline::new(config.tool_paths());
    let mut writer = ReportWriter::new(args.bitrates.clone());

    for (set_id, effects) in refs.test_sets() {
        for effect in effects {
            if let Some(filter) = &args.filter_by_type {
                if filter != &effect.kind {
                    continue;
                }
            }
            let points = match evaluate_effect(&args, &pipeline, refs, set_id, effect) {
                Ok(points) => points,
                Err(err) if on_error == OnError::Skip => {
                    tracing::warn!("Skipping {}: {err:#}", effect.name);
                    continue;
                }
                Err(err) => return Err(err),
            };
            writer.push_row(EvalRow {
                name: effect.name.clone(),
                test_set: format!("{}1_{set_id}", effect.kind),
                kind: effect.extension.clone(),
                points,
            });
        }
    }

    let eval_csv = args.output.join("bitratePSNR.csv");
    writer.write_eval_csv(&eval_csv)?;
    println!("[{}] Wrote {}", Local::now().format("%Hh:%Mm:%Ss"), eval_csv.display());

    if args.bjontegaard {
        write_bjontegaard(&args.output, refs, &writer, on_error)?;
    }

    println!("[{}] FINISH", Local::now().format("%Hh:%Mm:%Ss"));
    Ok(())
}

/// Run one effect through the ladder, returning its curve points.
///
/// A missing codec input is logged and yields a shorter curve; stage
/// failures bubble up for the caller's continuation policy.
fn evaluate_effect(
    args: &SubmissionArgs,
    pipeline: &CodecPipeline,
    refs: &ReferenceSection,
    set_id: usize,
    effect: &ReferenceEffect,
) -> Result<Vec<RateDistortionPoint>> {
    let input = refs.resolve(&effect.haptic_file_path);
    let reference_path = refs.resolve(&effect.reference_file);

    if !input.exists() {
        tracing::warn!("FILE NOT FOUND: {}", input.display());
        return Ok(Vec::new());
    }
    let reference = read_wav(&reference_path)?;

    let set_dir = args.output.join(format!("{}1_{set_id}", effect.kind));
    let mut points = Vec::with_capacity(args.bitrates.len());

    for &bitrate in &args.bitrates {
        println!(
            "[{}] Encoder ({bitrate}kbps) on: {}",
            Local::now().format("%Hh:%Mm:%Ss"),
            effect.name
        );

        let stem = format!(
            "{}1_{set_id}fvt_{}_{bitrate}_{}",
            effect.kind, args.version, effect.name
        );
        let outputs = StageOutputs {
            artifact: set_dir.join("HMPG").join(format!("{stem}.hmpg")),
            intermediate: set_dir.join("HJIF").join(format!("{stem}.hjif")),
            restored: set_dir.join("WAV_nopad").join(format!("{stem}_nopad.wav")),
            padded: (args.padding > 0)
                .then(|| set_dir.join("WAV_pad").join(format!("{stem}_pad.wav"))),
        };
        let options = RunOptions {
            encode: EncodeOptions {
                bitrate_kbps: Some(bitrate),
                cutoff_hz: Some(args.cutoff),
                binary: true,
                refactor: true,
                disable_wavelet: args.disable_wavelet,
                disable_vectorial: args.disable_vectorial && !args.disable_wavelet,
            },
            generate_companion: true,
            padding_secs: (args.padding > 0).then_some(args.padding),
        };

        let run = pipeline.run(&input, outputs, &options)?;
        points.push(RateDistortionPoint {
            bitrate_kbps: bitrate_kbps(&reference, run.artifact_bytes, BitrateMode::PerChannel),
            psnr_db: psnr_files(&run.outputs.restored, &reference_path, true)?,
        });
    }

    // Regression check against the stored per-file PSNR reference; the
    // reference was recorded at the best quality, so the highest ladder
    // point is the one held to it.
    if let (Some(reference_db), false) = (effect.psnr_ref, points.is_empty()) {
        let best = points
            .iter()
            .map(|p| p.psnr_db)
            .fold(f64::NEG_INFINITY, f64::max);
        if !meets_psnr_reference(best, reference_db) {
            bail!(
                "PSNR regression for {}: best {best:.2} dB against stored reference {reference_db} dB",
                effect.name
            );
        }
    }

    Ok(points)
}

/// Recreate the submission output tree from scratch.
fn generate_output_tree(output: &Path) -> Result<()> {
    if output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("cannot clear output folder {}", output.display()))?;
    }
    for test_type in TEST_TYPES {
        for set_id in 1..=3 {
            let set_dir = output.join(format!("{test_type}1_{set_id}"));
            for sub in ["HMPG", "HJIF", "WAV_nopad", "WAV_pad"] {
                fs::create_dir_all(set_dir.join(sub))
                    .with_context(|| format!("cannot create {}", set_dir.display()))?;
            }
        }
    }
    Ok(())
}

/// Compute per-signal Bjontegaard deltas against the stored reference
/// table and render the overlaid rate-distortion plots.
fn write_bjontegaard(
    output: &Path,
    refs: &ReferenceSection,
    writer: &ReportWriter,
    on_error: OnError,
) -> Result<()> {
    let table_path = refs
        .reference_bitrate_psnr
        .as_ref()
        .context("--bjontegaard requires reference_bitratePSNR in the config")?;
    let reference_rows = ReportWriter::load_table(&refs.resolve(table_path))?;

    let test_rows = writer.rows();
    if reference_rows.len() != test_rows.len() {
        tracing::warn!(
            "Reference table has {} rows, this run produced {}; comparing by position",
            reference_rows.len(),
            test_rows.len()
        );
    }

    let bjontegaard_dir = output.join("Bjontegaard");
    let plots_dir = bjontegaard_dir.join("Plots");
    fs::create_dir_all(&plots_dir)
        .with_context(|| format!("cannot create {}", plots_dir.display()))?;

    let mut rows = Vec::new();
    for (reference, test) in reference_rows.iter().zip(test_rows) {
        let result = match bjontegaard(
            &reference.rates(),
            &reference.psnrs(),
            &test.rates(),
            &test.psnrs(),
        ) {
            Ok(result) => result,
            Err(err) if on_error == OnError::Skip => {
                tracing::warn!("Bjontegaard failed for {}: {err}", reference.name);
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        plot_rd_curve(
            &plots_dir.join(format!("{}.png", reference.name)),
            &reference.name,
            &reference.points,
            &test.points,
        )?;

        rows.push(BjontegaardRow {
            name: reference.name.clone(),
            kind: reference.kind.clone(),
            result,
        });
    }

    ReportWriter::write_bjontegaard_csv(&bjontegaard_dir.join("bjontegaard.csv"), &rows)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn output_tree_has_all_set_folders() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        generate_output_tree(&out).unwrap();

        for test_type in TEST_TYPES {
            for set_id in 1..=3 {
                for sub in ["HMPG", "HJIF", "WAV_nopad", "WAV_pad"] {
                    assert!(out.join(format!("{test_type}1_{set_id}")).join(sub).is_dir());
                }
            }
        }
    }

    #[test]
    fn existing_output_tree_is_recreated() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        generate_output_tree(&out).unwrap();
        let stale = out.join("Test1_1/HMPG/old.hmpg");
        fs::write(&stale, b"stale").unwrap();

        generate_output_tree(&out).unwrap();
        assert!(!stale.exists());
        assert!(out.join("Test1_1/HMPG").is_dir());
    }
}
