//! Stage runner for the external codec pipeline.
//!
//! One run takes a single input signal through
//! Encode -> Decode -> Synthesize (-> Pad), one synchronous external
//! process per stage, recording wall-clock duration per stage. A
//! non-zero exit status aborts the remaining stages and reports the
//! failing stage with its captured diagnostics.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::TempDir;

use crate::config::ToolPaths;
use crate::signal::{pad_symmetric, read_wav, write_wav};

use super::tools::{run_tool, EncodeOptions};
use super::{PipelineError, PipelineResult};

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Encode,
    Decode,
    Synthesize,
    /// Optional post-synthesis symmetric padding.
    Pad,
}

impl Stage {
    /// Stage name for logging and error context.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Encode => "Encode",
            Stage::Decode => "Decode",
            Stage::Synthesize => "Synthesize",
            Stage::Pad => "Pad",
        }
    }
}

/// Wall-clock duration of one completed stage.
#[derive(Debug, Clone, Copy)]
pub struct StageTiming {
    pub stage: Stage,
    pub duration: Duration,
}

/// Where each stage writes its artifact.
#[derive(Debug, Clone)]
pub struct StageOutputs {
    /// Encoded artifact (.hmpg role).
    pub artifact: PathBuf,
    /// Decoded intermediate representation (.hjif role).
    pub intermediate: PathBuf,
    /// Restored signal from the synthesizer (.wav).
    pub restored: PathBuf,
    /// Symmetrically padded restored signal, when padding is configured.
    pub padded: Option<PathBuf>,
}

/// Options for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Encoder configuration.
    pub encode: EncodeOptions,
    /// Ask the synthesizer to also emit its companion artifact.
    pub generate_companion: bool,
    /// Symmetric padding duration in seconds after synthesis.
    pub padding_secs: Option<u32>,
}

/// Result of a completed pipeline run.
///
/// When the run used a scratch directory the artifacts live only as
/// long as this value; dropping it removes them on every exit path.
#[derive(Debug)]
pub struct PipelineRun {
    pub outputs: StageOutputs,
    pub timings: Vec<StageTiming>,
    /// Byte size of the encoded artifact, for bitrate computation.
    pub artifact_bytes: u64,
    _scratch: Option<TempDir>,
}

impl PipelineRun {
    /// Duration of a given stage, if it ran.
    pub fn stage_duration(&self, stage: Stage) -> Option<Duration> {
        self.timings
            .iter()
            .find(|t| t.stage == stage)
            .map(|t| t.duration)
    }
}

/// Drives the external encoder, decoder, and synthesizer.
pub struct CodecPipeline {
    tools: ToolPaths,
}

impl CodecPipeline {
    /// Create a pipeline over resolved tool paths.
    pub fn new(tools: ToolPaths) -> Self {
        Self { tools }
    }

    /// Run the full pipeline writing artifacts to an explicit output tree.
    pub fn run(
        &self,
        input: &Path,
        outputs: StageOutputs,
        options: &RunOptions,
    ) -> PipelineResult<PipelineRun> {
        let mut timings = Vec::with_capacity(4);

        timings.push(self.run_stage(
            Stage::Encode,
            &self.tools.encoder,
            options.encode.to_args(input, &outputs.artifact),
            &outputs.artifact,
        )?);

        timings.push(self.run_stage(
            Stage::Decode,
            &self.tools.decoder,
            io_args(&outputs.artifact, &outputs.intermediate),
            &outputs.intermediate,
        )?);

        let mut synth_args = io_args(&outputs.intermediate, &outputs.restored);
        if options.generate_companion {
            synth_args.push("--generate_ohm".into());
        }
        timings.push(self.run_stage(
            Stage::Synthesize,
            &self.tools.synthesizer,
            synth_args,
            &outputs.restored,
        )?);

        if let (Some(seconds), Some(padded_path)) = (options.padding_secs, &outputs.padded) {
            let started = Instant::now();
            let restored = read_wav(&outputs.restored)?;
            let padded = pad_symmetric(&restored, seconds);
            write_wav(padded_path, &padded)?;
            timings.push(StageTiming {
                stage: Stage::Pad,
                duration: started.elapsed(),
            });
        }

        let artifact_bytes = fs::metadata(&outputs.artifact)?.len();

        Ok(PipelineRun {
            outputs,
            timings,
            artifact_bytes,
            _scratch: None,
        })
    }

    /// Run the full pipeline in a scratch directory.
    ///
    /// Artifacts are removed when the returned run is dropped,
    /// including on error and early-return paths of the caller.
    pub fn run_scratch(
        &self,
        input: &Path,
        stem: &str,
        options: &RunOptions,
    ) -> PipelineResult<PipelineRun> {
        let scratch = TempDir::new()?;
        let dir = scratch.path();
        let outputs = StageOutputs {
            artifact: dir.join(format!("{stem}.hmpg")),
            intermediate: dir.join(format!("{stem}.hjif")),
            restored: dir.join(format!("{stem}.wav")),
            padded: options
                .padding_secs
                .map(|_| dir.join(format!("{stem}_pad.wav"))),
        };

        let mut run = self.run(input, outputs, options)?;
        run._scratch = Some(scratch);
        Ok(run)
    }

    /// Run one external stage, timing it and checking its result.
    fn run_stage(
        &self,
        stage: Stage,
        tool: &Path,
        args: Vec<OsString>,
        expected_output: &Path,
    ) -> PipelineResult<StageTiming> {
        tracing::info!("[{}] {}", stage.name(), tool.display());

        let started = Instant::now();
        let captured = run_tool(tool, &args)?;
        let duration = started.elapsed();

        if !captured.success() {
            return Err(PipelineError::StageFailed {
                stage: stage.name(),
                tool: tool.display().to_string(),
                exit_code: captured.exit_code,
                stderr: captured.stderr,
            });
        }
        if !expected_output.exists() {
            return Err(PipelineError::MissingOutput {
                stage: stage.name(),
                path: expected_output.to_path_buf(),
            });
        }

        tracing::debug!(
            "[{}] completed in {:.3}s",
            stage.name(),
            duration.as_secs_f64()
        );

        Ok(StageTiming { stage, duration })
    }
}

fn io_args(input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "-f".into(),
        input.as_os_str().to_os_string(),
        "-o".into(),
        output.as_os_str().to_os_string(),
    ]
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::metrics::psnr;
    use crate::signal::Signal;
    use std::io::Write;
    use tempfile::tempdir;

    /// Write an executable stub tool script.
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

    /// Stub pipeline where every tool copies -f input to -o output.
    fn identity_tools(dir: &Path) -> ToolPaths {
        ToolPaths {
            encoder: write_stub(dir, "encoder", "cp \"$2\" \"$4\""),
            decoder: write_stub(dir, "decoder", "cp \"$2\" \"$4\""),
            synthesizer: write_stub(dir, "synthesizer", "cp \"$2\" \"$4\""),
        }
    }

    #[test]
    fn identity_pipeline_restores_signal_exactly() {
        let dir = tempdir().unwrap();
        let tools = identity_tools(dir.path());

        // 1-second 8 kHz mono silence
        let original = Signal::mono(vec![0.0; 8000], 8000);
        let input = dir.path().join("silence.wav");
        write_wav(&input, &original).unwrap();
        let input_bytes = fs::metadata(&input).unwrap().len();

        let pipeline = CodecPipeline::new(tools);
        let run = pipeline
            .run_scratch(&input, "silence", &RunOptions::default())
            .unwrap();

        assert_eq!(run.timings.len(), 3);
        assert!(run.stage_duration(Stage::Encode).is_some());
        assert!(run.stage_duration(Stage::Pad).is_none());
        assert_eq!(run.artifact_bytes, input_bytes);

        let restored = read_wav(&run.outputs.restored).unwrap();
        assert_eq!(psnr(&original, &restored), 100.0);
    }

    #[test]
    fn padding_stage_runs_when_configured() {
        let dir = tempdir().unwrap();
        let tools = identity_tools(dir.path());

        let input = dir.path().join("tone.wav");
        write_wav(&input, &Signal::mono(vec![0.25; 8000], 8000)).unwrap();

        let options = RunOptions {
            padding_secs: Some(1),
            ..Default::default()
        };
        let pipeline = CodecPipeline::new(tools);
        let run = pipeline.run_scratch(&input, "tone", &options).unwrap();

        assert_eq!(run.timings.len(), 4);
        let padded = read_wav(run.outputs.padded.as_ref().unwrap()).unwrap();
        assert_eq!(padded.frames(), 3 * 8000);
    }

    #[test]
    fn failing_stage_aborts_with_diagnostics() {
        let dir = tempdir().unwrap();
        let tools = ToolPaths {
            encoder: write_stub(dir.path(), "encoder", "cp \"$2\" \"$4\""),
            decoder: write_stub(dir.path(), "decoder", "echo 'bad stream' >&2; exit 2"),
            synthesizer: write_stub(dir.path(), "synthesizer", "cp \"$2\" \"$4\""),
        };

        let input = dir.path().join("in.wav");
        write_wav(&input, &Signal::mono(vec![0.0; 800], 8000)).unwrap();

        let pipeline = CodecPipeline::new(tools);
        let err = pipeline
            .run_scratch(&input, "in", &RunOptions::default())
            .unwrap_err();

        match err {
            PipelineError::StageFailed {
                stage,
                exit_code,
                stderr,
                ..
            } => {
                assert_eq!(stage, "Decode");
                assert_eq!(exit_code, 2);
                assert!(stderr.contains("bad stream"));
            }
            other => panic!("expected StageFailed, got {other:?}"),
        }
    }

    #[test]
    fn silent_tool_without_output_is_missing_output() {
        let dir = tempdir().unwrap();
        let tools = ToolPaths {
            encoder: write_stub(dir.path(), "encoder", "exit 0"),
            decoder: write_stub(dir.path(), "decoder", "cp \"$2\" \"$4\""),
            synthesizer: write_stub(dir.path(), "synthesizer", "cp \"$2\" \"$4\""),
        };

        let input = dir.path().join("in.wav");
        write_wav(&input, &Signal::mono(vec![0.0; 800], 8000)).unwrap();

        let pipeline = CodecPipeline::new(tools);
        let err = pipeline
            .run_scratch(&input, "in", &RunOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingOutput { stage: "Encode", .. }
        ));
    }

    #[test]
    fn scratch_artifacts_removed_on_drop() {
        let dir = tempdir().unwrap();
        let tools = identity_tools(dir.path());

        let input = dir.path().join("in.wav");
        write_wav(&input, &Signal::mono(vec![0.0; 800], 8000)).unwrap();

        let pipeline = CodecPipeline::new(tools);
        let run = pipeline
            .run_scratch(&input, "in", &RunOptions::default())
            .unwrap();
        let artifact = run.outputs.artifact.clone();
        assert!(artifact.exists());

        drop(run);
        assert!(!artifact.exists());
    }
}
