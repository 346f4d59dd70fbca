//! External tool invocation.
//!
//! Every tool is started from an explicit argument vector (never a
//! shell string) with both output streams captured and the exit status
//! surfaced to the caller.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use super::{PipelineError, PipelineResult};

/// Captured output streams of a finished tool process.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code; -1 when the process was killed by a signal.
    pub exit_code: i32,
}

impl CapturedOutput {
    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Encoder configuration for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Target bitrate in kbps; omitted for lossless/default mode.
    pub bitrate_kbps: Option<u32>,
    /// Cutoff frequency in Hz.
    pub cutoff_hz: Option<f64>,
    /// Request binary output mode.
    pub binary: bool,
    /// Request the refactored encoding path.
    pub refactor: bool,
    /// Disable the wavelet coding branch.
    pub disable_wavelet: bool,
    /// Disable the vectorial coding branch.
    pub disable_vectorial: bool,
}

impl EncodeOptions {
    /// Build the encoder argument vector for one input/output pair.
    pub fn to_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-f".into(),
            input.as_os_str().to_os_string(),
            "-o".into(),
            output.as_os_str().to_os_string(),
        ];
        if let Some(kb) = self.bitrate_kbps {
            args.push("-kb".into());
            args.push(kb.to_string().into());
        }
        if let Some(cf) = self.cutoff_hz {
            args.push("-cf".into());
            args.push(cf.to_string().into());
        }
        if self.binary {
            args.push("--binary".into());
        }
        if self.refactor {
            args.push("--refactor".into());
        }
        if self.disable_wavelet {
            args.push("--disable-wavelet".into());
        }
        if self.disable_vectorial {
            args.push("--disable-vectorial".into());
        }
        args
    }
}

/// Run an external tool to completion, capturing both streams.
///
/// The exit status is returned, not interpreted; stage runners decide
/// whether non-zero is fatal (the conformance comparator inspects
/// diagnostics from failing encoder runs on purpose).
pub fn run_tool(tool: &Path, args: &[OsString]) -> PipelineResult<CapturedOutput> {
    let mut cmd = Command::new(tool);
    cmd.args(args);

    tracing::debug!("Running {:?}", cmd);

    let output = cmd.output().map_err(|source| PipelineError::Spawn {
        tool: tool.display().to_string(),
        source,
    })?;

    Ok(CapturedOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn opts_all() -> EncodeOptions {
        EncodeOptions {
            bitrate_kbps: Some(16),
            cutoff_hz: Some(72.5),
            binary: true,
            refactor: true,
            disable_wavelet: true,
            disable_vectorial: false,
        }
    }

    #[test]
    fn encode_args_full_set() {
        let args = opts_all().to_args(Path::new("in.ohm"), Path::new("out.hmpg"));
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-f",
                "in.ohm",
                "-o",
                "out.hmpg",
                "-kb",
                "16",
                "-cf",
                "72.5",
                "--binary",
                "--refactor",
                "--disable-wavelet",
            ]
        );
    }

    #[test]
    fn encode_args_default_is_minimal() {
        let args =
            EncodeOptions::default().to_args(Path::new("in.ohm"), Path::new("out.hmpg"));
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn run_tool_reports_spawn_failure() {
        let err = run_tool(&PathBuf::from("/nonexistent/encoder"), &[]).unwrap_err();
        assert!(matches!(err, PipelineError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn run_tool_captures_streams_and_status() {
        // /bin/sh is a stable external collaborator for this test
        let args: Vec<OsString> = vec![
            "-c".into(),
            "echo out; echo err >&2; exit 3".into(),
        ];
        let captured = run_tool(Path::new("/bin/sh"), &args).unwrap();
        assert_eq!(captured.stdout.trim(), "out");
        assert_eq!(captured.stderr.trim(), "err");
        assert_eq!(captured.exit_code, 3);
        assert!(!captured.success());
    }
}
