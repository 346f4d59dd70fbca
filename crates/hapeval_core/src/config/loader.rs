//! Config loading with validation in a single pass.
//!
//! All problems found in one load are aggregated into a single error so
//! a user fixes the config once, not assertion by assertion.

use std::fs;
use std::path::{Path, PathBuf};

use super::schema::EvalConfig;

/// Errors that can occur while loading the evaluation config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("config file should be a .json file: {0}")]
    WrongExtension(PathBuf),

    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config:\n  - {}", problems.join("\n  - "))]
    Invalid { problems: Vec<String> },
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate the evaluation config.
///
/// The file must exist, carry a `.json` extension, parse into the typed
/// schema, and declare three existing executable tool paths. Every
/// violation found is collected before returning.
pub fn load_config(path: &Path) -> ConfigResult<EvalConfig> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(ConfigError::WrongExtension(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let config: EvalConfig = serde_json::from_str(&content)?;

    let problems = validate(&config);
    if !problems.is_empty() {
        return Err(ConfigError::Invalid { problems });
    }

    tracing::debug!("Loaded evaluation config from {}", path.display());
    Ok(config)
}

/// Collect every validation problem in the parsed config.
fn validate(config: &EvalConfig) -> Vec<String> {
    let mut problems = Vec::new();

    if !config.install_dir.is_dir() {
        problems.push(format!(
            "install_dir is not an existing directory: {}",
            config.install_dir.display()
        ));
    }

    let tools = config.tool_paths();
    for (key, path) in [
        ("encoder_path", &tools.encoder),
        ("decoder_path", &tools.decoder),
        ("synthesizer_path", &tools.synthesizer),
    ] {
        if !path.is_file() {
            problems.push(format!("{key} should be an existing file: {}", path.display()));
        } else if !is_executable(path) {
            problems.push(format!("{key} should be executable: {}", path.display()));
        }
    }

    problems
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}
