//! Evaluation configuration: typed JSON schema and load-time validation.

mod loader;
mod schema;

pub use loader::{load_config, ConfigError, ConfigResult};
pub use schema::{
    ConformanceCase, ConformanceSection, EvalConfig, OnError, ReferenceEffect, ReferenceSection,
    ToolPaths,
};
