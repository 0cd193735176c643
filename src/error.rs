use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::quality::CheckFailure;

#[derive(Error, Debug)]
pub enum WarehouseError {
    #[error("warehouse query failed: {0}")]
    Duckdb(#[from] duckdb::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("missing required extract files in {}:\n - {}", .raw_dir.display(), .missing.join("\n - "))]
    MissingInputs { raw_dir: PathBuf, missing: Vec<String> },

    #[error("missing transformation stage file: {}", .0.display())]
    MissingStageFile(PathBuf),

    #[error("stage '{name}' failed: {source}")]
    StageFailed {
        name: String,
        #[source]
        source: duckdb::Error,
    },

    #[error("{} quality check(s) failed; re-run with --allow-quality-failures to bypass", .failures.len())]
    QualityGateFailed { failures: Vec<CheckFailure> },

    #[error("export object does not exist in warehouse: {0}")]
    MissingExportObject(String),

    #[error("warehouse file not found: {}", .0.display())]
    WarehouseNotFound(PathBuf),

    #[error("warehouse validation failed: {0}")]
    ValidationFailed(String),
}

pub type Result<T> = std::result::Result<T, WarehouseError>;
