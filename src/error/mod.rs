use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("{kind} not found at {path}")]
    NotFound { kind: &'static str, path: String },

    #[error("{0} is not available in this build")]
    MissingCapability(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient groups: {0}")]
    InsufficientGroups(String),

    #[error("Scan execution failed: {0}")]
    ScanExecution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "parquet")]
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl AuditError {
    pub fn not_found(kind: &'static str, path: impl AsRef<std::path::Path>) -> Self {
        AuditError::NotFound {
            kind,
            path: path.as_ref().display().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
