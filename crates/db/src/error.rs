use std::path::PathBuf;

use edi_core::error::ConfigError;

/// Errors that abort a provisioning run.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// The server could not be reached or rejected the credentials.
    #[error("Database connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    /// Any other database error (create/select database, verification queries).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Schema file not found: {}", path.display())]
    SchemaNotFound { path: PathBuf },

    #[error("Failed to read schema file {}: {source}", path.display())]
    SchemaRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A schema statement failed. Statements before `index` stay applied.
    #[error("Statement {index} failed: {source}")]
    Statement {
        /// 1-based position in the filtered statement list.
        index: usize,
        /// First 100 characters of the statement.
        preview: String,
        /// The statement was longer than `preview`.
        truncated: bool,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
