//! Error types for ingestion

/// Result type for ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Error types for the ingestion pipeline
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The input file header is missing a column referenced by the source
    /// configuration. Raised before any row is processed.
    #[error("Schema error for source '{source_name}': missing column '{column}'")]
    Schema {
        source_name: String,
        column: String,
    },

    /// A non-empty, non-sentinel field value violates its declared type rule.
    #[error("Coercion error for field '{field}': cannot convert '{value}' ({reason})")]
    Coerce {
        field: String,
        value: String,
        reason: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Unknown source: '{0}' (expected one of: kaggle, crunchbase, hunter)")]
    UnknownSource(String),
}

impl IngestError {
    /// Schema error with owned context
    pub fn schema(source: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Schema {
            source_name: source.into(),
            column: column.into(),
        }
    }

    /// Coercion error with owned context
    pub fn coerce(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Coerce {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}
