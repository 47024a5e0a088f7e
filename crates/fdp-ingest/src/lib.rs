//! FDP Ingest Library
//!
//! Ingests vendor CSV exports describing companies into a normalized
//! PostgreSQL schema.
//!
//! # Supported Data Sources
//!
//! - **Kaggle**: Fortune 500 export with financial figures
//! - **Crunchbase**: organization export with categories, roles and aliases
//! - **Hunter**: domain-centric company export with technology stacks
//!
//! Each source goes through the same pipeline: a delimited file is loaded
//! and mapped into normalized records, field values are coerced to their
//! declared types, records are sharded into per-table projections carrying
//! a shared surrogate key, and every projection is written inside a single
//! transaction per source.
//!
//! # Example
//!
//! ```no_run
//! use fdp_ingest::{pipeline, Source};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = sqlx::PgPool::connect("postgresql://localhost/fdp").await?;
//!     let stats = pipeline::run(&pool, Source::Kaggle, Path::new("./data")).await?;
//!     println!("{} rows written", stats.rows_written);
//!     Ok(())
//! }
//! ```

pub mod coerce;
pub mod error;
pub mod identity;
pub mod mapper;
pub mod pipeline;
pub mod record;
pub mod shard;
pub mod source;
pub mod storage;

// Re-export main types
pub use coerce::TypeRule;
pub use error::{IngestError, Result};
pub use identity::{IdGenerator, SequentialIdGenerator, UuidGenerator};
pub use pipeline::{prepare, run, SourceStats};
pub use record::{NormalizedRecord, SourceDataset, TableProjection, Value};
pub use source::{Source, SourceConfig};
pub use storage::{DatasetWriter, StorageStats};

/// Name of the surrogate-key column shared by every destination table.
pub const ID_COLUMN: &str = "uuid";

/// Default number of rows per bulk INSERT statement.
pub const DEFAULT_INSERT_CHUNK_SIZE: usize = 500;
