//! Persistence writer
//!
//! Writes every projection of a [`SourceDataset`] inside a single
//! PostgreSQL transaction: projections in order (parent table first, so
//! foreign keys resolve), rows in order, chunked into bulk parameterized
//! INSERTs. Any failure rolls the whole source back and the error is
//! returned to the caller; on success one commit finalizes all writes.

use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, error, info};

use crate::error::Result;
use crate::record::{SourceDataset, TableProjection, Value};
use crate::DEFAULT_INSERT_CHUNK_SIZE;

/// Embedded migrations creating the destination tables
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Apply the destination schema migrations
pub async fn apply_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Storage statistics for one persisted dataset
#[derive(Debug, Clone)]
pub struct StorageStats {
    pub rows_written: usize,
    pub tables_written: usize,
}

/// Storage handler for prepared source datasets
pub struct DatasetWriter {
    db: PgPool,
    chunk_size: usize,
}

impl DatasetWriter {
    /// Create a new writer with the default chunk size
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            chunk_size: DEFAULT_INSERT_CHUNK_SIZE,
        }
    }

    /// Create a writer with a custom chunk size
    pub fn with_chunk_size(db: PgPool, chunk_size: usize) -> Self {
        Self { db, chunk_size }
    }

    /// Persist a dataset atomically.
    ///
    /// Either every row of every projection commits, or none do.
    pub async fn store_dataset(&self, dataset: &SourceDataset) -> Result<StorageStats> {
        info!(
            source = dataset.source.name(),
            tables = dataset.projections.len(),
            rows = dataset.total_rows(),
            "Storing dataset"
        );

        let mut tx = self.db.begin().await?;

        match Self::insert_projections(&mut tx, dataset, self.chunk_size).await {
            Ok(stats) => {
                tx.commit().await?;
                info!(
                    source = dataset.source.name(),
                    rows = stats.rows_written,
                    "Dataset committed"
                );
                Ok(stats)
            },
            Err(e) => {
                error!(
                    source = dataset.source.name(),
                    error = %e,
                    "Persistence failed, rolling back"
                );
                tx.rollback().await?;
                Err(e)
            },
        }
    }

    async fn insert_projections(
        tx: &mut Transaction<'_, Postgres>,
        dataset: &SourceDataset,
        chunk_size: usize,
    ) -> Result<StorageStats> {
        let mut rows_written = 0;

        for projection in &dataset.projections {
            if projection.is_empty() {
                continue;
            }

            for chunk in projection.rows.chunks(chunk_size) {
                let mut query = build_insert(projection, chunk);
                query.build().execute(&mut **tx).await?;
                rows_written += chunk.len();
            }

            debug!(
                table = projection.table_name,
                rows = projection.len(),
                "Inserted projection"
            );
        }

        Ok(StorageStats {
            rows_written,
            tables_written: dataset.projections.len(),
        })
    }
}

/// Build one bulk INSERT for a chunk of projection rows.
///
/// Table and column names come from the static source configuration; all
/// row values are bound as parameters.
fn build_insert<'a>(
    projection: &'a TableProjection,
    rows: &'a [Vec<Value>],
) -> QueryBuilder<'a, Postgres> {
    let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) ",
        projection.table_name,
        projection.columns.join(", ")
    ));

    query_builder.push_values(rows, |mut b, row| {
        for value in row {
            match value {
                Value::Text(v) => {
                    b.push_bind(v.clone());
                },
                Value::Int(v) => {
                    b.push_bind(*v);
                },
                Value::Float(v) => {
                    b.push_bind(*v);
                },
                Value::Id(v) => {
                    b.push_bind(*v);
                },
                Value::Timestamp(v) => {
                    b.push_bind(*v);
                },
            }
        }
    });

    query_builder
}
