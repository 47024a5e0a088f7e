//! Pipeline orchestration
//!
//! Strictly sequential per source: map, coerce, shard, persist. The three
//! sources share no state and may be run in any order. [`prepare`] is the
//! pure half of the pipeline and needs no database, which is how most of
//! the test suite exercises it.

use sqlx::PgPool;
use std::path::Path;
use tracing::info;

use crate::coerce::coerce_records;
use crate::error::Result;
use crate::identity::{IdGenerator, UuidGenerator};
use crate::mapper::map_rows;
use crate::record::SourceDataset;
use crate::shard::shard_records;
use crate::source::Source;
use crate::storage::DatasetWriter;

/// Per-source ingestion statistics
#[derive(Debug, Clone)]
pub struct SourceStats {
    pub source: Source,
    /// Rows read from the input file
    pub rows_read: usize,
    /// Rows written across all destination tables
    pub rows_written: usize,
    /// Destination tables touched
    pub tables_written: usize,
}

/// Transform one source's CSV content into a persistable dataset.
///
/// Pure composition of map, coerce and shard; identity generation comes
/// from the injected generator.
pub fn prepare(
    source: Source,
    csv_text: &str,
    ids: &mut dyn IdGenerator,
) -> Result<SourceDataset> {
    let mut records = map_rows(source, csv_text, ids)?;
    coerce_records(source.config(), &mut records)?;
    Ok(shard_records(source, records))
}

/// Read a source's export file from the dataset directory
pub fn read_source_file(source: Source, data_dir: &Path) -> Result<String> {
    let path = data_dir.join(source.config().file_name);
    Ok(std::fs::read_to_string(path)?)
}

/// Run the full pipeline for one source: read its file from the dataset
/// directory, prepare, and persist inside one transaction.
pub async fn run(pool: &PgPool, source: Source, data_dir: &Path) -> Result<SourceStats> {
    let config = source.config();

    info!(
        source = source.name(),
        file = config.file_name,
        dir = %data_dir.display(),
        "Ingesting source"
    );

    let csv_text = read_source_file(source, data_dir)?;

    let mut ids = UuidGenerator::new();
    let dataset = prepare(source, &csv_text, &mut ids)?;

    let rows_read = dataset
        .projection(config.tables[0].name)
        .map_or(0, |p| p.len());

    let stats = DatasetWriter::new(pool.clone())
        .store_dataset(&dataset)
        .await?;

    info!(
        source = source.name(),
        rows_read,
        rows_written = stats.rows_written,
        "Source ingested"
    );

    Ok(SourceStats {
        source,
        rows_read,
        rows_written: stats.rows_written,
        tables_written: stats.tables_written,
    })
}
