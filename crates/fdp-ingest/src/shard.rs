//! Table sharding
//!
//! Splits the in-memory record stream of one source into per-table
//! projections. Parent tables get one row per record, filtered down to the
//! table's column set and always carrying the surrogate key. Fan-out rules
//! emit child rows for one-to-many fields (categories, roles, aliases,
//! technologies), each child row carrying only the parent identity and the
//! item value.
//!
//! Row order in parent projections follows source order; fan-out children
//! are grouped by parent. Every row in every projection is stamped with the
//! same `created_at` / `updated_at` instant, taken once per dataset.

use chrono::Utc;
use std::collections::BTreeSet;
use tracing::debug;

use crate::record::{NormalizedRecord, SourceDataset, TableProjection, Value};
use crate::source::{FanOutRule, Source};
use crate::ID_COLUMN;

/// Bookkeeping column stamped on every row
pub const CREATED_AT_COLUMN: &str = "created_at";
/// Bookkeeping column stamped on every row
pub const UPDATED_AT_COLUMN: &str = "updated_at";

/// Shard coerced records into the source's table projections.
///
/// Consumes the records; they are never mutated again once projected.
pub fn shard_records(source: Source, records: Vec<NormalizedRecord>) -> SourceDataset {
    let config = source.config();
    let prepared_at = Utc::now();

    let mut projections = Vec::new();

    for table in config.tables {
        let mut projection = TableProjection::new(table.name, with_timestamps(table.columns));

        for record in &records {
            let mut row = Vec::with_capacity(projection.columns.len());
            for column in table.columns {
                if *column == ID_COLUMN {
                    row.push(Value::Id(record.id));
                } else {
                    // Intersection of record fields and table columns;
                    // a column the record does not carry becomes NULL
                    row.push(record.get(column).cloned().unwrap_or(Value::Text(None)));
                }
            }
            row.push(Value::Timestamp(prepared_at));
            row.push(Value::Timestamp(prepared_at));
            projection.push_row(row);
        }

        projections.push(projection);
    }

    for rule in config.fan_out {
        let columns = with_timestamps(&[ID_COLUMN, rule.column()]);
        let mut projection = TableProjection::new(rule.table(), columns);

        for record in &records {
            let items = match rule {
                FanOutRule::Split {
                    field, delimiter, ..
                } => split_items(record, field, *delimiter),
                FanOutRule::Aliases { fields, .. } => alias_items(record, fields),
            };

            for item in items {
                projection.push_row(vec![
                    Value::Id(record.id),
                    Value::text(item),
                    Value::Timestamp(prepared_at),
                    Value::Timestamp(prepared_at),
                ]);
            }
        }

        projections.push(projection);
    }

    debug!(
        source = source.name(),
        records = records.len(),
        tables = projections.len(),
        "Sharded records into table projections"
    );

    SourceDataset {
        source,
        prepared_at,
        projections,
    }
}

fn with_timestamps(columns: &[&str]) -> Vec<String> {
    columns
        .iter()
        .map(|c| (*c).to_string())
        .chain([CREATED_AT_COLUMN.to_string(), UPDATED_AT_COLUMN.to_string()])
        .collect()
}

/// Items of a delimiter-joined list field: order preserved, duplicates
/// kept, empty items between consecutive delimiters skipped.
fn split_items(record: &NormalizedRecord, field: &str, delimiter: char) -> Vec<String> {
    let Some(raw) = record.get(field).and_then(Value::as_text) else {
        return Vec::new();
    };

    raw.split(delimiter)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Alias values collected across a set of parent fields: lower-cased,
/// de-duplicated, empties excluded.
fn alias_items(record: &NormalizedRecord, fields: &[&str]) -> Vec<String> {
    let mut aliases = BTreeSet::new();

    for field in fields {
        if let Some(value) = record.get(field).and_then(Value::as_text) {
            let folded = value.trim().to_lowercase();
            if !folded.is_empty() {
                aliases.insert(folded);
            }
        }
    }

    aliases.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{IdGenerator, SequentialIdGenerator};
    use uuid::Uuid;

    fn record_with(id_gen: &mut SequentialIdGenerator, fields: &[(&str, &str)]) -> NormalizedRecord {
        let mut record = NormalizedRecord::new(id_gen.next_id());
        for (name, value) in fields {
            record.insert(*name, Value::text(*value));
        }
        record
    }

    #[test]
    fn test_parent_projection_carries_identity_and_timestamps() {
        let mut ids = SequentialIdGenerator::new();
        let records = vec![
            record_with(&mut ids, &[("company", "Walmart"), ("sector", "Retailing")]),
            record_with(&mut ids, &[("company", "Amazon"), ("sector", "Retailing")]),
        ];

        let dataset = shard_records(Source::Kaggle, records);
        let kaggle = dataset.projection("kaggle").unwrap();

        assert_eq!(kaggle.len(), 2);
        assert_eq!(kaggle.value(0, "uuid"), Some(&Value::Id(Uuid::from_u128(1))));
        assert_eq!(kaggle.value(1, "uuid"), Some(&Value::Id(Uuid::from_u128(2))));
        // Source order is preserved
        assert_eq!(kaggle.value(0, "company"), Some(&Value::text("Walmart")));
        assert_eq!(kaggle.value(1, "company"), Some(&Value::text("Amazon")));
        assert_eq!(
            kaggle.value(0, "created_at"),
            Some(&Value::Timestamp(dataset.prepared_at))
        );
        assert_eq!(
            kaggle.value(0, "updated_at"),
            Some(&Value::Timestamp(dataset.prepared_at))
        );
    }

    #[test]
    fn test_fields_split_between_tables_without_duplication() {
        let mut ids = SequentialIdGenerator::new();
        let records = vec![record_with(
            &mut ids,
            &[("company", "Walmart"), ("revenue", "523964.0"), ("ticker", "WMT")],
        )];

        let dataset = shard_records(Source::Kaggle, records);
        let kaggle = dataset.projection("kaggle").unwrap();
        let financial = dataset.projection("kaggle_financial_infos").unwrap();

        // company lives in the parent table only, revenue/ticker in the
        // financial table only; both carry the shared key
        assert!(kaggle.column_index("company").is_some());
        assert!(kaggle.column_index("revenue").is_none());
        assert!(financial.column_index("revenue").is_some());
        assert!(financial.column_index("company").is_none());
        assert_eq!(kaggle.value(0, "uuid"), financial.value(0, "uuid"));
    }

    #[test]
    fn test_split_fan_out_preserves_order_and_skips_empty_items() {
        let mut ids = SequentialIdGenerator::new();
        let records = vec![record_with(
            &mut ids,
            &[("technologies", "nginx,,react,nginx")],
        )];

        let dataset = shard_records(Source::Hunter, records);
        let technologies = dataset.projection("hunter_technologies").unwrap();

        // Duplicates kept, order preserved, the empty item between the
        // consecutive delimiters produces no row
        assert_eq!(technologies.len(), 3);
        assert_eq!(technologies.value(0, "technology"), Some(&Value::text("nginx")));
        assert_eq!(technologies.value(1, "technology"), Some(&Value::text("react")));
        assert_eq!(technologies.value(2, "technology"), Some(&Value::text("nginx")));
        for row in 0..3 {
            assert_eq!(
                technologies.value(row, "uuid"),
                Some(&Value::Id(Uuid::from_u128(1)))
            );
        }
    }

    #[test]
    fn test_alias_fan_out_folds_and_deduplicates() {
        let mut ids = SequentialIdGenerator::new();
        let records = vec![record_with(
            &mut ids,
            &[
                ("legal_name", "Acme Inc"),
                ("alias1", "acme inc"),
                ("alias2", ""),
                ("alias3", "ACME"),
            ],
        )];

        let dataset = shard_records(Source::Crunchbase, records);
        let aliases = dataset.projection("crunchbase_aliases").unwrap();

        let values: Vec<&str> = (0..aliases.len())
            .filter_map(|row| aliases.value(row, "alias").and_then(Value::as_text))
            .collect();

        // "Acme Inc" and "acme inc" fold to one alias; the empty alias
        // never produces a row
        assert_eq!(values.iter().filter(|v| **v == "acme inc").count(), 1);
        assert!(values.contains(&"acme"));
        assert!(!values.contains(&""));
        assert_eq!(aliases.len(), 2);
    }

    #[test]
    fn test_fan_out_children_grouped_by_parent() {
        let mut ids = SequentialIdGenerator::new();
        let records = vec![
            record_with(&mut ids, &[("technologies", "nginx,react")]),
            record_with(&mut ids, &[("technologies", "varnish")]),
        ];

        let dataset = shard_records(Source::Hunter, records);
        let technologies = dataset.projection("hunter_technologies").unwrap();

        assert_eq!(technologies.len(), 3);
        assert_eq!(
            technologies.value(0, "uuid"),
            Some(&Value::Id(Uuid::from_u128(1)))
        );
        assert_eq!(
            technologies.value(1, "uuid"),
            Some(&Value::Id(Uuid::from_u128(1)))
        );
        assert_eq!(
            technologies.value(2, "uuid"),
            Some(&Value::Id(Uuid::from_u128(2)))
        );
    }

    #[test]
    fn test_all_projections_share_one_timestamp() {
        let mut ids = SequentialIdGenerator::new();
        let records = vec![record_with(
            &mut ids,
            &[("legal_name", "Acme Inc"), ("roles", "company,investor")],
        )];

        let dataset = shard_records(Source::Crunchbase, records);

        for projection in &dataset.projections {
            for row in 0..projection.len() {
                assert_eq!(
                    projection.value(row, "created_at"),
                    Some(&Value::Timestamp(dataset.prepared_at)),
                    "{}",
                    projection.table_name
                );
            }
        }
    }
}
