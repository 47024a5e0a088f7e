//! Type coercion
//!
//! Applies the declarative per-field type rules of a source configuration
//! to mapped records, converting raw string values in place. Vendor exports
//! use a couple of null sentinels: the empty string everywhere, and `"-"`
//! for missing floats. Integer fields tolerate float-formatted values like
//! `"1200.0"` and are truncated.
//!
//! A non-empty, non-sentinel value that fails to parse aborts the whole
//! source run; partial coercion is never retried.

use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};
use crate::record::{NormalizedRecord, Value};
use crate::source::SourceConfig;

/// Declarative type rule for one field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeRule {
    /// Integer; empty string is null, float-formatted values are truncated
    Int,
    /// Float; empty string and `"-"` are null
    Float,
    /// Date; empty string is null, anything else passes through unchanged
    /// (the storage layer owns date parsing)
    Date,
    /// Leave the value untouched
    Passthrough,
}

/// Coerce a single raw string value under a rule
pub fn coerce_value(rule: TypeRule, field: &str, raw: &str) -> Result<Value> {
    let trimmed = raw.trim();

    match rule {
        TypeRule::Int => {
            if trimmed.is_empty() {
                return Ok(Value::Int(None));
            }
            // Exports carry values like "1200.0" for integer fields
            let parsed: f64 = trimmed
                .parse()
                .map_err(|e: std::num::ParseFloatError| {
                    IngestError::coerce(field, raw, e.to_string())
                })?;
            Ok(Value::Int(Some(parsed as i64)))
        },
        TypeRule::Float => {
            if trimmed.is_empty() || trimmed == "-" {
                return Ok(Value::Float(None));
            }
            let parsed: f64 = trimmed
                .parse()
                .map_err(|e: std::num::ParseFloatError| {
                    IngestError::coerce(field, raw, e.to_string())
                })?;
            Ok(Value::Float(Some(parsed)))
        },
        TypeRule::Date => {
            if trimmed.is_empty() {
                Ok(Value::Text(None))
            } else {
                Ok(Value::text(raw))
            }
        },
        TypeRule::Passthrough => Ok(Value::text(raw)),
    }
}

/// Apply a source's type rules to every record, in place.
///
/// Fields absent from a record are skipped; already-coerced values are left
/// alone so the operation is idempotent.
pub fn coerce_records(config: &SourceConfig, records: &mut [NormalizedRecord]) -> Result<()> {
    for record in records.iter_mut() {
        for (field, rule) in config.type_rules.iter().copied() {
            let Some(value) = record.get_mut(field) else {
                continue;
            };
            if let Value::Text(Some(raw)) = value {
                let raw = std::mem::take(raw);
                *value = coerce_value(rule, field, &raw)?;
            }
        }
    }

    Ok(())
}
