//! Record mapping
//!
//! Reads one delimited export and turns each row into a
//! [`NormalizedRecord`]: dropped columns removed, renames applied, derived
//! fields computed, and a fresh surrogate key attached. Values stay raw
//! strings at this stage; the coercer types them afterwards.
//!
//! The header is validated eagerly against the source configuration so a
//! file missing an expected column fails before any row is processed.

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::identity::IdGenerator;
use crate::record::{NormalizedRecord, Value};
use crate::source::{FanOutRule, Source};

/// Check that every column referenced by the source configuration is
/// present in the file header. Mapping must not start otherwise.
pub fn validate_header(source: Source, header: &[&str]) -> Result<()> {
    let config = source.config();

    for (old, _) in config.rename {
        if !header.contains(old) {
            return Err(IngestError::schema(source.name(), *old));
        }
    }

    // Fields visible after drop + rename, plus derived targets
    let mapped: Vec<&str> = header
        .iter()
        .filter(|raw| !config.drop.iter().any(|d| *d == **raw))
        .map(|raw| config.mapped_name(raw))
        .chain(config.derive.iter().map(|rule| rule.target))
        .collect();

    for rule in config.derive {
        if !mapped.contains(&rule.from) {
            return Err(IngestError::schema(source.name(), rule.from));
        }
    }

    for rule in config.fan_out {
        match rule {
            FanOutRule::Split { field, .. } => {
                if !mapped.contains(field) {
                    return Err(IngestError::schema(source.name(), *field));
                }
            },
            FanOutRule::Aliases { fields, .. } => {
                for field in *fields {
                    if !mapped.contains(field) {
                        return Err(IngestError::schema(source.name(), *field));
                    }
                }
            },
        }
    }

    Ok(())
}

/// Map the whole delimited file into normalized records.
///
/// Column order in the file is irrelevant; fields are matched by header
/// name. Each record receives its identity from the injected generator.
pub fn map_rows(
    source: Source,
    csv_text: &str,
    ids: &mut dyn IdGenerator,
) -> Result<Vec<NormalizedRecord>> {
    let config = source.config();

    let mut reader = ReaderBuilder::new()
        .delimiter(config.delimiter)
        .from_reader(csv_text.as_bytes());

    let header = reader.headers()?.clone();
    let header_fields: Vec<&str> = header.iter().collect();
    validate_header(source, &header_fields)?;

    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let mut record = NormalizedRecord::new(ids.next_id());

        for (raw_name, raw_value) in header.iter().zip(row.iter()) {
            if config.drop.iter().any(|d| *d == raw_name) {
                continue;
            }
            record.insert(config.mapped_name(raw_name), Value::text(raw_value));
        }

        for rule in config.derive {
            let base = record
                .get(rule.from)
                .and_then(Value::as_text)
                .unwrap_or_default();
            let derived = rule.transform.apply(base);
            record.insert(rule.target, Value::text(derived));
        }

        records.push(record);
    }

    debug!(source = source.name(), rows = records.len(), "Mapped raw rows");

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SequentialIdGenerator;
    use uuid::Uuid;

    const KAGGLE_SAMPLE: &str = "\
company;rank;rank_change;revenue;profit;num. of employees;sector;city;state;newcomer;ceo_founder;ceo_woman;profitable;prev_rank;CEO;Website;Ticker;Market Cap
Walmart;1;0;523964.0;14881.0;2200000;Retailing;Bentonville;AR;no;no;no;yes;1;C. Douglas McMillon;https://www.stock.walmart.com;WMT;411690
Amazon;2;0;280522.0;11588.0;798000;Retailing;Seattle;WA;no;yes;no;yes;3;Jeffrey P. Bezos;https://www.amazon.com;AMZN;1637405";

    #[test]
    fn test_mapped_record_shape() {
        let mut ids = SequentialIdGenerator::new();
        let records = map_rows(Source::Kaggle, KAGGLE_SAMPLE, &mut ids).unwrap();

        assert_eq!(records.len(), 2);

        let first = &records[0];
        // Dropped columns never appear
        assert!(!first.contains("rank"));
        assert!(!first.contains("rank_change"));
        assert!(!first.contains("prev_rank"));
        // Renamed columns appear under their new name only
        assert!(!first.contains("num. of employees"));
        assert_eq!(first.get("num_of_employees"), Some(&Value::text("2200000")));
        assert_eq!(first.get("ceo"), Some(&Value::text("C. Douglas McMillon")));
        // Untouched columns pass through
        assert_eq!(first.get("company"), Some(&Value::text("Walmart")));
        assert_eq!(first.get("sector"), Some(&Value::text("Retailing")));
    }

    #[test]
    fn test_identity_comes_from_the_injected_generator() {
        let mut ids = SequentialIdGenerator::new();
        let records = map_rows(Source::Kaggle, KAGGLE_SAMPLE, &mut ids).unwrap();

        assert_eq!(records[0].id, Uuid::from_u128(1));
        assert_eq!(records[1].id, Uuid::from_u128(2));
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let reordered = "\
CEO;company;rank;rank_change;revenue;profit;num. of employees;sector;city;state;newcomer;ceo_founder;ceo_woman;profitable;prev_rank;Website;Ticker;Market Cap
C. Douglas McMillon;Walmart;1;0;523964.0;14881.0;2200000;Retailing;Bentonville;AR;no;no;no;yes;1;https://www.stock.walmart.com;WMT;411690";

        let mut ids = SequentialIdGenerator::new();
        let records = map_rows(Source::Kaggle, reordered, &mut ids).unwrap();

        assert_eq!(records[0].get("company"), Some(&Value::text("Walmart")));
        assert_eq!(records[0].get("ceo"), Some(&Value::text("C. Douglas McMillon")));
    }

    #[test]
    fn test_missing_renamed_column_fails_before_any_row() {
        let truncated = "\
company;revenue;profit;sector
Walmart;523964.0;14881.0;Retailing";

        let mut ids = SequentialIdGenerator::new();
        let err = map_rows(Source::Kaggle, truncated, &mut ids).unwrap_err();
        assert!(matches!(err, IngestError::Schema { .. }));
    }

    #[test]
    fn test_derived_field_is_computed() {
        let crunchbase = "\
name,legal_name,alias1,alias2,alias3,permalink,cb_url,rank,homepage_url,country_code,state_code,region,city,address,status,short_description,category_list,category_groups_list,roles,num_funding_rounds,total_funding_usd,founded_on,last_funding_on,employee_count,logo_url
Acme,Acme Inc,,,,acme,https://cb.example/acme,10,https://www.acme.com/home,USA,CA,SF Bay,San Francisco,1 Acme Way,operating,Widgets,Software,Tech,company,3,1000000,2001-04-01,2010-09-12,51-100,https://img.example/acme.png";

        let mut ids = SequentialIdGenerator::new();
        let records = map_rows(Source::Crunchbase, crunchbase, &mut ids).unwrap();

        assert_eq!(records[0].get("domain"), Some(&Value::text("acme.com")));
        // Dropped vendor plumbing never appears
        assert!(!records[0].contains("permalink"));
        assert!(!records[0].contains("logo_url"));
    }

    #[test]
    fn test_validate_header_accepts_extra_columns() {
        let header = vec!["Domain", "Organization", "Industry", "Company type", "Country",
            "State", "City", "Postal code", "Street", "Headcount", "Technologies",
            "Twitter", "Facebook", "Linkedin", "SomethingNew"];
        assert!(validate_header(Source::Hunter, &header).is_ok());
    }

    #[test]
    fn test_validate_header_rejects_missing_fan_out_field() {
        let header = vec!["Domain", "Organization", "Industry", "Company type", "Country",
            "State", "City", "Postal code", "Street", "Headcount"];
        let err = validate_header(Source::Hunter, &header).unwrap_err();
        assert!(matches!(err, IngestError::Schema { .. }));
    }
}
