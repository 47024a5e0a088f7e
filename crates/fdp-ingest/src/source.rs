//! Source configuration
//!
//! Each vendor export is described declaratively by a [`SourceConfig`]:
//! delimiter, columns to drop, columns to rename, derived fields, type
//! rules, destination table schemas, and fan-out rules. One generic
//! pipeline consumes these records; there is no per-source code path.

use serde::{Deserialize, Serialize};

use crate::coerce::TypeRule;
use crate::error::IngestError;

/// The three supported vendor exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Kaggle,
    Crunchbase,
    Hunter,
}

impl Source {
    /// All sources in canonical ingestion order
    pub const ALL: [Source; 3] = [Source::Kaggle, Source::Crunchbase, Source::Hunter];

    /// Lowercase source name as used on the CLI and in logs
    pub fn name(&self) -> &'static str {
        match self {
            Source::Kaggle => "kaggle",
            Source::Crunchbase => "crunchbase",
            Source::Hunter => "hunter",
        }
    }

    /// Transformation rules for this source
    pub fn config(&self) -> &'static SourceConfig {
        match self {
            Source::Kaggle => &KAGGLE_CONFIG,
            Source::Crunchbase => &CRUNCHBASE_CONFIG,
            Source::Hunter => &HUNTER_CONFIG,
        }
    }
}

impl std::str::FromStr for Source {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kaggle" => Ok(Source::Kaggle),
            "crunchbase" => Ok(Source::Crunchbase),
            "hunter" => Ok(Source::Hunter),
            _ => Err(IngestError::UnknownSource(s.to_string())),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Transformation applied by a derive rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Lowercase the source field
    Lowercase,
    /// Extract the host part of a URL (scheme, `www.` prefix and path stripped)
    UrlHost,
}

impl Transform {
    /// Apply the transformation to a raw field value
    pub fn apply(&self, value: &str) -> String {
        match self {
            Transform::Lowercase => value.to_lowercase(),
            Transform::UrlHost => {
                let stripped = value
                    .trim()
                    .trim_start_matches("https://")
                    .trim_start_matches("http://")
                    .trim_start_matches("www.");
                stripped
                    .split('/')
                    .next()
                    .unwrap_or_default()
                    .to_lowercase()
            },
        }
    }
}

/// A field computed from another field during mapping
#[derive(Debug, Clone, Copy)]
pub struct DeriveRule {
    /// Name of the new field
    pub target: &'static str,
    /// Mapped field the value is computed from
    pub from: &'static str,
    /// How the value is computed
    pub transform: Transform,
}

/// Column set of one destination table.
///
/// Columns list the data fields only (surrogate key first); the sharder
/// appends the `created_at` / `updated_at` bookkeeping columns.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// One-to-many child table rule
#[derive(Debug, Clone, Copy)]
pub enum FanOutRule {
    /// Split a delimiter-joined field into one child row per item.
    /// Order is preserved and duplicates are kept; empty items produced by
    /// consecutive delimiters are skipped.
    Split {
        table: &'static str,
        column: &'static str,
        field: &'static str,
        delimiter: char,
    },
    /// Collect a fixed set of parent fields into alias rows: lower-cased,
    /// de-duplicated, empties excluded. Row order is unspecified.
    Aliases {
        table: &'static str,
        column: &'static str,
        fields: &'static [&'static str],
    },
}

impl FanOutRule {
    /// Destination table of this rule
    pub fn table(&self) -> &'static str {
        match self {
            FanOutRule::Split { table, .. } => table,
            FanOutRule::Aliases { table, .. } => table,
        }
    }

    /// Value column of this rule
    pub fn column(&self) -> &'static str {
        match self {
            FanOutRule::Split { column, .. } => column,
            FanOutRule::Aliases { column, .. } => column,
        }
    }
}

/// Declarative description of one source's transformation
#[derive(Debug, Clone, Copy)]
pub struct SourceConfig {
    /// Expected file name inside the dataset directory
    pub file_name: &'static str,
    /// Field delimiter of the export
    pub delimiter: u8,
    /// Raw columns discarded during mapping
    pub drop: &'static [&'static str],
    /// Raw column name -> semantic field name
    pub rename: &'static [(&'static str, &'static str)],
    /// Fields computed from other fields
    pub derive: &'static [DeriveRule],
    /// Per-field type rules; unlisted fields pass through as text
    pub type_rules: &'static [(&'static str, TypeRule)],
    /// Destination tables, parent table first (children reference its key)
    pub tables: &'static [TableSchema],
    /// One-to-many child tables
    pub fan_out: &'static [FanOutRule],
}

impl SourceConfig {
    /// Semantic name of a raw column after the rename map is applied
    pub fn mapped_name<'a>(&self, raw: &'a str) -> &'a str {
        self.rename
            .iter()
            .find(|(old, _)| *old == raw)
            .map(|(_, new)| *new)
            .unwrap_or(raw)
    }

    /// Type rule for a field, `Passthrough` when unlisted
    pub fn type_rule(&self, field: &str) -> TypeRule {
        self.type_rules
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, rule)| *rule)
            .unwrap_or(TypeRule::Passthrough)
    }
}

static KAGGLE_CONFIG: SourceConfig = SourceConfig {
    file_name: "Fortune_500_Kaggle.csv",
    delimiter: b';',
    drop: &["rank", "rank_change", "prev_rank"],
    rename: &[
        ("num. of employees", "num_of_employees"),
        ("CEO", "ceo"),
        ("Website", "website"),
        ("Ticker", "ticker"),
        ("Market Cap", "market_cap"),
    ],
    derive: &[],
    type_rules: &[
        ("num_of_employees", TypeRule::Int),
        ("revenue", TypeRule::Float),
        ("profit", TypeRule::Float),
        ("market_cap", TypeRule::Float),
    ],
    tables: &[
        TableSchema {
            name: "kaggle",
            columns: &[
                "uuid",
                "company",
                "num_of_employees",
                "sector",
                "city",
                "state",
                "newcomer",
                "ceo_founder",
                "ceo_woman",
                "ceo",
                "website",
            ],
        },
        TableSchema {
            name: "kaggle_financial_infos",
            columns: &["uuid", "revenue", "profit", "profitable", "ticker", "market_cap"],
        },
    ],
    fan_out: &[],
};

static CRUNCHBASE_CONFIG: SourceConfig = SourceConfig {
    file_name: "Fortune_500_Crunchbase.csv",
    delimiter: b',',
    drop: &["permalink", "cb_url", "rank", "logo_url"],
    rename: &[],
    derive: &[DeriveRule {
        target: "domain",
        from: "homepage_url",
        transform: Transform::UrlHost,
    }],
    type_rules: &[
        ("num_funding_rounds", TypeRule::Int),
        ("total_funding_usd", TypeRule::Float),
        ("founded_on", TypeRule::Date),
        ("last_funding_on", TypeRule::Date),
    ],
    tables: &[
        TableSchema {
            name: "crunchbase",
            columns: &[
                "uuid",
                "name",
                "legal_name",
                "domain",
                "homepage_url",
                "country_code",
                "state_code",
                "region",
                "city",
                "address",
                "status",
                "short_description",
                "founded_on",
                "employee_count",
            ],
        },
        TableSchema {
            name: "crunchbase_funding_infos",
            columns: &["uuid", "num_funding_rounds", "total_funding_usd", "last_funding_on"],
        },
    ],
    fan_out: &[
        FanOutRule::Split {
            table: "crunchbase_categories",
            column: "category",
            field: "category_list",
            delimiter: ',',
        },
        FanOutRule::Split {
            table: "crunchbase_category_groups",
            column: "category_group",
            field: "category_groups_list",
            delimiter: ',',
        },
        FanOutRule::Split {
            table: "crunchbase_roles",
            column: "role",
            field: "roles",
            delimiter: ',',
        },
        FanOutRule::Aliases {
            table: "crunchbase_aliases",
            column: "alias",
            fields: &["legal_name", "alias1", "alias2", "alias3"],
        },
    ],
};

static HUNTER_CONFIG: SourceConfig = SourceConfig {
    file_name: "Fortune_500_Hunter.csv",
    delimiter: b';',
    drop: &["Twitter", "Facebook", "Linkedin"],
    rename: &[
        ("Domain", "domain"),
        ("Organization", "organization"),
        ("Industry", "industry"),
        ("Company type", "company_type"),
        ("Country", "country"),
        ("State", "state"),
        ("City", "city"),
        ("Postal code", "postal_code"),
        ("Street", "street"),
        ("Headcount", "headcount"),
        ("Technologies", "technologies"),
    ],
    derive: &[],
    type_rules: &[],
    tables: &[TableSchema {
        name: "hunter",
        columns: &[
            "uuid",
            "domain",
            "organization",
            "industry",
            "company_type",
            "country",
            "state",
            "city",
            "postal_code",
            "street",
            "headcount",
        ],
    }],
    fan_out: &[FanOutRule::Split {
        table: "hunter_technologies",
        column: "technology",
        field: "technologies",
        delimiter: ',',
    }],
};
