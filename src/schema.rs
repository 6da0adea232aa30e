use crate::error::SchemaError;
use crate::loader::RawTable;

/// Canonical column slots. `release_year` and `release_date` are optional;
/// the rest must resolve or the run halts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub title: usize,
    pub publisher: usize,
    pub release_year: Option<usize>,
    pub release_date: Option<usize>,
    pub budget: usize,
    pub gross_worldwide: usize,
}

/// One source row with its cells picked into canonical slots, still as raw
/// strings. Typing and derivation happen in the enrichment stage.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseRecord {
    pub title: String,
    pub publisher: String,
    pub release_year: Option<String>,
    pub release_date: Option<String>,
    pub budget: String,
    pub gross_worldwide: String,
}

#[derive(Debug, Clone)]
pub struct NormalizeReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_empty_title: usize,
}

// Alias table: a header matches a canonical field when, after folding, it
// contains every substring of any one pattern. Data, not control flow, so
// the list can grow without touching the matching logic.
struct FieldAliases {
    field: &'static str,
    required: bool,
    patterns: &'static [&'static [&'static str]],
}

const ALIASES: &[FieldAliases] = &[
    FieldAliases {
        field: "title",
        required: true,
        patterns: &[&["title"], &["film"], &["movie"], &["name"]],
    },
    FieldAliases {
        field: "publisher",
        required: true,
        patterns: &[&["publisher"], &["company"], &["studio"]],
    },
    FieldAliases {
        field: "release_year",
        required: false,
        patterns: &[&["year"]],
    },
    FieldAliases {
        field: "release_date",
        required: false,
        patterns: &[&["date"]],
    },
    FieldAliases {
        field: "budget",
        required: true,
        patterns: &[&["budget"], &["orcamento"], &["orçamento"], &["cost"]],
    },
    FieldAliases {
        field: "gross_worldwide",
        required: true,
        patterns: &[&["gross", "world"], &["revenue"], &["receita"], &["gross"]],
    },
];

/// Lowercase and collapse whitespace (non-breaking spaces included) so the
/// substring match sees a stable form of the header.
fn fold_header(h: &str) -> String {
    h.to_lowercase()
        .replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn matches(folded: &str, patterns: &[&[&str]]) -> bool {
    patterns
        .iter()
        .any(|pat| pat.iter().all(|needle| folded.contains(needle)))
}

/// Resolve headers onto the canonical schema.
///
/// Matching is case-insensitive substring per the alias table. When several
/// headers match one canonical field, the first in column order wins. Every
/// unmatched required field is collected so the caller can report the full
/// list at once.
pub fn map_columns(headers: &[String]) -> Result<ColumnMap, SchemaError> {
    let folded: Vec<String> = headers.iter().map(|h| fold_header(h)).collect();

    let mut slots: Vec<Option<usize>> = Vec::with_capacity(ALIASES.len());
    let mut missing: Vec<&'static str> = Vec::new();
    for alias in ALIASES {
        let hit = folded.iter().position(|f| matches(f, alias.patterns));
        if hit.is_none() && alias.required {
            missing.push(alias.field);
        }
        slots.push(hit);
    }
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns { missing });
    }

    // Slot positions follow ALIASES order.
    Ok(ColumnMap {
        title: slots[0].unwrap(),
        publisher: slots[1].unwrap(),
        release_year: slots[2],
        release_date: slots[3],
        budget: slots[4].unwrap(),
        gross_worldwide: slots[5].unwrap(),
    })
}

/// Map a parsed table onto base records, dropping rows whose title cell is
/// empty (the title is the display and join key).
pub fn build_records(table: &RawTable) -> Result<(Vec<BaseRecord>, NormalizeReport), SchemaError> {
    let map = map_columns(&table.headers)?;
    let mut records = Vec::with_capacity(table.rows.len());
    let mut dropped_empty_title = 0usize;

    for row in &table.rows {
        let title = row[map.title].trim().to_string();
        if title.is_empty() {
            dropped_empty_title += 1;
            continue;
        }
        let cell = |idx: Option<usize>| -> Option<String> {
            idx.map(|i| row[i].clone()).filter(|s| !s.trim().is_empty())
        };
        records.push(BaseRecord {
            title,
            publisher: row[map.publisher].trim().to_string(),
            release_year: cell(map.release_year),
            release_date: cell(map.release_date),
            budget: row[map.budget].clone(),
            gross_worldwide: row[map.gross_worldwide].clone(),
        });
    }

    let report = NormalizeReport {
        total_rows: table.rows.len(),
        kept_rows: records.len(),
        dropped_empty_title,
    };
    Ok((records, report))
}
