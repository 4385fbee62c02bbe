//! CSV loading and column resolution.
//!
//! The input schema is open-ended: only `address`, `in_search`, `Rating`,
//! the optional `Rating Count` and the category columns are interpreted.
//! Every other column rides along in `Record::cells`.

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;

use crate::models::{RankBy, Record};
use crate::progress::PhaseProgress;

pub const ADDRESS_COLUMN: &str = "address";
pub const IN_SEARCH_COLUMN: &str = "in_search";
pub const RATING_COLUMN: &str = "Rating";
pub const RATING_COUNT_COLUMN: &str = "Rating Count";
pub const DEFAULT_CATEGORY_PREFIX: &str = "Category";

/// Cell values read as missing (the pandas `read_csv` defaults).
pub static NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ============================================================================
// Schema
// ============================================================================

/// Column positions resolved from the header row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    pub headers: Vec<String>,
    pub address: usize,
    pub in_search: usize,
    pub rating: usize,
    pub rating_count: Option<usize>,
    pub categories: Vec<usize>, // header order
    /// Position within `categories` of the `<prefix>1` column
    pub primary_category: Option<usize>,
}

impl Schema {
    /// Resolve column positions. Category columns are every header starting
    /// with `category_prefix`, in header order.
    pub fn resolve(headers: &[String], category_prefix: &str) -> Result<Schema> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let required = |name: &str| -> Result<usize> {
            match find(name) {
                Some(idx) => Ok(idx),
                None => bail!("Input is missing required column '{}'", name),
            }
        };

        let categories: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.starts_with(category_prefix))
            .map(|(i, _)| i)
            .collect();
        let primary_name = format!("{}1", category_prefix);
        let primary_category = categories.iter().position(|&i| headers[i] == primary_name);

        Ok(Schema {
            headers: headers.to_vec(),
            address: required(ADDRESS_COLUMN)?,
            in_search: required(IN_SEARCH_COLUMN)?,
            rating: required(RATING_COLUMN)?,
            rating_count: find(RATING_COUNT_COLUMN),
            categories,
            primary_category,
        })
    }

    /// Fail if the ranking metric has no backing column.
    pub fn require_metric(&self, rank_by: RankBy) -> Result<()> {
        if rank_by == RankBy::Count && self.rating_count.is_none() {
            bail!(
                "Input is missing required column '{}' for --rank-by count",
                rank_by.column()
            );
        }
        Ok(())
    }

    /// Build a record from one CSV row.
    pub fn parse_row(&self, row: &StringRecord) -> Record {
        let cell = |idx: usize| row.get(idx).unwrap_or("");
        Record {
            address: cell(self.address).to_string(),
            in_search: parse_flag(cell(self.in_search)).unwrap_or(true),
            rating: parse_metric(cell(self.rating)),
            rating_count: self.rating_count.and_then(|idx| parse_metric(cell(idx))),
            categories: self.categories.iter().map(|&idx| parse_category(cell(idx))).collect(),
            primary_slot: self.primary_category,
            cells: (0..self.headers.len()).map(|idx| cell(idx).to_string()).collect(),
        }
    }

    /// Render a record back to cells.
    ///
    /// A typed field is only re-rendered when it no longer matches what its
    /// original cell parses to; untouched cells keep their exact input text.
    pub fn render(&self, record: &Record) -> Vec<String> {
        let mut cells = record.cells.clone();
        cells.resize(self.headers.len(), String::new());

        cells[self.address] = record.address.clone();

        if parse_flag(&cells[self.in_search]).unwrap_or(true) != record.in_search {
            cells[self.in_search] = render_flag(record.in_search).to_string();
        }

        for (slot, &idx) in self.categories.iter().enumerate() {
            let value = record.categories.get(slot).cloned().flatten();
            if parse_category(&cells[idx]) != value {
                cells[idx] = value.unwrap_or_default();
            }
        }

        cells
    }
}

// ============================================================================
// Cell Parsing
// ============================================================================

pub fn is_null(raw: &str) -> bool {
    NULL_MARKERS.contains(&raw)
}

/// Parse a visibility flag. `None` when the cell is missing or unrecognized.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

pub fn render_flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Parse a numeric metric. Missing, non-numeric and NaN cells give `None`.
pub fn parse_metric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if is_null(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

pub fn parse_category(raw: &str) -> Option<String> {
    if is_null(raw) {
        None
    } else {
        Some(raw.to_string())
    }
}

// ============================================================================
// Table
// ============================================================================

/// Immutable snapshot of the input file.
#[derive(Clone, Debug)]
pub struct Table {
    pub schema: Schema,
    pub records: Vec<Record>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read a CSV file into a table.
pub fn read_table(path: &Path, category_prefix: &str) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header row: {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();
    let schema = Schema::resolve(&headers, category_prefix)?;

    let progress = PhaseProgress::spinner("Phase 1: Reading records");
    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.with_context(|| {
            format!("Failed to read row {} of {}", line + 1, path.display())
        })?;
        records.push(schema.parse_row(&row));
        progress.inc();
    }
    progress.finish(format!("Phase 1: Read {} records", records.len()));

    Ok(Table { schema, records })
}
