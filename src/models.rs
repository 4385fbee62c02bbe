//! Core data models for listing consolidation.
//!
//! Records, groups, the ranking/harvesting policy enums and run statistics
//! shared by every stage of the pipeline.

use clap::ValueEnum;
use rustc_hash::FxHashMap;
use serde::Serialize;

// ============================================================================
// Type Aliases
// ============================================================================

/// Index mapping a normalized address to its position in `Vec<Group>`
pub type AddressIndex = FxHashMap<String, usize>;

// ============================================================================
// Records
// ============================================================================

/// One listing row.
///
/// The typed fields are what the pipeline reads and rewrites. `cells` holds
/// the row exactly as it was read so columns the pipeline never touches are
/// written back unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub address: String,
    pub in_search: bool,
    pub rating: Option<f64>,
    pub rating_count: Option<f64>,
    pub categories: Vec<Option<String>>, // Category1..CategoryN, header order
    /// Position of the `<prefix>1` column within `categories`
    pub primary_slot: Option<usize>,
    pub cells: Vec<String>,
}

impl Record {
    /// Value of the `Category1` slot, if the column exists and is populated.
    pub fn primary_category(&self) -> Option<&str> {
        self.primary_slot
            .and_then(|slot| self.categories.get(slot))
            .and_then(|c| c.as_deref())
    }

    /// Number of empty category slots.
    pub fn empty_slots(&self) -> usize {
        self.categories.iter().filter(|c| c.is_none()).count()
    }

    /// Copy of this record hidden from search. Category slots are untouched.
    pub fn demoted(&self) -> Record {
        Record {
            in_search: false,
            ..self.clone()
        }
    }

    /// Ranking metric selected by `rank_by`.
    pub fn metric(&self, rank_by: RankBy) -> Option<f64> {
        match rank_by {
            RankBy::Rating => self.rating,
            RankBy::Count => self.rating_count,
        }
    }
}

/// Records sharing one normalized address. `rows` index into the loaded
/// table in input order and are never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub address: String,
    pub rows: Vec<usize>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.rows.len() == 1
    }
}

// ============================================================================
// Policies
// ============================================================================

/// Metric used to choose the canonical record of a group (higher wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBy {
    /// `Rating` column
    #[default]
    Rating,
    /// `Rating Count` column
    Count,
}

impl RankBy {
    /// Input column holding the metric.
    pub fn column(self) -> &'static str {
        match self {
            RankBy::Rating => "Rating",
            RankBy::Count => "Rating Count",
        }
    }
}

/// How `Category1` values are collected from demoted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HarvestMode {
    /// Rank order, duplicates kept
    #[default]
    Ordered,
    /// Distinct values, first-seen order, minus the canonical's own Category1
    #[value(name = "dedup")]
    Deduplicated,
}

// ============================================================================
// Statistics (Instrumentation)
// ============================================================================

/// Counters collected over one pipeline run.
#[derive(Default, Debug, Clone, Serialize)]
pub struct RunStats {
    pub rank_by: RankBy,
    pub harvest: HarvestMode,

    // Input
    pub rows_read: usize,
    pub total_groups: usize,

    // Consolidation
    pub singleton_groups: usize,
    pub merged_groups: usize,
    pub demoted_records: usize,
    pub slots_filled: usize,
    pub harvested_dropped: usize, // harvested values with no empty slot left

    // Output
    pub groups_written: usize, // per-address file + combined append
    pub unsafe_addresses: usize, // addresses that are not plain file names

    pub elapsed_seconds: f64,
}

impl RunStats {
    /// Share of input rows that were demoted, as a percentage
    pub fn demotion_rate(&self) -> f64 {
        if self.rows_read == 0 {
            0.0
        } else {
            100.0 * self.demoted_records as f64 / self.rows_read as f64
        }
    }

    /// Log stats to stderr in JSON format
    pub fn log_phase(&self, phase: &str) {
        if let Ok(json) = serde_json::to_string_pretty(self) {
            eprintln!("[STATS:{}]\n{}", phase, json);
        }
    }

    /// Write stats to a JSON file
    pub fn write_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(categories: &[Option<&str>]) -> Record {
        Record {
            address: "5 oak ave".to_string(),
            in_search: true,
            rating: Some(4.0),
            rating_count: None,
            categories: categories.iter().map(|c| c.map(str::to_string)).collect(),
            primary_slot: if categories.is_empty() { None } else { Some(0) },
            cells: Vec::new(),
        }
    }

    #[test]
    fn test_primary_category_and_empty_slots() {
        let r = record(&[Some("cafe"), None, Some("bar"), None]);
        assert_eq!(r.primary_category(), Some("cafe"));
        assert_eq!(r.empty_slots(), 2);

        let r = record(&[None, Some("bar")]);
        assert_eq!(r.primary_category(), None);

        let r = record(&[]);
        assert_eq!(r.primary_category(), None);
        assert_eq!(r.empty_slots(), 0);
    }

    #[test]
    fn test_primary_category_follows_primary_slot() {
        let mut r = record(&[Some("7"), Some("cafe"), None]);
        r.primary_slot = Some(1);
        assert_eq!(r.primary_category(), Some("cafe"));

        r.primary_slot = None;
        assert_eq!(r.primary_category(), None);
    }

    #[test]
    fn test_demoted_keeps_categories() {
        let r = record(&[Some("cafe"), None]);
        let d = r.demoted();
        assert!(!d.in_search);
        assert_eq!(d.categories, r.categories);
        assert!(r.in_search);
    }

    #[test]
    fn test_metric_selection() {
        let mut r = record(&[]);
        r.rating_count = Some(120.0);
        assert_eq!(r.metric(RankBy::Rating), Some(4.0));
        assert_eq!(r.metric(RankBy::Count), Some(120.0));
    }

    #[test]
    fn test_demotion_rate() {
        let stats = RunStats {
            rows_read: 8,
            demoted_records: 2,
            ..Default::default()
        };
        assert_eq!(stats.demotion_rate(), 25.0);
        assert_eq!(RunStats::default().demotion_rate(), 0.0);
    }
}
