//! Canonical selection and category back-fill for one ranked group.
//!
//! The first record of a ranked group stays searchable; every other record is
//! demoted. `Category1` values collected from the demoted records fill the
//! canonical record's empty category slots, left to right, until either the
//! slots or the values run out. Populated slots are never overwritten and
//! demoted records keep their categories.

use rustc_hash::FxHashSet;
use std::collections::VecDeque;

use crate::models::{HarvestMode, Record};

/// Output of consolidating one group.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Consolidation {
    /// Canonical record first, then the demoted records in rank order
    pub records: Vec<Record>,
    pub slots_filled: usize,
    /// Harvested values left over once the empty slots were used up
    pub harvested_dropped: usize,
}

impl Consolidation {
    pub fn canonical(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn demoted_count(&self) -> usize {
        self.records.len().saturating_sub(1)
    }
}

/// Collect back-fill candidates from the demoted records' `Category1`.
/// Null `Category1` cells are skipped and never use up a slot.
pub fn harvest(canonical: &Record, demoted: &[&Record], mode: HarvestMode) -> VecDeque<String> {
    let values = demoted.iter().filter_map(|r| r.primary_category());

    match mode {
        HarvestMode::Ordered => values.map(str::to_string).collect(),
        HarvestMode::Deduplicated => {
            let mut seen: FxHashSet<&str> = FxHashSet::default();
            if let Some(own) = canonical.primary_category() {
                seen.insert(own);
            }
            values
                .filter(|v| seen.insert(*v))
                .map(str::to_string)
                .collect()
        }
    }
}

/// Consolidate a ranked group. `ranked[0]` becomes canonical.
///
/// Groups of one record are returned as-is.
pub fn consolidate(ranked: &[&Record], mode: HarvestMode) -> Consolidation {
    let Some((&canonical, demoted)) = ranked.split_first() else {
        return Consolidation::default();
    };
    if demoted.is_empty() {
        return Consolidation {
            records: vec![canonical.clone()],
            ..Default::default()
        };
    }

    let mut harvested = harvest(canonical, demoted, mode);
    let mut promoted = Record {
        in_search: true,
        ..canonical.clone()
    };

    let mut slots_filled = 0;
    for slot in promoted.categories.iter_mut() {
        if harvested.is_empty() {
            break;
        }
        if slot.is_none() {
            *slot = harvested.pop_front();
            slots_filled += 1;
        }
    }

    let mut records = Vec::with_capacity(ranked.len());
    records.push(promoted);
    records.extend(demoted.iter().map(|r| r.demoted()));

    Consolidation {
        records,
        slots_filled,
        harvested_dropped: harvested.len(),
    }
}
