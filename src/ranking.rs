//! Ranking of a group's records by the configured metric.

use std::cmp::Ordering;

use crate::models::{Group, RankBy, Record};

/// Descending order on an optional metric; missing values sort last.
pub fn compare_metric_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Row indices of `group` ordered best first.
///
/// The sort is stable: rows with equal metrics keep their input order, so the
/// earliest of several equally ranked rows becomes canonical.
pub fn rank_group(records: &[Record], group: &Group, rank_by: RankBy) -> Vec<usize> {
    let mut ranked = group.rows.clone();
    ranked.sort_by(|&a, &b| {
        compare_metric_desc(records[a].metric(rank_by), records[b].metric(rank_by))
    });
    ranked
}
