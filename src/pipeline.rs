//! Pipeline driver.
//!
//! load → normalize → group → (rank → consolidate → write) per group.
//! Groups are processed one at a time in first-occurrence order; any error
//! aborts the run.

use anyhow::Result;
use std::path::Path;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::consolidate::{consolidate, Consolidation};
use crate::grouping::group_by_address;
use crate::models::{Group, HarvestMode, RankBy, Record, RunStats};
use crate::normalize::normalize_records;
use crate::output::{group_file_path, write_group_file, CombinedOutput, COMBINED_FILE_NAME};
use crate::progress::PhaseProgress;
use crate::ranking::rank_group;
use crate::safety::{ensure_not_source, is_filesystem_safe};
use crate::table::{read_table, Table};

/// Returned by a successful run.
pub const COMPLETION_MESSAGE: &str = "Pipeline Finished Processing";

/// State carried between stages: the normalized table and its groups.
#[derive(Clone, Debug)]
pub struct RunContext {
    pub table: Table,
    pub groups: Vec<Group>,
}

impl RunContext {
    /// Rank and consolidate one group. Singletons skip ranking entirely.
    pub fn consolidate_group(&self, group: &Group, rank_by: RankBy, harvest: HarvestMode) -> Consolidation {
        let records = &self.table.records;
        let order = if group.is_singleton() {
            group.rows.clone()
        } else {
            rank_group(records, group, rank_by)
        };
        let ranked: Vec<&Record> = order.iter().map(|&row| &records[row]).collect();
        consolidate(&ranked, harvest)
    }
}

#[derive(Debug)]
pub struct RunOutcome {
    pub message: &'static str,
    pub stats: RunStats,
}

/// Load the input, normalize addresses and compute groups.
pub fn prepare(input_path: &Path, category_prefix: &str) -> Result<RunContext> {
    let raw = read_table(input_path, category_prefix)?;
    let table = Table {
        records: normalize_records(&raw.records),
        schema: raw.schema,
    };
    let groups = group_by_address(&table.records);
    Ok(RunContext { table, groups })
}

/// Run the whole pipeline.
pub fn run(config: &PipelineConfig) -> Result<RunOutcome> {
    let start = Instant::now();
    config.validate()?;

    let ctx = prepare(&config.input_path, &config.category_prefix)?;
    ctx.table.schema.require_metric(config.rank_by)?;
    println!(
        "Found {} unique addresses in {} records",
        ctx.groups.len(),
        ctx.table.len()
    );

    let total_dir = config.total_dir();
    ensure_not_source(&total_dir.join(COMBINED_FILE_NAME), &config.input_path)?;
    let mut combined = CombinedOutput::create(&total_dir)?;

    let mut stats = RunStats {
        rank_by: config.rank_by,
        harvest: config.harvest,
        rows_read: ctx.table.len(),
        total_groups: ctx.groups.len(),
        ..Default::default()
    };

    let progress = PhaseProgress::bar("Phase 2: Consolidating groups", ctx.groups.len() as u64);
    for (idx, group) in ctx.groups.iter().enumerate() {
        let result = ctx.consolidate_group(group, config.rank_by, config.harvest);

        if group.is_singleton() {
            stats.singleton_groups += 1;
        } else {
            stats.merged_groups += 1;
        }
        stats.demoted_records += result.demoted_count();
        stats.slots_filled += result.slots_filled;
        stats.harvested_dropped += result.harvested_dropped;

        if !is_filesystem_safe(&group.address) {
            stats.unsafe_addresses += 1;
            eprintln!(
                "Warning: address {:?} is not a plain file name; its output may land elsewhere",
                group.address
            );
        }

        let path = group_file_path(&config.output_path, &group.address);
        ensure_not_source(&path, &config.input_path)?;
        write_group_file(&path, &ctx.table.schema, &result.records)?;
        combined.append_group(&group.address, &ctx.table.schema, &result.records, idx == 0)?;
        stats.groups_written += 1;

        progress.inc();
    }
    progress.finish(format!(
        "Phase 2: Consolidated {} groups ({} merged)",
        stats.total_groups, stats.merged_groups
    ));
    combined.finish()?;

    stats.elapsed_seconds = start.elapsed().as_secs_f64();
    Ok(RunOutcome {
        message: COMPLETION_MESSAGE,
        stats,
    })
}
