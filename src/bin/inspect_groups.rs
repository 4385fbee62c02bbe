//! Preview how an input file will be grouped, without writing anything.
//!
//! Usage: inspect-groups --input <listings.csv> [--rank-by rating|count] [--top N]

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use listing_consolidate::config::{load_config, PipelineConfig};
use listing_consolidate::models::{HarvestMode, RankBy};
use listing_consolidate::pipeline::prepare;
use listing_consolidate::table::DEFAULT_CATEGORY_PREFIX;

#[derive(Parser)]
#[command(name = "inspect-groups")]
#[command(about = "Dry-run report of address groups and their canonical rows")]
struct Args {
    #[arg(long)]
    input: Option<PathBuf>,

    /// INI config file with a [Paths] section
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = RankBy::Rating)]
    rank_by: RankBy,

    #[arg(long, default_value = DEFAULT_CATEGORY_PREFIX)]
    category_prefix: String,

    /// Number of largest groups to list
    #[arg(long, default_value = "10")]
    top: usize,
}

/// Bucket label for a group size
fn size_bucket(size: usize) -> &'static str {
    match size {
        0 | 1 => "1",
        2 => "2",
        3..=5 => "3-5",
        _ => "6+",
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let file_config = match &args.config {
        Some(path) => Some(load_config(path)?),
        None => None,
    };
    // Output path is irrelevant here; nothing is written.
    let config = PipelineConfig::resolve(args.input, Some(String::new()), file_config.as_ref())?
        .with_rank_by(args.rank_by)
        .with_category_prefix(args.category_prefix);
    config.validate()?;

    let ctx = prepare(&config.input_path, &config.category_prefix)?;
    ctx.table.schema.require_metric(config.rank_by)?;

    println!("\nGroups for {:?}", config.input_path);
    println!("{:-<80}", "");
    println!("  Records: {}", ctx.table.len());
    println!("  Addresses: {}", ctx.groups.len());
    println!("  Category columns: {}", ctx.table.schema.categories.len());

    let mut histogram = [("1", 0usize), ("2", 0), ("3-5", 0), ("6+", 0)];
    for group in &ctx.groups {
        let bucket = size_bucket(group.len());
        if let Some(entry) = histogram.iter_mut().find(|entry| entry.0 == bucket) {
            entry.1 += 1;
        }
    }
    println!("\nGroup sizes:");
    for (label, count) in histogram {
        println!("  {:>4}: {}", label, count);
    }

    let mut largest: Vec<_> = ctx.groups.iter().filter(|g| !g.is_singleton()).collect();
    largest.sort_by(|a, b| b.len().cmp(&a.len()));

    if largest.is_empty() {
        println!("\nNo duplicate addresses found.");
        return Ok(());
    }

    println!("\nLargest groups (canonical row by {}):", config.rank_by.column());
    for group in largest.into_iter().take(args.top) {
        let result = ctx.consolidate_group(group, config.rank_by, HarvestMode::Ordered);
        let metric = result
            .canonical()
            .and_then(|r| r.metric(config.rank_by))
            .map_or_else(|| "-".to_string(), |m| m.to_string());
        println!(
            "  [{}] {} -> {}={} ({} slots fillable)",
            group.len(),
            group.address,
            config.rank_by.column(),
            metric,
            result.slots_filled
        );
    }

    Ok(())
}
