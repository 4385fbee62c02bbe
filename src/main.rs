use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use listing_consolidate::config::{load_config, PipelineConfig};
use listing_consolidate::models::{HarvestMode, RankBy};
use listing_consolidate::pipeline;
use listing_consolidate::progress::{format_duration, set_log_only};
use listing_consolidate::table::DEFAULT_CATEGORY_PREFIX;

#[derive(Parser)]
#[command(name = "listing-consolidate")]
#[command(about = "Consolidate duplicate listings per address into one searchable row")]
struct Args {
    /// Input CSV (overrides [Paths] input_path)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output prefix; files are written as <output><address>.csv (overrides [Paths] output_path)
    #[arg(long)]
    output: Option<String>,

    /// INI config file with a [Paths] section
    #[arg(long)]
    config: Option<PathBuf>,

    /// Metric that picks the canonical row of each address
    #[arg(long, value_enum, default_value_t = RankBy::Rating)]
    rank_by: RankBy,

    /// How Category1 values are collected from demoted rows
    #[arg(long, value_enum, default_value_t = HarvestMode::Ordered)]
    harvest: HarvestMode,

    /// Prefix shared by the category columns
    #[arg(long, default_value = DEFAULT_CATEGORY_PREFIX)]
    category_prefix: String,

    /// Hide progress bars and log plain progress lines to stderr
    #[arg(long)]
    log_only: bool,

    /// Write run statistics as JSON to this path
    #[arg(long)]
    stats: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    set_log_only(args.log_only);

    let file_config = match &args.config {
        Some(path) => Some(load_config(path)?),
        None => None,
    };
    let config = PipelineConfig::resolve(args.input, args.output, file_config.as_ref())?
        .with_rank_by(args.rank_by)
        .with_harvest(args.harvest)
        .with_category_prefix(args.category_prefix);

    println!("Reading listings: {:?}", config.input_path);
    let outcome = pipeline::run(&config)?;
    let stats = &outcome.stats;

    println!("\n{:=<60}", "");
    println!("{}", outcome.message);
    println!("  Records: {}", stats.rows_read);
    println!("  Addresses: {} ({} merged)", stats.total_groups, stats.merged_groups);
    println!("  Demoted: {} ({:.1}%)", stats.demoted_records, stats.demotion_rate());
    println!("  Category slots filled: {}", stats.slots_filled);
    println!(
        "  Elapsed: {}",
        format_duration(std::time::Duration::from_secs_f64(stats.elapsed_seconds))
    );
    println!("{:=<60}", "");

    stats.log_phase("final");
    if let Some(path) = &args.stats {
        stats
            .write_to_file(path)
            .with_context(|| format!("Failed to write stats file: {}", path.display()))?;
    }

    Ok(())
}
