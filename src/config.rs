//! Run configuration.
//!
//! Paths come from CLI flags or from an INI file with a `[Paths]` section:
//!
//! ```ini
//! [Paths]
//! input_path = data/listings.csv
//! output_path = out/
//! ```
//!
//! Values may also be double-quoted. Flags win over the file. The resolved
//! `PipelineConfig` is immutable and is handed to every pipeline stage.

use anyhow::{bail, Context, Result};
use ini::{Ini, ParseOption};
use std::path::{Path, PathBuf};

use crate::models::{HarvestMode, RankBy};
use crate::table::DEFAULT_CATEGORY_PREFIX;

pub const PATHS_SECTION: &str = "Paths";

/// Configuration loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    pub input_path: Option<PathBuf>,
    pub output_path: Option<String>,
}

impl FileConfig {
    /// Parse INI text. A missing section or blank value leaves the path unset.
    pub fn parse(content: &str) -> Result<FileConfig> {
        // Backslashes are literal so Windows paths survive.
        let option = ParseOption {
            enabled_quote: true,
            enabled_escape: false,
            ..Default::default()
        };
        let ini = Ini::load_from_str_opt(content, option)?;

        let value = |key: &str| {
            ini.section(Some(PATHS_SECTION))
                .and_then(|section| section.get(key))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Ok(FileConfig {
            paths: PathsConfig {
                input_path: value("input_path").map(PathBuf::from),
                output_path: value("output_path"),
            },
        })
    }
}

/// Load and parse an INI config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    FileConfig::parse(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Everything one run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    /// Prefix for per-address files: `<output_path><address>.csv`
    pub output_path: String,
    pub rank_by: RankBy,
    pub harvest: HarvestMode,
    pub category_prefix: String,
}

impl PipelineConfig {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            rank_by: RankBy::default(),
            harvest: HarvestMode::default(),
            category_prefix: DEFAULT_CATEGORY_PREFIX.to_string(),
        }
    }

    pub fn with_rank_by(mut self, rank_by: RankBy) -> Self {
        self.rank_by = rank_by;
        self
    }

    pub fn with_harvest(mut self, harvest: HarvestMode) -> Self {
        self.harvest = harvest;
        self
    }

    pub fn with_category_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.category_prefix = prefix.into();
        self
    }

    /// Merge explicit paths with an optional config file. Explicit paths win.
    pub fn resolve(
        input_path: Option<PathBuf>,
        output_path: Option<String>,
        file: Option<&FileConfig>,
    ) -> Result<Self> {
        let paths = file.map(|f| f.paths.clone()).unwrap_or_default();

        let Some(input_path) = input_path.or(paths.input_path) else {
            bail!("Input path is not set or is not a valid file.");
        };
        let Some(output_path) = output_path.or(paths.output_path) else {
            bail!("Output path is not set.");
        };

        Ok(Self::new(input_path, output_path))
    }

    /// Check the input exists before anything is read or written.
    pub fn validate(&self) -> Result<()> {
        if !self.input_path.is_file() {
            bail!(
                "Input path is not set or is not a valid file: {}",
                self.input_path.display()
            );
        }
        Ok(())
    }

    /// Directory holding the combined output (`<output_path>/_total`).
    pub fn total_dir(&self) -> PathBuf {
        Path::new(&self.output_path).join("_total")
    }
}
