//! Command-line arguments for parqlens.

use clap::Parser;
use std::path::PathBuf;

use crate::query::{FilterOperator, FilterStatement};

/// Command-line arguments for parqlens
#[derive(Parser, Debug)]
#[command(version, about = "parqlens: inspect Parquet files from the terminal")]
pub struct Args {
    /// Parquet file to open
    pub path: Option<PathBuf>,

    /// Print the column schema instead of rows
    #[arg(long = "schema", action)]
    pub schema: bool,

    /// Print statistics for one column
    #[arg(long = "stats", value_name = "COLUMN")]
    pub stats: Option<String>,

    /// Print statistics for every column
    #[arg(long = "all-stats", action)]
    pub all_stats: bool,

    /// Page number to display (0-based)
    #[arg(long = "page", default_value_t = 0)]
    pub page: usize,

    /// Rows per page (defaults to the configured page size)
    #[arg(long = "page-size")]
    pub page_size: Option<usize>,

    /// Sort by this column before paginating
    #[arg(long = "sort", value_name = "COLUMN")]
    pub sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long = "descending", action)]
    pub descending: bool,

    /// Filter rows, e.g. --filter "price > 10" (repeatable; conditions AND)
    #[arg(long = "filter", value_name = "COND")]
    pub filters: Vec<String>,

    /// Keep only rows where any column contains this text (case-insensitive)
    #[arg(long = "search", value_name = "TERM")]
    pub search: Option<String>,

    /// Work against a random sample instead of the full file
    #[arg(long = "sample", action)]
    pub sample: bool,

    /// Random seed for --sample (reproducible draws)
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Load the full file even when it is over the streaming threshold
    #[arg(long = "full-load", action)]
    pub full_load: bool,

    /// Emit schema/stats as JSON instead of a table
    #[arg(long = "json", action)]
    pub json: bool,

    /// Write a default config file and exit
    #[arg(long = "init-config", action)]
    pub init_config: bool,
}

/// Parse a `--filter` condition of the form `column OP value`. The value may
/// contain spaces; the first two whitespace-separated tokens are the column
/// and operator.
pub fn parse_filter(raw: &str) -> Result<FilterStatement, String> {
    let mut parts = raw.trim().splitn(3, char::is_whitespace);
    let column = parts.next().unwrap_or_default();
    let op_str = parts.next().unwrap_or_default();
    let value = parts.next().unwrap_or_default().trim();
    if column.is_empty() || op_str.is_empty() {
        return Err(format!(
            "Invalid filter '{raw}': expected \"column OP value\""
        ));
    }
    let operator = FilterOperator::parse(op_str)
        .ok_or_else(|| format!("Unknown filter operator '{op_str}' in '{raw}'"))?;
    Ok(FilterStatement {
        column: column.to_string(),
        operator,
        value: value.to_string(),
    })
}
