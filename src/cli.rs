use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Load UK trade statistics extracts into PostgreSQL", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the trade tables, key the reference tables, and fill the
    /// vocabulary lookup tables
    Provision(ProvisionArgs),
    /// Load one period's extract files from a local directory
    Load(LoadArgs),
    /// Report per-period row counts for the fact tables
    Status(StatusArgs),
}

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// PostgreSQL connection URL
    #[arg(long = "database-url", env = "DATABASE_URL")]
    pub database_url: String,
    /// Directory holding the column specification documents
    #[arg(long = "specs", default_value = "data/lookups")]
    pub specs_dir: PathBuf,
    /// Directory holding the vocabulary lookup CSV files
    #[arg(long = "lookups", default_value = "data/lookups")]
    pub lookups_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Directory holding the decompressed extract files
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Year of the period to load; two or four digits
    #[arg(short = 'y', long, value_parser = parse_year)]
    pub year: i32,
    /// Month of the period to load (1-12)
    #[arg(short = 'm', long, value_parser = parse_month)]
    pub month: u32,
    /// PostgreSQL connection URL
    #[arg(long = "database-url", env = "DATABASE_URL")]
    pub database_url: String,
    /// Directory holding the column specification documents
    #[arg(long = "specs", default_value = "data/lookups")]
    pub specs_dir: PathBuf,
    /// Mode-of-transport recode document
    #[arg(
        long = "recode",
        default_value = "data/lookups/recode_mode_of_transport.json"
    )]
    pub recode: PathBuf,
    /// Row-count threshold below which a fact table is reloaded for the
    /// period; re-runs above a partial load's threshold append duplicates,
    /// clean up below-threshold partials before retrying
    #[arg(long, default_value_t = 50_000)]
    pub threshold: u64,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// PostgreSQL connection URL
    #[arg(long = "database-url", env = "DATABASE_URL")]
    pub database_url: String,
    /// Year of the period to inspect; two or four digits
    #[arg(short = 'y', long, value_parser = parse_year)]
    pub year: i32,
    /// Month of the period to inspect (1-12)
    #[arg(short = 'm', long, value_parser = parse_month)]
    pub month: u32,
}

pub fn parse_year(value: &str) -> Result<i32, String> {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err("Year must be numeric".to_string());
    }
    match value.len() {
        2 => Ok(2000 + value.parse::<i32>().map_err(|e| e.to_string())?),
        4 => Ok(value.parse::<i32>().map_err(|e| e.to_string())?),
        _ => Err("Year must be a two- or four-digit number".to_string()),
    }
}

pub fn parse_month(value: &str) -> Result<u32, String> {
    let month: u32 = value
        .parse()
        .map_err(|_| "Month must be numeric".to_string())?;
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err("Month must be between 1 and 12".to_string())
    }
}
