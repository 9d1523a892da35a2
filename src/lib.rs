pub mod cli;
pub mod control;
pub mod data;
pub mod db;
pub mod error;
pub mod facts;
pub mod layout;
pub mod lookups;
pub mod orchestrate;
pub mod period;
pub mod provision;
pub mod recode;
pub mod spec;
pub mod status;
pub mod types;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("trade_loader", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub async fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Provision(args) => provision::execute(&args).await,
        Commands::Load(args) => orchestrate::execute(&args).await,
        Commands::Status(args) => status::execute(&args).await,
    }
}
