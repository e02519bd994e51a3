pub mod cli;
pub mod core;

pub use crate::core::config;

use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

/// Analyses the binary can run once configuration is resolved.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Look-through allocation of the portfolio in the given assets file
    Allocation { assets_path: PathBuf },
    /// Money-weighted return for the given transactions/values file
    Performance { data_path: PathBuf },
}

pub fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Allocation { assets_path } => cli::alloc::run(&assets_path, &config),
        AppCommand::Performance { data_path } => cli::performance::run(&data_path, &config),
    }
}
