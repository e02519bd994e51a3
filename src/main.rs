use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fundscope::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fundscope::AppCommand {
    fn from(cmd: Commands) -> fundscope::AppCommand {
        match cmd {
            Commands::Alloc { assets } => fundscope::AppCommand::Allocation {
                assets_path: assets,
            },
            Commands::Perf { data } => fundscope::AppCommand::Performance { data_path: data },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display country, continent, sector and market status allocation
    Alloc {
        /// JSON list of positions: isin or ticker, shares, price
        assets: PathBuf,
    },
    /// Display money-weighted rate of return
    Perf {
        /// JSON object with transactions and values
        data: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fundscope::cli::setup::setup(),
        Some(cmd) => fundscope::run_command(cmd.into(), cli.config_path.as_deref()),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
