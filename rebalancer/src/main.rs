//! CLI entry point for ratiobook.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use ratiobook_rebalancer::commands::{self, RunOptions};
use ratiobook_rebalancer::config::Config;
use ratiobook_rebalancer::error::Error;

#[derive(Parser)]
#[command(name = "ratiobook")]
#[command(about = "Bitcoin wallet vs brokerage allocation and rebalancing")]
#[command(version)]
struct Cli {
    /// Path to config.toml
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Value both sides and compute the rebalance
    Run {
        /// Wallet part of the target ratio (falls back to config)
        #[arg(long)]
        ratio_wallet: Option<f64>,

        /// Brokerage part of the target ratio (falls back to config)
        #[arg(long)]
        ratio_brokerage: Option<f64>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Skip the ratio alert
        #[arg(long)]
        no_alert: bool,
    },

    /// List derived wallet addresses
    Addresses {
        /// 0 = receive, 1 = change (default: both)
        #[arg(long)]
        chain: Option<u32>,

        /// Addresses per chain (default: wallet.discovery_limit)
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show wallet balances only
    Balance,

    /// Log in to the brokerage and print a new session token
    Login,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Run {
            ratio_wallet,
            ratio_brokerage,
            json,
            no_alert,
        } => {
            let opts = RunOptions {
                ratio_wallet,
                ratio_brokerage,
                json,
                no_alert,
            };
            commands::run(&config, &opts)
        }
        Command::Addresses { chain, limit } => commands::show_addresses(&config, chain, limit),
        Command::Balance => commands::show_balance(&config),
        Command::Login => commands::login(&config),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e @ Error::ConfigurationMissing(_)) => {
            eprintln!("Error: {e}\nSet it in {}", cli.config.display());
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
