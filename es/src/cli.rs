//! CLI argument parsing for evalsurvey

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::warn;

use crate::reconcile::{OrderingKind, OrderingPolicy};

#[derive(Parser, Debug)]
#[command(name = "es")]
#[command(author, version, about = "Resumable image rating survey", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format for reporting commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Presentation order chosen for this invocation
#[derive(Args, Debug, Clone, Default)]
pub struct OrderArgs {
    /// Presentation order (defaults to the configured one)
    #[arg(long, value_enum)]
    pub order: Option<OrderingKind>,

    /// Seed for the shuffled order; reuse it to get the same order again.
    /// `status` and `rate` use canonical order when shuffled has no seed
    #[arg(long)]
    pub seed: Option<u64>,
}

impl OrderArgs {
    pub fn policy(&self, configured: OrderingKind) -> OrderingPolicy {
        OrderingPolicy::from_kind(self.order.unwrap_or(configured), self.seed)
    }

    /// Policy for commands that run once and exit
    ///
    /// Each invocation would draw a new seed, so an unseeded shuffle falls
    /// back to canonical order and `status` agrees with the next `rate`.
    pub fn one_shot_policy(&self, configured: OrderingKind) -> OrderingPolicy {
        match (self.order.unwrap_or(configured), self.seed) {
            (OrderingKind::Shuffled, None) => {
                warn!("Shuffled order without --seed; using canonical order");
                OrderingPolicy::Canonical
            }
            (kind, seed) => OrderingPolicy::from_kind(kind, seed),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an interactive rating session
    Run {
        /// Respondent name or ID (asked for if omitted)
        #[arg(short, long)]
        respondent: Option<String>,

        #[command(flatten)]
        order: OrderArgs,
    },

    /// Show a respondent's progress
    Status {
        /// Respondent name or ID
        #[arg(required = true)]
        respondent: String,

        #[command(flatten)]
        order: OrderArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List the full image sequence
    Catalog {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Rate the respondent's current image without the interactive session
    Rate {
        /// Respondent name or ID
        #[arg(required = true)]
        respondent: String,

        /// Regional authenticity (1-5)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        authenticity: u8,

        /// Feature fidelity (1-5)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        fidelity: u8,

        /// Structural naturalness (1-5)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        naturalness: u8,

        /// Streetscape harmony (1-5)
        #[arg(short = 'H', long, value_parser = clap::value_parser!(u8).range(1..=5))]
        harmony: u8,

        /// Only rate if the current image has this file name
        #[arg(short, long)]
        expect: Option<String>,

        #[command(flatten)]
        order: OrderArgs,
    },

    /// Inspect and export result logs
    Results {
        #[command(subcommand)]
        command: ResultsCommand,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ResultsCommand {
    /// List all result logs
    List,

    /// Copy a result log byte-for-byte
    Export {
        /// Result log file name, as shown by `results list`
        #[arg(required = true)]
        file: String,

        /// Destination path (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write the default configuration
    Init {
        /// Destination (default: evalsurvey.yml)
        path: Option<PathBuf>,
    },
}
