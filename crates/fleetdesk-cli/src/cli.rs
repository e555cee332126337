//! CLI definition using clap

use clap::{Parser, Subcommand};
use fleetdesk_types::OutputFormat;

#[derive(Parser)]
#[command(name = "fleetdesk")]
#[command(version)]
#[command(about = "Transportation management over a managed SQL database")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table)
    #[arg(long, short = 'f', global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Delivery log status: counts per status, null timestamps, recent rows
    Status,

    /// List tables, or the columns of one table
    Schema {
        /// Table to describe; lists all tables when omitted
        table: Option<String>,
    },

    /// Show the most recent deliveries
    Recent {
        /// Number of rows
        #[arg(long, short = 'n', default_value = "20")]
        limit: i64,
    },

    /// Plan routes for the pending backlog (dry run unless --apply)
    Optimize {
        /// Per-vehicle ceiling for this run
        #[arg(long, default_value = "10")]
        max_per_vehicle: i64,

        /// Persist the vehicle assignments
        #[arg(long)]
        apply: bool,
    },

    /// Train the delivery-time model and score the open backlog
    Predict {
        /// Max predictions to show
        #[arg(long, short = 'n', default_value = "15")]
        limit: usize,

        /// Completed deliveries to train on
        #[arg(long, default_value = "500")]
        history: i64,
    },

    /// Show the effective configuration
    Config,
}
