//! Usage command - per-service aggregates and call history.

use anyhow::Result;
use apiconsole_services::{DEFAULT_HISTORY_LIMIT, DEFAULT_STATS_DAYS};
use clap::{Args, Subcommand};

use super::emit;
use crate::Cli;
use crate::session::Session;

/// Arguments for the usage command.
#[derive(Args)]
pub struct UsageArgs {
    #[command(subcommand)]
    pub action: UsageAction,
}

/// Usage subcommands.
#[derive(Subcommand)]
pub enum UsageAction {
    /// Aggregates per service.
    Stats {
        /// Look-back window in days.
        #[arg(long, short, default_value_t = DEFAULT_STATS_DAYS)]
        days: u32,
    },
    /// Most recent calls.
    History {
        /// Maximum number of records.
        #[arg(long, short, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
    },
}

/// Runs the usage command.
pub async fn run(args: &UsageArgs, cli: &Cli) -> Result<()> {
    let session = Session::open(cli).await?;

    match &args.action {
        UsageAction::Stats { days } => {
            let stats = session.api.usage_stats(*days).await?;
            emit(cli, &stats, |f| f.format_usage_stats(&stats, *days))
        }
        UsageAction::History { limit } => {
            let records = session.api.usage_history(*limit).await?;
            emit(cli, &records, |f| f.format_usage_history(&records))
        }
    }
}
