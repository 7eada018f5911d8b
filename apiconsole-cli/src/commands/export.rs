//! Export command - write tables to date-stamped CSV files.

use anyhow::Result;
use apiconsole_core::TokenFilter;
use apiconsole_services::{
    DEFAULT_HISTORY_LIMIT, DEFAULT_STATS_DAYS, tokens_csv, usage_history_csv, usage_stats_csv,
    write_csv,
};
use apiconsole_store::default_export_dir;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::emit;
use super::tokens::parse_filter;
use crate::Cli;
use crate::session::Session;

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    #[command(subcommand)]
    pub table: ExportTable,

    /// Output directory (defaults to the configured export directory).
    #[arg(long, short, global = true)]
    pub dir: Option<PathBuf>,
}

/// Exportable tables.
#[derive(Subcommand)]
pub enum ExportTable {
    /// Token list.
    Tokens {
        /// Which tokens: mine, all, used, unused.
        #[arg(long, default_value = "all")]
        filter: String,
    },
    /// Per-service aggregates.
    Stats {
        /// Look-back window in days.
        #[arg(long, default_value_t = DEFAULT_STATS_DAYS)]
        days: u32,
    },
    /// Call history.
    History {
        /// Maximum number of records.
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
    },
}

/// Runs the export command.
pub async fn run(args: &ExportArgs, cli: &Cli) -> Result<()> {
    let session = Session::open(cli).await?;
    let dir = args
        .dir
        .clone()
        .or_else(|| session.settings.export_dir.clone())
        .unwrap_or_else(default_export_dir);

    let (prefix, rows, contents) = match &args.table {
        ExportTable::Tokens { filter } => {
            let filter: TokenFilter = parse_filter(filter)?;
            let tokens = session.api.list_tokens(filter).await?;
            ("tokens", tokens.len(), tokens_csv(tokens.as_slice()))
        }
        ExportTable::Stats { days } => {
            let stats = session.api.usage_stats(*days).await?;
            ("usage-stats", stats.len(), usage_stats_csv(&stats))
        }
        ExportTable::History { limit } => {
            let records = session.api.usage_history(*limit).await?;
            ("usage-history", records.len(), usage_history_csv(&records))
        }
    };

    let path = write_csv(&dir, prefix, &contents).await?;
    let result = serde_json::json!({"path": path, "rows": rows});
    emit(cli, &result, |f| {
        f.format_success(&format!("Exported {rows} rows to {}", path.display()))
    })
}
