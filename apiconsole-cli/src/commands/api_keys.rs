//! Keys command - manage API keys.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::emit;
use crate::Cli;
use crate::session::Session;

/// Arguments for the keys command.
#[derive(Args)]
pub struct KeysArgs {
    #[command(subcommand)]
    pub action: KeysAction,
}

/// Key subcommands.
#[derive(Subcommand)]
pub enum KeysAction {
    /// Create a named API key.
    Create {
        /// Key name.
        name: String,
    },
}

/// Runs the keys command.
pub async fn run(args: &KeysArgs, cli: &Cli) -> Result<()> {
    let session = Session::open(cli).await?;

    match &args.action {
        KeysAction::Create { name } => {
            let key = session.api.create_api_key(name).await?;
            emit(cli, &key, |f| f.format_api_key(&key))
        }
    }
}
