//! Credits command - show the balance.

use anyhow::Result;

use super::emit;
use crate::Cli;
use crate::session::Session;

/// Runs the credits command.
pub async fn run(cli: &Cli) -> Result<()> {
    let session = Session::open(cli).await?;
    session.credits.refresh().await?;

    let state = session.credits.state().await;
    emit(cli, &state, |f| f.format_balance(&state))
}
