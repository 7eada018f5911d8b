//! Health command - check the backend.

use anyhow::{Result, bail};
use std::time::Instant;

use super::emit;
use crate::Cli;
use crate::session::Session;

/// Runs the health command.
pub async fn run(cli: &Cli) -> Result<()> {
    let session = Session::open(cli).await?;

    let started = Instant::now();
    let status = session.api.health().await?;
    let elapsed = started.elapsed();

    emit(cli, &status, |f| {
        f.format_health(&status, session.api.client().base_url(), elapsed)
    })?;

    if !status.is_healthy() {
        bail!("backend reported status '{}'", status.status);
    }
    Ok(())
}
