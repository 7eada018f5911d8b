//! CLI command implementations.

pub mod api_keys;
pub mod config;
pub mod credits;
pub mod export;
pub mod health;
pub mod images;
pub mod tokens;
pub mod usage;

use anyhow::Result;
use serde::Serialize;

use crate::output::TextFormatter;
use crate::{Cli, OutputFormat};

/// Prints `value` as JSON, or the text rendering produced by `text`.
pub(crate) fn emit<T, F>(cli: &Cli, value: &T, text: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&TextFormatter) -> String,
{
    match cli.format {
        OutputFormat::Text => println!("{}", text(&cli.text())),
        OutputFormat::Json => println!("{}", cli.json().format(value)?),
    }
    Ok(())
}
