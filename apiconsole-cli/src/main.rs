// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! API Console CLI - credits, tokens and processing services from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Current balance
//! apiconsole credits
//!
//! # Redeem a credit token
//! apiconsole tokens redeem 0123456789abcdef0123456789abcdef
//!
//! # Decode QR codes from an image
//! apiconsole qr extract ./ticket.png
//!
//! # Compare two signatures, JSON output
//! apiconsole --format json signature a.png b.png
//!
//! # Export the last 30 days of usage
//! apiconsole export stats --days 30
//! ```

mod commands;
mod output;
mod session;

use anyhow::Result;
use apiconsole_fetch::{ApiError, ErrorKind};
use apiconsole_store::LogLevel;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{api_keys, config, credits, export, health, images, tokens, usage};
use output::{JsonFormatter, TextFormatter};

// ============================================================================
// CLI Definition
// ============================================================================

/// API Console CLI.
#[derive(Parser)]
#[command(name = "apiconsole")]
#[command(about = "Client for the document and identity processing API")]
#[command(long_about = r#"
Manage credits and tokens, and call the processing services.

Services:
  • QR masking and extraction (qr)
  • Face detection and verification (face)
  • Signature verification (signature)
  • ID document cropping (id)

Connection settings come from the settings file and can be overridden
with APICONSOLE_API_URL, APICONSOLE_AUTH_URL, APICONSOLE_SESSION_COOKIE
and APICONSOLE_ACCESS_TOKEN.

Examples:
  apiconsole credits                   # Current balance
  apiconsole tokens list --filter all  # Every token
  apiconsole face verify a.jpg b.jpg   # Compare two faces
  apiconsole health                    # Backend health
"#)]
#[command(version)]
#[command(author = "API Console Contributors")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Backend URL for this invocation.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Settings file to use instead of the default.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Generate, list, delete and redeem credit tokens.
    #[command(visible_alias = "t")]
    Tokens(tokens::TokensArgs),

    /// Show the credit balance.
    #[command(visible_alias = "c")]
    Credits,

    /// Manage API keys.
    Keys(api_keys::KeysArgs),

    /// QR masking and extraction.
    Qr(images::QrArgs),

    /// Face detection and verification.
    Face(images::FaceArgs),

    /// Compare two signature images.
    Signature(images::SignatureArgs),

    /// Crop an ID document out of a photo.
    Id(images::IdArgs),

    /// Usage analytics.
    #[command(visible_alias = "u")]
    Usage(usage::UsageArgs),

    /// Check backend health.
    Health,

    /// Export tables as CSV.
    Export(export::ExportArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Input rejected before sending.
    Validation = 2,
    /// Authentication failed.
    Auth = 3,
    /// Backend unreachable or timed out.
    Network = 4,
    /// Backend reported a server error.
    Server = 5,
}

impl From<ErrorKind> for ExitCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Validation => ExitCode::Validation,
            ErrorKind::Auth => ExitCode::Auth,
            ErrorKind::Network => ExitCode::Network,
            ErrorKind::Server => ExitCode::Server,
            ErrorKind::NotFound | ErrorKind::Unclassified => ExitCode::Error,
        }
    }
}

impl Cli {
    /// Text formatter honoring `--no-color`.
    pub fn text(&self) -> TextFormatter {
        TextFormatter::new(!self.no_color)
    }

    /// JSON formatter honoring `--pretty`.
    pub fn json(&self) -> JsonFormatter {
        JsonFormatter::new(self.pretty)
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

/// Picks the filter directive: `--verbose`, then `RUST_LOG`, then the
/// configured log level.
fn log_directive(verbose: bool, env: Option<&str>, level: LogLevel) -> String {
    if verbose {
        return "apiconsole=debug,info".to_string();
    }
    match env.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directive) => directive.to_string(),
        None => level.directive(),
    }
}

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::try_new(log_directive(verbose, env.as_deref(), level))
        .unwrap_or_else(|_| EnvFilter::new(level.directive()));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = session::load_settings(&cli).await.log_level;
    setup_logging(cli.verbose, cli.quiet, log_level);

    let result = match &cli.command {
        Commands::Tokens(args) => tokens::run(args, &cli).await,
        Commands::Credits => credits::run(&cli).await,
        Commands::Keys(args) => api_keys::run(args, &cli).await,
        Commands::Qr(args) => images::run_qr(args, &cli).await,
        Commands::Face(args) => images::run_face(args, &cli).await,
        Commands::Signature(args) => images::run_signature(args, &cli).await,
        Commands::Id(args) => images::run_id(args, &cli).await,
        Commands::Usage(args) => usage::run(args, &cli).await,
        Commands::Health => health::run(&cli).await,
        Commands::Export(args) => export::run(args, &cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    if let Err(e) = result {
        let code = report_error(&e, &cli);
        std::process::exit(code as i32);
    }

    Ok(())
}

/// Prints an error and picks the exit code.
fn report_error(error: &anyhow::Error, cli: &Cli) -> ExitCode {
    let Some(api_error) = error.downcast_ref::<ApiError>() else {
        if !cli.quiet {
            eprintln!("Error: {error:#}");
        }
        return ExitCode::Error;
    };

    let report = api_error.report();
    if !cli.quiet {
        match cli.format {
            OutputFormat::Text => eprintln!("{}", cli.text().format_error(&report)),
            OutputFormat::Json => match cli.json().format(&report) {
                Ok(json) => println!("{json}"),
                Err(_) => eprintln!("Error: {}", report.message),
            },
        }
    }
    ExitCode::from(report.kind)
}

// ============================================================================
// Tests
// ============================================================================
