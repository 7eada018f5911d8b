//! Processing service commands - QR, face, signature and ID cropping.

use anyhow::{Context, Result};
use apiconsole_core::{ServiceKind, ServiceResponse};
use apiconsole_fetch::ApiError;
use apiconsole_services::{ConsoleApi, encode_image_bytes};
use apiconsole_store::ApiCall;
use clap::{Args, Subcommand};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::emit;
use crate::Cli;
use crate::output::ServiceOutput;
use crate::session::Session;

// ============================================================================
// Arguments
// ============================================================================

/// Arguments for the qr command.
#[derive(Args)]
pub struct QrArgs {
    #[command(subcommand)]
    pub action: QrAction,

    /// Retry once when the backend fails transiently.
    #[arg(long, global = true)]
    pub retry: bool,
}

/// QR subcommands.
#[derive(Subcommand)]
pub enum QrAction {
    /// Mask every QR code in the image.
    Mask {
        /// Image file (binary, or a data URL as text).
        image: PathBuf,
    },
    /// Decode every QR code in the image.
    Extract {
        /// Image file (binary, or a data URL as text).
        image: PathBuf,
    },
}

/// Arguments for the face command.
#[derive(Args)]
pub struct FaceArgs {
    #[command(subcommand)]
    pub action: FaceAction,

    /// Retry once when the backend fails transiently.
    #[arg(long, global = true)]
    pub retry: bool,
}

/// Face subcommands.
#[derive(Subcommand)]
pub enum FaceAction {
    /// Detect faces in one image.
    Detect {
        /// Image file.
        image: PathBuf,
    },
    /// Check whether two images show the same person.
    Verify {
        /// First image.
        first: PathBuf,
        /// Second image.
        second: PathBuf,
    },
}

/// Arguments for the signature command.
#[derive(Args)]
pub struct SignatureArgs {
    /// Exactly two signature images.
    #[arg(required = true, num_args = 1..)]
    pub images: Vec<PathBuf>,

    /// Retry once when the backend fails transiently.
    #[arg(long)]
    pub retry: bool,
}

/// Arguments for the id command.
#[derive(Args)]
pub struct IdArgs {
    /// Photo of the ID document.
    pub image: PathBuf,

    /// Retry once when the backend fails transiently.
    #[arg(long)]
    pub retry: bool,
}

// ============================================================================
// Image Loading
// ============================================================================

/// Reads an image file as base64.
///
/// Text files holding a data URL or bare base64 are passed through as-is;
/// anything else is treated as raw image bytes.
pub async fn load_image(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(image_payload(&bytes))
}

fn image_payload(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) if looks_like_base64(text.trim()) => text.trim().to_string(),
        _ => encode_image_bytes(bytes),
    }
}

fn looks_like_base64(text: &str) -> bool {
    text.starts_with("data:image/")
        || (!text.is_empty()
            && text
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=' | b'\n' | b'\r')))
}

async fn load_all(paths: &[PathBuf]) -> Result<Vec<String>> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        images.push(load_image(path).await?);
    }
    Ok(images)
}

// ============================================================================
// Execution
// ============================================================================

/// Runs one service call, optionally retrying a transient failure once.
async fn run_call<A, F, Fut>(
    cli: &Cli,
    kind: ServiceKind,
    args: A,
    retry: bool,
    operation: F,
) -> Result<()>
where
    A: Clone + Send + Sync + 'static,
    F: Fn(ConsoleApi, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ServiceResponse, ApiError>> + Send + 'static,
{
    let session = Session::open(cli).await?;
    let api = session.api.clone();
    let call = ApiCall::new(move |args: A| operation(api.clone(), args));

    debug!(service = kind.display_name(), "Calling service");
    let mut result = call.execute(args).await;

    if let Err(ref e) = result {
        if retry && e.kind().is_retryable() {
            warn!(service = kind.display_name(), error = %e, "Retrying once");
            if let Some(second) = call.retry().await {
                result = second;
            }
        }
    }

    let response = result?;
    let balance = session.credits.state().await.credits;
    emit(cli, &ServiceOutput::new(kind, &response, balance), |f| {
        f.format_service(kind, &response, balance)
    })
}

/// Runs the qr command.
pub async fn run_qr(args: &QrArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        QrAction::Mask { image } => {
            let image = load_image(image).await?;
            run_call(cli, ServiceKind::QrMasking, image, args.retry, |api, image| async move {
                api.mask_qr(&image).await
            })
            .await
        }
        QrAction::Extract { image } => {
            let image = load_image(image).await?;
            run_call(cli, ServiceKind::QrExtraction, image, args.retry, |api, image| async move {
                api.extract_qr(&image).await
            })
            .await
        }
    }
}

/// Runs the face command.
pub async fn run_face(args: &FaceArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        FaceAction::Detect { image } => {
            let image = load_image(image).await?;
            run_call(cli, ServiceKind::FaceDetect, image, args.retry, |api, image| async move {
                api.detect_face(&image).await
            })
            .await
        }
        FaceAction::Verify { first, second } => {
            let pair = (load_image(first).await?, load_image(second).await?);
            run_call(
                cli,
                ServiceKind::FaceVerification,
                pair,
                args.retry,
                |api, (first, second): (String, String)| async move {
                    api.verify_face(&first, &second).await
                },
            )
            .await
        }
    }
}

/// Runs the signature command.
pub async fn run_signature(args: &SignatureArgs, cli: &Cli) -> Result<()> {
    let images = load_all(&args.images).await?;
    run_call(
        cli,
        ServiceKind::SignatureVerification,
        images,
        args.retry,
        |api, images: Vec<String>| async move { api.verify_signature(&images).await },
    )
    .await
}

/// Runs the id command.
pub async fn run_id(args: &IdArgs, cli: &Cli) -> Result<()> {
    let image = load_image(&args.image).await?;
    run_call(cli, ServiceKind::IdCropping, image, args.retry, |api, image| async move {
        api.crop_id(&image).await
    })
    .await
}

// ============================================================================
// Tests
// ============================================================================
