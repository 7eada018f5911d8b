//! Per-operation call state.
//!
//! [`ApiCall`] wraps one async operation and tracks its most recent
//! invocation: `Idle -> Loading -> Success | Error`. Only the latest
//! invocation may write results; completions that started before a newer
//! `execute` or a `reset` are dropped.

use apiconsole_fetch::{ApiError, ErrorReport};
use futures::future::BoxFuture;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tracing::{debug, warn};

// ============================================================================
// State
// ============================================================================

/// Lifecycle of an [`ApiCall`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    /// Never executed, or reset.
    #[default]
    Idle,
    /// An invocation is in flight.
    Loading,
    /// The last invocation succeeded.
    Success,
    /// The last invocation failed.
    Error,
}

/// Snapshot of an [`ApiCall`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiCallState<T> {
    /// Result of the last successful invocation.
    pub data: Option<T>,
    /// True while an invocation is in flight.
    pub loading: bool,
    /// Message of the last failure.
    pub error: Option<String>,
    /// Classified report of the last failure.
    pub error_details: Option<ErrorReport>,
    /// Current lifecycle state.
    pub status: CallStatus,
}

impl<T> Default for ApiCallState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            error_details: None,
            status: CallStatus::Idle,
        }
    }
}

struct CallInner<A, T> {
    state: ApiCallState<T>,
    last_args: Option<A>,
    generation: u64,
}

type Operation<A, T> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync>;

// ============================================================================
// Api Call
// ============================================================================

/// Tracks loading, data and error for one operation.
pub struct ApiCall<A, T> {
    operation: Operation<A, T>,
    inner: Arc<RwLock<CallInner<A, T>>>,
    notify: Arc<watch::Sender<u64>>,
}

impl<A, T> Clone for ApiCall<A, T> {
    fn clone(&self) -> Self {
        Self {
            operation: Arc::clone(&self.operation),
            inner: Arc::clone(&self.inner),
            notify: Arc::clone(&self.notify),
        }
    }
}

impl<A, T> ApiCall<A, T>
where
    A: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Wraps `operation`.
    pub fn new<F, Fut>(operation: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let (notify, _) = watch::channel(0);
        Self {
            operation: Arc::new(move |args| Box::pin(operation(args))),
            inner: Arc::new(RwLock::new(CallInner {
                state: ApiCallState::default(),
                last_args: None,
                generation: 0,
            })),
            notify: Arc::new(notify),
        }
    }

    /// Runs the operation with `args`.
    ///
    /// Enters `Loading` (clearing any previous error), then records the
    /// outcome. The outcome is also returned to the caller.
    pub async fn execute(&self, args: A) -> Result<T, ApiError> {
        let generation = {
            let mut inner = self.inner.write().await;
            inner.generation += 1;
            inner.last_args = Some(args.clone());
            inner.state.loading = true;
            inner.state.error = None;
            inner.state.error_details = None;
            inner.state.status = CallStatus::Loading;
            inner.generation
        };
        self.bump();

        let result = (self.operation)(args).await;

        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            debug!(generation, "Dropping superseded call result");
            return result;
        }

        match &result {
            Ok(data) => {
                inner.state.data = Some(data.clone());
                inner.state.status = CallStatus::Success;
            }
            Err(e) => {
                let report = e.report();
                warn!(kind = report.kind.code(), error = %report.message, "Call failed");
                inner.state.error = Some(report.message.clone());
                inner.state.error_details = Some(report);
                inner.state.status = CallStatus::Error;
            }
        }
        inner.state.loading = false;
        drop(inner);
        self.bump();

        result
    }

    /// Re-runs the last `execute` with the same arguments.
    ///
    /// Returns `None` if there was no previous call.
    pub async fn retry(&self) -> Option<Result<T, ApiError>> {
        let args = self.inner.read().await.last_args.clone()?;
        Some(self.execute(args).await)
    }

    /// Returns to `Idle`, discarding data, error and in-flight results.
    pub async fn reset(&self) {
        {
            let mut inner = self.inner.write().await;
            inner.generation += 1;
            inner.state = ApiCallState::default();
            inner.last_args = None;
        }
        self.bump();
    }

    /// Current snapshot.
    pub async fn state(&self) -> ApiCallState<T> {
        self.inner.read().await.state.clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    fn bump(&self) {
        self.notify.send_modify(|v| *v += 1);
    }
}

// ============================================================================
// Tests
// ============================================================================
