//! Teardown of produced values.
//!
//! # Responsibilities
//! - Define the synchronous (`Close`) and asynchronous (`DelayClose`) contracts
//! - Close recorded values in reverse production order
//! - Bound asynchronous teardown by one shared deadline
//!
//! # Design Decisions
//! - A consumer is always produced after what it consumes, so closing in
//!   reverse order tears a component down before its dependencies
//! - Only one delayed closer is awaited at a time
//! - A timeout abandons the rest of the teardown; nothing is retried

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::{Builder, Runtime};
use tokio::sync::oneshot;

use crate::capability::Capability;
use crate::error::{BoxError, Error};
use crate::observability::metrics;

/// Teardown timeout used when none is configured.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(20);

/// Synchronous teardown.
pub trait Close {
    fn close(&self) -> Result<(), BoxError>;
}

/// Asynchronous teardown: finish on another task, then report on `done`.
pub trait DelayClose {
    fn close(&self, done: CloseNotifier);
}

impl Capability for dyn Close {}
impl Capability for dyn DelayClose {}

/// Single-use completion handle given to a [`DelayClose`].
#[derive(Debug)]
pub struct CloseNotifier {
    tx: oneshot::Sender<Result<(), BoxError>>,
}

impl CloseNotifier {
    fn new(tx: oneshot::Sender<Result<(), BoxError>>) -> Self {
        Self { tx }
    }

    /// Report completion. A report arriving after the deadline is discarded.
    pub fn notify(self, result: Result<(), BoxError>) {
        if self.tx.send(result).is_err() {
            tracing::debug!("Close result arrived after teardown stopped waiting");
        }
    }
}

/// Teardown attached to a produced value.
pub enum Closer {
    Immediate(Arc<dyn Close>),
    Delayed(Arc<dyn DelayClose>),
}

impl Closer {
    pub fn immediate<T: Close + 'static>(value: Arc<T>) -> Self {
        Closer::Immediate(value)
    }

    pub fn delayed<T: DelayClose + 'static>(value: Arc<T>) -> Self {
        Closer::Delayed(value)
    }

    fn kind(&self) -> &'static str {
        match self {
            Closer::Immediate(_) => "immediate",
            Closer::Delayed(_) => "delayed",
        }
    }
}

impl std::fmt::Debug for Closer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Closer::{}", self.kind())
    }
}

/// Close `closers` last-first and return the errors met on the way.
///
/// Blocks the calling thread; must not run inside an async runtime.
pub fn teardown(closers: Vec<Closer>, timeout: Duration) -> Vec<Error> {
    let started = Instant::now();
    // `None` when the timeout is too large to represent: wait without a deadline.
    let deadline = started.checked_add(timeout);
    let mut errors = Vec::new();
    let mut runtime: Option<Runtime> = None;

    tracing::debug!(closers = closers.len(), timeout = ?timeout, "Teardown starting");

    for closer in closers.into_iter().rev() {
        metrics::record_closer(closer.kind());
        match closer {
            Closer::Immediate(value) => {
                if let Err(e) = value.close() {
                    tracing::warn!(error = %e, "Closer failed");
                    errors.push(Error::Close(e));
                }
            }
            Closer::Delayed(value) => {
                if runtime.is_none() {
                    match Builder::new_current_thread().enable_time().build() {
                        Ok(rt) => runtime = Some(rt),
                        Err(e) => {
                            errors.push(Error::Runtime(e));
                            break;
                        }
                    }
                }
                let Some(rt) = runtime.as_ref() else { break };

                let (tx, rx) = oneshot::channel();
                value.close(CloseNotifier::new(tx));

                let waited = match deadline {
                    Some(deadline) => {
                        let remaining = deadline.saturating_duration_since(Instant::now());
                        rt.block_on(async move { tokio::time::timeout(remaining, rx).await })
                    }
                    None => Ok(rt.block_on(rx)),
                };
                match waited {
                    Ok(Ok(Ok(()))) => {}
                    Ok(Ok(Err(e))) => {
                        tracing::warn!(error = %e, "Delayed closer failed");
                        errors.push(Error::Close(e));
                    }
                    Ok(Err(_)) => {
                        errors.push(Error::Bug(
                            "DelayCloser dropped its notifier without reporting".into(),
                        ));
                        break;
                    }
                    Err(_) => {
                        tracing::error!(timeout = ?timeout, "Timed out waiting for delayed closer");
                        metrics::record_close_timeout();
                        errors.push(Error::DelayCloserTimeout(timeout));
                        break;
                    }
                }
            }
        }
    }

    metrics::record_teardown(started);
    errors
}
