//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGINT (Ctrl-C) on a dedicated thread
//! - Translate it into a shutdown request
//! - Stop listening during teardown and report when the listener is gone
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe) on a current-thread runtime
//! - Teardown hands its notifier to the listener thread, which reports only
//!   after it stopped listening

use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::error::{BoxError, Error};
use crate::lifecycle::closer::{CloseNotifier, Closer, DelayClose};
use crate::lifecycle::shutdown::ShutdownRequest;
use crate::producer::Producer;

/// Forwards Ctrl-C to a [`ShutdownRequest`] until closed.
pub struct SignalInterrupt {
    stop: Mutex<Option<oneshot::Sender<CloseNotifier>>>,
}

impl SignalInterrupt {
    /// Start listening on a background thread.
    pub fn spawn(shutdown: Arc<dyn ShutdownRequest>) -> Result<Arc<Self>, Error> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (stop_tx, stop_rx) = oneshot::channel::<CloseNotifier>();

        std::thread::Builder::new()
            .name("signal-interrupt".into())
            .spawn(move || {
                let notifier = runtime.block_on(listen(shutdown, stop_rx));
                if let Some(notifier) = notifier {
                    notifier.notify(Ok(()));
                }
            })?;

        tracing::debug!("Interrupt listener started");
        Ok(Arc::new(Self {
            stop: Mutex::new(Some(stop_tx)),
        }))
    }

    /// A producer that needs `dyn ShutdownRequest` and makes `dyn DelayClose`.
    pub fn producer() -> Producer {
        Producer::builder("signal-interrupt")
            .needs::<dyn ShutdownRequest>()
            .makes::<dyn DelayClose>()
            .factory(|deps, out| {
                let listener = SignalInterrupt::spawn(deps.one::<dyn ShutdownRequest>()?)?;
                out.provide_closing::<dyn DelayClose>(listener.clone(), Closer::delayed(listener));
                Ok(())
            })
            .build()
    }
}

/// Wait for Ctrl-C or for teardown, whichever comes first.
async fn listen(
    shutdown: Arc<dyn ShutdownRequest>,
    mut stop_rx: oneshot::Receiver<CloseNotifier>,
) -> Option<CloseNotifier> {
    let stopped = tokio::select! {
        res = tokio::signal::ctrl_c() => {
            match res {
                Ok(()) => {
                    tracing::info!("Interrupt signal received");
                    let err: BoxError = Box::new(Error::Interrupted);
                    shutdown.shutdown(Some(err));
                }
                Err(e) => tracing::warn!(error = %e, "Unable to listen for interrupt signal"),
            }
            None
        }
        stop = &mut stop_rx => Some(stop),
    };

    let stop = match stopped {
        Some(stop) => stop,
        None => stop_rx.await,
    };
    tracing::debug!("Interrupt listener stopped");
    stop.ok()
}

impl DelayClose for SignalInterrupt {
    fn close(&self, done: CloseNotifier) {
        let stop = match self.stop.lock() {
            Ok(mut stop) => stop.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match stop {
            Some(stop) => {
                if let Err(done) = stop.send(done) {
                    // Listener thread is gone already.
                    done.notify(Ok(()));
                }
            }
            None => done.notify(Ok(())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::closer::teardown;
    use crate::lifecycle::shutdown::ShutdownMain;
    use std::time::Duration;

    #[test]
    fn test_teardown_waits_for_listener() {
        let (shutdowner, _main) = ShutdownMain::new();
        let listener = SignalInterrupt::spawn(shutdowner.clone()).unwrap();

        let errors = teardown(vec![Closer::delayed(listener.clone())], Duration::from_secs(5));

        assert!(errors.is_empty(), "{errors:?}");
        assert!(!shutdowner.is_shutdown());
    }

    #[test]
    fn test_second_close_reports_immediately() {
        let (shutdowner, _main) = ShutdownMain::new();
        let listener = SignalInterrupt::spawn(shutdowner).unwrap();

        assert!(teardown(vec![Closer::delayed(listener.clone())], Duration::from_secs(5)).is_empty());
        assert!(teardown(vec![Closer::delayed(listener)], Duration::from_secs(5)).is_empty());
    }
}
