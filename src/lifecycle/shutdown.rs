//! Shutdown coordination for an assembled application.

use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::capability::Capability;
use crate::entry::Main;
use crate::error::BoxError;
use crate::producer::Producer;

/// Something that can ask the application to stop.
pub trait ShutdownRequest: Send + Sync {
    /// Request shutdown; `Main::run` returns `err`. Only the first call counts.
    fn shutdown(&self, err: Option<BoxError>);
}

impl Capability for dyn ShutdownRequest {}

/// Sending half of the shutdown coordinator.
pub struct Shutdowner {
    tx: Mutex<Option<oneshot::Sender<Option<BoxError>>>>,
}

impl Shutdowner {
    /// Whether a shutdown was already requested (or `Main` went away).
    pub fn is_shutdown(&self) -> bool {
        match self.tx.lock() {
            Ok(tx) => tx.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }
}

impl ShutdownRequest for Shutdowner {
    fn shutdown(&self, err: Option<BoxError>) {
        let tx = match self.tx.lock() {
            Ok(mut tx) => tx.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match tx {
            Some(tx) => {
                tracing::info!(error = err.is_some(), "Shutdown requested");
                let _ = tx.send(err);
            }
            None => tracing::debug!("Shutdown already requested, ignoring"),
        }
    }
}

/// A `Main` that blocks until its `Shutdowner` is triggered.
pub struct ShutdownMain {
    rx: Mutex<Option<oneshot::Receiver<Option<BoxError>>>>,
}

impl ShutdownMain {
    /// Create a linked shutdown requester and entry point.
    pub fn new() -> (Arc<Shutdowner>, Arc<ShutdownMain>) {
        let (tx, rx) = oneshot::channel();
        (
            Arc::new(Shutdowner {
                tx: Mutex::new(Some(tx)),
            }),
            Arc::new(ShutdownMain {
                rx: Mutex::new(Some(rx)),
            }),
        )
    }

    /// A producer making `dyn ShutdownRequest` and `dyn Main`.
    pub fn producer() -> Producer {
        Producer::builder("shutdown-main")
            .makes::<dyn ShutdownRequest>()
            .makes::<dyn Main>()
            .factory(|_, out| {
                let (shutdowner, main) = ShutdownMain::new();
                out.provide::<dyn ShutdownRequest>(shutdowner)
                    .provide::<dyn Main>(main);
                Ok(())
            })
            .build()
    }
}

impl Main for ShutdownMain {
    /// Blocks the calling thread; must not run inside an async runtime.
    fn run(&self) -> Result<(), BoxError> {
        let rx = match self.rx.lock() {
            Ok(mut rx) => rx.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(rx) = rx else {
            return Err("ShutdownMain already ran".into());
        };

        match rx.blocking_recv() {
            Ok(None) => Ok(()),
            Ok(Some(err)) => Err(err),
            Err(_) => {
                tracing::warn!("Shutdowner dropped before any shutdown request");
                Ok(())
            }
        }
    }
}
