//! Assembly orchestration.
//!
//! # Data Flow
//! ```text
//! Assembly::add(producer)      → catalog validation (errors returned at once)
//! Assembly::run()
//!     → resolver::resolve      (fixpoint over the producers)
//!     → entry::locate/run_main (only when resolution succeeded)
//!     → closer::teardown       (always)
//!     → Vec<Error>: resolution, then Main, then teardown
//! ```
//!
//! # Design Decisions
//! - Settings are fixed before `run`; `run` consumes the assembly
//! - The value store is released before Main runs; only closers outlive it

use std::time::Duration;

use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::{AssemblyConfig, EmptySequencePolicy};
use crate::entry;
use crate::error::Error;
use crate::lifecycle::closer::{self, DEFAULT_CLOSE_TIMEOUT};
use crate::producer::Producer;
use crate::resolver::{self, Resolution};

/// Registered producers plus the settings of one run.
#[derive(Debug)]
pub struct Assembly {
    catalog: Catalog,
    close_timeout: Duration,
    empty_sequence: EmptySequencePolicy,
}

impl Default for Assembly {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembly {
    pub fn new() -> Self {
        Self {
            catalog: Catalog::new(),
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
            empty_sequence: EmptySequencePolicy::default(),
        }
    }

    pub fn with_config(config: &AssemblyConfig) -> Self {
        Self {
            catalog: Catalog::new(),
            close_timeout: config.close_timeout(),
            empty_sequence: config.empty_sequence,
        }
    }

    /// Total time delayed closers get during teardown.
    pub fn set_close_timeout(&mut self, close_timeout: Duration) {
        self.close_timeout = close_timeout;
    }

    pub fn set_empty_sequence(&mut self, policy: EmptySequencePolicy) {
        self.empty_sequence = policy;
    }

    pub fn close_timeout(&self) -> Duration {
        self.close_timeout
    }

    /// Register a producer. `None` fails with `Error::ProducerNil`.
    pub fn add(&mut self, producer: impl Into<Option<Producer>>) -> Result<(), Error> {
        let producer = producer.into().ok_or(Error::ProducerNil)?;
        self.catalog.add(producer)
    }

    /// Number of registered producers.
    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Resolve, run Main, tear down. Blocks until all three are done.
    ///
    /// Must not be called from inside an async runtime.
    pub fn run(self) -> Vec<Error> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("assembly", %run_id);
        let _enter = span.enter();

        tracing::info!(producers = self.catalog.len(), "Assembly starting");

        let Resolution {
            store,
            closers,
            mut errors,
        } = resolver::resolve(self.catalog, self.empty_sequence);

        if errors.is_empty() {
            tracing::debug!(capabilities = store.len(), "Resolution complete");
            match entry::locate(store).and_then(entry::run_main) {
                Ok(()) => {}
                Err(e) => errors.push(e),
            }
        } else {
            drop(store);
        }

        errors.extend(closer::teardown(closers, self.close_timeout));

        if errors.is_empty() {
            tracing::info!("Assembly finished");
        } else {
            tracing::warn!(errors = errors.len(), "Assembly finished with errors");
        }
        errors
    }
}

/// Register every producer and run, in one call.
///
/// A registration failure is returned alone; nothing has run at that point.
pub fn run_producers<I, P>(producers: I) -> Vec<Error>
where
    I: IntoIterator<Item = P>,
    P: Into<Option<Producer>>,
{
    let mut assembly = Assembly::new();
    for producer in producers {
        if let Err(e) = assembly.add(producer) {
            return vec![e];
        }
    }
    assembly.run()
}
