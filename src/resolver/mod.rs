//! Fixpoint resolution of the producer set.
//!
//! # Data Flow
//! ```text
//! Catalog::freeze → (Ledger, pending producers)
//!     → pass: attempt every pending producer in registration order
//!         inputs satisfiable?   no, more deliveries expected → defer (MissingDependency)
//!                               no, nothing can ever supply → abort (NoProducerMakes)
//!         invoke factory        error → abort
//!         apply outputs         missing → abort (ProducerReturnedNil)
//!                               → Ledger::deliver → ValueStore::insert, closer recorded
//!     → pass resolved nothing → stall, report every deferral of that pass
//!     → pending empty → success
//! ```
//!
//! # Design Decisions
//! - A consumer only runs once every supplier of what it needs has run, so
//!   sequences are complete when bound
//! - Fatal errors stop resolution at once and are reported alone
//! - A stall reports missing suppliers and cycles the same way: mutually
//!   blocked producers never become satisfiable
//! - Every closer handed to `Outputs` is recorded, even when the producer
//!   that created it ends up failing

use crate::capability::Param;
use crate::catalog::{Catalog, Ledger};
use crate::config::EmptySequencePolicy;
use crate::error::Error;
use crate::lifecycle::closer::Closer;
use crate::observability::metrics;
use crate::producer::io::{Binding, Provided};
use crate::producer::{Deps, Outputs, Producer};
use crate::store::{Slot, ValueStore};

/// Result of a resolution: the store, the closers to run, and any errors.
///
/// `errors` is empty exactly when every producer ran.
#[derive(Debug)]
pub struct Resolution {
    pub store: ValueStore,
    pub closers: Vec<Closer>,
    pub errors: Vec<Error>,
}

/// Outcome of attempting one producer.
enum Attempt {
    Resolved,
    Deferred(Producer, Error),
    Failed(Error),
}

/// Drives pending producers into the value store.
pub struct Resolver {
    ledger: Ledger,
    store: ValueStore,
    closers: Vec<Closer>,
    empty_sequence: EmptySequencePolicy,
}

impl Resolver {
    pub fn new(ledger: Ledger, empty_sequence: EmptySequencePolicy) -> Self {
        Self {
            ledger,
            store: ValueStore::new(),
            closers: Vec::new(),
            empty_sequence,
        }
    }

    /// Run passes until every producer ran, one failed, or a pass stalled.
    pub fn resolve(mut self, mut pending: Vec<Producer>) -> Resolution {
        let mut pass = 0;
        let errors = loop {
            if pending.is_empty() {
                break Vec::new();
            }
            pass += 1;
            let attempted = pending.len();
            tracing::trace!(pass, pending = attempted, "Resolution pass starting");

            let mut waiting = Vec::new();
            let mut missing = Vec::new();
            let mut fatal = None;
            for producer in pending {
                match self.attempt(producer) {
                    Attempt::Resolved => {}
                    Attempt::Deferred(producer, err) => {
                        missing.push(err);
                        waiting.push(producer);
                    }
                    Attempt::Failed(err) => {
                        fatal = Some(err);
                        break;
                    }
                }
            }

            if let Some(err) = fatal {
                tracing::error!(pass, error = %err, "Resolution aborted");
                break vec![err];
            }
            if waiting.len() == attempted {
                tracing::warn!(pass, pending = attempted, "Resolution stalled");
                metrics::record_stall(attempted);
                break missing;
            }
            pending = waiting;
        };

        Resolution {
            store: self.store,
            closers: self.closers,
            errors,
        }
    }

    fn attempt(&mut self, mut producer: Producer) -> Attempt {
        let params = producer.inputs().to_vec();
        let mut bindings = Vec::with_capacity(params.len());
        for param in params {
            match self.bind(producer.name(), &param) {
                Ok(binding) => bindings.push((param, binding)),
                Err(err @ Error::MissingDependency { .. }) => return Attempt::Deferred(producer, err),
                Err(err) => return Attempt::Failed(err),
            }
        }

        let Some(factory) = producer.take_factory() else {
            return Attempt::Failed(Error::Bug(format!(
                "producer {} has already run",
                producer.name()
            )));
        };

        let span = tracing::debug_span!("producer", producer = %producer.name());
        let _enter = span.enter();
        tracing::debug!("Invoking producer");
        metrics::record_producer_invoked(producer.name());

        let mut outputs = Outputs::new();
        let result = {
            let deps = Deps::new(producer.name(), bindings);
            factory(&deps, &mut outputs)
        };

        if let Err(source) = result {
            self.record_leftovers(&mut outputs);
            return Attempt::Failed(Error::Producer {
                producer: producer.name().to_string(),
                source,
            });
        }

        match self.apply(&producer, &mut outputs) {
            Ok(()) => Attempt::Resolved,
            Err(err) => {
                self.record_leftovers(&mut outputs);
                Attempt::Failed(err)
            }
        }
    }

    /// Find the value(s) `param` binds to, or why it cannot bind yet.
    fn bind<'s>(&'s self, producer: &str, param: &Param) -> Result<Binding<'s>, Error> {
        let key = param.key();
        if self.ledger.remaining(&key) > 0 {
            return Err(Error::MissingDependency {
                producer: producer.to_string(),
                capability: *param,
            });
        }

        let no_producer = || Error::NoProducerMakes {
            producer: producer.to_string(),
            capability: *param,
        };

        match (param, self.store.get(&key)) {
            (Param::One(_), Some(slot)) => slot.single().map(Binding::One).ok_or_else(no_producer),
            (Param::One(_), None) => Err(no_producer()),
            (Param::All(_), Some(Slot::Sequence(values))) => Ok(Binding::All(values.iter().collect())),
            (Param::All(_), Some(Slot::Single(_))) => Err(Error::Bug(format!(
                "{key} is list-marked but stored as a singleton"
            ))),
            (Param::All(_), None) if self.ledger.registered(&key) > 0 => Err(Error::Bug(format!(
                "every {key} was delivered but none is stored"
            ))),
            (Param::All(_), None) => match self.empty_sequence {
                EmptySequencePolicy::Bind => Ok(Binding::All(Vec::new())),
                EmptySequencePolicy::Fail => Err(no_producer()),
            },
        }
    }

    /// Store declared outputs in declaration order.
    fn apply(&mut self, producer: &Producer, outputs: &mut Outputs) -> Result<(), Error> {
        for key in producer.outputs() {
            let Some(Provided { value, closer }) = outputs.take(*key) else {
                return Err(Error::ProducerReturnedNil {
                    producer: producer.name().to_string(),
                    capability: *key,
                });
            };
            if let Some(closer) = closer {
                self.closers.push(closer);
            }
            let cardinality = self.ledger.deliver(key)?;
            self.store.insert(value, cardinality)?;
            tracing::trace!(capability = %key, ?cardinality, "Capability stored");
        }

        if let Some(extra) = outputs.drain().next() {
            let capability = extra.value.key();
            if let Some(closer) = extra.closer {
                self.closers.push(closer);
            }
            return Err(Error::UndeclaredOutput {
                producer: producer.name().to_string(),
                capability,
            });
        }
        Ok(())
    }

    fn record_leftovers(&mut self, outputs: &mut Outputs) {
        self.closers
            .extend(outputs.drain().filter_map(|provided| provided.closer));
    }
}

/// Resolve every producer registered in `catalog`.
pub fn resolve(catalog: Catalog, empty_sequence: EmptySequencePolicy) -> Resolution {
    let (ledger, producers) = catalog.freeze();
    Resolver::new(ledger, empty_sequence).resolve(producers)
}
