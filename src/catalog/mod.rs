//! Capability catalog.
//!
//! # Responsibilities
//! - Validate producer shapes at registration time
//! - Count how many deliveries of each capability are expected
//! - Remember which capabilities must be delivered as sequences
//! - Freeze into a `Ledger` when resolution starts
//!
//! # Design Decisions
//! - Validation is eager: a malformed producer is rejected by `add`, never
//!   discovered during resolution
//! - A rejected producer leaves counts and list marks untouched
//! - Cardinality is derived once, at freeze time

use std::collections::{HashMap, HashSet};

use crate::capability::{Param, TypeKey};
use crate::error::Error;
use crate::producer::Producer;
use crate::store::Cardinality;

/// Registered producers plus the bookkeeping derived from their shapes.
#[derive(Debug, Default)]
pub struct Catalog {
    produce_counts: HashMap<TypeKey, usize>,
    list_marked: HashSet<TypeKey>,
    producers: Vec<Producer>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a producer.
    pub fn add(&mut self, producer: Producer) -> Result<(), Error> {
        if !producer.has_factory() {
            return Err(Error::ProducerNotFunc);
        }

        if let Some(output) = producer.outputs().iter().find(|key| !key.is_capability()) {
            return Err(Error::ProducerInvalidReturns {
                producer: producer.name().to_string(),
                output: *output,
            });
        }

        if let Some(param) = producer.inputs().iter().find(|param| !param.key().is_capability()) {
            return Err(Error::ProducerInvalidInputs {
                producer: producer.name().to_string(),
                param: *param,
            });
        }

        for output in producer.outputs() {
            *self.produce_counts.entry(*output).or_insert(0) += 1;
        }
        for param in producer.inputs() {
            if let Param::All(key) = param {
                self.list_marked.insert(*key);
            }
        }

        tracing::debug!(
            producer = %producer.name(),
            inputs = producer.inputs().len(),
            outputs = producer.outputs().len(),
            "Producer registered"
        );
        self.producers.push(producer);
        Ok(())
    }

    /// Registered deliveries of `key`.
    pub fn expected(&self, key: &TypeKey) -> usize {
        self.produce_counts.get(key).copied().unwrap_or(0)
    }

    /// Whether some consumer asked for `key` as a sequence.
    pub fn is_list_marked(&self, key: &TypeKey) -> bool {
        self.list_marked.contains(key)
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }

    /// End registration: split into the frozen ledger and the pending producers.
    pub fn freeze(self) -> (Ledger, Vec<Producer>) {
        let cardinality = self
            .produce_counts
            .iter()
            .map(|(key, count)| {
                let cardinality = if *count > 1 || self.list_marked.contains(key) {
                    Cardinality::Sequence
                } else {
                    Cardinality::Single
                };
                (*key, cardinality)
            })
            .collect();

        let ledger = Ledger {
            registered: self.produce_counts.clone(),
            remaining: self.produce_counts,
            cardinality,
        };
        (ledger, self.producers)
    }
}

/// Frozen registration counts plus the deliveries still outstanding.
#[derive(Debug)]
pub struct Ledger {
    registered: HashMap<TypeKey, usize>,
    remaining: HashMap<TypeKey, usize>,
    cardinality: HashMap<TypeKey, Cardinality>,
}

impl Ledger {
    /// Deliveries of `key` registered before resolution started.
    pub fn registered(&self, key: &TypeKey) -> usize {
        self.registered.get(key).copied().unwrap_or(0)
    }

    /// Deliveries of `key` still expected from pending producers.
    pub fn remaining(&self, key: &TypeKey) -> usize {
        self.remaining.get(key).copied().unwrap_or(0)
    }

    pub fn cardinality(&self, key: &TypeKey) -> Cardinality {
        self.cardinality
            .get(key)
            .copied()
            .unwrap_or(Cardinality::Single)
    }

    /// Account for one delivery of `key`.
    pub fn deliver(&mut self, key: &TypeKey) -> Result<Cardinality, Error> {
        match self.remaining.get_mut(key) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Ok(self.cardinality(key))
            }
            _ => Err(Error::Bug(format!("not waiting for produced type: {key}"))),
        }
    }
}
