//! Value store for resolved capabilities.
//!
//! # Responsibilities
//! - Hold every delivered capability value, keyed by `TypeKey`
//! - Keep singleton slots write-once and sequence slots append-only
//! - Serve typed reads to the resolver and the entry point locator
//!
//! # Design Decisions
//! - Cardinality is decided by the catalog before resolution; the store
//!   never upgrades a singleton into a sequence
//! - Owned by the resolving thread, so no locking

use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::capability::{Capability, TypeKey};
use crate::error::Error;

/// How a capability is stored and bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Sequence,
}

/// A type-erased `Arc<C>` tagged with the key of `C`.
pub struct Value {
    key: TypeKey,
    inner: Box<dyn Any>,
}

impl Value {
    pub fn new<C: Capability + ?Sized>(value: Arc<C>) -> Self {
        Self {
            key: TypeKey::of::<C>(),
            inner: Box::new(value),
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Recover the typed handle; `None` when `C` is not the stored type.
    pub fn downcast<C: Capability + ?Sized>(&self) -> Option<Arc<C>> {
        self.inner.downcast_ref::<Arc<C>>().cloned()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", self.key)
    }
}

/// One store slot.
#[derive(Debug)]
pub enum Slot {
    Single(Value),
    Sequence(Vec<Value>),
}

impl Slot {
    /// The value a bare consumer receives.
    ///
    /// A sequence never yields one, whatever its length.
    pub fn single(&self) -> Option<&Value> {
        match self {
            Slot::Single(value) => Some(value),
            Slot::Sequence(_) => None,
        }
    }

    pub fn sequence(&self) -> Option<&[Value]> {
        match self {
            Slot::Sequence(values) => Some(values),
            Slot::Single(_) => None,
        }
    }
}

/// Resolved capability values.
#[derive(Debug, Default)]
pub struct ValueStore {
    slots: HashMap<TypeKey, Slot>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a delivered value.
    ///
    /// Fails with `Error::Bug` when a singleton slot is written twice or a
    /// slot would change shape.
    pub fn insert(&mut self, value: Value, cardinality: Cardinality) -> Result<(), Error> {
        let key = value.key();
        match self.slots.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(match cardinality {
                    Cardinality::Single => Slot::Single(value),
                    Cardinality::Sequence => Slot::Sequence(vec![value]),
                });
            }
            Entry::Occupied(mut slot) => match (slot.get_mut(), cardinality) {
                (Slot::Sequence(values), Cardinality::Sequence) => values.push(value),
                (Slot::Single(_), Cardinality::Single) => {
                    return Err(Error::Bug(format!("second value for singleton {key}")));
                }
                _ => {
                    return Err(Error::Bug(format!(
                        "cardinality of {key} changed during resolution"
                    )));
                }
            },
        }
        Ok(())
    }

    pub fn get(&self, key: &TypeKey) -> Option<&Slot> {
        self.slots.get(key)
    }

    /// The bare value of `C`, if one is bound.
    pub fn one<C: Capability + ?Sized>(&self) -> Option<Arc<C>> {
        self.get(&TypeKey::of::<C>())?.single()?.downcast::<C>()
    }

    /// Every value of `C` in production order; empty when none is stored.
    pub fn all<C: Capability + ?Sized>(&self) -> Vec<Arc<C>> {
        match self.get(&TypeKey::of::<C>()) {
            Some(Slot::Single(value)) => value.downcast::<C>().into_iter().collect(),
            Some(Slot::Sequence(values)) => values.iter().filter_map(|v| v.downcast::<C>()).collect(),
            None => Vec::new(),
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
