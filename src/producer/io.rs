//! What a factory reads (`Deps`) and what it hands back (`Outputs`).

use std::sync::Arc;

use crate::capability::{Capability, Param, TypeKey};
use crate::error::Error;
use crate::lifecycle::closer::Closer;
use crate::store::Value;

/// A resolved input of a producer.
pub(crate) enum Binding<'a> {
    One(&'a Value),
    All(Vec<&'a Value>),
}

/// Resolved inputs, borrowed from the value store for one factory call.
pub struct Deps<'a> {
    producer: &'a str,
    bindings: Vec<(Param, Binding<'a>)>,
}

impl<'a> Deps<'a> {
    pub(crate) fn new(producer: &'a str, bindings: Vec<(Param, Binding<'a>)>) -> Self {
        Self { producer, bindings }
    }

    /// The single value of `C` declared with `needs::<C>()`.
    pub fn one<C: Capability + ?Sized>(&self) -> Result<Arc<C>, Error> {
        let wanted = Param::one::<C>();
        match self.find(&wanted) {
            Some(Binding::One(value)) => value.downcast::<C>().ok_or_else(|| self.mismatch(value)),
            _ => Err(self.undeclared(wanted)),
        }
    }

    /// Every value of `C` declared with `needs_all::<C>()`, in production order.
    pub fn all<C: Capability + ?Sized>(&self) -> Result<Vec<Arc<C>>, Error> {
        let wanted = Param::all::<C>();
        match self.find(&wanted) {
            Some(Binding::All(values)) => values
                .iter()
                .map(|value| value.downcast::<C>().ok_or_else(|| self.mismatch(value)))
                .collect(),
            _ => Err(self.undeclared(wanted)),
        }
    }

    /// Name of the producer being invoked.
    pub fn producer(&self) -> &str {
        self.producer
    }

    fn find(&self, wanted: &Param) -> Option<&Binding<'a>> {
        self.bindings
            .iter()
            .find(|(param, _)| param == wanted)
            .map(|(_, binding)| binding)
    }

    fn undeclared(&self, capability: Param) -> Error {
        Error::NoProducerMakes {
            producer: self.producer.to_string(),
            capability,
        }
    }

    fn mismatch(&self, value: &Value) -> Error {
        Error::Bug(format!(
            "value stored under {} has a different type (read by {})",
            value.key(),
            self.producer
        ))
    }
}

/// A value handed back by a factory, with its optional teardown.
pub(crate) struct Provided {
    pub value: Value,
    pub closer: Option<Closer>,
}

/// Values delivered by a factory, in delivery order.
#[derive(Default)]
pub struct Outputs {
    provided: Vec<Provided>,
}

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a value of `C`.
    pub fn provide<C: Capability + ?Sized>(&mut self, value: Arc<C>) -> &mut Self {
        self.provided.push(Provided {
            value: Value::new(value),
            closer: None,
        });
        self
    }

    /// Deliver a value of `C` that must be torn down with `closer`.
    pub fn provide_closing<C: Capability + ?Sized>(
        &mut self,
        value: Arc<C>,
        closer: Closer,
    ) -> &mut Self {
        self.provided.push(Provided {
            value: Value::new(value),
            closer: Some(closer),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.provided.len()
    }

    pub fn is_empty(&self) -> bool {
        self.provided.is_empty()
    }

    /// Remove the earliest delivery of `key`.
    pub(crate) fn take(&mut self, key: TypeKey) -> Option<Provided> {
        let index = self
            .provided
            .iter()
            .position(|provided| provided.value.key() == key)?;
        Some(self.provided.remove(index))
    }

    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, Provided> {
        self.provided.drain(..)
    }
}
