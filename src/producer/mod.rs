//! Producer descriptors.
//!
//! # Data Flow
//! ```text
//! Producer::builder("db")
//!     .needs::<dyn Settings>()          → Param::One
//!     .needs_all::<dyn Migration>()     → Param::All
//!     .makes::<dyn Database>()          → output TypeKey
//!     .factory(|deps, out| { .. })      → called once by the resolver
//!     .build()
//!     → Assembly::add (catalog validation)
//! ```
//!
//! # Design Decisions
//! - Inputs and outputs are declared up front; the factory never decides
//!   what it consumes at call time
//! - The factory is `FnOnce`: a producer executes at most once
//! - Teardown is attached per delivered value through `Outputs`, where the
//!   concrete type is still known

pub mod io;

use std::fmt;
use std::sync::Arc;

use crate::capability::{Capability, Param, TypeKey};
use crate::error::BoxError;
use crate::lifecycle::closer::Closer;

pub use io::{Deps, Outputs};

/// Construction function of a producer.
pub type Factory = Box<dyn FnOnce(&Deps<'_>, &mut Outputs) -> Result<(), BoxError>>;

/// A named constructor with declared inputs and outputs.
pub struct Producer {
    name: String,
    inputs: Vec<Param>,
    outputs: Vec<TypeKey>,
    factory: Option<Factory>,
}

impl Producer {
    /// Start describing a producer.
    pub fn builder(name: impl Into<String>) -> ProducerBuilder {
        ProducerBuilder {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            factory: None,
        }
    }

    /// A producer with no inputs that hands out an already built value.
    pub fn value<C: Capability + ?Sized>(name: impl Into<String>, value: Arc<C>) -> Self {
        Self::builder(name)
            .makes::<C>()
            .factory(move |_, out| {
                out.provide::<C>(value);
                Ok(())
            })
            .build()
    }

    /// Like [`Producer::value`], tearing the value down with `closer`.
    pub fn closing_value<C: Capability + ?Sized>(
        name: impl Into<String>,
        value: Arc<C>,
        closer: Closer,
    ) -> Self {
        Self::builder(name)
            .makes::<C>()
            .factory(move |_, out| {
                out.provide_closing::<C>(value, closer);
                Ok(())
            })
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[Param] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TypeKey] {
        &self.outputs
    }

    pub(crate) fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    pub(crate) fn take_factory(&mut self) -> Option<Factory> {
        self.factory.take()
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("factory", &self.factory.is_some())
            .finish()
    }
}

/// Builder for [`Producer`].
pub struct ProducerBuilder {
    name: String,
    inputs: Vec<Param>,
    outputs: Vec<TypeKey>,
    factory: Option<Factory>,
}

impl ProducerBuilder {
    /// Require exactly one value of `C`.
    pub fn needs<C: Capability + ?Sized>(self) -> Self {
        self.input(Param::one::<C>())
    }

    /// Require every value of `C`, in production order.
    pub fn needs_all<C: Capability + ?Sized>(self) -> Self {
        self.input(Param::all::<C>())
    }

    /// Declare one delivered value of `C`.
    pub fn makes<C: Capability + ?Sized>(self) -> Self {
        self.output(TypeKey::of::<C>())
    }

    /// Declare an input from a runtime descriptor.
    pub fn input(mut self, param: Param) -> Self {
        self.inputs.push(param);
        self
    }

    /// Declare an output from a runtime descriptor.
    pub fn output(mut self, key: TypeKey) -> Self {
        self.outputs.push(key);
        self
    }

    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(&Deps<'_>, &mut Outputs) -> Result<(), BoxError> + 'static,
    {
        self.factory = Some(Box::new(factory));
        self
    }

    pub fn build(self) -> Producer {
        Producer {
            name: self.name,
            inputs: self.inputs,
            outputs: self.outputs,
            factory: self.factory,
        }
    }
}
