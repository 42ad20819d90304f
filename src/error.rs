//! Error definitions for registration, resolution, entry point and teardown.

use std::time::Duration;
use thiserror::Error;

use crate::capability::{Param, TypeKey};

/// Boxed error raised by user code (factories, `Main`, closers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors reported by an assembly.
///
/// `Assembly::run` returns these in chronological order: resolution errors,
/// then the `Main` error, then teardown errors.
#[derive(Debug, Error)]
pub enum Error {
    /// No producer was supplied to `add`.
    #[error("producer nil")]
    ProducerNil,

    /// The producer descriptor has nothing to call.
    #[error("producer not function")]
    ProducerNotFunc,

    /// A parameter is neither a capability nor a sequence of one capability.
    #[error("producer inputs must be capability or sequence of capability: {producer} takes {param}")]
    ProducerInvalidInputs { producer: String, param: Param },

    /// An output is not a capability.
    #[error("producer may only return capabilities: {producer} returns {output}")]
    ProducerInvalidReturns { producer: String, output: TypeKey },

    /// Another pending producer is still expected to supply this capability.
    #[error("missing dependency: {producer} needs {capability}")]
    MissingDependency { producer: String, capability: Param },

    /// Nothing can ever supply this capability in the requested form.
    #[error("no producer makes {capability} (needed by {producer})")]
    NoProducerMakes { producer: String, capability: Param },

    /// A declared output was not delivered.
    #[error("producer returned nil value: {producer} did not provide {capability}")]
    ProducerReturnedNil { producer: String, capability: TypeKey },

    /// A delivered value was never declared as an output.
    #[error("producer {producer} provided undeclared {capability}")]
    UndeclaredOutput { producer: String, capability: TypeKey },

    /// The factory itself failed.
    #[error("producer {producer} failed: {source}")]
    Producer {
        producer: String,
        #[source]
        source: BoxError,
    },

    /// Resolution finished without a single `Main` value.
    #[error("no Main capability provided")]
    NoMain,

    /// `Main::run` returned an error.
    #[error("{0}")]
    Main(#[source] BoxError),

    /// A synchronous closer failed.
    #[error("{0}")]
    Close(#[source] BoxError),

    /// A delayed closer did not report before the teardown deadline.
    #[error("timeout after {0:?} before all DelayCloser results")]
    DelayCloserTimeout(Duration),

    /// The interrupt listener received Ctrl-C.
    #[error("interrupt signal received")]
    Interrupted,

    /// A Tokio runtime could not be built.
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),

    /// An internal invariant was violated.
    #[error("BUG {0}")]
    Bug(String),
}

impl Error {
    /// Name of the producer an error is attributed to, if any.
    pub fn producer(&self) -> Option<&str> {
        match self {
            Error::ProducerInvalidInputs { producer, .. }
            | Error::ProducerInvalidReturns { producer, .. }
            | Error::MissingDependency { producer, .. }
            | Error::NoProducerMakes { producer, .. }
            | Error::ProducerReturnedNil { producer, .. }
            | Error::UndeclaredOutput { producer, .. }
            | Error::Producer { producer, .. } => Some(producer),
            _ => None,
        }
    }
}
