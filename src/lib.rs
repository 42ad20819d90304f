//! Capability runner library.
//!
//! Producers declare the capabilities they need and make; an `Assembly`
//! runs each of them once, in dependency order, hands the single `Main`
//! control, and closes everything that was produced in reverse order.

pub mod assembly;
pub mod capability;
pub mod catalog;
pub mod config;
pub mod entry;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod producer;
pub mod resolver;
pub mod store;

pub use assembly::{run_producers, Assembly};
pub use capability::{Capability, Param, TypeKey};
pub use config::{AssemblyConfig, EmptySequencePolicy};
pub use entry::Main;
pub use error::{BoxError, Error};
pub use lifecycle::{
    Close, CloseNotifier, Closer, DelayClose, ShutdownMain, ShutdownRequest, Shutdowner,
    SignalInterrupt,
};
pub use producer::{Deps, Outputs, Producer};
