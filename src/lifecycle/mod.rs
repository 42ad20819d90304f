//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Teardown (closer.rs):
//!     Closer (production order) → reversed → Close / DelayClose
//!     → errors appended after resolution and Main errors
//!
//! Shutdown (shutdown.rs):
//!     Shutdowner::shutdown(err) → ShutdownMain::run returns err → teardown
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl-C) → Shutdowner::shutdown(Interrupted)
//!     teardown → SignalInterrupt stops listening → reports on its notifier
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: Main returns first, then everything it used closes
//! - Asynchronous teardown has a deadline: remaining closers are abandoned
//! - The signal listener is itself a delayed closer, so teardown waits for it

pub mod closer;
pub mod shutdown;
pub mod signals;

pub use closer::{Close, CloseNotifier, Closer, DelayClose};
pub use shutdown::{ShutdownMain, ShutdownRequest, Shutdowner};
pub use signals::SignalInterrupt;
