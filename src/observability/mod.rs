//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! catalog / resolver / entry / lifecycle produce:
//!     → logging.rs (subscriber setup for structured tracing events)
//!     → metrics.rs (counters and histograms through the `metrics` facade)
//!
//! Consumers:
//!     → stdout via tracing-subscriber fmt layer
//!     → whatever metrics recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - Every `Assembly::run` is wrapped in a span carrying a UUID run id
//! - The library never installs a metrics exporter; without a recorder the
//!   counters are no-ops

pub mod logging;
pub mod metrics;
