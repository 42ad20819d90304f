//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AssemblyConfig (validated, immutable)
//!     → Assembly::with_config, before any producer runs
//! ```
//!
//! # Design Decisions
//! - Settings are read once; nothing changes after resolution starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AssemblyConfig;
pub use schema::EmptySequencePolicy;
