//! Configuration schema definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::lifecycle::closer::DEFAULT_CLOSE_TIMEOUT;

/// Root configuration of an assembly.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Budget for all delayed closers together, in seconds.
    pub close_timeout_secs: u64,

    /// What a sequence consumer receives when nothing supplies the capability.
    pub empty_sequence: EmptySequencePolicy,

    /// Log filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            close_timeout_secs: DEFAULT_CLOSE_TIMEOUT.as_secs(),
            empty_sequence: EmptySequencePolicy::default(),
            log_filter: "capability_runner=info".to_string(),
        }
    }
}

impl AssemblyConfig {
    pub fn close_timeout(&self) -> Duration {
        Duration::from_secs(self.close_timeout_secs)
    }
}

/// Binding of a sequence parameter whose capability has no producer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptySequencePolicy {
    /// Bind an empty sequence.
    #[default]
    Bind,
    /// Fail with `NoProducerMakes`.
    Fail,
}
