//! Engine configuration.
//!
//! Definition documents may omit channeling timing attributes; the
//! compiler falls back to these defaults. The config is constructed
//! explicitly and passed to the compiler - there is no process-wide
//! instance.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tick interval used when a `channeling` element omits `interval`.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(2);

/// Engine-wide defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default channeling tick interval.
    pub channeling_tick_interval: Duration,

    /// Default delay before the first channeling tick.
    ///
    /// `None` means "same as the tick interval", matching documents
    /// that only declare an interval.
    pub channeling_initial_delay: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            channeling_tick_interval: DEFAULT_TICK_INTERVAL,
            channeling_initial_delay: None,
        }
    }
}

impl EngineConfig {
    /// Resolve the default initial delay against the default interval.
    #[must_use]
    pub fn initial_delay(&self) -> Duration {
        self.channeling_initial_delay
            .unwrap_or(self.channeling_tick_interval)
    }
}
