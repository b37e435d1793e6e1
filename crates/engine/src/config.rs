//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tuning knobs for the engine.
///
/// Deserialisable with every field optional, so it can be embedded in any
/// serde-backed settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Run only the target task. Its dependencies are still validated but
    /// not executed.
    pub exclusive: bool,
    /// Evaluate criteria and report what would run, without running any
    /// hook or action.
    pub dry_run: bool,
}

impl EngineConfig {
    pub fn with_exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
