//! Logging port handed to the engine at construction time.
//!
//! Diagnostic trace messages (registration, hook invocation, task progress)
//! go through [`EngineLog`] rather than a process-wide logger so embedders
//! can route or capture them. [`TracingLog`] is the default and forwards to
//! `tracing`.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Error,
    Warning,
    Information,
    Verbose,
    Diagnostic,
}

pub trait EngineLog: Send + Sync {
    fn log(&self, level: Verbosity, message: &str);

    fn error(&self, message: &str) {
        self.log(Verbosity::Error, message);
    }

    fn warning(&self, message: &str) {
        self.log(Verbosity::Warning, message);
    }

    fn information(&self, message: &str) {
        self.log(Verbosity::Information, message);
    }

    fn verbose(&self, message: &str) {
        self.log(Verbosity::Verbose, message);
    }

    fn diagnostic(&self, message: &str) {
        self.log(Verbosity::Diagnostic, message);
    }
}

/// Forwards every message to the matching `tracing` macro.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl EngineLog for TracingLog {
    fn log(&self, level: Verbosity, message: &str) {
        match level {
            Verbosity::Error => tracing::error!("{message}"),
            Verbosity::Warning => tracing::warn!("{message}"),
            Verbosity::Information => tracing::info!("{message}"),
            Verbosity::Verbose => tracing::debug!("{message}"),
            Verbosity::Diagnostic => tracing::trace!("{message}"),
        }
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<(Verbosity, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Verbosity, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages logged at exactly `level`.
    pub fn messages(&self, level: Verbosity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    /// `true` if any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|(_, m)| m.contains(needle))
    }
}

impl EngineLog for MemoryLog {
    fn log(&self, level: Verbosity, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_owned()));
    }
}
