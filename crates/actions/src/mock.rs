//! `MockAction` — a test double for `Action`.
//!
//! Every mock shares a [`Journal`] with its siblings so tests can assert the
//! global order in which tasks actually ran.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::{Action, ActionError, TaskContext};

/// Ordered record of which mocks ran.
pub type Journal = Arc<Mutex<Vec<String>>>;

/// Create an empty journal.
pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// Snapshot of a journal's contents.
pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// Behaviour injected into `MockAction` at construction time.
#[derive(Clone)]
pub enum MockBehaviour {
    /// Succeed without touching the context.
    Succeed,
    /// Store a value in the context, then succeed.
    Store(String, Value),
    /// Fail with the given message.
    Fail(String),
}

/// A mock action that appends its name to a journal and returns a
/// programmer-specified result.
#[derive(Clone)]
pub struct MockAction {
    /// Label written to the journal.
    pub name: String,
    /// What the action will do when `execute` is called.
    pub behaviour: MockBehaviour,
    /// Shared journal of every executed mock (in call order).
    pub journal: Journal,
}

impl MockAction {
    /// Create a mock that always succeeds.
    pub fn succeeding(name: impl Into<String>, journal: &Journal) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::Succeed,
            journal: Arc::clone(journal),
        }
    }

    /// Create a mock that stores `value` under `key` and succeeds.
    pub fn storing(
        name: impl Into<String>,
        key: impl Into<String>,
        value: Value,
        journal: &Journal,
    ) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::Store(key.into(), value),
            journal: Arc::clone(journal),
        }
    }

    /// Create a mock that always fails.
    pub fn failing(name: impl Into<String>, msg: impl Into<String>, journal: &Journal) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::Fail(msg.into()),
            journal: Arc::clone(journal),
        }
    }

    /// Number of times this mock has been executed.
    pub fn call_count(&self) -> usize {
        self.journal
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| **entry == self.name)
            .count()
    }
}

#[async_trait]
impl Action for MockAction {
    async fn execute(&self, ctx: &mut TaskContext) -> Result<(), ActionError> {
        self.journal.lock().unwrap().push(self.name.clone());

        match &self.behaviour {
            MockBehaviour::Succeed => Ok(()),
            MockBehaviour::Store(key, value) => ctx.set(key.clone(), value.clone()),
            MockBehaviour::Fail(msg) => Err(ActionError::Failed(msg.clone())),
        }
    }
}
