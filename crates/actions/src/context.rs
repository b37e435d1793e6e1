//! The context object threaded through every criterion, action and hook.

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::ActionError;

/// Shared, mutable state for a single engine run.
///
/// Tasks run strictly one after another, so the engine hands out `&mut`
/// access to each callback in turn and no locking is needed. Values are kept
/// as JSON so that tasks written independently can exchange data without
/// sharing Rust types.
#[derive(Debug, Clone)]
pub struct TaskContext {
    /// Unique ID of the current run. Regenerated by [`TaskContext::begin_run`].
    pub run_id: Uuid,
    /// Name of the task the current run was asked to reach.
    pub target: String,
    data: HashMap<String, Value>,
}

impl Default for TaskContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            target: String::new(),
            data: HashMap::new(),
        }
    }

    /// Reset the run metadata for a new run towards `target`.
    ///
    /// Stored values survive so callers can pre-seed the context.
    pub fn begin_run(&mut self, target: &str) {
        self.run_id = Uuid::new_v4();
        self.target = target.to_owned();
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> Result<(), ActionError> {
        let key = key.into();
        let value = serde_json::to_value(value).map_err(|source| ActionError::Serialization {
            key: key.clone(),
            source,
        })?;
        self.data.insert(key, value);
        Ok(())
    }

    /// Read the value under `key` as `T`.
    ///
    /// Returns `None` if the key is absent or holds a value of another shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.data.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Raw JSON value under `key`.
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }
}
