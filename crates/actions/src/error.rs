//! Action-level error type.

use thiserror::Error;

/// Errors returned by an action, a hook, or an error handler.
///
/// The engine never inspects the variant to make decisions; the per-task
/// continue-on-error flag alone decides whether a failure aborts the run.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Plain failure with a human-readable message.
    #[error("{0}")]
    Failed(String),

    /// Several actions of the same task failed (deferred error mode).
    #[error("{} action(s) failed: {}", .0.len(), join_messages(.0))]
    Aggregate(Vec<ActionError>),

    /// A value could not be stored in the task context.
    #[error("context value '{key}' could not be serialised: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Any other error bubbled up from inside an action.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ActionError {
    /// Shorthand for [`ActionError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

fn join_messages(errors: &[ActionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
