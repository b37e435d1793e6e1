//! Engine-level error types.

use actions::ActionError;
use thiserror::Error;

use crate::report::Report;

/// Structural errors raised by [`crate::Graph`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The node was already added.
    #[error("node '{0}' already exists in the graph")]
    DuplicateNode(String),

    /// An edge from a node to itself.
    #[error("reflexive edges are not allowed: '{0}' cannot depend on itself")]
    ReflexiveEdge(String),

    /// The opposite edge already exists (a cycle of length two).
    #[error("edge '{start}' -> '{end}' contradicts the existing edge '{end}' -> '{start}'")]
    CyclicEdge { start: String, end: String },

    /// Traversal found a node on its own dependency path.
    #[error("graph contains a circular dependency involving '{0}'")]
    CircularDependency(String),
}

/// Errors produced by the engine (registration, resolution and execution).
#[derive(Debug, Error)]
pub enum EngineError {
    // ------ Configuration errors ------

    /// A task was registered with an empty name.
    #[error("task name must not be empty")]
    InvalidTaskName,

    /// Two tasks share the same name.
    #[error("another task with the name '{0}' has already been registered")]
    DuplicateTask(String),

    /// A lifecycle hook was registered twice.
    #[error("a {0} hook has already been registered")]
    HookAlreadyRegistered(&'static str),

    /// The requested target is not a registered task.
    #[error("the target '{0}' was not found")]
    TargetNotFound(String),

    /// A required dependency names a task that doesn't exist.
    #[error("task '{task}' is dependent on task '{dependency}' which does not exist")]
    MissingDependency { task: String, dependency: String },

    /// A required dependee names a task that doesn't exist.
    #[error("task '{task}' is a dependee of task '{dependee}' which does not exist")]
    MissingDependee { task: String, dependee: String },

    /// Graph construction or traversal failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    // ------ Execution errors ------

    /// The setup hook failed; no task was executed.
    #[error("setup failed: {0}")]
    SetupFailed(#[source] ActionError),

    /// A task's actions failed and the task does not continue on error.
    #[error("task '{task}' failed: {source}")]
    TaskFailed { task: String, source: ActionError },

    /// The per-task setup hook failed before the task's actions ran.
    #[error("task setup for '{task}' failed: {source}")]
    TaskSetupFailed { task: String, source: ActionError },

    /// The per-task teardown hook failed and no earlier error was pending. The
    /// task itself may have succeeded or failed with continue-on-error set.
    #[error("task teardown for '{task}' failed: {source}")]
    TaskTeardownFailed { task: String, source: ActionError },

    /// The teardown hook failed and nothing else had failed before it.
    #[error("teardown failed: {0}")]
    TeardownFailed(#[source] ActionError),
}

impl EngineError {
    /// `true` for errors detected before any task runs.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidTaskName
                | Self::DuplicateTask(_)
                | Self::HookAlreadyRegistered(_)
                | Self::TargetNotFound(_)
                | Self::MissingDependency { .. }
                | Self::MissingDependee { .. }
                | Self::Graph(_)
        )
    }
}

/// A failed run: the error that stopped it plus everything recorded so far.
///
/// Resolution failures carry an empty report because no task was attempted.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunFailure {
    #[source]
    pub error: EngineError,
    pub report: Report,
}
