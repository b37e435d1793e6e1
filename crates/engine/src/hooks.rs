//! Run-level and task-level lifecycle hooks.

use std::time::Duration;

use actions::{ActionError, TaskContext};

use crate::Task;

/// Runs once before the first task.
pub type SetupHook = Box<dyn Fn(&mut TaskContext) -> Result<(), ActionError> + Send + Sync>;

/// Runs once after the last task, whatever happened before it.
pub type TeardownHook =
    Box<dyn Fn(&mut TaskContext, &TeardownInfo) -> Result<(), ActionError> + Send + Sync>;

/// Runs before the actions of every task that passed its criteria.
pub type TaskSetupHook =
    Box<dyn Fn(&mut TaskContext, &TaskSetupInfo<'_>) -> Result<(), ActionError> + Send + Sync>;

/// Runs after every task whose setup hook ran.
pub type TaskTeardownHook =
    Box<dyn Fn(&mut TaskContext, &TaskTeardownInfo<'_>) -> Result<(), ActionError> + Send + Sync>;

/// Outcome summary passed to the teardown hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownInfo {
    /// `false` if setup or a task failed fatally.
    pub successful: bool,
    /// Message of the error that will be propagated, if any.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct TaskSetupInfo<'a> {
    pub task: &'a Task,
}

#[derive(Debug, Clone, Copy)]
pub struct TaskTeardownInfo<'a> {
    pub task: &'a Task,
    pub duration: Duration,
    pub successful: bool,
}
