//! Task definitions and the fluent builder used to declare them.
//!
//! A [`TaskBuilder`] accumulates dependencies, criteria, actions and handlers;
//! the engine stores the finished [`Task`] and never mutates it afterwards.

use std::fmt;
use std::sync::Arc;

use actions::{from_fn, Action, ActionError, TaskContext};

/// Predicate deciding whether a task should run.
pub type Predicate = Arc<dyn Fn(&TaskContext) -> bool + Send + Sync>;

/// Observes a task failure without being able to recover from it.
pub type ErrorReporter = Arc<dyn Fn(&ActionError) + Send + Sync>;

/// Invoked when a task fails. Returning `Err` replaces the original error and
/// makes the failure fatal regardless of the continue-on-error flag.
pub type ErrorHandler =
    Arc<dyn Fn(&ActionError, &mut TaskContext) -> Result<(), ActionError> + Send + Sync>;

/// Always invoked after a task's actions were attempted.
pub type FinallyHandler = Arc<dyn Fn(&mut TaskContext) + Send + Sync>;

/// Skip reason used when a criterion carries no message of its own.
pub const DEFAULT_SKIP_REASON: &str = "criteria not met";

/// Reference to another task by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDependency {
    pub name: String,
    /// Optional references to unknown tasks are dropped instead of rejected.
    pub required: bool,
}

/// A single run condition.
#[derive(Clone)]
pub struct TaskCriteria {
    pub predicate: Predicate,
    pub message: Option<String>,
}

impl fmt::Debug for TaskCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskCriteria")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// A named unit of work.
#[derive(Clone)]
pub struct Task {
    name: String,
    description: Option<String>,
    dependencies: Vec<TaskDependency>,
    dependees: Vec<TaskDependency>,
    actions: Vec<Arc<dyn Action>>,
    criteria: Vec<TaskCriteria>,
    continue_on_error: bool,
    defer_errors: bool,
    error_reporter: Option<ErrorReporter>,
    error_handler: Option<ErrorHandler>,
    finally_handler: Option<FinallyHandler>,
}

impl Task {
    /// Start declaring a task called `name`.
    pub fn builder(name: impl Into<String>) -> TaskBuilder {
        TaskBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Tasks that must run before this one, in declaration order.
    pub fn dependencies(&self) -> &[TaskDependency] {
        &self.dependencies
    }

    /// Tasks that must run after this one, in declaration order.
    pub fn dependees(&self) -> &[TaskDependency] {
        &self.dependees
    }

    pub fn actions(&self) -> &[Arc<dyn Action>] {
        &self.actions
    }

    pub fn criteria(&self) -> &[TaskCriteria] {
        &self.criteria
    }

    pub fn continues_on_error(&self) -> bool {
        self.continue_on_error
    }

    pub fn defers_errors(&self) -> bool {
        self.defer_errors
    }

    pub fn error_reporter(&self) -> Option<&ErrorReporter> {
        self.error_reporter.as_ref()
    }

    pub fn error_handler(&self) -> Option<&ErrorHandler> {
        self.error_handler.as_ref()
    }

    pub fn finally_handler(&self) -> Option<&FinallyHandler> {
        self.finally_handler.as_ref()
    }

    /// Evaluate the criteria in order and return the skip reason of the first
    /// one that fails, or `None` if the task should run.
    pub fn unmet_criteria(&self, ctx: &TaskContext) -> Option<String> {
        self.criteria
            .iter()
            .find(|criteria| !(criteria.predicate)(ctx))
            .map(|criteria| {
                criteria
                    .message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SKIP_REASON.to_owned())
            })
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("dependencies", &self.dependencies)
            .field("dependees", &self.dependees)
            .field("actions", &self.actions.len())
            .field("criteria", &self.criteria)
            .field("continue_on_error", &self.continue_on_error)
            .field("defer_errors", &self.defer_errors)
            .finish_non_exhaustive()
    }
}

/// Fluent builder for [`Task`].
///
/// ```ignore
/// let task = Task::builder("Package")
///     .depends_on("Build")
///     .with_criteria_reason(|ctx| ctx.contains("version"), "no version computed")
///     .does(|ctx| ctx.set("packaged", true))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            task: Task {
                name: name.into(),
                description: None,
                dependencies: Vec::new(),
                dependees: Vec::new(),
                actions: Vec::new(),
                criteria: Vec::new(),
                continue_on_error: false,
                defer_errors: false,
                error_reporter: None,
                error_handler: None,
                finally_handler: None,
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.task.description = Some(description.into());
        self
    }

    /// Require `name` to run before this task.
    pub fn depends_on(self, name: impl Into<String>) -> Self {
        self.dependency(name.into(), true)
    }

    /// Run `name` first if it exists; ignore it otherwise.
    pub fn depends_on_optional(self, name: impl Into<String>) -> Self {
        self.dependency(name.into(), false)
    }

    /// Require this task to run before `name`.
    pub fn dependee_of(self, name: impl Into<String>) -> Self {
        self.dependee(name.into(), true)
    }

    /// Run this task before `name` if it exists; ignore it otherwise.
    pub fn dependee_of_optional(self, name: impl Into<String>) -> Self {
        self.dependee(name.into(), false)
    }

    /// Append a synchronous action.
    pub fn does<F>(self, f: F) -> Self
    where
        F: Fn(&mut TaskContext) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.does_action(from_fn(f))
    }

    /// Append any [`Action`], including ones that suspend internally.
    pub fn does_action(mut self, action: impl Action + 'static) -> Self {
        self.task.actions.push(Arc::new(action));
        self
    }

    /// Only run the task when `predicate` holds.
    pub fn with_criteria<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&TaskContext) -> bool + Send + Sync + 'static,
    {
        self.task.criteria.push(TaskCriteria {
            predicate: Arc::new(predicate),
            message: None,
        });
        self
    }

    /// Like [`TaskBuilder::with_criteria`], reporting `reason` when skipped.
    pub fn with_criteria_reason<F>(mut self, predicate: F, reason: impl Into<String>) -> Self
    where
        F: Fn(&TaskContext) -> bool + Send + Sync + 'static,
    {
        self.task.criteria.push(TaskCriteria {
            predicate: Arc::new(predicate),
            message: Some(reason.into()),
        });
        self
    }

    pub fn continue_on_error(mut self) -> Self {
        self.task.continue_on_error = true;
        self
    }

    /// Keep running the remaining actions after one fails and raise all
    /// failures together at the end.
    pub fn defer_on_error(mut self) -> Self {
        self.task.defer_errors = true;
        self
    }

    pub fn report_error<F>(mut self, reporter: F) -> Self
    where
        F: Fn(&ActionError) + Send + Sync + 'static,
    {
        self.task.error_reporter = Some(Arc::new(reporter));
        self
    }

    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ActionError, &mut TaskContext) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.task.error_handler = Some(Arc::new(handler));
        self
    }

    pub fn finally<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut TaskContext) + Send + Sync + 'static,
    {
        self.task.finally_handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Task {
        self.task
    }

    fn dependency(mut self, name: String, required: bool) -> Self {
        if !self.task.dependencies.iter().any(|d| d.name == name) {
            self.task.dependencies.push(TaskDependency { name, required });
        }
        self
    }

    fn dependee(mut self, name: String, required: bool) -> Self {
        if !self.task.dependees.iter().any(|d| d.name == name) {
            self.task.dependees.push(TaskDependency { name, required });
        }
        self
    }
}

impl From<TaskBuilder> for Task {
    fn from(builder: TaskBuilder) -> Self {
        builder.build()
    }
}
