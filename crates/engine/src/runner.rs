//! Task execution engine.
//!
//! `Engine` owns the task registry and the lifecycle hooks. A call to
//! [`Engine::run`]:
//! 1. Builds the graph from every registered task and resolves the order
//!    for the target. Nothing runs if this fails.
//! 2. Runs the setup hook.
//! 3. Runs each task in order: criteria, task setup, actions, error
//!    handling, finally handler, task teardown.
//! 4. Runs the teardown hook, even if setup or a task failed.
//! 5. Returns the report, or the first error together with the report.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::instrument;

use actions::{ActionError, TaskContext};

use crate::builder::GraphBuilder;
use crate::config::EngineConfig;
use crate::error::{EngineError, RunFailure};
use crate::hooks::{
    SetupHook, TaskSetupHook, TaskSetupInfo, TaskTeardownHook, TaskTeardownInfo, TeardownHook,
    TeardownInfo,
};
use crate::log::{EngineLog, TracingLog};
use crate::report::{Report, ReportCategory};
use crate::task::Task;

const SETUP: &str = "Setup";
const TEARDOWN: &str = "Teardown";

/// What the run does after a task's actions failed.
enum Disposition {
    Continue,
    Abort(ActionError),
}

/// Sequential task runner.
///
/// Register tasks and hooks, then call [`Engine::run`] as many times as
/// needed; each run resolves the graph from scratch.
pub struct Engine {
    config: EngineConfig,
    log: Arc<dyn EngineLog>,
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
    setup: Option<SetupHook>,
    teardown: Option<TeardownHook>,
    task_setup: Option<TaskSetupHook>,
    task_teardown: Option<TaskTeardownHook>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default(), Arc::new(TracingLog))
    }
}

impl Engine {
    /// Create an engine with an empty registry.
    pub fn new(config: EngineConfig, log: Arc<dyn EngineLog>) -> Self {
        Self {
            config,
            log,
            tasks: Vec::new(),
            index: HashMap::new(),
            setup: None,
            teardown: None,
            task_setup: None,
            task_teardown: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registered tasks in registration order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.index.get(name).map(|&i| &self.tasks[i])
    }

    /// Add a task to the registry.
    ///
    /// # Errors
    /// - [`EngineError::InvalidTaskName`] if the name is empty.
    /// - [`EngineError::DuplicateTask`] if the name is already taken.
    pub fn register_task(&mut self, task: impl Into<Task>) -> Result<&Task, EngineError> {
        let task = task.into();
        if task.name().is_empty() {
            return Err(EngineError::InvalidTaskName);
        }
        if self.index.contains_key(task.name()) {
            return Err(EngineError::DuplicateTask(task.name().to_owned()));
        }

        self.log.diagnostic(&format!("Registered task '{}'", task.name()));

        let position = self.tasks.len();
        self.index.insert(task.name().to_owned(), position);
        self.tasks.push(task);
        Ok(&self.tasks[position])
    }

    /// Register the hook that runs once before the first task.
    pub fn register_setup<F>(&mut self, hook: F) -> Result<(), EngineError>
    where
        F: Fn(&mut TaskContext) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        let hook: SetupHook = Box::new(hook);
        Self::install(&mut self.setup, hook, "setup")
    }

    /// Register the hook that runs once after the last task.
    pub fn register_teardown<F>(&mut self, hook: F) -> Result<(), EngineError>
    where
        F: Fn(&mut TaskContext, &TeardownInfo) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        let hook: TeardownHook = Box::new(hook);
        Self::install(&mut self.teardown, hook, "teardown")
    }

    /// Register the hook that runs before each executed task.
    pub fn register_task_setup<F>(&mut self, hook: F) -> Result<(), EngineError>
    where
        F: Fn(&mut TaskContext, &TaskSetupInfo<'_>) -> Result<(), ActionError>
            + Send
            + Sync
            + 'static,
    {
        let hook: TaskSetupHook = Box::new(hook);
        Self::install(&mut self.task_setup, hook, "task setup")
    }

    /// Register the hook that runs after each executed task.
    pub fn register_task_teardown<F>(&mut self, hook: F) -> Result<(), EngineError>
    where
        F: Fn(&mut TaskContext, &TaskTeardownInfo<'_>) -> Result<(), ActionError>
            + Send
            + Sync
            + 'static,
    {
        let hook: TaskTeardownHook = Box::new(hook);
        Self::install(&mut self.task_teardown, hook, "task teardown")
    }

    /// Run `target` and everything it depends on.
    ///
    /// # Errors
    /// Returns a [`RunFailure`] holding the first fatal error and the report
    /// recorded up to that point. Resolution errors come with an empty report.
    #[instrument(skip_all, fields(task = %target))]
    pub async fn run(&self, target: &str, ctx: &mut TaskContext) -> Result<Report, RunFailure> {
        let mut report = Report::new();

        // ------------------------------------------------------------------
        // Resolve the execution order.
        // ------------------------------------------------------------------
        let order = match self.resolve(target) {
            Ok(order) => order,
            Err(error) => {
                self.log.error(&format!("Unable to resolve '{target}': {error}"));
                return Err(RunFailure { error, report });
            }
        };

        ctx.begin_run(target);
        self.log.verbose(&format!(
            "Executing {} task(s): {}",
            order.len(),
            order.iter().map(|t| t.name()).collect::<Vec<_>>().join(" -> ")
        ));

        // ------------------------------------------------------------------
        // Setup, then every task until one fails fatally.
        // ------------------------------------------------------------------
        let mut pending = self.perform_setup(ctx, &mut report).err();

        if pending.is_none() {
            for task in &order {
                if let Err(error) = self.run_task(task, ctx, &mut report).await {
                    pending = Some(error);
                    break;
                }
            }
        }

        // ------------------------------------------------------------------
        // Teardown always runs; the first error wins.
        // ------------------------------------------------------------------
        if let Err(error) = self.perform_teardown(ctx, &mut report, pending.as_ref()) {
            match &pending {
                Some(first) => self.log.error(&format!(
                    "{error} (suppressed in favour of the earlier error: {first})"
                )),
                None => pending = Some(error),
            }
        }

        match pending {
            Some(error) => {
                self.log.error(&format!("Run of '{target}' failed: {error}"));
                Err(RunFailure { error, report })
            }
            None => {
                self.log.information(&format!("Run of '{target}' completed"));
                Ok(report)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internal: resolution.
    // -----------------------------------------------------------------------

    fn resolve(&self, target: &str) -> Result<Vec<&Task>, EngineError> {
        if self.task(target).is_none() {
            return Err(EngineError::TargetNotFound(target.to_owned()));
        }

        let graph = GraphBuilder::build(&self.tasks)?;
        let mut order = graph.traverse(target)?;
        if self.config.exclusive {
            order.retain(|name| name == target);
        }

        order
            .iter()
            .map(|name| {
                self.task(name)
                    .ok_or_else(|| EngineError::TargetNotFound(name.clone()))
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Internal: run-level hooks.
    // -----------------------------------------------------------------------

    fn perform_setup(&self, ctx: &mut TaskContext, report: &mut Report) -> Result<(), EngineError> {
        let Some(setup) = &self.setup else {
            return Ok(());
        };
        let stopwatch = Instant::now();

        if self.config.dry_run {
            self.log.information("Would execute setup");
            report.add_delegated(SETUP, ReportCategory::Setup, stopwatch.elapsed());
            return Ok(());
        }

        self.log.verbose("Executing custom setup action...");
        match setup(ctx) {
            Ok(()) => {
                report.add_executed(SETUP, ReportCategory::Setup, stopwatch.elapsed());
                Ok(())
            }
            Err(error) => {
                self.log.error(&format!("An error occurred in the custom setup action: {error}"));
                report.add_failed(SETUP, ReportCategory::Setup, stopwatch.elapsed());
                Err(EngineError::SetupFailed(error))
            }
        }
    }

    fn perform_teardown(
        &self,
        ctx: &mut TaskContext,
        report: &mut Report,
        pending: Option<&EngineError>,
    ) -> Result<(), EngineError> {
        let Some(teardown) = &self.teardown else {
            return Ok(());
        };
        let stopwatch = Instant::now();

        if self.config.dry_run {
            self.log.information("Would execute teardown");
            report.add_delegated(TEARDOWN, ReportCategory::Teardown, stopwatch.elapsed());
            return Ok(());
        }

        let info = TeardownInfo {
            successful: pending.is_none(),
            error: pending.map(ToString::to_string),
        };

        self.log.verbose("Executing custom teardown action...");
        match teardown(ctx, &info) {
            Ok(()) => {
                report.add_executed(TEARDOWN, ReportCategory::Teardown, stopwatch.elapsed());
                Ok(())
            }
            Err(error) => {
                self.log.error(&format!(
                    "An error occurred in the custom teardown action: {error}"
                ));
                report.add_failed(TEARDOWN, ReportCategory::Teardown, stopwatch.elapsed());
                Err(EngineError::TeardownFailed(error))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internal: a single task.
    // -----------------------------------------------------------------------

    async fn run_task(
        &self,
        task: &Task,
        ctx: &mut TaskContext,
        report: &mut Report,
    ) -> Result<(), EngineError> {
        let name = task.name();

        if let Some(reason) = task.unmet_criteria(ctx) {
            self.log.verbose(&format!("Skipping task '{name}': {reason}"));
            report.add_skipped(name, reason);
            return Ok(());
        }

        let stopwatch = Instant::now();

        if self.config.dry_run {
            self.log.information(&format!("Would execute task: {name}"));
            report.add_delegated(name, ReportCategory::Task, stopwatch.elapsed());
            return Ok(());
        }

        self.log.information(&format!("Executing task: {name}"));

        if let Err(source) = self.perform_task_setup(task, ctx) {
            self.log.error(&format!(
                "An error occurred in the task setup action of '{name}': {source}"
            ));
            report.add_failed(name, ReportCategory::Task, stopwatch.elapsed());
            return Err(EngineError::TaskSetupFailed {
                task: name.to_owned(),
                source,
            });
        }

        let (failed, mut pending) = match self.execute_actions(task, ctx).await {
            Ok(()) => (false, None),
            Err(error) => match self.handle_task_error(task, error, ctx) {
                Disposition::Continue => (true, None),
                Disposition::Abort(source) => (
                    true,
                    Some(EngineError::TaskFailed {
                        task: name.to_owned(),
                        source,
                    }),
                ),
            },
        };

        if let Some(finally) = task.finally_handler() {
            finally(ctx);
        }

        if let Err(source) = self.perform_task_teardown(task, ctx, stopwatch.elapsed(), !failed) {
            let error = EngineError::TaskTeardownFailed {
                task: name.to_owned(),
                source,
            };
            match &pending {
                Some(_) => self
                    .log
                    .error(&format!("{error} (suppressed: the task already failed)")),
                None => pending = Some(error),
            }
        }

        if failed || pending.is_some() {
            report.add_failed(name, ReportCategory::Task, stopwatch.elapsed());
        } else {
            self.log.verbose(&format!(
                "Finished executing task: {name} ({:?})",
                stopwatch.elapsed()
            ));
            report.add_executed(name, ReportCategory::Task, stopwatch.elapsed());
        }

        match pending {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn execute_actions(&self, task: &Task, ctx: &mut TaskContext) -> Result<(), ActionError> {
        let mut deferred = Vec::new();

        for action in task.actions() {
            if let Err(error) = action.execute(ctx).await {
                if !task.defers_errors() {
                    return Err(error);
                }
                self.log.verbose(&format!(
                    "Deferring error in task '{}': {error}",
                    task.name()
                ));
                deferred.push(error);
            }
        }

        if deferred.is_empty() {
            Ok(())
        } else {
            Err(ActionError::Aggregate(deferred))
        }
    }

    fn handle_task_error(
        &self,
        task: &Task,
        error: ActionError,
        ctx: &mut TaskContext,
    ) -> Disposition {
        self.log.error(&format!(
            "An error occurred when executing task '{}': {error}",
            task.name()
        ));

        if let Some(reporter) = task.error_reporter() {
            reporter(&error);
        }

        if let Some(handler) = task.error_handler() {
            if let Err(replacement) = handler(&error, ctx) {
                self.log.error(&format!(
                    "Error handler of task '{}' failed: {replacement}",
                    task.name()
                ));
                return Disposition::Abort(replacement);
            }
        }

        if task.continues_on_error() {
            self.log.warning(&format!(
                "Task '{}' failed but is allowed to continue on error",
                task.name()
            ));
            return Disposition::Continue;
        }

        Disposition::Abort(error)
    }

    // -----------------------------------------------------------------------
    // Internal: task-level hooks.
    // -----------------------------------------------------------------------

    fn perform_task_setup(&self, task: &Task, ctx: &mut TaskContext) -> Result<(), ActionError> {
        let Some(hook) = &self.task_setup else {
            return Ok(());
        };
        self.log.verbose(&format!("Executing custom task setup action ({})...", task.name()));
        hook(ctx, &TaskSetupInfo { task })
    }

    fn perform_task_teardown(
        &self,
        task: &Task,
        ctx: &mut TaskContext,
        duration: Duration,
        successful: bool,
    ) -> Result<(), ActionError> {
        let Some(hook) = &self.task_teardown else {
            return Ok(());
        };
        self.log.verbose(&format!("Executing custom task teardown action ({})...", task.name()));
        hook(
            ctx,
            &TaskTeardownInfo {
                task,
                duration,
                successful,
            },
        )
    }

    fn install<H>(slot: &mut Option<H>, hook: H, kind: &'static str) -> Result<(), EngineError> {
        if slot.is_some() {
            return Err(EngineError::HookAlreadyRegistered(kind));
        }
        *slot = Some(hook);
        Ok(())
    }
}
