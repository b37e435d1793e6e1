//! `engine` crate — task definitions, graph resolution, and the execution engine.

pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod hooks;
pub mod log;
pub mod report;
pub mod runner;
pub mod task;

pub use builder::GraphBuilder;
pub use config::EngineConfig;
pub use error::{EngineError, GraphError, RunFailure};
pub use graph::{Edge, Graph};
pub use hooks::{TaskSetupInfo, TaskTeardownInfo, TeardownInfo};
pub use log::{EngineLog, MemoryLog, TracingLog, Verbosity};
pub use report::{ExecutionStatus, Report, ReportCategory, ReportEntry};
pub use runner::Engine;
pub use task::{Task, TaskBuilder, TaskCriteria, TaskDependency};

pub use actions::{Action, ActionError, TaskContext};
