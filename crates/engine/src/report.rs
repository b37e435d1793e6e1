//! Execution report — the ordered trace of a single run.
//!
//! Only the engine appends entries. Callers get the finished report back
//! (or inside a [`crate::RunFailure`]) and can print it with its `Display`
//! impl or serialise it for their own printers.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which phase of the run an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    Setup,
    Task,
    Teardown,
}

/// What happened to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Executed,
    Skipped,
    Failed,
    /// A dry run would have executed it.
    Delegated,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Executed => "Executed",
            Self::Skipped => "Skipped",
            Self::Failed => "Failed",
            Self::Delegated => "Delegated",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub task_name: String,
    pub category: ReportCategory,
    pub duration: Duration,
    pub status: ExecutionStatus,
    pub skip_reason: Option<String>,
    /// When the entry was recorded (i.e. when the step finished).
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(
        &mut self,
        task_name: &str,
        skip_reason: Option<String>,
        category: ReportCategory,
        duration: Duration,
        status: ExecutionStatus,
    ) {
        self.entries.push(ReportEntry {
            task_name: task_name.to_owned(),
            category,
            duration,
            status,
            skip_reason,
            finished_at: Utc::now(),
        });
    }

    pub(crate) fn add_executed(
        &mut self,
        task_name: &str,
        category: ReportCategory,
        duration: Duration,
    ) {
        self.add(task_name, None, category, duration, ExecutionStatus::Executed);
    }

    pub(crate) fn add_failed(
        &mut self,
        task_name: &str,
        category: ReportCategory,
        duration: Duration,
    ) {
        self.add(task_name, None, category, duration, ExecutionStatus::Failed);
    }

    pub(crate) fn add_delegated(
        &mut self,
        task_name: &str,
        category: ReportCategory,
        duration: Duration,
    ) {
        self.add(task_name, None, category, duration, ExecutionStatus::Delegated);
    }

    pub(crate) fn add_skipped(&mut self, task_name: &str, reason: String) {
        self.add(
            task_name,
            Some(reason),
            ReportCategory::Task,
            Duration::ZERO,
            ExecutionStatus::Skipped,
        );
    }

    /// Entries in execution order.
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReportEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_duration(&self) -> Duration {
        self.entries.iter().map(|e| e.duration).sum()
    }

    /// `true` when no entry failed.
    pub fn is_successful(&self) -> bool {
        self.entries
            .iter()
            .all(|e| e.status != ExecutionStatus::Failed)
    }

    /// First entry recorded for `task_name`.
    pub fn entry(&self, task_name: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.task_name == task_name)
    }

    /// Names of the entries with the given status, in execution order.
    pub fn names_with_status(&self, status: ExecutionStatus) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.status == status)
            .map(|e| e.task_name.as_str())
            .collect()
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a ReportEntry;
    type IntoIter = std::slice::Iter<'a, ReportEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .entries
            .iter()
            .map(|e| e.task_name.len())
            .chain(std::iter::once("Task".len()))
            .max()
            .unwrap_or(0)
            + 3;

        writeln!(f, "{:<width$}{:<12}{}", "Task", "Status", "Duration")?;
        writeln!(f, "{}", "-".repeat(width + 12 + 12))?;

        for entry in &self.entries {
            let timing = match (&entry.status, &entry.skip_reason) {
                (ExecutionStatus::Skipped, Some(reason)) => reason.clone(),
                _ => format_duration(entry.duration),
            };
            writeln!(f, "{:<width$}{:<12}{}", entry.task_name, entry.status.to_string(), timing)?;
        }

        writeln!(f, "{}", "-".repeat(width + 12 + 12))?;
        write!(f, "{:<width$}{:<12}{}", "Total:", "", format_duration(self.total_duration()))
    }
}

/// `hh:mm:ss.fff`
fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    let (hours, rest) = (millis / 3_600_000, millis % 3_600_000);
    let (minutes, rest) = (rest / 60_000, rest % 60_000);
    let (seconds, millis) = (rest / 1_000, rest % 1_000);
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}
