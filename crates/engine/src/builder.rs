//! Graph construction — run this before every traversal.
//!
//! Rules enforced:
//! 1. Task names must be unique.
//! 2. Every required dependency and dependee must name a registered task.
//! 3. Edges must satisfy the [`Graph`] insertion rules.
//!
//! The first violation is returned; no partially built graph escapes.

use std::collections::HashSet;

use crate::{EngineError, Graph, Task};

pub struct GraphBuilder;

impl GraphBuilder {
    /// Build a validated graph from the full task registry.
    ///
    /// Dependencies become `dependency -> task` edges; dependees become
    /// `task -> dependee` edges.
    ///
    /// # Errors
    /// - [`EngineError::Graph`] for duplicate nodes or illegal edges.
    /// - [`EngineError::MissingDependency`] for unknown required dependencies.
    /// - [`EngineError::MissingDependee`] for unknown required dependees.
    pub fn build<'a, I>(tasks: I) -> Result<Graph, EngineError>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let tasks: Vec<&Task> = tasks.into_iter().collect();
        let mut graph = Graph::new();

        for task in &tasks {
            graph.add_node(task.name())?;
        }

        let known: HashSet<&str> = tasks.iter().map(|t| t.name()).collect();

        for task in &tasks {
            for dependency in task.dependencies() {
                if !known.contains(dependency.name.as_str()) {
                    if dependency.required {
                        return Err(EngineError::MissingDependency {
                            task: task.name().to_owned(),
                            dependency: dependency.name.clone(),
                        });
                    }
                    continue;
                }
                graph.connect(&dependency.name, task.name())?;
            }

            for dependee in task.dependees() {
                if !known.contains(dependee.name.as_str()) {
                    if dependee.required {
                        return Err(EngineError::MissingDependee {
                            task: task.name().to_owned(),
                            dependee: dependee.name.clone(),
                        });
                    }
                    continue;
                }
                graph.connect(task.name(), &dependee.name)?;
            }
        }

        Ok(graph)
    }
}
