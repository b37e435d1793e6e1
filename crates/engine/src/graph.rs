//! Directed graph over task names.
//!
//! An edge `(start, end)` means "`start` must execute before `end`".
//! Rules enforced on insertion:
//! 1. Node names are unique.
//! 2. No node may depend on itself.
//! 3. Two nodes may not depend on each other directly.
//!
//! Longer cycles are only visible once the graph is walked, so
//! [`Graph::traverse`] rejects them.

use std::collections::{HashMap, HashSet};

use crate::error::GraphError;

/// Directed edge from one node to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: Vec<String>,
    names: HashSet<String>,
    edges: Vec<Edge>,
    /// node -> direct prerequisites, in edge insertion order.
    incoming: HashMap<String, Vec<String>>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node.
    ///
    /// # Errors
    /// [`GraphError::DuplicateNode`] if the name is already present.
    pub fn add_node(&mut self, name: &str) -> Result<(), GraphError> {
        if self.exists(name) {
            return Err(GraphError::DuplicateNode(name.to_owned()));
        }
        self.insert_node(name);
        Ok(())
    }

    /// Record that `start` must execute before `end`, adding either endpoint
    /// if it is missing. Connecting an existing edge again is a no-op.
    ///
    /// # Errors
    /// - [`GraphError::ReflexiveEdge`] if `start == end`.
    /// - [`GraphError::CyclicEdge`] if `end -> start` already exists.
    pub fn connect(&mut self, start: &str, end: &str) -> Result<(), GraphError> {
        if start == end {
            return Err(GraphError::ReflexiveEdge(start.to_owned()));
        }
        if self.has_edge(end, start) {
            return Err(GraphError::CyclicEdge {
                start: start.to_owned(),
                end: end.to_owned(),
            });
        }
        if self.has_edge(start, end) {
            return Ok(());
        }

        for name in [start, end] {
            if !self.exists(name) {
                self.insert_node(name);
            }
        }

        self.edges.push(Edge {
            start: start.to_owned(),
            end: end.to_owned(),
        });
        self.incoming
            .entry(end.to_owned())
            .or_default()
            .push(start.to_owned());
        Ok(())
    }

    /// Whether a node with this exact name is present.
    pub fn exists(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Return every node `target` transitively depends on, followed by
    /// `target` itself, in an order where each node comes after all of its
    /// prerequisites.
    ///
    /// Unknown targets yield an empty list.
    ///
    /// # Errors
    /// [`GraphError::CircularDependency`] if a node is reached again while it
    /// is still on the active path.
    pub fn traverse(&self, target: &str) -> Result<Vec<String>, GraphError> {
        if !self.exists(target) {
            return Ok(Vec::new());
        }

        let mut walk = Walk::default();
        walk.enter(target);

        // Each frame is a node plus the index of the next prerequisite to inspect.
        while let Some(frame) = walk.stack.last_mut() {
            let (node, next) = *frame;
            frame.1 += 1;

            let prerequisites = self.incoming.get(node).map_or(&[][..], Vec::as_slice);
            let Some(prerequisite) = prerequisites.get(next) else {
                walk.stack.pop();
                walk.finished.insert(node);
                walk.result.push(node.to_owned());
                continue;
            };

            if walk.visited.contains(prerequisite.as_str()) {
                if walk.finished.contains(prerequisite.as_str()) {
                    continue;
                }
                return Err(GraphError::CircularDependency(prerequisite.clone()));
            }
            walk.enter(prerequisite);
        }

        Ok(walk.result)
    }

    fn insert_node(&mut self, name: &str) {
        self.names.insert(name.to_owned());
        self.nodes.push(name.to_owned());
    }

    fn has_edge(&self, start: &str, end: &str) -> bool {
        self.incoming
            .get(end)
            .is_some_and(|starts| starts.iter().any(|s| s == start))
    }
}

/// Bookkeeping for a single depth-first traversal.
#[derive(Default)]
struct Walk<'a> {
    stack: Vec<(&'a str, usize)>,
    visited: HashSet<&'a str>,
    finished: HashSet<&'a str>,
    result: Vec<String>,
}

impl<'a> Walk<'a> {
    fn enter(&mut self, node: &'a str) {
        self.visited.insert(node);
        self.stack.push((node, 0));
    }
}
