// src/dag/graph.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use crate::errors::{BuildError, Result};
use crate::types::{AssetClass, TaskId};

/// The task graph of one full build.
///
/// An edge `a -> b` means `b` runs after `a` has run. The four asset tasks
/// are independent of each other; the HTML task comes after all of them.
#[derive(Debug, Clone)]
pub struct DagGraph {
    graph: DiGraphMap<TaskId, ()>,
}

impl DagGraph {
    pub fn standard() -> Self {
        let mut graph = DiGraphMap::new();
        for class in AssetClass::ALL {
            graph.add_edge(TaskId::Asset(class), TaskId::Html, ());
        }
        Self { graph }
    }

    pub fn tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.graph.nodes()
    }

    /// Tasks that must have run before `task` can start.
    pub fn dependencies_of(&self, task: TaskId) -> Vec<TaskId> {
        let mut deps: Vec<TaskId> = self
            .graph
            .neighbors_directed(task, Direction::Incoming)
            .collect();
        deps.sort();
        deps
    }

    pub fn dependents_of(&self, task: TaskId) -> Vec<TaskId> {
        let mut deps: Vec<TaskId> = self
            .graph
            .neighbors_directed(task, Direction::Outgoing)
            .collect();
        deps.sort();
        deps
    }

    /// A valid sequential execution order.
    pub fn build_order(&self) -> Result<Vec<TaskId>> {
        toposort(&self.graph, None).map_err(|cycle| {
            BuildError::BuildFailed(format!("task graph has a cycle at {}", cycle.node_id()))
        })
    }
}

impl Default for DagGraph {
    fn default() -> Self {
        Self::standard()
    }
}
