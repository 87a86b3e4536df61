//! Hierarchical task plan (HTP)
//!
//! An ownership tree of Tasks: a node's sub-plans are the decomposition of
//! its task into sub-questions. Nodes are only ever created from a
//! structured record, never attached to an existing subtree, so the tree is
//! acyclic by construction.

use serde_json::Value;

use super::record::{PlanRecord, TaskField, TaskRecord};
use super::task::Task;
use crate::error::PlanError;

/// A hierarchical task plan node
///
/// Owns exactly one [`Task`] and the ordered sub-plans decomposing it.
/// No sub-plans means the task is a leaf, resolved directly by a reasoner;
/// a node with sub-plans resolves only after all of them have.
#[derive(Debug, Clone)]
pub struct Htp {
    pub task: Task,
    pub sub_plans: Vec<Htp>,
}

impl Htp {
    /// Create a single-node plan
    pub fn new(task: Task) -> Self {
        Self {
            task,
            sub_plans: Vec::new(),
        }
    }

    /// Build a plan tree from a structured JSON value
    ///
    /// This is the deserialization boundary between model-generated
    /// structured output and the in-memory tree. A record without a `task`
    /// field fails with [`PlanError::MalformedPlan`].
    pub fn from_value(value: &Value) -> Result<Self, PlanError> {
        let record: PlanRecord =
            serde_json::from_value(value.clone()).map_err(|e| PlanError::MalformedPlan(e.to_string()))?;
        Ok(Self::from_record(record))
    }

    /// Build a plan tree from a typed record
    pub fn from_record(record: PlanRecord) -> Self {
        Self {
            task: record.task.into_task(),
            sub_plans: record.sub_plans.into_iter().map(Self::from_record).collect(),
        }
    }

    /// Serialize the tree back to its structured record, statuses and
    /// results included
    pub fn to_record(&self) -> PlanRecord {
        PlanRecord {
            task: TaskField::Record(TaskRecord::from(&self.task)),
            sub_plans: self.sub_plans.iter().map(Self::to_record).collect(),
        }
    }

    /// Read-only view of the tree for progress reporting
    ///
    /// Taken between node resolutions, this is how callers observe
    /// in-progress results without live references into the tree.
    pub fn snapshot(&self) -> PlanRecord {
        self.to_record()
    }

    /// Propagate resource sets to descendants that have none
    ///
    /// Depth-first: every child with an empty resource set receives its
    /// parent's set - the same underlying set, shared, not a copy. Root
    /// resources are never altered. Once any ancestor has resources, every
    /// reachable node ends up with some.
    pub fn fix_missing_resources(&mut self) {
        for child in &mut self.sub_plans {
            if child.task.resources.is_empty() {
                child.task.resources = self.task.resources.clone();
            }
            child.fix_missing_resources();
        }
    }

    /// Decomposition depth: edges on the longest root-to-leaf path
    ///
    /// A single node is depth 0; a flat decomposition is depth 1.
    pub fn depth(&self) -> u32 {
        self.sub_plans.iter().map(|p| p.depth() + 1).max().unwrap_or(0)
    }

    /// Largest fan-out of any decomposition step in the tree
    pub fn max_fanout(&self) -> u32 {
        let own = self.sub_plans.len() as u32;
        self.sub_plans.iter().map(Htp::max_fanout).fold(own, u32::max)
    }

    /// Total number of nodes in the tree
    pub fn node_count(&self) -> u32 {
        1 + self.sub_plans.iter().map(Htp::node_count).sum::<u32>()
    }

    /// Whether this node is a leaf (no decomposition)
    pub fn is_leaf(&self) -> bool {
        self.sub_plans.is_empty()
    }
}

impl std::fmt::Display for Htp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn walk(node: &Htp, depth: usize, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let marker = if node.task.is_done() { "[x]" } else { "[ ]" };
            writeln!(f, "{}{} {}", "  ".repeat(depth), marker, node.task.ask())?;
            for child in &node.sub_plans {
                walk(child, depth + 1, f)?;
            }
            Ok(())
        }
        walk(self, 0, f)
    }
}
