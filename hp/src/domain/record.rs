//! Structured-plan wire format
//!
//! The only shape the engine exchanges with the outside world: a nested
//! record `{ "task": <record-or-string>, "sub_plans": [...] }`. This is the
//! contract between model-generated structured output and the in-memory
//! tree, and it round-trips.

use serde::{Deserialize, Serialize};

use super::task::{Task, TaskStatus};

/// One node of a structured plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub task: TaskField,

    /// Decomposition of `task` into sub-questions; empty for a leaf.
    /// `sub-plans` is accepted on input as a legacy spelling.
    #[serde(default, alias = "sub-plans", skip_serializing_if = "Vec::is_empty")]
    pub sub_plans: Vec<PlanRecord>,
}

/// A task in the wire format: either a bare question string or a full record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskField {
    Ask(String),
    Record(TaskRecord),
}

/// Task record carrying at least the question; status and result are
/// serialized for introspection and accepted back on input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub ask: String,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl TaskField {
    /// Normalize to the canonical in-memory Task
    ///
    /// A `done` record without a result is demoted to pending - the
    /// result-iff-done invariant wins over what the record claims.
    pub fn into_task(self) -> Task {
        match self {
            TaskField::Ask(ask) => Task::new(ask),
            TaskField::Record(record) => match (record.status, record.result) {
                (TaskStatus::Done, Some(result)) => Task::resolved(record.ask, result),
                _ => Task::new(record.ask),
            },
        }
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            ask: task.ask().to_string(),
            status: task.status(),
            result: task.result().map(str::to_string),
        }
    }
}
