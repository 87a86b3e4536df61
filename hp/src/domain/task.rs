//! Task domain type
//!
//! A Task is one unit of work: a question plus its resolution lifecycle.
//! The question is fixed at construction; the result is written exactly once,
//! by the executor, when the owning plan node resolves.

use serde::{Deserialize, Serialize};

use super::resource::ResourceSet;

/// Task status in the resolution lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not yet resolved
    #[default]
    Pending,
    /// Resolved; `result` holds the answer
    Done,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// A single question with lifecycle status and eventual result
///
/// Invariant: `result` is `Some` iff `status` is `Done`. The fields are
/// private so the invariant holds by construction - `complete` is the only
/// way to a `Done` state.
#[derive(Debug, Clone)]
pub struct Task {
    ask: String,
    status: TaskStatus,
    result: Option<String>,

    /// Informational resources grounding this task's reasoning.
    /// May be shared with other tasks after resource propagation.
    pub resources: ResourceSet,
}

impl Task {
    /// Create a pending task for a question
    pub fn new(ask: impl Into<String>) -> Self {
        Self {
            ask: ask.into(),
            status: TaskStatus::Pending,
            result: None,
            resources: ResourceSet::default(),
        }
    }

    /// Create an already-resolved task (e.g. reused from a prior run)
    pub fn resolved(ask: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            ask: ask.into(),
            status: TaskStatus::Done,
            result: Some(result.into()),
            resources: ResourceSet::default(),
        }
    }

    /// The question text (immutable after creation)
    pub fn ask(&self) -> &str {
        &self.ask
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// The answer, present only once the task is done
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Record the result and mark the task done
    pub fn complete(&mut self, result: impl Into<String>) {
        self.result = Some(result.into());
        self.status = TaskStatus::Done;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_new_is_pending() {
        let task = Task::new("What is X?");
        assert_eq!(task.ask(), "What is X?");
        assert_eq!(task.status(), TaskStatus::Pending);
        assert!(task.result().is_none());
        assert!(!task.is_done());
        assert!(task.resources.is_empty());
    }

    #[test]
    fn test_task_complete() {
        let mut task = Task::new("What is X?");
        task.complete("X is 42.");
        assert!(task.is_done());
        assert_eq!(task.result(), Some("X is 42."));
    }

    #[test]
    fn test_task_resolved() {
        let task = Task::resolved("What is X?", "X is 42.");
        assert!(task.is_done());
        assert_eq!(task.result(), Some("X is 42."));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&TaskStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(serde_json::to_string(&TaskStatus::Done).unwrap(), "\"done\"");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(TaskStatus::Pending.to_string(), "pending");
        assert_eq!(TaskStatus::Done.to_string(), "done");
    }
}
