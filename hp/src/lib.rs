//! htplan - hierarchical task-plan solver
//!
//! Decomposes an open-ended problem into a tree of sub-questions, resolves
//! each sub-question with an LM-backed reasoner, and synthesizes a final
//! answer from the sub-results.
//!
//! # Core Concepts
//!
//! - **Bottom-Up Resolution**: a node resolves only after all its sub-plans
//!   have; leaves go straight to the reasoner
//! - **Sibling Context**: sub-tasks run strictly in order so each one can
//!   see its earlier siblings' results
//! - **Baseline + Synthesis**: every node gets a sub-plan-independent
//!   baseline answer; for decomposed nodes a synthesis prompt folds the
//!   baseline and the sub-results into the final answer
//! - **Shared Resources**: informational resources propagate down the tree
//!   by reference, grounding each task's reasoning
//!
//! # Modules
//!
//! - [`domain`] - Task, resource, and plan-tree types with the wire format
//! - [`planner`] - LLM-driven problem decomposition with bounded retry
//! - [`exec`] - recursive bottom-up plan execution
//! - [`reasoner`] - the single-task reasoning capability
//! - [`prompts`] - Handlebars prompt templates
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod exec;
pub mod planner;
pub mod prompts;
pub mod reasoner;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{Config, PromptsConfig};
pub use domain::{FileResource, Htp, PlanRecord, Resource, ResourceOverview, ResourceSet, Task, TaskField, TaskRecord, TaskStatus};
pub use error::{ExecuteError, PlanError};
pub use exec::{CancelFlag, ExecContext, SubResult};
pub use planner::{AutoPlanner, PlannerConfig, RetryConfig};
pub use prompts::PromptLoader;
pub use reasoner::{LmReasoner, Reasoner};
