//! Domain types: tasks, resources, and the plan tree

pub mod plan;
pub mod record;
pub mod resource;
pub mod task;

pub use plan::Htp;
pub use record::{PlanRecord, TaskField, TaskRecord};
pub use resource::{FileResource, Resource, ResourceOverview, ResourceSet};
pub use task::{Task, TaskStatus};
