//! Informational resources
//!
//! A resource is an opaque named handle to something a task's reasoning can
//! be grounded in (a document, a knowledge base). The engine only ever reads
//! its name and overview to build prompts; retrieval is someone else's job.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use eyre::{Context, Result};
use serde::Serialize;

/// An opaque informational resource attachable to a task
pub trait Resource: Send + Sync {
    /// Stable identifier for this resource
    fn unique_name(&self) -> &str;

    /// Short description used when building prompts
    fn overview(&self) -> &str;
}

/// Name and overview of one resource, in prompt-template form
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResourceOverview {
    pub name: String,
    pub overview: String,
}

/// A set of resources shared between tasks
///
/// Cloning shares the underlying set (it is behind an `Arc`), so resource
/// propagation hands the same set to many nodes without copying. The set is
/// immutable once built - replacing a task's set never affects other tasks
/// holding the same one.
#[derive(Clone, Default)]
pub struct ResourceSet {
    inner: Arc<Vec<Arc<dyn Resource>>>,
}

impl ResourceSet {
    pub fn new(resources: Vec<Arc<dyn Resource>>) -> Self {
        Self {
            inner: Arc::new(resources),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Resource>> {
        self.inner.iter()
    }

    /// Compact name/overview pairs for prompt building
    pub fn overviews(&self) -> Vec<ResourceOverview> {
        self.inner
            .iter()
            .map(|r| ResourceOverview {
                name: r.unique_name().to_string(),
                overview: r.overview().to_string(),
            })
            .collect()
    }

    /// Whether two sets are the same underlying set (not merely equal)
    pub fn shares_with(&self, other: &ResourceSet) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ResourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|r| r.unique_name())).finish()
    }
}

/// A file-backed resource
///
/// The overview is the first non-empty line of the file unless one is
/// supplied explicitly.
#[derive(Debug)]
pub struct FileResource {
    name: String,
    overview: String,
}

impl FileResource {
    /// Load a resource from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read resource file {}", path.display()))?;

        let overview = content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("(empty file)")
            .chars()
            .take(200)
            .collect();

        Ok(Self {
            name: path.display().to_string(),
            overview,
        })
    }

    pub fn with_overview(name: impl Into<String>, overview: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            overview: overview.into(),
        }
    }
}

impl Resource for FileResource {
    fn unique_name(&self) -> &str {
        &self.name
    }

    fn overview(&self) -> &str {
        &self.overview
    }
}
