//! Prompt templates for decomposition, synthesis, and reasoning

pub mod embedded;
mod loader;

pub use loader::PromptLoader;
