//! LmClient - language-model capability for plan generation and reasoning
//!
//! This crate is the boundary between the plan engine and whatever model
//! actually answers prompts. It exposes two operations: get a text response
//! for a completion request, and parse a text response into structured data.
//! No retry or backoff happens here - callers own their retry policy.
//!
//! # Modules
//!
//! - [`client`] - the `LmClient` trait
//! - [`types`] - request/response types
//! - [`parse`] - structured-output extraction from model text
//! - [`anthropic`] - Anthropic Messages API implementation
//! - [`config`] - client options and the provider factory

mod anthropic;
mod client;
pub mod config;
mod error;
pub mod parse;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LmClient;
pub use config::{LmOptions, create_client};
pub use error::LmError;
pub use parse::parse_output;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, TokenUsage};
