//! LmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LmError};

/// Stateless LM client - each call is independent (fresh context)
///
/// This is the core abstraction for interacting with language models.
/// No conversation state is maintained between calls, and no retry or
/// backoff happens at this layer - callers decide what is worth retrying.
#[async_trait]
pub trait LmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LmError>;

    /// Send a completion request and return just the response text
    ///
    /// Fails with [`LmError::EmptyResponse`] when the model returned no text.
    async fn get_response(&self, request: CompletionRequest) -> Result<String, LmError> {
        let response = self.complete(request).await?;
        response.content.ok_or(LmError::EmptyResponse)
    }
}
