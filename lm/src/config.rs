//! Client options and the provider factory

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AnthropicClient, LmClient, LmError};

/// LM provider options
///
/// Embedded verbatim into the application config's `llm` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LmOptions {
    /// Provider name (currently only "anthropic" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 8192,
            timeout_ms: 300_000,
        }
    }
}

impl LmOptions {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String, LmError> {
        std::env::var(&self.api_key_env).map_err(|_| {
            LmError::InvalidResponse(format!("API key not found: set the {} environment variable", self.api_key_env))
        })
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Create an LM client based on the provider specified in the options
pub fn create_client(options: &LmOptions) -> Result<Arc<dyn LmClient>, LmError> {
    debug!(provider = %options.provider, model = %options.model, "create_client: called");
    match options.provider.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicClient::from_options(options)?)),
        other => Err(LmError::InvalidResponse(format!(
            "Unknown LM provider: '{}'. Supported: anthropic",
            other
        ))),
    }
}
