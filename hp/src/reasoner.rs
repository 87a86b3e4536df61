//! Reasoner capability and the LM-backed default
//!
//! A reasoner answers a single task without consulting its sub-plans. The
//! executor calls it for every node; what happens inside is the reasoner's
//! business - the default here is one grounded prompt through the LM.

use std::sync::Arc;

use async_trait::async_trait;
use lmclient::{CompletionRequest, LmClient};
use serde::Serialize;

use crate::domain::{ResourceOverview, Task};
use crate::error::ExecuteError;
use crate::prompts::PromptLoader;

/// Produces an answer to a single task, ignoring any decomposition
#[async_trait]
pub trait Reasoner: Send + Sync {
    async fn reason(&self, task: &Task) -> Result<String, ExecuteError>;
}

/// Default max tokens for a single reasoning response
const REASON_MAX_TOKENS: u32 = 4096;

const REASON_SYSTEM_PROMPT: &str = "You are a careful analyst. \
     Answer the question you are given directly, grounded in the listed resources when any are listed.";

/// Context for rendering the reasoning prompt
#[derive(Serialize)]
struct ReasonContext<'a> {
    ask: &'a str,
    resources: Vec<ResourceOverview>,
}

/// LM-backed reasoner: renders one reasoning prompt per task
pub struct LmReasoner {
    lm: Arc<dyn LmClient>,
    prompts: Arc<PromptLoader>,
    max_tokens: u32,
}

impl LmReasoner {
    pub fn new(lm: Arc<dyn LmClient>, prompts: Arc<PromptLoader>) -> Self {
        Self {
            lm,
            prompts,
            max_tokens: REASON_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl Reasoner for LmReasoner {
    async fn reason(&self, task: &Task) -> Result<String, ExecuteError> {
        let context = ReasonContext {
            ask: task.ask(),
            resources: task.resources.overviews(),
        };
        let prompt = self
            .prompts
            .render("reason", &context)
            .map_err(|e| ExecuteError::Template(e.to_string()))?;

        let request = CompletionRequest::from_prompt(REASON_SYSTEM_PROMPT, prompt, self.max_tokens);
        Ok(self.lm.get_response(request).await?)
    }
}
