//! AutoPlanner - LLM-driven decomposition of a problem into a plan tree
//!
//! Builds a decomposition prompt, asks the model for a structured plan, and
//! retries the whole generate-and-parse cycle until something parseable
//! comes back or the retry budget runs out. Structural errors in a parsed
//! record are never retried - a malformed record is a model bug, a
//! non-parse is just a bad sample.

use std::sync::Arc;
use std::time::Duration;

use lmclient::{CompletionRequest, LmClient, parse_output};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::{Htp, ResourceOverview, ResourceSet};
use crate::error::PlanError;
use crate::prompts::PromptLoader;

/// Max tokens for a decomposition response
const PLAN_MAX_TOKENS: u32 = 8192;

/// Sampling temperature for decomposition; low for determinism
const PLAN_TEMPERATURE: f32 = 0.3;

const DECOMPOSE_SYSTEM_PROMPT: &str = "You are an expert planner that breaks an open-ended problem into a tree \
     of concrete sub-questions. You always respond with a single JSON object in the requested shape and nothing else.";

/// Decomposition limits requested from the model
///
/// Advisory: the model may still exceed them; violations are accepted as-is
/// and logged, never truncated or rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum decomposition depth to request
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum sub-tasks to request per decomposition step
    #[serde(rename = "max-subtasks-per-decomp")]
    pub max_subtasks_per_decomp: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_subtasks_per_decomp: 4,
        }
    }
}

/// Bounded retry policy for the generate-and-parse cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts before giving up with `GenerationFailed`
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Initial backoff between attempts; doubles each retry, with jitter
    #[serde(rename = "initial-backoff-ms")]
    pub initial_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 1000,
        }
    }
}

/// Context for rendering decomposition prompts
#[derive(Serialize)]
struct DecomposeContext<'a> {
    problem: &'a str,
    max_depth: u32,
    max_subtasks: u32,
    resources: Vec<ResourceOverview>,
}

/// Context for rendering the resource-update prompt
#[derive(Serialize)]
struct UpdateContext {
    resources: Vec<ResourceOverview>,
    plan_json: String,
}

/// Automated (generative) hierarchical task planner
pub struct AutoPlanner {
    lm: Arc<dyn LmClient>,
    prompts: Arc<PromptLoader>,
    config: PlannerConfig,
    retry: RetryConfig,
}

impl AutoPlanner {
    pub fn new(lm: Arc<dyn LmClient>, prompts: Arc<PromptLoader>, config: PlannerConfig, retry: RetryConfig) -> Self {
        Self {
            lm,
            prompts,
            config,
            retry,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// A planner sharing this one's LM capability, forced to a flat
    /// decomposition (no further nesting)
    pub fn one_level_deep(&self) -> AutoPlanner {
        self.at_depth(1)
    }

    /// A planner sharing this one's LM capability, allowed one less level
    /// of nesting (floored at 1)
    pub fn one_fewer_level_deep(&self) -> AutoPlanner {
        self.at_depth(self.config.max_depth.saturating_sub(1).max(1))
    }

    fn at_depth(&self, max_depth: u32) -> AutoPlanner {
        AutoPlanner {
            lm: Arc::clone(&self.lm),
            prompts: Arc::clone(&self.prompts),
            config: PlannerConfig {
                max_depth,
                max_subtasks_per_decomp: self.config.max_subtasks_per_decomp,
            },
            retry: self.retry.clone(),
        }
    }

    /// Generate a plan tree for a problem
    ///
    /// With resources present, the decomposition prompt carries their
    /// overviews, the resulting root task holds the set, and every node
    /// without resources of its own inherits its parent's.
    pub async fn plan(&self, problem: &str, resources: &ResourceSet) -> Result<Htp, PlanError> {
        info!(max_depth = self.config.max_depth, "plan: decomposing problem");

        let context = DecomposeContext {
            problem,
            max_depth: self.config.max_depth,
            max_subtasks: self.config.max_subtasks_per_decomp,
            resources: resources.overviews(),
        };
        let template = if resources.is_empty() { "decompose" } else { "decompose-resources" };
        let prompt = self
            .prompts
            .render(template, &context)
            .map_err(|e| PlanError::Template(e.to_string()))?;

        let value = self.generate_structured(prompt).await?;
        let mut htp = Htp::from_value(&value)?;

        self.warn_on_limit_violations(&htp);

        if !resources.is_empty() {
            htp.task.resources = resources.clone();
            htp.fix_missing_resources();
        }

        info!(nodes = htp.node_count(), depth = htp.depth(), "plan: decomposition complete");
        Ok(htp)
    }

    /// Revise an existing plan for a new set of informational resources
    ///
    /// Precondition: `resources` must be non-empty. Violations fail with
    /// `InvalidArgument` before any LM call.
    pub async fn update_plan_resources(&self, plan: &Htp, resources: &ResourceSet) -> Result<Htp, PlanError> {
        if resources.is_empty() {
            return Err(PlanError::InvalidArgument(
                "update_plan_resources requires a non-empty resource set".to_string(),
            ));
        }

        let context = UpdateContext {
            resources: resources.overviews(),
            plan_json: serde_json::to_string(&plan.to_record())?,
        };
        let prompt = self
            .prompts
            .render("update-resources", &context)
            .map_err(|e| PlanError::Template(e.to_string()))?;

        let value = self.generate_structured(prompt).await?;
        let mut updated = Htp::from_value(&value)?;

        self.warn_on_limit_violations(&updated);

        updated.task.resources = resources.clone();
        updated.fix_missing_resources();

        Ok(updated)
    }

    /// The generate-and-parse retry cycle
    ///
    /// Regenerates the response on every attempt. Unparseable output and
    /// retryable transport errors consume attempts; anything else surfaces
    /// immediately.
    async fn generate_structured(&self, prompt: String) -> Result<Value, PlanError> {
        let mut backoff = Duration::from_millis(self.retry.initial_backoff_ms);

        for attempt in 1..=self.retry.max_attempts {
            if attempt > 1 {
                let jitter_ms = rand::rng().random_range(0..=backoff.as_millis() as u64 / 4);
                tokio::time::sleep(backoff + Duration::from_millis(jitter_ms)).await;
                backoff *= 2;
            }

            let request = CompletionRequest::from_prompt(DECOMPOSE_SYSTEM_PROMPT, prompt.clone(), PLAN_MAX_TOKENS)
                .with_temperature(PLAN_TEMPERATURE);

            match self.lm.get_response(request).await {
                Ok(text) => {
                    if let Some(value) = parse_output(&text) {
                        debug!(attempt, "generate_structured: got parseable plan");
                        return Ok(value);
                    }
                    warn!(attempt, "generate_structured: response not parseable, regenerating");
                }
                Err(e) if e.is_retryable() => {
                    warn!(attempt, error = %e, "generate_structured: transient LM error");
                }
                Err(e) => return Err(PlanError::Lm(e)),
            }
        }

        Err(PlanError::GenerationFailed {
            attempts: self.retry.max_attempts,
        })
    }

    /// Advisory limits stay advisory - log and accept
    fn warn_on_limit_violations(&self, htp: &Htp) {
        let depth = htp.depth();
        if depth > self.config.max_depth {
            warn!(
                depth,
                max_depth = self.config.max_depth,
                "plan exceeds requested depth; accepting as-is"
            );
        }
        let fanout = htp.max_fanout();
        if fanout > self.config.max_subtasks_per_decomp {
            warn!(
                fanout,
                max_subtasks = self.config.max_subtasks_per_decomp,
                "plan exceeds requested fan-out; accepting as-is"
            );
        }
    }
}
