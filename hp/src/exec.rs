//! Plan execution - bottom-up resolution with result synthesis
//!
//! Walks the tree depth-first. Every node gets a baseline answer from the
//! reasoner; nodes with sub-plans then resolve each child strictly in
//! declaration order - each child sees its earlier siblings' results - and
//! synthesize a final answer from the baseline plus the accumulated child
//! results. Sequential on purpose: reordering or parallelizing siblings
//! would break the context each later sibling depends on.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;
use lmclient::{CompletionRequest, LmClient};
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::Htp;
use crate::error::ExecuteError;
use crate::prompts::PromptLoader;
use crate::reasoner::Reasoner;

/// Default max tokens for a synthesis response
const SYNTHESIZE_MAX_TOKENS: u32 = 4096;

const SYNTHESIZE_SYSTEM_PROMPT: &str = "You are a careful analyst. \
     Consolidate the reasoning and supporting results you are given into one answer to the stated question.";

/// A resolved sub-question: the ask and its result
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubResult {
    pub ask: String,
    pub result: String,
}

/// Cooperative cancellation for an in-flight tree walk
///
/// Checked between node resolutions; raising it aborts the walk at the next
/// node boundary, never mid-call.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything a tree walk needs: the reasoner, the LM for synthesis,
/// prompt templates, and the cancellation flag
pub struct ExecContext<'a> {
    reasoner: &'a dyn Reasoner,
    lm: &'a dyn LmClient,
    prompts: &'a PromptLoader,
    cancel: CancelFlag,
    max_tokens: u32,
}

impl<'a> ExecContext<'a> {
    pub fn new(reasoner: &'a dyn Reasoner, lm: &'a dyn LmClient, prompts: &'a PromptLoader) -> Self {
        Self {
            reasoner,
            lm,
            prompts,
            cancel: CancelFlag::new(),
            max_tokens: SYNTHESIZE_MAX_TOKENS,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A numbered entry for the synthesis template
#[derive(Serialize)]
struct NumberedResult<'a> {
    n: usize,
    ask: &'a str,
    result: &'a str,
}

fn numbered(results: &[SubResult]) -> Vec<NumberedResult<'_>> {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| NumberedResult {
            n: i + 1,
            ask: &r.ask,
            result: &r.result,
        })
        .collect()
}

/// Context for rendering the synthesis prompt
#[derive(Serialize)]
struct SynthesisContext<'a> {
    ask: &'a str,
    baseline: &'a str,
    supporting: Vec<NumberedResult<'a>>,
    other: Vec<NumberedResult<'a>>,
}

impl Htp {
    /// Execute this plan and return the final result
    ///
    /// `other_results` is the ask/result context inherited from an
    /// ancestor's earlier siblings; pass an empty slice at the root.
    ///
    /// Children already marked done are reused without re-execution; the
    /// node's own task is resolved from scratch every time. On success the
    /// task is done and holds the returned result.
    pub fn execute<'a>(
        &'a mut self,
        ctx: &'a ExecContext<'a>,
        other_results: &'a [SubResult],
    ) -> BoxFuture<'a, Result<String, ExecuteError>> {
        Box::pin(async move {
            if ctx.cancel.is_cancelled() {
                return Err(ExecuteError::Cancelled);
            }

            debug!(ask = %self.task.ask(), sub_plans = self.sub_plans.len(), "execute: resolving node");

            // Baseline answer, independent of any sub-plan results. For a
            // non-leaf node it only feeds the synthesis prompt.
            let baseline = ctx.reasoner.reason(&self.task).await?;

            let result = if self.sub_plans.is_empty() {
                baseline
            } else {
                let mut sub_results: Vec<SubResult> = Vec::with_capacity(self.sub_plans.len());
                for child in &mut self.sub_plans {
                    let result = if child.task.is_done() {
                        // Pre-resolved (e.g. reused from a prior run)
                        child.task.result().unwrap_or_default().to_string()
                    } else {
                        child.execute(ctx, &sub_results).await?
                    };
                    sub_results.push(SubResult {
                        ask: child.task.ask().to_string(),
                        result,
                    });
                }

                let context = SynthesisContext {
                    ask: self.task.ask(),
                    baseline: &baseline,
                    supporting: numbered(&sub_results),
                    other: numbered(other_results),
                };
                let prompt = ctx
                    .prompts
                    .render("synthesize", &context)
                    .map_err(|e| ExecuteError::Template(e.to_string()))?;

                let request = CompletionRequest::from_prompt(SYNTHESIZE_SYSTEM_PROMPT, prompt, ctx.max_tokens);
                ctx.lm.get_response(request).await?
            };

            self.task.complete(result.clone());
            info!(ask = %self.task.ask(), "execute: task done");
            Ok(result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Htp, Task};
    use crate::testing::{StubLm, StubReasoner, plan_from_json};

    fn leaf(ask: &str) -> Htp {
        Htp::new(Task::new(ask))
    }

    #[tokio::test]
    async fn test_leaf_execution_uses_reasoner_result() {
        let reasoner = StubReasoner::fixed("R");
        let lm = StubLm::new(vec![]);
        let prompts = PromptLoader::embedded_only();
        let ctx = ExecContext::new(&reasoner, &lm, &prompts);

        let mut htp = leaf("What is X?");
        let result = htp.execute(&ctx, &[]).await.unwrap();

        assert_eq!(result, "R");
        assert!(htp.task.is_done());
        assert_eq!(htp.task.result(), Some("R"));
        // No synthesis for a leaf
        assert_eq!(lm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_synthesis_wins_over_baseline() {
        let reasoner = StubReasoner::by_ask(&[("root-q", "baseline-answer"), ("sub-a", "answer-a"), ("sub-b", "answer-b")]);
        let lm = StubLm::new(vec!["synthesized".to_string()]);
        let prompts = PromptLoader::embedded_only();
        let ctx = ExecContext::new(&reasoner, &lm, &prompts);

        let mut htp = plan_from_json(r#"{"task": "root-q", "sub_plans": [{"task": "sub-a"}, {"task": "sub-b"}]}"#);
        let result = htp.execute(&ctx, &[]).await.unwrap();

        assert_eq!(result, "synthesized");
        assert_eq!(htp.task.result(), Some("synthesized"));
        assert_eq!(htp.sub_plans[0].task.result(), Some("answer-a"));
        assert_eq!(htp.sub_plans[1].task.result(), Some("answer-b"));
        assert_eq!(lm.call_count(), 1);

        // The synthesis prompt carries the question, the baseline, and
        // every supporting pair
        let prompt = &lm.prompts()[0];
        assert!(prompt.contains("root-q"));
        assert!(prompt.contains("baseline-answer"));
        assert!(prompt.contains("SUPPORTING QUESTION/TASK #1"));
        assert!(prompt.contains("answer-a"));
        assert!(prompt.contains("SUPPORTING RESULT #2"));
        assert!(prompt.contains("answer-b"));
    }

    #[tokio::test]
    async fn test_sibling_ordering_passes_earlier_results() {
        // Second sibling has its own child, so it synthesizes - and its
        // synthesis prompt must carry the first sibling's result as OTHER
        // context.
        let reasoner = StubReasoner::by_ask(&[
            ("root-q", "baseline-root"),
            ("sub-a", "answer-a"),
            ("sub-b", "baseline-b"),
            ("sub-b-inner", "answer-b-inner"),
        ]);
        let lm = StubLm::new(vec!["synth-inner".to_string(), "synth-root".to_string()]);
        let prompts = PromptLoader::embedded_only();
        let ctx = ExecContext::new(&reasoner, &lm, &prompts);

        let mut htp = plan_from_json(
            r#"{"task": "root-q", "sub_plans": [
                {"task": "sub-a"},
                {"task": "sub-b", "sub_plans": [{"task": "sub-b-inner"}]}
            ]}"#,
        );
        htp.execute(&ctx, &[]).await.unwrap();

        let prompts_sent = lm.prompts();
        // First synthesis is for node "sub-b"; it sees sibling "sub-a"'s
        // result before its own resolution finishes
        assert!(prompts_sent[0].contains("OTHER QUESTION/TASK #1"));
        assert!(prompts_sent[0].contains("sub-a"));
        assert!(prompts_sent[0].contains("answer-a"));
        // Root synthesis has no inherited context
        assert!(!prompts_sent[1].contains("OTHER QUESTION/TASK"));
        assert!(prompts_sent[1].contains("synth-inner"));
    }

    #[tokio::test]
    async fn test_done_child_is_reused_not_reexecuted() {
        let reasoner = StubReasoner::by_ask(&[("root", "B"), ("b", "RB")]);
        let lm = StubLm::new(vec!["S".to_string()]);
        let prompts = PromptLoader::embedded_only();
        let ctx = ExecContext::new(&reasoner, &lm, &prompts);

        let mut htp = plan_from_json(r#"{"task": "root", "sub_plans": [{"task": "a"}, {"task": "b"}]}"#);
        htp.sub_plans[0].task = Task::resolved("a", "cached");

        htp.execute(&ctx, &[]).await.unwrap();

        // Reasoner was asked about root and b, never about a
        assert_eq!(reasoner.asks(), vec!["root".to_string(), "b".to_string()]);
        assert!(lm.prompts()[0].contains("cached"));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let reasoner = StubReasoner::fixed("R");
        let lm = StubLm::new(vec![]);
        let prompts = PromptLoader::embedded_only();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let ctx = ExecContext::new(&reasoner, &lm, &prompts).with_cancel(cancel);

        let mut htp = leaf("What is X?");
        let err = htp.execute(&ctx, &[]).await.unwrap_err();
        assert!(matches!(err, ExecuteError::Cancelled));
        assert!(!htp.task.is_done());
    }

    #[tokio::test]
    async fn test_cancel_mid_walk_stops_before_next_sibling() {
        // The first child's reasoner call raises the flag; the second child
        // must never start.
        let cancel = CancelFlag::new();
        let reasoner = StubReasoner::cancelling_after("a", cancel.clone());
        let lm = StubLm::new(vec![]);
        let prompts = PromptLoader::embedded_only();
        let ctx = ExecContext::new(&reasoner, &lm, &prompts).with_cancel(cancel);

        let mut htp = plan_from_json(r#"{"task": "root", "sub_plans": [{"task": "a"}, {"task": "b"}]}"#);
        let err = htp.execute(&ctx, &[]).await.unwrap_err();

        assert!(matches!(err, ExecuteError::Cancelled));
        assert!(!reasoner.asks().contains(&"b".to_string()));
    }

    #[test]
    fn test_cancel_flag_shared_between_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        clone.cancel();
        assert!(flag.is_cancelled());
    }
}
