//! Shared test doubles for unit tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lmclient::{CompletionRequest, CompletionResponse, LmClient, LmError, StopReason, TokenUsage};

use crate::domain::{FileResource, Htp, Resource, ResourceSet, Task};
use crate::error::ExecuteError;
use crate::exec::CancelFlag;
use crate::reasoner::Reasoner;

/// Scripted LM client: returns queued responses in order, records prompts
pub struct StubLm {
    responses: Vec<String>,
    call_count: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubLm {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            call_count: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LmClient for StubLm {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LmError> {
        let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
        let prompt = request.messages.first().map(|m| m.content.clone()).unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt);
        let content = self
            .responses
            .get(idx)
            .cloned()
            .ok_or_else(|| LmError::InvalidResponse("No more stub responses".to_string()))?;
        Ok(CompletionResponse {
            content: Some(content),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        })
    }
}

/// Scripted reasoner: answers by ask, records the asks it sees
pub struct StubReasoner {
    answers: HashMap<String, String>,
    fallback: Option<String>,
    asks: Mutex<Vec<String>>,
    cancel_after: Option<(String, CancelFlag)>,
}

impl StubReasoner {
    /// Same fixed answer for every task
    pub fn fixed(answer: &str) -> Self {
        Self {
            answers: HashMap::new(),
            fallback: Some(answer.to_string()),
            asks: Mutex::new(Vec::new()),
            cancel_after: None,
        }
    }

    /// Distinct answers per ask; unknown asks are an error
    pub fn by_ask(pairs: &[(&str, &str)]) -> Self {
        Self {
            answers: pairs.iter().map(|(a, r)| (a.to_string(), r.to_string())).collect(),
            fallback: None,
            asks: Mutex::new(Vec::new()),
            cancel_after: None,
        }
    }

    /// Fixed answers, raising the cancel flag after answering `ask`
    pub fn cancelling_after(ask: &str, cancel: CancelFlag) -> Self {
        Self {
            answers: HashMap::new(),
            fallback: Some("answer".to_string()),
            asks: Mutex::new(Vec::new()),
            cancel_after: Some((ask.to_string(), cancel)),
        }
    }

    pub fn asks(&self) -> Vec<String> {
        self.asks.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reasoner for StubReasoner {
    async fn reason(&self, task: &Task) -> Result<String, ExecuteError> {
        self.asks.lock().unwrap().push(task.ask().to_string());

        if let Some((trigger, cancel)) = &self.cancel_after
            && task.ask() == trigger.as_str()
        {
            cancel.cancel();
        }

        self.answers
            .get(task.ask())
            .cloned()
            .or_else(|| self.fallback.clone())
            .ok_or_else(|| ExecuteError::Template(format!("StubReasoner has no answer for: {}", task.ask())))
    }
}

/// A resource set of named stub resources
pub fn test_resources(names: &[&str]) -> ResourceSet {
    let resources: Vec<Arc<dyn Resource>> = names
        .iter()
        .map(|n| Arc::new(FileResource::with_overview(*n, format!("overview of {}", n))) as Arc<dyn Resource>)
        .collect();
    ResourceSet::new(resources)
}

/// Build a plan tree from a JSON literal
pub fn plan_from_json(json: &str) -> Htp {
    let value: serde_json::Value = serde_json::from_str(json).unwrap();
    Htp::from_value(&value).unwrap()
}
