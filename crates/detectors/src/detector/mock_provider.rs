//! Deterministic in-process detector for tests and offline runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::core::category::SmellCategory;
use crate::core::usage::TokenUsage;
use crate::detector::provider::{
    DetectorError, DetectorProvider, DetectorRequest, DetectorResponse,
};
use crate::detector::schemas::{Candidate, CandidateReport};

pub struct MockDetectorProvider {
    responses: HashMap<SmellCategory, Vec<Candidate>>,
    raw_responses: HashMap<SmellCategory, String>,
    failing: Vec<SmellCategory>,
    fail_all: bool,
    delay: Duration,
    call_count: AtomicUsize,
}

impl Default for MockDetectorProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDetectorProvider {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            raw_responses: HashMap::new(),
            failing: Vec::new(),
            fail_all: false,
            delay: Duration::from_millis(1),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Provider that fails every call.
    pub fn failing() -> Self {
        let mut provider = Self::new();
        provider.fail_all = true;
        provider
    }

    pub fn with_candidates(mut self, category: SmellCategory, candidates: Vec<Candidate>) -> Self {
        self.responses.insert(category, candidates);
        self
    }

    /// Raw payload returned verbatim for a category, for exercising the
    /// malformed-output recovery path.
    pub fn with_raw_response(mut self, category: SmellCategory, content: &str) -> Self {
        self.raw_responses.insert(category, content.to_string());
        self
    }

    pub fn failing_for(mut self, category: SmellCategory) -> Self {
        self.failing.push(category);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn reset_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl DetectorProvider for MockDetectorProvider {
    async fn invoke(&self, request: DetectorRequest) -> Result<DetectorResponse, DetectorError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        if self.fail_all || self.failing.contains(&request.category) {
            return Err(DetectorError::Api(
                "mock provider configured to fail".to_string(),
            ));
        }

        let content = match self.raw_responses.get(&request.category) {
            Some(raw) => raw.clone(),
            None => {
                let report = CandidateReport {
                    detections: self
                        .responses
                        .get(&request.category)
                        .cloned()
                        .unwrap_or_default(),
                    analysis_summary: Some("mock analysis".to_string()),
                };
                serde_json::to_string(&report)
                    .map_err(|e| DetectorError::InvalidResponse(e.to_string()))?
            }
        };

        Ok(DetectorResponse {
            content,
            model: "mock-model".to_string(),
            usage: TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 50,
                total_tokens: 150,
            },
        })
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
