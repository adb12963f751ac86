use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::core::category::SmellCategory;
use crate::core::config::{AnalysisConfig, ExecutionMode, ProviderConfig};
use crate::core::usage::{CallUsage, UsageSummary};
use crate::detector::prompts;
use crate::detector::provider::{DetectorError, DetectorProvider, DetectorRequest};
use crate::detector::schemas::{decode_candidates, Candidate};
use crate::structure::CodeUnit;

use super::registry::{CategoryRegistry, DetectorTask};

/// Terminal state of one category's detector call: its candidates (possibly
/// none), its usage, and the failure reason when the call did not succeed.
#[derive(Debug)]
pub struct CategoryOutcome {
    pub category: SmellCategory,
    pub candidates: Vec<Candidate>,
    pub usage: CallUsage,
    pub error: Option<String>,
}

impl CategoryOutcome {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Everything the orchestration join produced, outcomes in category order.
#[derive(Debug)]
pub struct OrchestratorRun {
    pub outcomes: Vec<CategoryOutcome>,
    pub usage: UsageSummary,
}

/// Fans the configured detector tasks out against one source file. Each
/// category is invoked exactly once; failures (timeout, transport, malformed
/// output) are isolated to their category and recorded in usage. The run
/// joins on all categories reaching a terminal state before returning.
pub struct DetectorOrchestrator {
    provider: Arc<dyn DetectorProvider>,
    registry: CategoryRegistry,
    execution: ExecutionMode,
    call_timeout: Duration,
    request_deadline: Duration,
    temperature: f32,
    max_tokens: u32,
}

impl DetectorOrchestrator {
    pub fn new(provider: Arc<dyn DetectorProvider>, config: &AnalysisConfig) -> Self {
        let ProviderConfig::OpenAi {
            temperature,
            max_tokens,
            ..
        } = config.provider;

        Self {
            provider,
            registry: CategoryRegistry::for_categories(&config.enabled_categories),
            execution: config.execution,
            call_timeout: Duration::from_secs(config.call_timeout_secs),
            request_deadline: Duration::from_secs(config.request_deadline_secs),
            temperature,
            max_tokens,
        }
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub async fn run(&self, unit: &CodeUnit, source: &str) -> OrchestratorRun {
        let started = Instant::now();
        let deadline_at = started + self.request_deadline;
        let payload = prompts::build_payload(source, unit);

        let mut outcomes = match self.execution {
            ExecutionMode::Concurrent { max_in_flight } => {
                self.run_concurrent(&payload, deadline_at, max_in_flight.max(1))
                    .await
            }
            ExecutionMode::Sequential { pacing_ms } => {
                self.run_sequential(&payload, deadline_at, Duration::from_millis(pacing_ms))
                    .await
            }
        };

        outcomes.sort_by_key(|o| self.registry.position(o.category));

        let mut usage = UsageSummary::default();
        for outcome in &outcomes {
            usage.absorb(&outcome.usage);
        }
        usage.elapsed = started.elapsed();

        OrchestratorRun { outcomes, usage }
    }

    async fn run_concurrent(
        &self,
        payload: &str,
        deadline_at: Instant,
        max_in_flight: usize,
    ) -> Vec<CategoryOutcome> {
        stream::iter(self.registry.tasks())
            .map(|task| self.call_category(task, payload, deadline_at))
            .buffer_unordered(max_in_flight)
            .collect()
            .await
    }

    async fn run_sequential(
        &self,
        payload: &str,
        deadline_at: Instant,
        pacing: Duration,
    ) -> Vec<CategoryOutcome> {
        let mut outcomes = Vec::with_capacity(self.registry.len());
        for (idx, task) in self.registry.tasks().iter().enumerate() {
            if idx > 0 && !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }
            outcomes.push(self.call_category(task, payload, deadline_at).await);
        }
        outcomes
    }

    /// Runs one category to a terminal state. Never panics and never returns
    /// an error: failures become part of the outcome.
    async fn call_category(
        &self,
        task: &DetectorTask,
        payload: &str,
        deadline_at: Instant,
    ) -> CategoryOutcome {
        let started = Instant::now();

        let remaining = deadline_at.saturating_duration_since(started);
        if remaining.is_zero() {
            warn!(category = %task.category, "request deadline exhausted before call");
            return CategoryOutcome {
                category: task.category,
                candidates: Vec::new(),
                usage: CallUsage::failure(Duration::ZERO),
                error: Some(DetectorError::DeadlineExceeded.to_string()),
            };
        }

        let request = DetectorRequest {
            category: task.category,
            instructions: task.instructions.clone(),
            payload: payload.to_string(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let budget = remaining.min(self.call_timeout);
        let result = tokio::time::timeout(budget, self.provider.invoke(request)).await;
        let elapsed = started.elapsed();

        match result {
            Ok(Ok(response)) => match decode_candidates(&response.content) {
                Ok(candidates) => {
                    debug!(
                        category = %task.category,
                        count = candidates.len(),
                        "detector call succeeded"
                    );
                    CategoryOutcome {
                        category: task.category,
                        candidates,
                        usage: CallUsage::success(response.usage, elapsed),
                        error: None,
                    }
                }
                Err(reason) => {
                    warn!(category = %task.category, "undecodable detector output: {}", reason);
                    CategoryOutcome {
                        category: task.category,
                        candidates: Vec::new(),
                        usage: CallUsage::failure_with_tokens(response.usage, elapsed),
                        error: Some(format!("malformed detector output: {}", reason)),
                    }
                }
            },
            Ok(Err(e)) => {
                warn!(category = %task.category, "detector call failed: {}", e);
                CategoryOutcome {
                    category: task.category,
                    candidates: Vec::new(),
                    usage: CallUsage::failure(elapsed),
                    error: Some(e.to_string()),
                }
            }
            Err(_) => {
                warn!(category = %task.category, "detector call timed out after {:?}", budget);
                CategoryOutcome {
                    category: task.category,
                    candidates: Vec::new(),
                    usage: CallUsage::failure(elapsed),
                    error: Some(DetectorError::Timeout(budget).to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::mock_provider::MockDetectorProvider;
    use crate::detector::schemas::Candidate;

    fn config_for(categories: &[SmellCategory]) -> AnalysisConfig {
        AnalysisConfig {
            enabled_categories: categories.to_vec(),
            ..AnalysisConfig::default()
        }
    }

    fn unit() -> CodeUnit {
        CodeUnit::parse("def f(a):\n    return a\n")
    }

    #[tokio::test]
    async fn test_run_invokes_each_category_once() {
        let provider = Arc::new(MockDetectorProvider::new());
        let categories = [SmellCategory::LongMethod, SmellCategory::MagicNumber];
        let orchestrator = DetectorOrchestrator::new(provider.clone(), &config_for(&categories));

        let run = orchestrator.run(&unit(), "def f(a):\n    return a\n").await;

        assert_eq!(run.outcomes.len(), 2);
        assert_eq!(provider.call_count(), 2);
        assert_eq!(run.usage.calls_attempted, 2);
        assert_eq!(run.usage.calls_succeeded, 2);
        assert_eq!(run.usage.calls_failed, 0);
        assert_eq!(run.usage.tokens.total_tokens, 300);
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_its_category() {
        let provider = Arc::new(
            MockDetectorProvider::new()
                .failing_for(SmellCategory::LongMethod)
                .with_candidates(
                    SmellCategory::MagicNumber,
                    vec![Candidate {
                        detected: Some(true),
                        description: Some("Magic number 9.81 at line 2".to_string()),
                        line_no: Some(2),
                        ..Default::default()
                    }],
                ),
        );
        let categories = [SmellCategory::LongMethod, SmellCategory::MagicNumber];
        let orchestrator = DetectorOrchestrator::new(provider, &config_for(&categories));

        let run = orchestrator.run(&unit(), "x = 9.81\n").await;

        assert_eq!(run.usage.calls_failed, 1);
        assert_eq!(run.usage.calls_succeeded, 1);

        let failed: Vec<_> = run.outcomes.iter().filter(|o| o.failed()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].category, SmellCategory::LongMethod);

        let magic = run
            .outcomes
            .iter()
            .find(|o| o.category == SmellCategory::MagicNumber)
            .unwrap();
        assert_eq!(magic.candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_output_recovers_bare_list() {
        let provider = Arc::new(MockDetectorProvider::new().with_raw_response(
            SmellCategory::LongStatement,
            r#"[{"line_number": 3, "line_length": 140}]"#,
        ));
        let orchestrator =
            DetectorOrchestrator::new(provider, &config_for(&[SmellCategory::LongStatement]));

        let run = orchestrator.run(&unit(), "x = 1\n").await;
        let outcome = &run.outcomes[0];
        assert!(!outcome.failed());
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].line_length, Some(140));
    }

    #[tokio::test]
    async fn test_unrecoverable_output_is_counted_failure() {
        let provider = Arc::new(
            MockDetectorProvider::new()
                .with_raw_response(SmellCategory::LongStatement, "certainly! here are the smells"),
        );
        let orchestrator =
            DetectorOrchestrator::new(provider, &config_for(&[SmellCategory::LongStatement]));

        let run = orchestrator.run(&unit(), "x = 1\n").await;
        assert_eq!(run.usage.calls_failed, 1);
        assert!(run.outcomes[0].candidates.is_empty());
    }

    #[tokio::test]
    async fn test_call_timeout_fails_category_only() {
        let provider = Arc::new(
            MockDetectorProvider::new().with_delay(Duration::from_millis(200)),
        );
        let mut config = config_for(&[SmellCategory::LongMethod, SmellCategory::MagicNumber]);
        config.call_timeout_secs = 0; // floor: every call times out immediately
        let orchestrator = DetectorOrchestrator::new(provider, &config);

        let run = orchestrator.run(&unit(), "x = 1\n").await;
        assert_eq!(run.usage.calls_failed, 2);
        assert!(run.outcomes.iter().all(|o| o.failed()));
    }

    #[tokio::test]
    async fn test_sequential_mode_matches_concurrent_results() {
        let candidates = vec![Candidate {
            detected: Some(true),
            method_name: Some("f".to_string()),
            total_lines: Some(90),
            ..Default::default()
        }];

        let mut sequential = config_for(&[SmellCategory::LongMethod]);
        sequential.execution = ExecutionMode::Sequential { pacing_ms: 1 };
        let provider = Arc::new(
            MockDetectorProvider::new()
                .with_candidates(SmellCategory::LongMethod, candidates.clone()),
        );
        let run_seq = DetectorOrchestrator::new(provider, &sequential)
            .run(&unit(), "x = 1\n")
            .await;

        let provider = Arc::new(
            MockDetectorProvider::new().with_candidates(SmellCategory::LongMethod, candidates),
        );
        let run_conc = DetectorOrchestrator::new(provider, &config_for(&[SmellCategory::LongMethod]))
            .run(&unit(), "x = 1\n")
            .await;

        assert_eq!(run_seq.outcomes.len(), run_conc.outcomes.len());
        assert_eq!(
            run_seq.outcomes[0].candidates.len(),
            run_conc.outcomes[0].candidates.len()
        );
    }
}
