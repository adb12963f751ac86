//! End-to-end analysis pipeline.
//!
//! One entry point per request: gate the input, parse it, fan detectors out,
//! validate and enrich what they returned, and assemble the report. The only
//! failures that surface as errors are boundary rejections (empty or
//! oversized input); everything downstream degrades to fewer findings with
//! the degradation recorded in usage.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::config::AnalysisConfig;
use crate::core::context::{AnalysisCache, FileContext, UNKNOWN_FILE};
use crate::detector::provider::DetectorProvider;
use crate::enrich::FindingEnricher;
use crate::orchestrator::DetectorOrchestrator;
use crate::report::AnalysisReport;
use crate::validate::FindingValidator;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("source is empty")]
    EmptySource,

    #[error("source too large: {actual} {dimension} exceeds the limit of {limit}")]
    SourceTooLarge {
        dimension: &'static str,
        actual: usize,
        limit: usize,
    },
}

pub struct SmellAnalyzer {
    config: AnalysisConfig,
    orchestrator: DetectorOrchestrator,
    validator: FindingValidator,
    enricher: FindingEnricher,
    cache: AnalysisCache,
}

impl SmellAnalyzer {
    pub fn new(provider: Arc<dyn DetectorProvider>, config: AnalysisConfig) -> Self {
        let orchestrator = DetectorOrchestrator::new(provider, &config);
        let validator = FindingValidator::new(config.validation);
        Self {
            config,
            orchestrator,
            validator,
            enricher: FindingEnricher::new(),
            cache: AnalysisCache::default(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyzes one source file. `file_path` feeds the module/package
    /// context of every finding; absent, the configured unknown context is
    /// used.
    pub async fn analyze(
        &self,
        source: &str,
        file_path: Option<&str>,
        project: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        self.gate(source)?;

        let unit = self.cache.get_or_parse(source);
        if let Some(reason) = &unit.parse_error {
            debug!("analyzing unparsable source: {}", reason);
        }

        let context = FileContext::from_path(file_path.unwrap_or(UNKNOWN_FILE), project);

        let run = self.orchestrator.run(&unit, source).await;

        let mut per_category = Vec::with_capacity(run.outcomes.len());
        for outcome in &run.outcomes {
            let mut findings = Vec::new();
            for candidate in &outcome.candidates {
                if !self.validator.validate(outcome.category, candidate, &unit) {
                    continue;
                }
                if let Some(finding) =
                    self.enricher
                        .enrich(outcome.category, candidate, &unit, &context)
                {
                    findings.push(finding);
                }
            }
            per_category.push((outcome.category, findings));
        }

        let report = AnalysisReport::assemble(per_category, run.usage, unit.parse_error.clone());

        info!(
            findings = report.total_findings(),
            failed_calls = report.usage.calls_failed,
            "analysis complete"
        );

        Ok(report)
    }

    fn gate(&self, source: &str) -> Result<(), AnalysisError> {
        if source.trim().is_empty() {
            return Err(AnalysisError::EmptySource);
        }

        let limits = self.config.limits;
        if source.len() > limits.max_source_bytes {
            return Err(AnalysisError::SourceTooLarge {
                dimension: "bytes",
                actual: source.len(),
                limit: limits.max_source_bytes,
            });
        }

        let line_count = source.lines().count();
        if line_count > limits.max_source_lines {
            return Err(AnalysisError::SourceTooLarge {
                dimension: "lines",
                actual: line_count,
                limit: limits.max_source_lines,
            });
        }

        Ok(())
    }
}
