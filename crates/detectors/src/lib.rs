//! Nioi Detectors - Code Smell Analysis Pipeline
//!
//! This crate turns one Python source file and a set of unreliable,
//! LLM-backed candidate detectors into a trustworthy smell report. The
//! deterministic side (tree-sitter parsing, validation thresholds, location
//! resolution) is the ground truth; everything a detector returns is treated
//! as untrusted until it survives decoding, validation, and enrichment.

#![allow(dead_code)]

pub mod analyzer;
pub mod core;
pub mod detector;
pub mod enrich;
pub mod orchestrator;
pub mod report;
pub mod structure;
pub mod validate;

pub use analyzer::{AnalysisError, SmellAnalyzer};

pub use core::{
    AnalysisCache, AnalysisConfig, EnrichedFinding, ExecutionMode, FileContext, Location,
    ProviderConfig, SmellCategory, SmellRecord, TokenUsage, UsageSummary, ValidationPolicy,
};

pub use detector::{
    Candidate, DetectorError, DetectorProvider, DetectorRequest, DetectorResponse,
    MockDetectorProvider, OpenAiDetectorProvider,
};

pub use enrich::FindingEnricher;

pub use orchestrator::{CategoryOutcome, CategoryRegistry, DetectorOrchestrator, OrchestratorRun};

pub use report::AnalysisReport;

pub use structure::{ClassInfo, CodeUnit, FunctionInfo, LineRange};

pub use validate::FindingValidator;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
