//! Core types shared across the pipeline
//!
//! The smell category taxonomy, resolved finding and export-record shapes,
//! call and token accounting, configuration surface, and the request-scoped
//! file context and parse cache. Everything here is plain data: the stages
//! that produce and consume these types live in their own modules.

pub mod category;
pub mod config;
pub mod context;
pub mod result;
pub mod usage;

pub use category::SmellCategory;
pub use config::{
    AnalysisConfig, ExecutionMode, InputLimits, ProviderConfig, ValidationPolicy,
};
pub use context::{AnalysisCache, FileContext};
pub use result::{EnrichedFinding, Location, SmellRecord};
pub use usage::{CallUsage, TokenUsage, UsageSummary};
