//! Detector orchestration
//!
//! Schedules the configured category detectors against one source file,
//! either with bounded concurrency or sequentially with pacing, and joins on
//! every category reaching a terminal state. Per-category failures never
//! cross category boundaries; the aggregate usage summary records them.

pub mod engine;
pub mod registry;

pub use engine::{CategoryOutcome, DetectorOrchestrator, OrchestratorRun};
pub use registry::{CategoryRegistry, DetectorTask};
