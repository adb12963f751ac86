//! Detector boundary
//!
//! The external capability that proposes candidate findings, one smell
//! category per call. The provider abstraction hides the transport (an
//! OpenAI-compatible endpoint in production, a deterministic mock in tests);
//! the schema module quarantines the untrusted wire shapes and their lenient
//! decoding. Nothing downstream touches a candidate that has not been
//! decoded here and validated afterwards.

pub mod mock_provider;
pub mod prompts;
pub mod provider;
pub mod schemas;

pub use mock_provider::MockDetectorProvider;
pub use provider::{
    DetectorError, DetectorProvider, DetectorRequest, DetectorResponse, OpenAiDetectorProvider,
};
pub use schemas::{decode_candidates, Candidate, CandidateReport};
