//! # eventra-assist
//!
//! AI-assist boundary for eventra: the generation backend implementations
//! and the planning operations built on top of them.
//!
//! Every planner operation produces a useful result without a backend;
//! the backend only improves ranking and drafting. Backend failures are
//! logged and absorbed, never surfaced to API callers.

pub mod gemini;
pub mod mock;
pub mod planner;

pub use eventra_core::AssistBackend;
pub use gemini::{GeminiBackend, DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL};
pub use mock::MockAssistBackend;
pub use planner::{
    AnalyzeRequirementsRequest, AssistPlanner, AssistSource, CostBreakdown, GeneratedQuote,
    RecommendVenuesRequest, RequirementsAnalysis, VenueRecommendation, CANDIDATE_LIMIT,
    FALLBACK_CHEAPEST_LIMIT, RECOMMEND_COUNT,
};
