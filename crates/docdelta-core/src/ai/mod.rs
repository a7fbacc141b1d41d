//! AI-assisted analysis and tagging on top of the structural diff
//!
//! The kernel side is pure: the data model, the change payload transform and
//! the phase transition function. Driving the service call, cancellation and
//! timeouts lives in the engine.

pub mod model;
pub mod payload;
pub mod state;

pub use model::{
    is_analysis_result, is_tagging_result, AIADocumentChangePayload,
    AIADocumentChangesAnalysisResponse, AIADocumentChangesTaggingResponse, AIComparisonData,
    AIComparisonError, AIComparisonPhase, AIDocumentComparisonResult, AIEnhancedChange,
    AIErrorPhase, AiServiceResponse, TaggedChangeReference,
};
pub use payload::transform_changes;
pub use state::{transition, AIComparisonEvent};
