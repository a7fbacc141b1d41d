//! docdelta engine - asynchronous comparison orchestration
//!
//! Drives the synchronous kernel in `docdelta-core` against host-provided
//! collaborators: a document opener, a per-page text extractor and an
//! optional AI text service.
//!
//! - `Comparator::compare`: one-shot text or AI comparison
//! - `ComparisonSession`: one active AI orchestration with cancellation and
//!   observable phase snapshots
//! - `PlainTextBackend`: form-feed paged UTF-8 text as a document source

pub mod collaborators;
mod orchestrator;
pub mod pipeline;
pub mod plain_text;
pub mod session;
pub mod settings;

pub use collaborators::{
    AiTextService, CollaboratorError, CollaboratorResult, DocumentHandle, DocumentOpener,
    TextBlockExtractor,
};
pub use pipeline::{ComparisonOutcome, Comparator};
pub use plain_text::{PlainTextBackend, PlainTextDocument, PlainTextLayout};
pub use session::{ComparisonRun, ComparisonSession};
pub use settings::EngineSettings;
