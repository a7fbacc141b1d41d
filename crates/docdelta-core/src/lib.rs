//! docdelta core - document text-comparison kernel
//!
//! Synchronous, I/O-free building blocks of a document comparison:
//! - `RangeIndex`: page text offsets back to the text blocks that drew them
//! - `align`: Myers shortest edit script over word or character tokens
//! - `hunk`: context-window grouping of the aligned stream
//! - `assemble`: page attribution and the top-level `compare_pages`
//! - `ai`: data model, change payloads and phase machine of the AI layer
//! - `operation`: the per-run `ComparisonOperation` configuration
//!
//! Document loading, extraction and the AI service are collaborators driven
//! by the engine crate.

pub mod ai;
pub mod align;
pub mod assemble;
pub mod errors;
pub mod hunk;
pub mod logging_facility;
pub mod model;
pub mod operation;
pub mod range_index;
pub mod summary;

pub use docdelta_core_types as types;

// Re-export commonly used types
pub use assemble::{compare_pages, PageComparisonAssembler};
pub use errors::{CompareError, ExError, ExErrorKind, Result};
pub use model::{
    ComparisonDocuments, DocumentComparisonResult, DocumentDescriptor, DocumentSide, PageText,
};
pub use operation::{AiComparisonOptions, AiOperationType, ComparisonOperation, TextComparisonOptions};
pub use range_index::{RangeCursor, RangeIndex};
pub use summary::render_human_summary;
