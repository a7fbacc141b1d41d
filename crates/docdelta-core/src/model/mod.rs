//! Comparison data model
//!
//! Plain value types. Results own all their data (copied text and
//! rectangles) and never reference the documents they came from.

pub mod descriptor;
pub mod geometry;
pub mod result;

use serde::{Deserialize, Serialize};

pub use descriptor::{ComparisonDocuments, DocumentDescriptor, DocumentSource, PageSelection};
pub use geometry::{PageText, Range, Rect, TextBlock};
pub use result::{
    ComparisonResult, DocumentComparisonResult, Hunk, Operation, OperationType,
    PageComparisonResult, TextComparisonResult,
};

/// Which of the two compared documents something belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSide {
    Original,
    Changed,
}

impl DocumentSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentSide::Original => "original",
            DocumentSide::Changed => "changed",
        }
    }
}

impl std::fmt::Display for DocumentSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
