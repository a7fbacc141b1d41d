//! Comparison result types (JSON wire format)

use serde::{Deserialize, Serialize};

use crate::model::{Range, TextBlock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Insert,
    Delete,
    Equal,
}

impl OperationType {
    /// Whether the operation consumes text of the original document
    pub fn touches_original(&self) -> bool {
        matches!(self, OperationType::Delete | OperationType::Equal)
    }

    /// Whether the operation consumes text of the changed document
    pub fn touches_changed(&self) -> bool {
        matches!(self, OperationType::Insert | OperationType::Equal)
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, OperationType::Equal)
    }
}

/// Smallest diff unit, anchored to the blocks that draw its text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(rename = "type")]
    pub op_type: OperationType,
    pub text: String,
    pub original_text_blocks: Vec<TextBlock>,
    pub changed_text_blocks: Vec<TextBlock>,
}

/// Contiguous group of operations with page-local ranges on both sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    pub original_range: Range,
    pub changed_range: Range,
    pub operations: Vec<Operation>,
}

impl Hunk {
    /// Original-side text covered by this hunk (equal + delete)
    pub fn original_text(&self) -> String {
        self.operations
            .iter()
            .filter(|op| op.op_type.touches_original())
            .map(|op| op.text.as_str())
            .collect()
    }

    /// Changed-side text covered by this hunk (equal + insert)
    pub fn changed_text(&self) -> String {
        self.operations
            .iter()
            .filter(|op| op.op_type.touches_changed())
            .map(|op| op.text.as_str())
            .collect()
    }

    pub fn has_changes(&self) -> bool {
        self.operations.iter().any(|op| op.op_type.is_change())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextComparisonResult {
    pub hunks: Vec<Hunk>,
}

/// One entry per comparison granularity; only text comparison exists today
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComparisonResult {
    Text(TextComparisonResult),
}

impl ComparisonResult {
    pub fn hunks(&self) -> &[Hunk] {
        match self {
            ComparisonResult::Text(text) => &text.hunks,
        }
    }
}

/// Comparison of one page pair; at least one index is present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageComparisonResult {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub original_page_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub changed_page_index: Option<u32>,
    pub comparison_results: Vec<ComparisonResult>,
}

impl PageComparisonResult {
    pub fn hunks(&self) -> impl Iterator<Item = &Hunk> {
        self.comparison_results.iter().flat_map(|r| r.hunks())
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.hunks().flat_map(|h| h.operations.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentComparisonResult {
    pub document_comparison_results: Vec<PageComparisonResult>,
}

impl DocumentComparisonResult {
    pub fn pages(&self) -> &[PageComparisonResult] {
        &self.document_comparison_results
    }

    pub fn hunks(&self) -> impl Iterator<Item = &Hunk> {
        self.document_comparison_results.iter().flat_map(|p| p.hunks())
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.hunks().flat_map(|h| h.operations.iter())
    }

    /// Number of insert and delete operations
    pub fn change_count(&self) -> usize {
        self.operations().filter(|op| op.op_type.is_change()).count()
    }
}
