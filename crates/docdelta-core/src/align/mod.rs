//! Text alignment
//!
//! Produces the unpositioned operation stream between two texts: a minimal
//! edit script over word or character tokens, with adjacent tokens of the
//! same operation type reassembled into one operation.
//!
//! Comparison is over Unicode code points exactly as extracted. No NFC/NFD
//! normalization is applied and whitespace runs are compared verbatim.
//!
//! ```
//! use docdelta_core::align::{align, Granularity};
//! use docdelta_core::model::OperationType;
//!
//! let ops = align("The quick fox", "The quick brown fox", Granularity::Word);
//! assert_eq!(ops.len(), 3);
//! assert_eq!(ops[1].op_type, OperationType::Insert);
//! assert_eq!(ops[1].text, "brown ");
//! ```

pub mod tokenize;

use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices, Algorithm, DiffOp};

use crate::model::OperationType;

pub use tokenize::{is_word, tokenize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Character,
    #[default]
    Word,
}

/// Unpositioned diff operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedOperation {
    #[serde(rename = "type")]
    pub op_type: OperationType,
    pub text: String,
}

impl AlignedOperation {
    pub fn new(op_type: OperationType, text: impl Into<String>) -> Self {
        Self {
            op_type,
            text: text.into(),
        }
    }
}

/// Align two texts at the given granularity
pub fn align(original: &str, changed: &str, granularity: Granularity) -> Vec<AlignedOperation> {
    let original_tokens = tokenize(original, granularity);
    let changed_tokens = tokenize(changed, granularity);
    align_tokens(&original_tokens, &changed_tokens)
}

/// Align two pre-tokenized streams
///
/// Used when the caller needs control over token boundaries, e.g. to keep
/// tokens from spanning two pages.
pub fn align_tokens(original: &[&str], changed: &[&str]) -> Vec<AlignedOperation> {
    if original.is_empty() && changed.is_empty() {
        return Vec::new();
    }
    if original.is_empty() {
        return vec![AlignedOperation::new(OperationType::Insert, changed.concat())];
    }
    if changed.is_empty() {
        return vec![AlignedOperation::new(OperationType::Delete, original.concat())];
    }

    let prefix = original
        .iter()
        .zip(changed)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = original[prefix..]
        .iter()
        .rev()
        .zip(changed[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let original_middle = &original[prefix..original.len() - suffix];
    let changed_middle = &changed[prefix..changed.len() - suffix];

    let mut run = ChangeRun::default();
    run.equal(&original[..prefix]);
    for op in capture_diff_slices(Algorithm::Myers, original_middle, changed_middle) {
        match op {
            DiffOp::Equal { old_index, len, .. } => {
                run.equal(&original_middle[old_index..old_index + len]);
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => run.delete(&original_middle[old_index..old_index + old_len]),
            DiffOp::Insert {
                new_index, new_len, ..
            } => run.insert(&changed_middle[new_index..new_index + new_len]),
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                run.delete(&original_middle[old_index..old_index + old_len]);
                run.insert(&changed_middle[new_index..new_index + new_len]);
            }
        }
    }
    run.equal(&original[original.len() - suffix..]);
    run.finish()
}

/// Accumulates the edit stream. Deletions and insertions between two equal
/// runs are emitted deletions first, each merged into one operation.
#[derive(Default)]
struct ChangeRun {
    ops: Vec<AlignedOperation>,
    deleted: String,
    inserted: String,
}

impl ChangeRun {
    fn equal(&mut self, tokens: &[&str]) {
        if tokens.is_empty() {
            return;
        }
        self.flush();
        self.push(OperationType::Equal, tokens.concat());
    }

    fn delete(&mut self, tokens: &[&str]) {
        self.deleted.extend(tokens.iter().copied());
    }

    fn insert(&mut self, tokens: &[&str]) {
        self.inserted.extend(tokens.iter().copied());
    }

    fn flush(&mut self) {
        let deleted = std::mem::take(&mut self.deleted);
        let inserted = std::mem::take(&mut self.inserted);
        self.push(OperationType::Delete, deleted);
        self.push(OperationType::Insert, inserted);
    }

    fn push(&mut self, op_type: OperationType, text: String) {
        if text.is_empty() {
            return;
        }
        match self.ops.last_mut() {
            Some(last) if last.op_type == op_type => last.text.push_str(&text),
            _ => self.ops.push(AlignedOperation::new(op_type, text)),
        }
    }

    fn finish(mut self) -> Vec<AlignedOperation> {
        self.flush();
        self.ops
    }
}

/// Replay the stream from the original side: equal and delete text
pub fn original_text(ops: &[AlignedOperation]) -> String {
    ops.iter()
        .filter(|op| op.op_type.touches_original())
        .map(|op| op.text.as_str())
        .collect()
}

/// Replay the stream from the changed side: equal and insert text
pub fn changed_text(ops: &[AlignedOperation]) -> String {
    ops.iter()
        .filter(|op| op.op_type.touches_changed())
        .map(|op| op.text.as_str())
        .collect()
}
