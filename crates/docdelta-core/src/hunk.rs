//! Hunk building
//!
//! Positions an aligned operation stream on both sides and groups it into
//! hunks. Interior equal runs longer than twice the context window are cut:
//! the first `N` words close the running hunk, the last `N` words open the
//! next one, and the middle is dropped. Equal text before the first change
//! and after the last change stays attached to the first and last hunk.
//!
//! Ranges here are document-wide (over the concatenated page text of each
//! side); the assembler maps them back to pages.

use crate::align::{is_word, tokenize, AlignedOperation, Granularity};
use crate::errors::{CompareError, Result};
use crate::model::{OperationType, Range};

/// An operation with its ranges on both sides
///
/// The range of the side an operation does not touch is zero-length at the
/// current position of that side.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedOperation {
    pub op_type: OperationType,
    pub text: String,
    pub original: Range,
    pub changed: Range,
}

/// A hunk before page attribution
#[derive(Debug, Clone, PartialEq)]
pub struct RawHunk {
    pub original_range: Range,
    pub changed_range: Range,
    pub operations: Vec<PositionedOperation>,
}

/// Assign document-wide ranges to every operation
pub fn position_operations(ops: &[AlignedOperation]) -> Vec<PositionedOperation> {
    let mut original_pos = 0;
    let mut changed_pos = 0;

    ops.iter()
        .map(|op| {
            let len = op.text.chars().count();
            let original_len = if op.op_type.touches_original() { len } else { 0 };
            let changed_len = if op.op_type.touches_changed() { len } else { 0 };
            let positioned = PositionedOperation {
                op_type: op.op_type,
                text: op.text.clone(),
                original: Range::new(original_pos, original_len),
                changed: Range::new(changed_pos, changed_len),
            };
            original_pos += original_len;
            changed_pos += changed_len;
            positioned
        })
        .collect()
}

/// Group an aligned stream into hunks
///
/// A stream without any insert or delete yields no hunks.
///
/// # Errors
///
/// `InconsistentAlignment` if the resulting hunks do not cover contiguous,
/// increasing ranges on both sides.
pub fn build_hunks(ops: &[AlignedOperation], number_of_context_words: usize) -> Result<Vec<RawHunk>> {
    let positioned = position_operations(ops);

    let changes: Vec<usize> = positioned
        .iter()
        .enumerate()
        .filter(|(_, op)| op.op_type.is_change())
        .map(|(i, _)| i)
        .collect();
    let (Some(&first_change), Some(&last_change)) = (changes.first(), changes.last()) else {
        tracing::debug!(operation_count = ops.len(), "no changes, no hunks");
        return Ok(Vec::new());
    };

    let mut hunks = Vec::new();
    let mut current: Vec<PositionedOperation> = Vec::new();

    for (i, op) in positioned.into_iter().enumerate() {
        let interior = i > first_change && i < last_change;
        if !interior || op.op_type != OperationType::Equal {
            current.push(op);
            continue;
        }

        match split_context(&op, number_of_context_words) {
            None => current.push(op),
            Some((head, tail)) => {
                current.extend(head);
                if !current.is_empty() {
                    hunks.push(close(std::mem::take(&mut current))?);
                }
                current.extend(tail);
            }
        }
    }
    hunks.push(close(current)?);

    tracing::debug!(
        operation_count = ops.len(),
        hunk_count = hunks.len(),
        context_words = number_of_context_words,
        "built hunks"
    );
    Ok(hunks)
}

/// Cut an equal run holding more than `2 * n` words into its first and last
/// `n` words. Returns `None` when the run stays whole.
fn split_context(
    op: &PositionedOperation,
    n: usize,
) -> Option<(Option<PositionedOperation>, Option<PositionedOperation>)> {
    let tokens = tokenize(&op.text, Granularity::Word);
    let word_count = tokens.iter().filter(|t| is_word(t)).count();
    if word_count <= 2 * n {
        return None;
    }

    // Code-point offset just past the n-th word, and at the start of the
    // (word_count - n)-th word counted from zero.
    let mut head_end = 0;
    let mut tail_start = 0;
    let mut words_seen = 0;
    let mut offset = 0;
    for token in &tokens {
        let len = token.chars().count();
        if is_word(token) {
            if words_seen == word_count - n {
                tail_start = offset;
            }
            words_seen += 1;
            if words_seen == n {
                head_end = offset + len;
            }
        }
        offset += len;
    }
    if n == 0 {
        tail_start = offset;
    }

    let head = (head_end > 0).then(|| sub_operation(op, 0, head_end));
    let tail = (tail_start < offset).then(|| sub_operation(op, tail_start, offset));
    Some((head, tail))
}

/// Slice `[start, end)` code points out of an equal operation
fn sub_operation(op: &PositionedOperation, start: usize, end: usize) -> PositionedOperation {
    let text: String = op.text.chars().skip(start).take(end - start).collect();
    PositionedOperation {
        op_type: op.op_type,
        text,
        original: Range::from_bounds(op.original.position + start, op.original.position + end),
        changed: Range::from_bounds(op.changed.position + start, op.changed.position + end),
    }
}

fn close(operations: Vec<PositionedOperation>) -> Result<RawHunk> {
    let (Some(first), Some(last)) = (operations.first(), operations.last()) else {
        return Err(CompareError::InconsistentAlignment {
            reason: "hunk without operations".to_string(),
        });
    };
    let hunk = RawHunk {
        original_range: Range::from_bounds(first.original.position, last.original.end()),
        changed_range: Range::from_bounds(first.changed.position, last.changed.end()),
        operations,
    };
    check_hunk(&hunk)?;
    Ok(hunk)
}

/// Contiguous, increasing ranges on both sides and text lengths matching
/// the ranges of the sides each operation touches.
pub fn check_hunk(hunk: &RawHunk) -> Result<()> {
    let mut original_end = hunk.original_range.position;
    let mut changed_end = hunk.changed_range.position;

    for (i, op) in hunk.operations.iter().enumerate() {
        if op.original.position != original_end || op.changed.position != changed_end {
            return Err(CompareError::InconsistentAlignment {
                reason: format!(
                    "operation {} starts at {}/{} but previous ended at {}/{}",
                    i, op.original.position, op.changed.position, original_end, changed_end
                ),
            });
        }

        let len = op.text.chars().count();
        let expected_original = if op.op_type.touches_original() { len } else { 0 };
        let expected_changed = if op.op_type.touches_changed() { len } else { 0 };
        if op.original.length != expected_original || op.changed.length != expected_changed {
            return Err(CompareError::InconsistentAlignment {
                reason: format!(
                    "{:?} operation {} has text of length {} but ranges {:?}/{:?}",
                    op.op_type, i, len, op.original, op.changed
                ),
            });
        }

        original_end = op.original.end();
        changed_end = op.changed.end();
    }

    if original_end != hunk.original_range.end() || changed_end != hunk.changed_range.end() {
        return Err(CompareError::InconsistentAlignment {
            reason: "hunk range does not end at its last operation".to_string(),
        });
    }
    Ok(())
}
