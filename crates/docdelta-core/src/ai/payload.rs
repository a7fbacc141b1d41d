//! Change payloads for the AI service
//!
//! Every insert/delete operation of the structural result becomes one flat
//! change record, with a little of the surrounding unchanged text.

use crate::align::{is_word, tokenize, Granularity};
use crate::model::{DocumentComparisonResult, Hunk, OperationType};

use super::model::AIADocumentChangePayload;

/// Flatten all changes of `result` into service payloads
///
/// Ids are `"{pair}-{hunk}-{operation}"` positions in the result and are
/// unique within it. `context_words` caps the context on each side.
pub fn transform_changes(
    result: &DocumentComparisonResult,
    context_words: usize,
) -> Vec<AIADocumentChangePayload> {
    let mut payloads = Vec::new();

    for (pair_idx, pair) in result.pages().iter().enumerate() {
        for (hunk_idx, hunk) in pair.hunks().enumerate() {
            for (op_idx, op) in hunk.operations.iter().enumerate() {
                let page = match op.op_type {
                    OperationType::Equal => continue,
                    OperationType::Insert => pair.changed_page_index.or(pair.original_page_index),
                    OperationType::Delete => pair.original_page_index.or(pair.changed_page_index),
                };
                payloads.push(AIADocumentChangePayload {
                    id: format!("{}-{}-{}", pair_idx, hunk_idx, op_idx),
                    change_type: op.op_type,
                    text: op.text.clone(),
                    context_before: context_before(hunk, op_idx, context_words),
                    context_after: context_after(hunk, op_idx, context_words),
                    page: page.unwrap_or_default(),
                });
            }
        }
    }
    payloads
}

fn context_before(hunk: &Hunk, op_idx: usize, words: usize) -> String {
    hunk.operations[..op_idx]
        .iter()
        .rev()
        .find(|op| op.op_type == OperationType::Equal)
        .map(|op| last_words(&op.text, words))
        .unwrap_or_default()
}

fn context_after(hunk: &Hunk, op_idx: usize, words: usize) -> String {
    hunk.operations[op_idx + 1..]
        .iter()
        .find(|op| op.op_type == OperationType::Equal)
        .map(|op| first_words(&op.text, words))
        .unwrap_or_default()
}

/// Leading text of `text` up to and including its `n`-th word
pub fn first_words(text: &str, n: usize) -> String {
    let mut seen = 0;
    let mut out = String::new();
    for token in tokenize(text, Granularity::Word) {
        if seen == n {
            break;
        }
        if is_word(token) {
            seen += 1;
        }
        out.push_str(token);
    }
    out.trim().to_string()
}

/// Trailing text of `text` starting at its `n`-th word from the end
pub fn last_words(text: &str, n: usize) -> String {
    let tokens = tokenize(text, Granularity::Word);
    let mut seen = 0;
    let mut start = tokens.len();
    for (i, token) in tokens.iter().enumerate().rev() {
        if seen == n {
            break;
        }
        if is_word(token) {
            seen += 1;
        }
        start = i;
    }
    tokens[start..].concat().trim().to_string()
}
