//! Human-readable summary renderer for document comparisons.

use crate::model::{DocumentComparisonResult, OperationType, PageComparisonResult};

/// Longest operation text quoted verbatim in the summary
const MAX_QUOTE_CHARS: usize = 80;

/// Render a Markdown summary of a comparison result.
///
/// `None` (nothing to compare) renders as a short "no differences" note.
/// The summary is informational only and does not affect the structured
/// result.
pub fn render_human_summary(result: Option<&DocumentComparisonResult>) -> String {
    let mut out = String::new();

    out.push_str("## Document Comparison\n\n");

    let Some(result) = result.filter(|r| r.change_count() > 0) else {
        out.push_str("_No differences found._\n");
        return out;
    };

    let inserts = count(result.operations().map(|op| op.op_type), OperationType::Insert);
    let deletes = count(result.operations().map(|op| op.op_type), OperationType::Delete);
    out.push_str(&format!(
        "**Page pairs**: {}  \n**Hunks**: {}  \n**Insertions**: {inserts}  \n**Deletions**: {deletes}\n\n",
        result.pages().len(),
        result.hunks().count(),
    ));

    for page in result.pages() {
        if !page.operations().any(|op| op.op_type.is_change()) {
            continue;
        }
        out.push_str(&format!("### {}\n\n", page_heading(page)));

        for op in page.operations() {
            let marker = match op.op_type {
                OperationType::Insert => "+",
                OperationType::Delete => "-",
                OperationType::Equal => continue,
            };
            out.push_str(&format!("- `{}` {}\n", marker, quote(&op.text)));
        }
        out.push('\n');
    }

    out
}

fn page_heading(page: &PageComparisonResult) -> String {
    match (page.original_page_index, page.changed_page_index) {
        (Some(o), Some(c)) if o == c => format!("Page {}", o + 1),
        (Some(o), Some(c)) => format!("Page {} → {}", o + 1, c + 1),
        (Some(o), None) => format!("Page {} (removed)", o + 1),
        (None, Some(c)) => format!("Page {} (added)", c + 1),
        (None, None) => "Unpaired text".to_string(),
    }
}

fn count(types: impl Iterator<Item = OperationType>, wanted: OperationType) -> usize {
    types.filter(|t| *t == wanted).count()
}

/// Single-line, length-capped rendering of operation text
fn quote(text: &str) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    let flat = flat.trim();
    if flat.chars().count() > MAX_QUOTE_CHARS {
        let cut: String = flat.chars().take(MAX_QUOTE_CHARS).collect();
        format!("\"{}…\"", cut)
    } else {
        format!("\"{}\"", flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComparisonResult, Hunk, Operation, Range, TextComparisonResult};

    fn op(op_type: OperationType, text: &str) -> Operation {
        Operation {
            op_type,
            text: text.to_string(),
            original_text_blocks: Vec::new(),
            changed_text_blocks: Vec::new(),
        }
    }

    #[test]
    fn test_none_renders_no_differences() {
        let summary = render_human_summary(None);
        assert!(summary.contains("No differences"));
    }

    #[test]
    fn test_lists_changes_per_page() {
        let result = DocumentComparisonResult {
            document_comparison_results: vec![PageComparisonResult {
                original_page_index: Some(2),
                changed_page_index: None,
                comparison_results: vec![ComparisonResult::Text(TextComparisonResult {
                    hunks: vec![Hunk {
                        original_range: Range::new(0, 9),
                        changed_range: Range::default(),
                        operations: vec![op(OperationType::Delete, "Old annex\n")],
                    }],
                })],
            }],
        };
        let summary = render_human_summary(Some(&result));
        assert!(summary.contains("**Deletions**: 1"));
        assert!(summary.contains("### Page 3 (removed)"));
        assert!(summary.contains("- `-` \"Old annex\""));
    }

    #[test]
    fn test_long_text_is_cut() {
        let long = "word ".repeat(40);
        assert!(quote(&long).ends_with("…\""));
    }
}
