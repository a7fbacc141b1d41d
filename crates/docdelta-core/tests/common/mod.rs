use docdelta_core::model::{PageText, Range, Rect, TextBlock};

/// Line height and glyph advance of the synthetic layout
pub const LINE_HEIGHT: f64 = 12.0;
pub const GLYPH_WIDTH: f64 = 6.0;

/// A page laid out one block per line (newline included in the block)
#[allow(dead_code)]
pub fn page(page_index: u32, text: &str) -> PageText {
    let mut blocks = Vec::new();
    let mut position = 0;
    for (row, line) in text.split_inclusive('\n').enumerate() {
        let len = line.chars().count();
        blocks.push(TextBlock::new(
            Range::new(position, len),
            Rect::new(
                0.0,
                row as f64 * LINE_HEIGHT,
                len as f64 * GLYPH_WIDTH,
                LINE_HEIGHT,
            ),
        ));
        position += len;
    }
    PageText {
        page_index,
        text: text.to_string(),
        blocks,
    }
}

/// Pages numbered from zero
#[allow(dead_code)]
pub fn pages(texts: &[&str]) -> Vec<PageText> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| page(i as u32, text))
        .collect()
}
