//! Ranges, rectangles and extracted page text

use serde::{Deserialize, Serialize};

/// Half-open interval `[position, position + length)` into a page's text,
/// measured in Unicode code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    pub position: usize,
    pub length: usize,
}

impl Range {
    pub fn new(position: usize, length: usize) -> Self {
        Self { position, length }
    }

    /// Range spanning `start..end`; `end` must not precede `start`
    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self {
            position: start,
            length: end.saturating_sub(start),
        }
    }

    pub fn end(&self) -> usize {
        self.position + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// True when the two ranges share at least one code point
    pub fn intersects(&self, other: &Range) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.position < other.end()
            && other.position < self.end()
    }
}

/// Axis-aligned rectangle in page space, serialized as `[left, top, width, height]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

impl From<[f64; 4]> for Rect {
    fn from([left, top, width, height]: [f64; 4]) -> Self {
        Self::new(left, top, width, height)
    }
}

impl From<Rect> for [f64; 4] {
    fn from(r: Rect) -> Self {
        [r.left, r.top, r.width, r.height]
    }
}

/// A page-space rectangle paired with the text range it draws
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub range: Range,
    pub rect: Rect,
}

impl TextBlock {
    pub fn new(range: Range, rect: Rect) -> Self {
        Self { range, rect }
    }
}

/// Text of one page as returned by the extraction collaborator
///
/// `blocks` are in reading order and their ranges index into `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageText {
    pub page_index: u32,
    pub text: String,
    pub blocks: Vec<TextBlock>,
}

impl PageText {
    /// Length of the page buffer in code points
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_intersection_is_half_open() {
        let a = Range::new(0, 5);
        assert!(a.intersects(&Range::new(4, 3)));
        assert!(!a.intersects(&Range::new(5, 3)));
        assert!(!a.intersects(&Range::new(2, 0)));
    }

    #[test]
    fn test_rect_serializes_as_array() {
        let rect = Rect::new(1.0, 2.0, 30.0, 12.0);
        let json = serde_json::to_string(&rect).unwrap();
        assert_eq!(json, "[1.0,2.0,30.0,12.0]");
        let back: Rect = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rect);
    }

    #[test]
    fn test_char_len_counts_code_points() {
        let page = PageText {
            page_index: 0,
            text: "naïve".to_string(),
            blocks: Vec::new(),
        };
        assert_eq!(page.char_len(), 5);
    }
}
