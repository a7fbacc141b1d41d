//! Offset → text block lookup for one page
//!
//! Diff operations carry code-point ranges into a page's text buffer. The
//! visual layer needs the rectangles that drew those characters, so every
//! range is translated into the whole blocks it touches. Blocks are never
//! subdivided: a block is returned as soon as any of its characters is in
//! the query range.

use crate::errors::{CompareError, Result};
use crate::model::{PageText, Range, TextBlock};

/// Sorted, validated block table of one page
#[derive(Debug, Clone, PartialEq)]
pub struct RangeIndex {
    page_index: u32,
    text_len: usize,
    blocks: Vec<TextBlock>,
}

impl RangeIndex {
    /// Build the index in O(n).
    ///
    /// # Errors
    ///
    /// `InvalidPageLayout` if blocks overlap, are out of reading order, or
    /// extend past `text_len`.
    pub fn new(page_index: u32, text_len: usize, blocks: Vec<TextBlock>) -> Result<Self> {
        let mut previous_end = 0;
        for (i, block) in blocks.iter().enumerate() {
            if block.range.position < previous_end {
                return Err(CompareError::InvalidPageLayout {
                    page_index,
                    reason: format!(
                        "block {} starts at {} before the previous block ends at {}",
                        i, block.range.position, previous_end
                    ),
                });
            }
            if block.range.end() > text_len {
                return Err(CompareError::InvalidPageLayout {
                    page_index,
                    reason: format!(
                        "block {} ends at {} past the page text length {}",
                        i,
                        block.range.end(),
                        text_len
                    ),
                });
            }
            previous_end = block.range.end();
        }

        Ok(Self {
            page_index,
            text_len,
            blocks,
        })
    }

    /// # Errors
    ///
    /// See [`RangeIndex::new`].
    pub fn from_page(page: &PageText) -> Result<Self> {
        Self::new(page.page_index, page.char_len(), page.blocks.clone())
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn text_len(&self) -> usize {
        self.text_len
    }

    pub fn blocks(&self) -> &[TextBlock] {
        &self.blocks
    }

    /// Every block whose range intersects `range`, in reading order.
    ///
    /// Zero-length queries intersect nothing and return an empty list.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `range` does not fit in the page text. This is a
    /// contract violation by the caller, not a user error.
    pub fn blocks_for_range(&self, range: Range) -> Result<Vec<TextBlock>> {
        self.check_bounds(range)?;
        let start = self.first_candidate(range.position);
        Ok(self.collect_from(start, range))
    }

    /// A cursor for scanning ranges in increasing order
    pub fn cursor(&self) -> RangeCursor<'_> {
        RangeCursor {
            index: self,
            next: 0,
        }
    }

    /// Range of the block at `block_index`
    pub fn range_of(&self, block_index: usize) -> Option<Range> {
        self.blocks.get(block_index).map(|b| b.range)
    }

    /// Smallest range spanning all of `blocks`
    pub fn covering_range(blocks: &[TextBlock]) -> Option<Range> {
        let start = blocks.iter().map(|b| b.range.position).min()?;
        let end = blocks.iter().map(|b| b.range.end()).max()?;
        Some(Range::from_bounds(start, end))
    }

    fn check_bounds(&self, range: Range) -> Result<()> {
        if range.position > self.text_len || range.end() > self.text_len {
            return Err(CompareError::OutOfBounds {
                position: range.position,
                length: range.length,
                text_len: self.text_len,
            });
        }
        Ok(())
    }

    /// Index of the first block ending after `position`
    fn first_candidate(&self, position: usize) -> usize {
        self.blocks.partition_point(|b| b.range.end() <= position)
    }

    fn collect_from(&self, start: usize, range: Range) -> Vec<TextBlock> {
        self.blocks[start..]
            .iter()
            .take_while(|b| b.range.position < range.end())
            .filter(|b| b.range.intersects(&range))
            .copied()
            .collect()
    }
}

/// Monotonically advancing lookup over a [`RangeIndex`]
///
/// Hunk assembly queries ranges in increasing order, so the cursor only
/// walks forward; a query that moves backwards falls back to binary search.
#[derive(Debug, Clone)]
pub struct RangeCursor<'a> {
    index: &'a RangeIndex,
    next: usize,
}

impl RangeCursor<'_> {
    /// Same contract as [`RangeIndex::blocks_for_range`]
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `range` does not fit in the page text.
    pub fn blocks_for_range(&mut self, range: Range) -> Result<Vec<TextBlock>> {
        self.index.check_bounds(range)?;
        let blocks = &self.index.blocks;

        let moved_back = self.next > 0
            && self
                .next
                .checked_sub(1)
                .and_then(|i| blocks.get(i))
                .is_some_and(|b| b.range.end() > range.position);
        if moved_back {
            self.next = self.index.first_candidate(range.position);
        } else {
            while self.next < blocks.len() && blocks[self.next].range.end() <= range.position {
                self.next += 1;
            }
        }

        Ok(self.index.collect_from(self.next, range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;

    fn lines(lengths: &[usize]) -> (usize, Vec<TextBlock>) {
        let mut position = 0;
        let mut blocks = Vec::new();
        for (row, len) in lengths.iter().enumerate() {
            blocks.push(TextBlock::new(
                Range::new(position, *len),
                Rect::new(0.0, row as f64 * 10.0, *len as f64 * 5.0, 10.0),
            ));
            position += len;
        }
        (position, blocks)
    }

    #[test]
    fn test_returns_every_touched_block_whole() {
        let (len, blocks) = lines(&[5, 5, 5]);
        let index = RangeIndex::new(0, len, blocks.clone()).unwrap();
        let hit = index.blocks_for_range(Range::new(4, 2)).unwrap();
        assert_eq!(hit, vec![blocks[0], blocks[1]]);
    }

    #[test]
    fn test_zero_length_query_is_empty() {
        let (len, blocks) = lines(&[5, 5]);
        let index = RangeIndex::new(0, len, blocks).unwrap();
        assert!(index.blocks_for_range(Range::new(5, 0)).unwrap().is_empty());
        assert!(index.blocks_for_range(Range::new(10, 0)).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_bounds() {
        let (len, blocks) = lines(&[5, 5]);
        let index = RangeIndex::new(3, len, blocks).unwrap();
        assert_eq!(
            index.blocks_for_range(Range::new(11, 0)),
            Err(CompareError::OutOfBounds {
                position: 11,
                length: 0,
                text_len: 10
            })
        );
        assert!(index.blocks_for_range(Range::new(8, 3)).is_err());
    }

    #[test]
    fn test_rejects_overlapping_blocks() {
        let blocks = vec![
            TextBlock::new(Range::new(0, 5), Rect::default()),
            TextBlock::new(Range::new(4, 5), Rect::default()),
        ];
        assert!(matches!(
            RangeIndex::new(2, 9, blocks),
            Err(CompareError::InvalidPageLayout { page_index: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_block_past_text_end() {
        let blocks = vec![TextBlock::new(Range::new(0, 6), Rect::default())];
        assert!(RangeIndex::new(0, 5, blocks).is_err());
    }

    #[test]
    fn test_gaps_between_blocks_are_tolerated() {
        let blocks = vec![
            TextBlock::new(Range::new(0, 3), Rect::default()),
            TextBlock::new(Range::new(5, 3), Rect::default()),
        ];
        let index = RangeIndex::new(0, 8, blocks).unwrap();
        assert!(index.blocks_for_range(Range::new(3, 2)).unwrap().is_empty());
        assert_eq!(index.blocks_for_range(Range::new(2, 4)).unwrap().len(), 2);
    }

    #[test]
    fn test_cursor_matches_binary_search_forward_and_backward() {
        let (len, blocks) = lines(&[3, 4, 1, 6, 2]);
        let index = RangeIndex::new(0, len, blocks).unwrap();
        let mut cursor = index.cursor();
        let queries = [
            Range::new(0, 2),
            Range::new(2, 3),
            Range::new(7, 1),
            Range::new(8, 6),
            Range::new(1, 9),
            Range::new(14, 2),
        ];
        for q in queries {
            assert_eq!(
                cursor.blocks_for_range(q).unwrap(),
                index.blocks_for_range(q).unwrap(),
                "query {:?}",
                q
            );
        }
    }

    #[test]
    fn test_inverse_lookup() {
        let (len, blocks) = lines(&[3, 4]);
        let index = RangeIndex::new(0, len, blocks.clone()).unwrap();
        assert_eq!(index.range_of(1), Some(Range::new(3, 4)));
        assert_eq!(index.range_of(2), None);
        assert_eq!(RangeIndex::covering_range(&blocks), Some(Range::new(0, 7)));
        assert_eq!(RangeIndex::covering_range(&[]), None);
    }
}
