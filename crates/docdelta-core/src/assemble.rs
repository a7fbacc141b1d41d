//! Page attribution
//!
//! The aligner works on the concatenated text of all selected pages of a
//! side. This module keeps a page boundary table per side, cuts every hunk
//! operation at page boundaries, assigns the pieces to page pairs and
//! resolves their text blocks, so that no hunk ever references blocks from
//! two pages of the same side.
//!
//! Pairing follows the operation stream:
//! - an equal piece pairs the original and changed page it sits on;
//! - a delete (insert) piece joins the latest pair holding its original
//!   (changed) page, otherwise completes a pair that so far only has a
//!   changed (original) page, otherwise opens a one-sided pair.
//!
//! Results are ordered by first appearance in the stream.

use std::time::Instant;

use crate::align::{align_tokens, tokenize, AlignedOperation, Granularity};
use crate::errors::Result;
use crate::hunk::{build_hunks, PositionedOperation, RawHunk};
use crate::model::{
    ComparisonResult, DocumentComparisonResult, DocumentSide, Hunk, Operation, OperationType,
    PageComparisonResult, PageText, Range, TextComparisonResult,
};
use crate::operation::TextComparisonOptions;
use crate::range_index::{RangeCursor, RangeIndex};
use crate::{log_op_end, log_op_error, log_op_start};

#[derive(Debug, Clone)]
struct PageSlot {
    start: usize,
    index: RangeIndex,
}

/// Cumulative offset → page table of one side
#[derive(Debug, Clone)]
pub struct PageTable {
    side: DocumentSide,
    slots: Vec<PageSlot>,
    total_len: usize,
}

impl PageTable {
    /// # Errors
    ///
    /// `InvalidPageLayout` if a page's blocks do not fit its text.
    pub fn new(side: DocumentSide, pages: &[PageText]) -> Result<Self> {
        let mut slots = Vec::with_capacity(pages.len());
        let mut start = 0;
        for page in pages {
            let index = RangeIndex::from_page(page)?;
            let len = index.text_len();
            slots.push(PageSlot { start, index });
            start += len;
        }
        Ok(Self {
            side,
            slots,
            total_len: start,
        })
    }

    pub fn side(&self) -> DocumentSide {
        self.side
    }

    pub fn page_count(&self) -> usize {
        self.slots.len()
    }

    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Document page index of slot `slot`
    pub fn page_index(&self, slot: usize) -> u32 {
        self.slots[slot].index.page_index()
    }

    /// Slot holding `position`; a position on a boundary belongs to the
    /// later page.
    pub fn locate(&self, position: usize) -> Option<usize> {
        self.slots
            .partition_point(|s| s.start <= position)
            .checked_sub(1)
    }

    /// Page starts strictly inside `range`, relative to its start
    fn cuts_within(&self, range: Range) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .map(|s| s.start)
            .filter(move |start| *start > range.position && *start < range.end())
            .map(move |start| start - range.position)
    }

    /// `range` in coordinates of slot `slot`, clamped to the page
    fn localize(&self, slot: usize, range: Range) -> Range {
        let page = &self.slots[slot];
        let len = page.index.text_len();
        let start = range.position.saturating_sub(page.start).min(len);
        let end = range.end().saturating_sub(page.start).min(len);
        Range::from_bounds(start, end)
    }
}

/// A hunk operation cut to a single page per side
#[derive(Debug, Clone)]
struct Piece {
    hunk: usize,
    op: PositionedOperation,
}

#[derive(Debug, Default)]
struct PairBuilder {
    original: Option<usize>,
    changed: Option<usize>,
    pieces: Vec<Piece>,
}

/// Maps hunks over concatenated page text back to page pairs
pub struct PageComparisonAssembler<'a> {
    original_pages: &'a [PageText],
    changed_pages: &'a [PageText],
    original: PageTable,
    changed: PageTable,
}

impl<'a> PageComparisonAssembler<'a> {
    /// # Errors
    ///
    /// `InvalidPageLayout` if any page's blocks do not fit its text.
    pub fn new(original_pages: &'a [PageText], changed_pages: &'a [PageText]) -> Result<Self> {
        Ok(Self {
            original: PageTable::new(DocumentSide::Original, original_pages)?,
            changed: PageTable::new(DocumentSide::Changed, changed_pages)?,
            original_pages,
            changed_pages,
        })
    }

    pub fn table(&self, side: DocumentSide) -> &PageTable {
        match side {
            DocumentSide::Original => &self.original,
            DocumentSide::Changed => &self.changed,
        }
    }

    /// Token stream of one side, tokenized page by page
    pub fn tokens(&self, side: DocumentSide, granularity: Granularity) -> Vec<&'a str> {
        let pages = match side {
            DocumentSide::Original => self.original_pages,
            DocumentSide::Changed => self.changed_pages,
        };
        pages
            .iter()
            .flat_map(|page| tokenize(&page.text, granularity))
            .collect()
    }

    /// Align the concatenated text of both sides
    pub fn align(&self, granularity: Granularity) -> Vec<AlignedOperation> {
        let original = self.tokens(DocumentSide::Original, granularity);
        let changed = self.tokens(DocumentSide::Changed, granularity);
        align_tokens(&original, &changed)
    }

    /// Attribute hunks to page pairs
    ///
    /// Returns `None` when there are no hunks.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if a hunk range falls outside the page text, which
    /// means the hunks were not built from this assembler's pages.
    pub fn assemble(&self, hunks: &[RawHunk]) -> Result<Option<DocumentComparisonResult>> {
        if hunks.is_empty() {
            return Ok(None);
        }

        let mut pairing = Pairing::new(self.original.page_count(), self.changed.page_count());
        for (hunk_id, hunk) in hunks.iter().enumerate() {
            for op in &hunk.operations {
                for piece in self.split(op) {
                    let o = if piece.op_type.touches_original() {
                        self.original.locate(piece.original.position)
                    } else {
                        None
                    };
                    let c = if piece.op_type.touches_changed() {
                        self.changed.locate(piece.changed.position)
                    } else {
                        None
                    };
                    let pair = pairing.pair_for(piece.op_type, o, c);
                    pairing.pairs[pair].pieces.push(Piece {
                        hunk: hunk_id,
                        op: piece,
                    });
                }
            }
        }

        let mut original_cursors: Vec<RangeCursor<'_>> =
            self.original.slots.iter().map(|s| s.index.cursor()).collect();
        let mut changed_cursors: Vec<RangeCursor<'_>> =
            self.changed.slots.iter().map(|s| s.index.cursor()).collect();

        let mut results = Vec::with_capacity(pairing.pairs.len());
        for pair in pairing.pairs {
            let mut page_hunks: Vec<Hunk> = Vec::new();
            let mut current_hunk = None;
            for piece in pair.pieces {
                let (operation, original_local, changed_local) = self.resolve(
                    pair.original,
                    pair.changed,
                    &piece.op,
                    &mut original_cursors,
                    &mut changed_cursors,
                )?;

                match page_hunks.last_mut() {
                    Some(hunk) if current_hunk == Some(piece.hunk) => {
                        if piece.op.op_type.touches_original() {
                            hunk.original_range = extend(hunk.original_range, original_local);
                        }
                        if piece.op.op_type.touches_changed() {
                            hunk.changed_range = extend(hunk.changed_range, changed_local);
                        }
                        hunk.operations.push(operation);
                    }
                    _ => {
                        page_hunks.push(Hunk {
                            original_range: original_local,
                            changed_range: changed_local,
                            operations: vec![operation],
                        });
                        current_hunk = Some(piece.hunk);
                    }
                }
            }

            results.push(PageComparisonResult {
                original_page_index: pair.original.map(|slot| self.original.page_index(slot)),
                changed_page_index: pair.changed.map(|slot| self.changed.page_index(slot)),
                comparison_results: vec![ComparisonResult::Text(TextComparisonResult {
                    hunks: page_hunks,
                })],
            });
        }

        Ok(Some(DocumentComparisonResult {
            document_comparison_results: results,
        }))
    }

    /// Cut an operation at every page boundary of the sides it touches
    fn split(&self, op: &PositionedOperation) -> Vec<PositionedOperation> {
        let mut cuts: Vec<usize> = Vec::new();
        if op.op_type.touches_original() {
            cuts.extend(self.original.cuts_within(op.original));
        }
        if op.op_type.touches_changed() {
            cuts.extend(self.changed.cuts_within(op.changed));
        }
        if cuts.is_empty() {
            return vec![op.clone()];
        }
        cuts.sort_unstable();
        cuts.dedup();

        let chars: Vec<char> = op.text.chars().collect();
        let mut bounds = Vec::with_capacity(cuts.len() + 2);
        bounds.push(0);
        bounds.extend(cuts);
        bounds.push(chars.len());

        bounds
            .windows(2)
            .map(|w| {
                let (start, end) = (w[0], w[1]);
                let shift = |range: Range, touched: bool| {
                    if touched {
                        Range::from_bounds(range.position + start, range.position + end)
                    } else {
                        Range::new(range.position, 0)
                    }
                };
                PositionedOperation {
                    op_type: op.op_type,
                    text: chars[start..end].iter().collect(),
                    original: shift(op.original, op.op_type.touches_original()),
                    changed: shift(op.changed, op.op_type.touches_changed()),
                }
            })
            .collect()
    }

    fn local_ranges(
        &self,
        original: Option<usize>,
        changed: Option<usize>,
        op: &PositionedOperation,
    ) -> (Range, Range) {
        let original_local = original
            .map(|slot| self.original.localize(slot, op.original))
            .unwrap_or_default();
        let changed_local = changed
            .map(|slot| self.changed.localize(slot, op.changed))
            .unwrap_or_default();
        (original_local, changed_local)
    }

    /// Page-local ranges and text blocks of one piece within its pair
    fn resolve(
        &self,
        original: Option<usize>,
        changed: Option<usize>,
        op: &PositionedOperation,
        original_cursors: &mut [RangeCursor<'_>],
        changed_cursors: &mut [RangeCursor<'_>],
    ) -> Result<(Operation, Range, Range)> {
        let (original_local, changed_local) = self.local_ranges(original, changed, op);

        let original_text_blocks = match original {
            Some(slot) if op.op_type.touches_original() => {
                original_cursors[slot].blocks_for_range(original_local)?
            }
            _ => Vec::new(),
        };
        let changed_text_blocks = match changed {
            Some(slot) if op.op_type.touches_changed() => {
                changed_cursors[slot].blocks_for_range(changed_local)?
            }
            _ => Vec::new(),
        };

        let operation = Operation {
            op_type: op.op_type,
            text: op.text.clone(),
            original_text_blocks,
            changed_text_blocks,
        };
        Ok((operation, original_local, changed_local))
    }
}

/// Grow a hunk range by a piece's range on the same page. A hunk that so far
/// only has zero-length anchors on this side takes the piece's range.
fn extend(range: Range, piece: Range) -> Range {
    if range.is_empty() {
        piece
    } else {
        Range::from_bounds(range.position, piece.end())
    }
}

/// Page pair bookkeeping while walking the operation stream
struct Pairing {
    pairs: Vec<PairBuilder>,
    original_owner: Vec<Option<usize>>,
    changed_owner: Vec<Option<usize>>,
}

impl Pairing {
    fn new(original_pages: usize, changed_pages: usize) -> Self {
        Self {
            pairs: Vec::new(),
            original_owner: vec![None; original_pages],
            changed_owner: vec![None; changed_pages],
        }
    }

    fn pair_for(&mut self, op_type: OperationType, o: Option<usize>, c: Option<usize>) -> usize {
        match (op_type, o, c) {
            (OperationType::Equal, Some(o), Some(c)) => self.equal_pair(o, c),
            (OperationType::Delete, Some(o), _) => self.one_sided_pair(DocumentSide::Original, o),
            (OperationType::Insert, _, Some(c)) => self.one_sided_pair(DocumentSide::Changed, c),
            // Pieces are never empty, so the touched side always has a page.
            _ => self.open(o, c),
        }
    }

    fn equal_pair(&mut self, o: usize, c: usize) -> usize {
        match (self.original_owner[o], self.changed_owner[c]) {
            (Some(i), _) if self.pairs[i].changed == Some(c) => i,
            (Some(i), None) if self.pairs[i].changed.is_none() => {
                self.pairs[i].changed = Some(c);
                self.changed_owner[c] = Some(i);
                i
            }
            (None, Some(i)) if self.pairs[i].original.is_none() => {
                self.pairs[i].original = Some(o);
                self.original_owner[o] = Some(i);
                i
            }
            _ => self.open(Some(o), Some(c)),
        }
    }

    fn one_sided_pair(&mut self, side: DocumentSide, page: usize) -> usize {
        let owner = match side {
            DocumentSide::Original => self.original_owner[page],
            DocumentSide::Changed => self.changed_owner[page],
        };
        if let Some(i) = owner {
            return i;
        }

        // Complete the last pair if it only has the other side so far.
        if let Some(i) = self.pairs.len().checked_sub(1) {
            let last = &mut self.pairs[i];
            match side {
                DocumentSide::Original if last.original.is_none() => {
                    last.original = Some(page);
                    self.original_owner[page] = Some(i);
                    return i;
                }
                DocumentSide::Changed if last.changed.is_none() => {
                    last.changed = Some(page);
                    self.changed_owner[page] = Some(i);
                    return i;
                }
                _ => {}
            }
        }

        match side {
            DocumentSide::Original => self.open(Some(page), None),
            DocumentSide::Changed => self.open(None, Some(page)),
        }
    }

    fn open(&mut self, o: Option<usize>, c: Option<usize>) -> usize {
        let i = self.pairs.len();
        self.pairs.push(PairBuilder {
            original: o,
            changed: c,
            pieces: Vec::new(),
        });
        if let Some(o) = o {
            self.original_owner[o] = Some(i);
        }
        if let Some(c) = c {
            self.changed_owner[c] = Some(i);
        }
        i
    }
}

/// Run the structural comparison over extracted pages
///
/// Returns `None` when there is nothing to compare: no changes between the
/// two sides.
///
/// # Errors
///
/// Internal consistency errors (`InvalidPageLayout`, `OutOfBounds`,
/// `InconsistentAlignment`); these are defects, not user errors.
pub fn compare_pages(
    original_pages: &[PageText],
    changed_pages: &[PageText],
    options: &TextComparisonOptions,
) -> Result<Option<DocumentComparisonResult>> {
    let start = Instant::now();
    log_op_start!(
        "compare_pages",
        original_page_count = original_pages.len(),
        changed_page_count = changed_pages.len()
    );

    let result = run(original_pages, changed_pages, options);
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(outcome) => {
            let page_count = outcome.as_ref().map_or(0, |r| r.pages().len());
            let hunk_count = outcome.as_ref().map_or(0, |r| r.hunks().count());
            log_op_end!(
                "compare_pages",
                duration_ms = duration_ms,
                page_count = page_count,
                hunk_count = hunk_count
            );
        }
        Err(err) => log_op_error!("compare_pages", err.clone(), duration_ms = duration_ms),
    }
    result
}

fn run(
    original_pages: &[PageText],
    changed_pages: &[PageText],
    options: &TextComparisonOptions,
) -> Result<Option<DocumentComparisonResult>> {
    let assembler = PageComparisonAssembler::new(original_pages, changed_pages)?;
    let ops = assembler.align(options.granularity());
    let hunks = build_hunks(&ops, options.number_of_context_words)?;
    assembler.assemble(&hunks)
}
