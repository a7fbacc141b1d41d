//! Plain-text document backend
//!
//! Treats UTF-8 text as a paged document: form feeds separate pages and
//! every line (newline included) is one text block laid out on a fixed
//! grid. Used by the CLI and as a reference collaborator in tests.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use docdelta_core::model::{DocumentSource, PageText, Range, Rect, TextBlock};
use docdelta_core_types::Sensitive;
use serde::{Deserialize, Serialize};

use crate::collaborators::{
    CollaboratorError, CollaboratorResult, DocumentHandle, DocumentOpener, TextBlockExtractor,
};

/// Page separator
pub const FORM_FEED: char = '\u{0C}';

/// Synthetic geometry of the line grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlainTextLayout {
    /// Horizontal advance of one code point
    pub glyph_width: f64,
    pub line_height: f64,
}

impl Default for PlainTextLayout {
    fn default() -> Self {
        Self {
            glyph_width: 6.0,
            line_height: 12.0,
        }
    }
}

impl PlainTextLayout {
    /// Lay out one page of text, one block per line
    pub fn layout_page(&self, page_index: u32, text: &str) -> PageText {
        let mut blocks = Vec::new();
        let mut position = 0;
        for (row, line) in text.split_inclusive('\n').enumerate() {
            let len = line.chars().count();
            blocks.push(TextBlock::new(
                Range::new(position, len),
                Rect::new(
                    0.0,
                    row as f64 * self.line_height,
                    len as f64 * self.glyph_width,
                    self.line_height,
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
}

/// An opened plain-text document
#[derive(Debug, Clone)]
pub struct PlainTextDocument {
    pages: Vec<String>,
}

impl PlainTextDocument {
    /// Split decoded text into pages
    pub fn parse(text: &str) -> Self {
        Self {
            pages: text.split(FORM_FEED).map(str::to_string).collect(),
        }
    }

    pub fn page(&self, page_index: u32) -> Option<&str> {
        self.pages.get(page_index as usize).map(String::as_str)
    }
}

impl DocumentHandle for PlainTextDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Opener and extractor for plain-text documents
#[derive(Debug, Clone, Default)]
pub struct PlainTextBackend {
    layout: PlainTextLayout,
}

impl PlainTextBackend {
    pub fn new(layout: PlainTextLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &PlainTextLayout {
        &self.layout
    }
}

#[async_trait]
impl DocumentOpener for PlainTextBackend {
    async fn open(
        &self,
        source: &DocumentSource,
        // Plain text has no encryption; a supplied password is ignored.
        _password: Option<&Sensitive<String>>,
    ) -> CollaboratorResult<Arc<dyn DocumentHandle>> {
        let bytes = match source {
            DocumentSource::Bytes(bytes) => bytes.clone(),
            DocumentSource::Path(path) => tokio::fs::read(path).await?,
        };
        let text = String::from_utf8(bytes).map_err(|e| CollaboratorError::CorruptDocument {
            reason: format!("not valid UTF-8: {}", e.utf8_error()),
        })?;
        Ok(Arc::new(PlainTextDocument::parse(&text)))
    }
}

#[async_trait]
impl TextBlockExtractor for PlainTextBackend {
    async fn extract_text_blocks(
        &self,
        document: &dyn DocumentHandle,
        page_index: u32,
    ) -> CollaboratorResult<PageText> {
        let document = document
            .as_any()
            .downcast_ref::<PlainTextDocument>()
            .ok_or_else(|| CollaboratorError::Unsupported {
                reason: "not a plain-text document".to_string(),
            })?;
        let text = document
            .page(page_index)
            .ok_or(CollaboratorError::PageIndexOutOfBounds {
                page_index,
                page_count: document.page_count(),
            })?;
        Ok(self.layout.layout_page(page_index, text))
    }
}
