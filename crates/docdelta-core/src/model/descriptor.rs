//! Document descriptors: one side of a comparison

use std::collections::BTreeSet;
use std::path::PathBuf;

use docdelta_core_types::Sensitive;
use serde::{Deserialize, Serialize};

use crate::errors::{CompareError, Result};
use crate::model::DocumentSide;

/// Where the document bytes come from
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl DocumentSource {
    fn is_empty(&self) -> bool {
        match self {
            DocumentSource::Bytes(bytes) => bytes.is_empty(),
            DocumentSource::Path(path) => path.as_os_str().is_empty(),
        }
    }
}

/// One entry of a page selection: a single index or an inclusive `[start, end]` range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageSelection {
    Index(u32),
    Range([u32; 2]),
}

/// Identifies one side of a comparison
#[derive(Debug, Clone)]
pub struct DocumentDescriptor {
    pub source: DocumentSource,
    pub password: Option<Sensitive<String>>,
    /// `None` selects every page; `Some(vec![])` selects nothing
    pub page_indexes: Option<Vec<PageSelection>>,
}

impl DocumentDescriptor {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: DocumentSource::Bytes(bytes.into()),
            password: None,
            page_indexes: None,
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: DocumentSource::Path(path.into()),
            password: None,
            page_indexes: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Sensitive::new(password.into()));
        self
    }

    pub fn with_pages(mut self, pages: Vec<PageSelection>) -> Self {
        self.page_indexes = Some(pages);
        self
    }

    /// Checks that need no I/O: a non-empty source and well-formed ranges.
    ///
    /// # Errors
    ///
    /// `EmptyDescriptor` or `InvalidPageSelection`, tagged with `side`.
    pub fn validate(&self, side: DocumentSide) -> Result<()> {
        if self.source.is_empty() {
            return Err(CompareError::EmptyDescriptor { side });
        }
        for selection in self.page_indexes.iter().flatten() {
            if let PageSelection::Range([start, end]) = selection {
                if start > end {
                    return Err(CompareError::InvalidPageSelection {
                        side,
                        reason: format!("range [{}, {}] is reversed", start, end),
                    });
                }
            }
        }
        Ok(())
    }

    /// True when an explicit, empty selection was given
    pub fn selects_nothing(&self) -> bool {
        matches!(&self.page_indexes, Some(pages) if pages.is_empty())
    }

    /// Expand the selection into ascending, de-duplicated page indexes.
    ///
    /// # Errors
    ///
    /// `InvalidPageSelection` if any selected page is `>= page_count`.
    pub fn resolve_pages(&self, side: DocumentSide, page_count: u32) -> Result<Vec<u32>> {
        let Some(selections) = &self.page_indexes else {
            return Ok((0..page_count).collect());
        };

        let mut pages = BTreeSet::new();
        for selection in selections {
            let (start, end) = match *selection {
                PageSelection::Index(i) => (i, i),
                PageSelection::Range([start, end]) => (start, end),
            };
            if end >= page_count {
                return Err(CompareError::InvalidPageSelection {
                    side,
                    reason: format!(
                        "page {} is out of bounds for a document with {} pages",
                        end, page_count
                    ),
                });
            }
            pages.extend(start..=end);
        }
        Ok(pages.into_iter().collect())
    }
}

/// The two documents handed to `compare`
#[derive(Debug, Clone)]
pub struct ComparisonDocuments {
    pub original_document: DocumentDescriptor,
    pub changed_document: DocumentDescriptor,
}

impl ComparisonDocuments {
    pub fn new(original_document: DocumentDescriptor, changed_document: DocumentDescriptor) -> Self {
        Self {
            original_document,
            changed_document,
        }
    }

    pub fn side(&self, side: DocumentSide) -> &DocumentDescriptor {
        match side {
            DocumentSide::Original => &self.original_document,
            DocumentSide::Changed => &self.changed_document,
        }
    }

    /// Validate both descriptors, original first
    ///
    /// # Errors
    ///
    /// The first descriptor error found.
    pub fn validate(&self) -> Result<()> {
        self.original_document.validate(DocumentSide::Original)?;
        self.changed_document.validate(DocumentSide::Changed)
    }
}
