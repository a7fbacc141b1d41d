//! Collaborator seams
//!
//! Document loading, per-page text extraction and the AI text service are
//! provided by the host. The engine only drives them through these traits.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use docdelta_core::ai::{AIADocumentChangePayload, AiServiceResponse};
use docdelta_core::errors::{ExError, ExErrorKind};
use docdelta_core::model::{DocumentSource, PageText};
use docdelta_core::AiOperationType;
use docdelta_core_types::Sensitive;
use thiserror::Error;

/// Failures reported by a collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    #[error("Wrong or missing password")]
    WrongPassword,

    #[error("Corrupt document: {reason}")]
    CorruptDocument { reason: String },

    #[error("Unsupported document: {reason}")]
    Unsupported { reason: String },

    #[error("Page {page_index} is out of bounds ({page_count} pages)")]
    PageIndexOutOfBounds { page_index: u32, page_count: u32 },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("AI service error: {message}")]
    Service { message: String },
}

impl From<std::io::Error> for CollaboratorError {
    fn from(err: std::io::Error) -> Self {
        CollaboratorError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CollaboratorError> for ExError {
    fn from(err: CollaboratorError) -> Self {
        let message = err.to_string();
        match err {
            CollaboratorError::WrongPassword => ExError::new(ExErrorKind::WrongPassword),
            CollaboratorError::CorruptDocument { .. } => ExError::new(ExErrorKind::CorruptDocument),
            CollaboratorError::Unsupported { .. } => ExError::new(ExErrorKind::UnsupportedDocument),
            CollaboratorError::PageIndexOutOfBounds { page_index, .. } => {
                ExError::new(ExErrorKind::PageIndexOutOfBounds).with_page_index(page_index)
            }
            CollaboratorError::Io { .. } => ExError::new(ExErrorKind::Io),
            CollaboratorError::Service { .. } => ExError::new(ExErrorKind::ExternalService),
        }
        .with_message(message)
    }
}

pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

/// An opened document
///
/// Handles are dropped as soon as their pages are extracted.
pub trait DocumentHandle: Send + Sync {
    fn page_count(&self) -> u32;

    /// Concrete handle, for extractors paired with a specific opener
    fn as_any(&self) -> &dyn Any;
}

/// Opens a document from its source
#[async_trait]
pub trait DocumentOpener: Send + Sync {
    async fn open(
        &self,
        source: &DocumentSource,
        password: Option<&Sensitive<String>>,
    ) -> CollaboratorResult<Arc<dyn DocumentHandle>>;
}

/// Extracts the linear text of one page plus the blocks that draw it
#[async_trait]
pub trait TextBlockExtractor: Send + Sync {
    async fn extract_text_blocks(
        &self,
        document: &dyn DocumentHandle,
        page_index: u32,
    ) -> CollaboratorResult<PageText>;
}

/// Text-generation service behind the AI layer
#[async_trait]
pub trait AiTextService: Send + Sync {
    async fn submit(
        &self,
        changes: &[AIADocumentChangePayload],
        operation_type: AiOperationType,
        categories: &[String],
    ) -> CollaboratorResult<AiServiceResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_error_kinds() {
        let cases = vec![
            (CollaboratorError::WrongPassword, ExErrorKind::WrongPassword),
            (
                CollaboratorError::CorruptDocument {
                    reason: "bad header".to_string(),
                },
                ExErrorKind::CorruptDocument,
            ),
            (
                CollaboratorError::Service {
                    message: "503".to_string(),
                },
                ExErrorKind::ExternalService,
            ),
        ];
        for (err, kind) in cases {
            assert_eq!(ExError::from(err).kind(), kind);
        }
    }

    #[test]
    fn test_out_of_bounds_keeps_page_index() {
        let err: ExError = CollaboratorError::PageIndexOutOfBounds {
            page_index: 9,
            page_count: 3,
        }
        .into();
        assert_eq!(err.page_index(), Some(9));
        assert!(err.message().contains("3 pages"));
    }
}
