use docdelta_core_types::{RequestId, TraceId};
use thiserror::Error;

use crate::model::DocumentSide;

/// Result type alias using CompareError
pub type Result<T> = std::result::Result<T, CompareError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure surfaced by the comparison kernel or the engine maps to one
/// of these kinds, each with a stable `ERR_*` code for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input (caller mistakes, raised before any I/O)
    InvalidInput,
    InvalidPageSelection,
    EmptyDescriptor,
    UnsupportedOperation,

    // Collaborators (document open / text extraction)
    DocumentUnavailable,
    WrongPassword,
    CorruptDocument,
    UnsupportedDocument,
    PageIndexOutOfBounds,

    // Internal consistency (defects, never valid end-user states)
    OutOfBounds,
    InvalidPageLayout,
    InconsistentAlignment,

    // AI phase
    ExternalService,
    MalformedResponse,
    Timeout,
    Cancelled,

    // Integration
    Io,
    Serialization,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidPageSelection => "ERR_INVALID_PAGE_SELECTION",
            ExErrorKind::EmptyDescriptor => "ERR_EMPTY_DESCRIPTOR",
            ExErrorKind::UnsupportedOperation => "ERR_UNSUPPORTED_OPERATION",
            ExErrorKind::DocumentUnavailable => "ERR_DOCUMENT_UNAVAILABLE",
            ExErrorKind::WrongPassword => "ERR_WRONG_PASSWORD",
            ExErrorKind::CorruptDocument => "ERR_CORRUPT_DOCUMENT",
            ExErrorKind::UnsupportedDocument => "ERR_UNSUPPORTED_DOCUMENT",
            ExErrorKind::PageIndexOutOfBounds => "ERR_PAGE_INDEX_OUT_OF_BOUNDS",
            ExErrorKind::OutOfBounds => "ERR_OUT_OF_BOUNDS",
            ExErrorKind::InvalidPageLayout => "ERR_INVALID_PAGE_LAYOUT",
            ExErrorKind::InconsistentAlignment => "ERR_INCONSISTENT_ALIGNMENT",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::MalformedResponse => "ERR_MALFORMED_RESPONSE",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Cancelled => "ERR_CANCELLED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// True for kinds that signal a bug in the aligner, index or assembler
    /// rather than bad input or a failing collaborator.
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            ExErrorKind::OutOfBounds
                | ExErrorKind::InvalidPageLayout
                | ExErrorKind::InconsistentAlignment
                | ExErrorKind::Internal
        )
    }

    /// True for caller mistakes detected before any I/O
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ExErrorKind::InvalidInput
                | ExErrorKind::InvalidPageSelection
                | ExErrorKind::EmptyDescriptor
                | ExErrorKind::UnsupportedOperation
        )
    }
}

/// Canonical structured error type
///
/// Carries the classification plus the comparison context needed to act on
/// it: which document side failed, which page, and the run's correlation ids.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    side: Option<DocumentSide>,
    page_index: Option<u32>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    details: Option<String>,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            side: None,
            page_index: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            details: None,
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the document side that failed
    pub fn with_side(mut self, side: DocumentSide) -> Self {
        self.side = Some(side);
        self
    }

    /// Add page context
    pub fn with_page_index(mut self, page_index: u32) -> Self {
        self.page_index = Some(page_index);
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach raw diagnostic details (e.g. an unparseable service payload)
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn side(&self) -> Option<DocumentSide> {
        self.side
    }

    pub fn page_index(&self) -> Option<u32> {
        self.page_index
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Get the wrapped cause, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(side) = self.side {
            write!(f, " (side: {})", side)?;
        }
        if let Some(page_index) = self.page_index {
            write!(f, " (page_index: {})", page_index)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Errors raised by the synchronous comparison kernel
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompareError {
    // ===== Input Errors =====
    /// Generic malformed input
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Page selection is malformed or points outside the document
    #[error("Invalid page selection for {side} document: {reason}")]
    InvalidPageSelection { side: DocumentSide, reason: String },

    /// Descriptor carries no bytes and no path
    #[error("Empty document descriptor for {side} document")]
    EmptyDescriptor { side: DocumentSide },

    /// Option combination the pipeline cannot run
    #[error("Unsupported comparison operation: {reason}")]
    UnsupportedOperation { reason: String },

    // ===== Internal Consistency Errors =====
    /// Range query outside a page's text buffer
    #[error("Range {position}+{length} is out of bounds for text of length {text_len}")]
    OutOfBounds {
        position: usize,
        length: usize,
        text_len: usize,
    },

    /// Extracted text blocks overlap, are unordered or exceed the page text
    #[error("Invalid text layout on page {page_index}: {reason}")]
    InvalidPageLayout { page_index: u32, reason: String },

    /// Operation stream does not reconstruct contiguous ranges
    #[error("Inconsistent alignment: {reason}")]
    InconsistentAlignment { reason: String },

    // ===== Generic Errors =====
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<CompareError> for ExError {
    fn from(err: CompareError) -> Self {
        let message = err.to_string();
        match err {
            CompareError::InvalidInput { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            CompareError::InvalidPageSelection { side, .. } => {
                ExError::new(ExErrorKind::InvalidPageSelection)
                    .with_side(side)
                    .with_message(message)
            }
            CompareError::EmptyDescriptor { side } => ExError::new(ExErrorKind::EmptyDescriptor)
                .with_side(side)
                .with_message(message),
            CompareError::UnsupportedOperation { .. } => {
                ExError::new(ExErrorKind::UnsupportedOperation).with_message(message)
            }
            CompareError::OutOfBounds { .. } => ExError::new(ExErrorKind::OutOfBounds)
                .with_op("blocks_for_range")
                .with_message(message),
            CompareError::InvalidPageLayout { page_index, .. } => {
                ExError::new(ExErrorKind::InvalidPageLayout)
                    .with_op("range_index")
                    .with_page_index(page_index)
                    .with_message(message)
            }
            CompareError::InconsistentAlignment { .. } => {
                ExError::new(ExErrorKind::InconsistentAlignment)
                    .with_op("build_hunks")
                    .with_message(message)
            }
            CompareError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
            CompareError::Internal { .. } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for CompareError {
    fn from(err: serde_json::Error) -> Self {
        CompareError::Serialization {
            message: err.to_string(),
        }
    }
}
