//! Comparison pipeline
//!
//! ## Stages (in order):
//! 1. Validate the operation and both descriptors (no I/O)
//! 2. Open both documents concurrently
//! 3. Extract the selected pages of each side concurrently, in page order
//! 4. Align, build hunks and attribute them to page pairs
//! 5. For AI operations, hand the structural result to the orchestrator

use std::sync::Arc;
use std::time::Instant;

use docdelta_core::ai::AIComparisonData;
use docdelta_core::errors::{ExError, ExErrorKind};
use docdelta_core::model::{DocumentDescriptor, DocumentSide, PageText};
use docdelta_core::{
    compare_pages, log_op_end, log_op_error, log_op_start, ComparisonDocuments,
    ComparisonOperation, DocumentComparisonResult, TextComparisonOptions,
};
use docdelta_core_types::RequestContext;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::collaborators::{
    AiTextService, CollaboratorError, DocumentHandle, DocumentOpener, TextBlockExtractor,
};
use crate::orchestrator::orchestrate;
use crate::plain_text::PlainTextBackend;
use crate::settings::EngineSettings;

pub type Result<T> = std::result::Result<T, ExError>;

/// What `compare` produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "lowercase")]
pub enum ComparisonOutcome {
    /// Structural diff; `None` when there was nothing to compare
    Text(Option<DocumentComparisonResult>),
    /// Final state of an AI orchestration
    Ai(AIComparisonData),
}

impl ComparisonOutcome {
    /// The structural result, whichever pipeline ran
    pub fn changes(&self) -> Option<&DocumentComparisonResult> {
        match self {
            ComparisonOutcome::Text(changes) => changes.as_ref(),
            ComparisonOutcome::Ai(data) => data.changes.as_ref(),
        }
    }

    pub fn ai_data(&self) -> Option<&AIComparisonData> {
        match self {
            ComparisonOutcome::Text(_) => None,
            ComparisonOutcome::Ai(data) => Some(data),
        }
    }
}

/// Runs comparisons against a set of collaborators
#[derive(Clone)]
pub struct Comparator {
    opener: Arc<dyn DocumentOpener>,
    extractor: Arc<dyn TextBlockExtractor>,
    ai_service: Option<Arc<dyn AiTextService>>,
    settings: EngineSettings,
}

impl std::fmt::Debug for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Comparator")
            .field("ai_service", &self.ai_service.is_some())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Comparator {
    pub fn new(opener: Arc<dyn DocumentOpener>, extractor: Arc<dyn TextBlockExtractor>) -> Self {
        Self {
            opener,
            extractor,
            ai_service: None,
            settings: EngineSettings::default(),
        }
    }

    /// Plain-text backend in both document roles, laid out per `settings`
    pub fn plain_text(settings: EngineSettings) -> Self {
        let backend = Arc::new(PlainTextBackend::new(settings.plain_text));
        Self::new(backend.clone(), backend).with_settings(settings)
    }

    pub fn with_ai_service(mut self, service: Arc<dyn AiTextService>) -> Self {
        self.ai_service = Some(service);
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub(crate) fn ai_service(&self) -> Option<&Arc<dyn AiTextService>> {
        self.ai_service.as_ref()
    }

    /// Compare two documents
    ///
    /// AI service failures never surface as `Err`: they end the orchestration
    /// in the ERROR phase with the structural result kept.
    ///
    /// # Errors
    ///
    /// Input errors before any I/O, `DocumentUnavailable` (with side) when
    /// a collaborator fails, and kernel defects on the text pipeline. These
    /// fail AI operations too.
    pub async fn compare(
        &self,
        documents: ComparisonDocuments,
        operation: ComparisonOperation,
    ) -> Result<ComparisonOutcome> {
        self.compare_in(RequestContext::new(), documents, operation)
            .await
    }

    /// `compare` under a caller-supplied request context
    ///
    /// # Errors
    ///
    /// As `compare`; every error carries the context's ids.
    pub async fn compare_in(
        &self,
        ctx: RequestContext,
        documents: ComparisonDocuments,
        operation: ComparisonOperation,
    ) -> Result<ComparisonOutcome> {
        self.check(&documents, &operation)
            .map_err(|e| with_context(e, &ctx))?;

        match operation {
            ComparisonOperation::Text(options) => {
                let changes = self.compare_text(&ctx, &documents, &options).await?;
                Ok(ComparisonOutcome::Text(changes))
            }
            ComparisonOperation::Ai(options) => {
                let (_cancel_tx, cancel_rx) = watch::channel(false);
                let (snapshots, _) = watch::channel(AIComparisonData::default());
                orchestrate(self, &ctx, &documents, &options, cancel_rx, &snapshots)
                    .await
                    .map(ComparisonOutcome::Ai)
            }
        }
    }

    /// Checks that need no I/O
    pub(crate) fn check(
        &self,
        documents: &ComparisonDocuments,
        operation: &ComparisonOperation,
    ) -> Result<()> {
        operation.validate()?;
        documents.validate()?;
        if operation.ai_options().is_some() && self.ai_service.is_none() {
            return Err(ExError::new(ExErrorKind::UnsupportedOperation)
                .with_op("compare")
                .with_message("AI comparison requested but no AI text service is configured"));
        }
        Ok(())
    }

    /// Structural pipeline: open, extract, align, assemble
    pub(crate) async fn compare_text(
        &self,
        ctx: &RequestContext,
        documents: &ComparisonDocuments,
        options: &TextComparisonOptions,
    ) -> Result<Option<DocumentComparisonResult>> {
        let request_id = ctx.request_id.as_str();
        let start = Instant::now();
        log_op_start!(
            "compare",
            request_id = request_id,
            trace_id = ctx.trace_id.as_ref().map(|t| t.as_str()),
            word_level = options.word_level,
            context_words = options.number_of_context_words
        );

        let result = self.run_text(documents, options).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(changes) => log_op_end!(
                "compare",
                duration_ms = duration_ms,
                request_id = request_id,
                hunk_count = changes.as_ref().map_or(0, |c| c.hunks().count())
            ),
            Err(err) => log_op_error!(
                "compare",
                err.clone(),
                duration_ms = duration_ms,
                request_id = request_id
            ),
        }
        result.map_err(|e| with_context(e, ctx))
    }

    async fn run_text(
        &self,
        documents: &ComparisonDocuments,
        options: &TextComparisonOptions,
    ) -> Result<Option<DocumentComparisonResult>> {
        if documents.original_document.selects_nothing()
            && documents.changed_document.selects_nothing()
        {
            return Ok(None);
        }

        let (original_pages, changed_pages) = tokio::try_join!(
            self.extract_side(DocumentSide::Original, &documents.original_document),
            self.extract_side(DocumentSide::Changed, &documents.changed_document),
        )?;

        Ok(compare_pages(&original_pages, &changed_pages, options)?)
    }

    async fn extract_side(
        &self,
        side: DocumentSide,
        descriptor: &DocumentDescriptor,
    ) -> Result<Vec<PageText>> {
        if descriptor.selects_nothing() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        log_op_start!("extract_side", side = side.as_str());

        let result = self.open_and_extract(side, descriptor).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(pages) => log_op_end!(
                "extract_side",
                duration_ms = duration_ms,
                side = side.as_str(),
                page_count = pages.len()
            ),
            Err(err) => log_op_error!(
                "extract_side",
                err.clone(),
                duration_ms = duration_ms,
                side = side.as_str()
            ),
        }
        result
    }

    async fn open_and_extract(
        &self,
        side: DocumentSide,
        descriptor: &DocumentDescriptor,
    ) -> Result<Vec<PageText>> {
        let handle = self
            .opener
            .open(&descriptor.source, descriptor.password.as_ref())
            .await
            .map_err(|e| unavailable(side, e))?;

        let page_indexes = descriptor.resolve_pages(side, handle.page_count())?;

        let document: &dyn DocumentHandle = handle.as_ref();
        let pages = try_join_all(page_indexes.iter().map(|&page_index| async move {
            self.extractor
                .extract_text_blocks(document, page_index)
                .await
                .map_err(|e| unavailable(side, e).with_page_index(page_index))
        }))
        .await?;

        drop(handle);
        Ok(pages)
    }
}

/// Attach the run's correlation ids to an error
pub(crate) fn with_context(err: ExError, ctx: &RequestContext) -> ExError {
    let err = err.with_request_id(ctx.request_id.clone());
    match &ctx.trace_id {
        Some(trace_id) => err.with_trace_id(trace_id.clone()),
        None => err,
    }
}

fn unavailable(side: DocumentSide, err: CollaboratorError) -> ExError {
    ExError::new(ExErrorKind::DocumentUnavailable)
        .with_side(side)
        .with_message(format!("{} document unavailable: {}", side, err))
        .with_source(err.into())
}
