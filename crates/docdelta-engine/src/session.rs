//! Comparison sessions
//!
//! A session owns at most one active AI orchestration. Starting another
//! cancels the one in flight, so a late answer for a superseded run never
//! reaches its caller as a result.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use docdelta_core::ai::AIComparisonData;
use docdelta_core::errors::{ExError, ExErrorKind};
use docdelta_core::{AiComparisonOptions, ComparisonDocuments, ComparisonOperation};
use docdelta_core_types::{RequestContext, RequestId};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::orchestrator::orchestrate;
use crate::pipeline::{with_context, Comparator, Result};

/// Handle on one started AI comparison
#[derive(Debug)]
pub struct ComparisonRun {
    request_id: RequestId,
    started_at: DateTime<Utc>,
    snapshots: watch::Receiver<AIComparisonData>,
    task: JoinHandle<Result<AIComparisonData>>,
}

impl ComparisonRun {
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Latest published state
    pub fn snapshot(&self) -> AIComparisonData {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every phase change
    pub fn subscribe(&self) -> watch::Receiver<AIComparisonData> {
        self.snapshots.clone()
    }

    /// Wait for the run to reach COMPLETED or ERROR
    ///
    /// # Errors
    ///
    /// `DocumentUnavailable` (with side) when a document could not be
    /// loaded, `Internal` when the run's task was aborted.
    pub async fn finished(self) -> Result<AIComparisonData> {
        match self.task.await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(
                    request_id = self.request_id.as_str(),
                    error = %err,
                    "AI comparison task ended abnormally"
                );
                Err(ExError::new(ExErrorKind::Internal)
                    .with_op("ai_compare")
                    .with_message(format!("AI comparison task ended abnormally: {}", err))
                    .with_request_id(self.request_id))
            }
        }
    }
}

#[derive(Debug)]
struct ActiveRun {
    request_id: RequestId,
    cancel: watch::Sender<bool>,
    snapshots: watch::Receiver<AIComparisonData>,
}

/// Serializes AI comparisons: one active orchestration at a time
#[derive(Debug)]
pub struct ComparisonSession {
    comparator: Arc<Comparator>,
    active: Option<ActiveRun>,
}

impl ComparisonSession {
    pub fn new(comparator: Arc<Comparator>) -> Self {
        Self {
            comparator,
            active: None,
        }
    }

    /// Start an AI comparison, cancelling any run still in flight
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Input errors, raised before anything is spawned; the previous run is
    /// left untouched in that case.
    pub fn start(
        &mut self,
        documents: ComparisonDocuments,
        options: AiComparisonOptions,
    ) -> Result<ComparisonRun> {
        self.start_in(RequestContext::new(), documents, options)
    }

    /// `start` under a caller-supplied request context
    ///
    /// # Errors
    ///
    /// As `start`.
    pub fn start_in(
        &mut self,
        ctx: RequestContext,
        documents: ComparisonDocuments,
        options: AiComparisonOptions,
    ) -> Result<ComparisonRun> {
        let request_id = ctx.request_id.clone();
        self.comparator
            .check(&documents, &ComparisonOperation::Ai(options.clone()))
            .map_err(|e| with_context(e, &ctx))?;

        if let Some(previous) = self.active.take() {
            tracing::info!(
                request_id = previous.request_id.as_str(),
                superseded_by = request_id.as_str(),
                "superseding active AI comparison"
            );
            previous.cancel.send_replace(true);
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (snapshot_tx, snapshot_rx) = watch::channel(AIComparisonData::default());

        let comparator = Arc::clone(&self.comparator);
        let task = tokio::spawn(async move {
            orchestrate(
                &comparator,
                &ctx,
                &documents,
                &options,
                cancel_rx,
                &snapshot_tx,
            )
            .await
        });

        self.active = Some(ActiveRun {
            request_id: request_id.clone(),
            cancel: cancel_tx,
            snapshots: snapshot_rx.clone(),
        });

        Ok(ComparisonRun {
            request_id,
            started_at: Utc::now(),
            snapshots: snapshot_rx,
            task,
        })
    }

    /// Cancel the active run; false when there was nothing to cancel
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(run) if !run.snapshots.borrow().is_terminal() => {
                run.cancel.send_replace(true);
                true
            }
            _ => false,
        }
    }

    /// Latest state of the active (or most recently started) run
    pub fn snapshot(&self) -> Option<AIComparisonData> {
        self.active.as_ref().map(|run| run.snapshots.borrow().clone())
    }

    pub fn active_request_id(&self) -> Option<&RequestId> {
        self.active.as_ref().map(|run| &run.request_id)
    }
}

impl Drop for ComparisonSession {
    fn drop(&mut self) {
        if let Some(run) = self.active.take() {
            run.cancel.send_replace(true);
        }
    }
}
