//! Drives one AI orchestration
//!
//! The phase machine itself is the pure `transition` in the core crate. This
//! module feeds it events from the structural pipeline and the AI service,
//! publishes every new state, and races each suspension point against
//! cancellation and the configured timeout.

use std::future::Future;
use std::time::Instant;

use docdelta_core::ai::{
    transform_changes, transition, AIComparisonData, AIComparisonEvent, AiServiceResponse,
};
use docdelta_core::errors::{ExError, ExErrorKind};
use docdelta_core::{log_op_end, log_op_start, AiComparisonOptions, ComparisonDocuments};
use docdelta_core_types::RequestContext;
use tokio::sync::watch;

use crate::pipeline::{Comparator, Result};

/// Run an AI comparison to a terminal phase
///
/// Every intermediate state is published on `snapshots`. Flipping `cancel`
/// to `true` ends the run in ERROR at the next suspension point; anything
/// the service answers afterwards is discarded.
///
/// A document that cannot be loaded still ends the published state in
/// ERROR, and the run returns that failure as `Err`.
pub(crate) async fn orchestrate(
    comparator: &Comparator,
    ctx: &RequestContext,
    documents: &ComparisonDocuments,
    options: &AiComparisonOptions,
    mut cancel: watch::Receiver<bool>,
    snapshots: &watch::Sender<AIComparisonData>,
) -> Result<AIComparisonData> {
    let start = Instant::now();
    log_op_start!(
        "ai_compare",
        request_id = ctx.request_id.as_str(),
        trace_id = ctx.trace_id.as_ref().map(|t| t.as_str()),
        ai_operation = ?options.ai_operation_type
    );

    let advance = |data: AIComparisonData, event: AIComparisonEvent| {
        let next = transition(data, event);
        snapshots.send_replace(next.clone());
        next
    };

    let data = advance(
        AIComparisonData::default(),
        AIComparisonEvent::Submitted {
            operation_type: options.ai_operation_type,
            categories: options.categories.clone(),
        },
    );

    let structural = comparator.compare_text(ctx, documents, &options.text);
    let mut loading_failure = None;
    let event = match until_cancelled(&mut cancel, structural).await {
        None => AIComparisonEvent::Cancelled,
        Some(Err(err)) => {
            loading_failure = Some(err.clone());
            AIComparisonEvent::Failed(err)
        }
        Some(Ok(changes)) => {
            let payloads = changes
                .as_ref()
                .map(|c| transform_changes(c, comparator.settings().ai_context_words))
                .unwrap_or_default();
            AIComparisonEvent::StructuralReady { changes, payloads }
        }
    };
    let mut data = advance(data, event);

    if !data.is_terminal() {
        let event = submit(comparator, &data, options, &mut cancel).await;
        data = advance(data, event);
    }

    log_op_end!(
        "ai_compare",
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = ctx.request_id.as_str(),
        ai_phase = data.phase.as_str()
    );
    match loading_failure {
        Some(err) => Err(err),
        None => Ok(data),
    }
}

/// Call the AI service with the submitted payloads
async fn submit(
    comparator: &Comparator,
    data: &AIComparisonData,
    options: &AiComparisonOptions,
    cancel: &mut watch::Receiver<bool>,
) -> AIComparisonEvent {
    let Some(service) = comparator.ai_service() else {
        return AIComparisonEvent::Failed(
            ExError::new(ExErrorKind::UnsupportedOperation)
                .with_message("no AI text service is configured"),
        );
    };
    let payloads = data.transformed_changes.as_deref().unwrap_or_default();

    let call = service.submit(payloads, options.ai_operation_type, &options.categories);
    let bounded = async {
        match comparator.settings().ai_timeout() {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                ExError::new(ExErrorKind::Timeout)
                    .with_op("ai_service")
                    .with_message(format!("AI service did not answer within {:?}", limit))
            }),
            None => Ok(call.await),
        }
    };

    match until_cancelled(cancel, bounded).await {
        None => AIComparisonEvent::Cancelled,
        Some(Err(timeout)) => AIComparisonEvent::Failed(timeout),
        Some(Ok(Err(err))) => AIComparisonEvent::Failed(ExError::from(err).with_op("ai_service")),
        Some(Ok(Ok(AiServiceResponse::Analysis(response)))) => {
            AIComparisonEvent::AnalysisReceived(response)
        }
        Some(Ok(Ok(AiServiceResponse::Tagging(response)))) => {
            AIComparisonEvent::TaggingReceived(response)
        }
    }
}

/// `None` if `cancel` flips to `true` before `work` finishes
async fn until_cancelled<F: Future>(
    cancel: &mut watch::Receiver<bool>,
    work: F,
) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancelled(cancel) => None,
        output = work => Some(output),
    }
}

async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    while !*cancel.borrow_and_update() {
        if cancel.changed().await.is_err() {
            // Sender dropped: no one can cancel any more.
            std::future::pending::<()>().await;
        }
    }
}
