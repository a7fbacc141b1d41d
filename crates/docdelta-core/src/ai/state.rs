//! AI orchestration phase machine
//!
//! ```text
//! IDLE -> LOADING -> ANALYZING | TAGGING -> COMPLETED
//!   any non-terminal phase -> ERROR
//! ```
//!
//! `transition` is the only place phases change. It is pure: no I/O, no
//! clock, so every path can be tested without a network. Events that do not
//! apply to the current phase are ignored and logged; nothing leaves
//! COMPLETED or ERROR.

use std::collections::HashSet;

use crate::errors::{ExError, ExErrorKind};
use crate::model::DocumentComparisonResult;
use crate::operation::AiOperationType;

use super::model::{
    AIADocumentChangePayload, AIADocumentChangesAnalysisResponse,
    AIADocumentChangesTaggingResponse, AIComparisonData, AIComparisonError, AIComparisonPhase,
    AIEnhancedChange, AIErrorPhase, TaggedChangeReference,
};

/// Inputs that advance an orchestration
#[derive(Debug, Clone)]
pub enum AIComparisonEvent {
    /// An AI comparison was requested
    Submitted {
        operation_type: AiOperationType,
        categories: Vec<String>,
    },
    /// The structural diff finished; `payloads` are its changes
    StructuralReady {
        changes: Option<DocumentComparisonResult>,
        payloads: Vec<AIADocumentChangePayload>,
    },
    AnalysisReceived(AIADocumentChangesAnalysisResponse),
    TaggingReceived(AIADocumentChangesTaggingResponse),
    Failed(ExError),
    Cancelled,
}

impl AIComparisonEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AIComparisonEvent::Submitted { .. } => "submitted",
            AIComparisonEvent::StructuralReady { .. } => "structural_ready",
            AIComparisonEvent::AnalysisReceived(_) => "analysis_received",
            AIComparisonEvent::TaggingReceived(_) => "tagging_received",
            AIComparisonEvent::Failed(_) => "failed",
            AIComparisonEvent::Cancelled => "cancelled",
        }
    }
}

/// Advance `data` by one event
pub fn transition(data: AIComparisonData, event: AIComparisonEvent) -> AIComparisonData {
    let from = data.phase;
    let event_name = event.name();

    let next = match (from, event) {
        (phase, _) if phase.is_terminal() => {
            tracing::warn!(
                ai_phase = phase.as_str(),
                ai_event = event_name,
                "event after terminal phase ignored"
            );
            return data;
        }

        (_, AIComparisonEvent::Failed(err)) => fail(data, &err),
        (_, AIComparisonEvent::Cancelled) => fail(
            data,
            &ExError::new(ExErrorKind::Cancelled).with_message("AI comparison was cancelled"),
        ),

        (
            AIComparisonPhase::Idle,
            AIComparisonEvent::Submitted {
                operation_type,
                categories,
            },
        ) => AIComparisonData {
            phase: AIComparisonPhase::Loading,
            ai_operation_type: Some(operation_type),
            requested_categories: categories,
            ..AIComparisonData::default()
        },

        (AIComparisonPhase::Loading, AIComparisonEvent::StructuralReady { changes, payloads }) => {
            structural_ready(data, changes, payloads)
        }

        (AIComparisonPhase::Analyzing, AIComparisonEvent::AnalysisReceived(response)) => {
            analysis_received(data, response)
        }

        (AIComparisonPhase::Tagging, AIComparisonEvent::TaggingReceived(response)) => {
            tagging_received(data, response)
        }

        (AIComparisonPhase::Analyzing, AIComparisonEvent::TaggingReceived(_))
        | (AIComparisonPhase::Tagging, AIComparisonEvent::AnalysisReceived(_)) => fail(
            data,
            &ExError::new(ExErrorKind::MalformedResponse)
                .with_message("service answered with the wrong response kind"),
        ),

        (phase, _) => {
            tracing::warn!(
                ai_phase = phase.as_str(),
                ai_event = event_name,
                "event does not apply to phase, ignored"
            );
            return data;
        }
    };

    if next.phase != from {
        tracing::debug!(
            event = crate::types::schema::EVENT_PHASE_CHANGE,
            from = from.as_str(),
            to = next.phase.as_str(),
            ai_event = event_name,
        );
    }
    next
}

/// Sub-operation a failure in the current phase is reported under
fn error_phase(data: &AIComparisonData) -> AIErrorPhase {
    match data.phase {
        AIComparisonPhase::Analyzing => AIErrorPhase::Analysis,
        AIComparisonPhase::Tagging => AIErrorPhase::Tagging,
        _ => data
            .ai_operation_type
            .map(AIErrorPhase::from)
            .unwrap_or(AIErrorPhase::Analysis),
    }
}

fn fail(data: AIComparisonData, err: &ExError) -> AIComparisonData {
    let error = AIComparisonError::from_ex_error(error_phase(&data), err);
    AIComparisonData {
        phase: AIComparisonPhase::Error,
        error: Some(error),
        ..data
    }
}

fn malformed(data: AIComparisonData, message: String, details: Option<String>) -> AIComparisonData {
    let mut err = ExError::new(ExErrorKind::MalformedResponse).with_message(message);
    if let Some(details) = details {
        err = err.with_details(details);
    }
    fail(data, &err)
}

fn structural_ready(
    data: AIComparisonData,
    changes: Option<DocumentComparisonResult>,
    payloads: Vec<AIADocumentChangePayload>,
) -> AIComparisonData {
    let Some(operation_type) = data.ai_operation_type else {
        return fail(
            data,
            &ExError::new(ExErrorKind::Internal).with_message("no AI operation was submitted"),
        );
    };

    // Nothing changed: there is nothing to send.
    if payloads.is_empty() {
        return AIComparisonData {
            phase: AIComparisonPhase::Completed,
            changes,
            transformed_changes: Some(Vec::new()),
            tagged_changes: (operation_type == AiOperationType::Tag).then(Vec::new),
            ai_enhanced_changes: (operation_type == AiOperationType::Tag).then(Vec::new),
            ..data
        };
    }

    let phase = match operation_type {
        AiOperationType::Analyze => AIComparisonPhase::Analyzing,
        AiOperationType::Tag => AIComparisonPhase::Tagging,
    };
    AIComparisonData {
        phase,
        changes,
        transformed_changes: Some(payloads),
        ..data
    }
}

fn analysis_received(
    data: AIComparisonData,
    response: AIADocumentChangesAnalysisResponse,
) -> AIComparisonData {
    let details = serde_json::to_string(&response).ok();
    if response.summary.trim().is_empty() {
        return malformed(data, "analysis summary is empty".to_string(), details);
    }
    let categories: Vec<String> = response
        .categories
        .into_iter()
        .filter(|c| !c.trim().is_empty())
        .collect();
    if categories.is_empty() {
        return malformed(data, "analysis has no categories".to_string(), details);
    }

    AIComparisonData {
        phase: AIComparisonPhase::Completed,
        summary: Some(response.summary),
        categories,
        ..data
    }
}

/// Tags outside the requested categories are dropped. A change left without
/// any tag, a reference to an unknown change, or a change without a
/// reference makes the whole response malformed.
fn tagging_received(
    data: AIComparisonData,
    response: AIADocumentChangesTaggingResponse,
) -> AIComparisonData {
    let details = serde_json::to_string(&response).ok();
    let payloads = data.transformed_changes.clone().unwrap_or_default();
    let submitted: HashSet<&str> = payloads.iter().map(|p| p.id.as_str()).collect();

    let mut tagged: Vec<TaggedChangeReference> = Vec::with_capacity(response.references.len());
    for reference in response.references {
        if !submitted.contains(reference.id.as_str()) {
            return malformed(
                data,
                format!("reference to unknown change '{}'", reference.id),
                details,
            );
        }
        if tagged.iter().any(|t| t.id == reference.id) {
            return malformed(
                data,
                format!("change '{}' referenced twice", reference.id),
                details,
            );
        }

        let mut tags: Vec<String> = Vec::new();
        for tag in reference.tag {
            if data.requested_categories.contains(&tag) && !tags.contains(&tag) {
                tags.push(tag);
            } else if !data.requested_categories.contains(&tag) {
                tracing::debug!(change_id = %reference.id, tag = %tag, "dropped unrequested tag");
            }
        }
        if tags.is_empty() {
            return malformed(
                data,
                format!("change '{}' has no requested category", reference.id),
                details,
            );
        }
        tagged.push(TaggedChangeReference {
            id: reference.id,
            tag: tags,
        });
    }

    let mut references = Vec::with_capacity(payloads.len());
    let mut enhanced = Vec::with_capacity(payloads.len());
    for payload in &payloads {
        let Some(reference) = tagged.iter().find(|t| t.id == payload.id) else {
            return malformed(
                data,
                format!("change '{}' was not tagged", payload.id),
                details,
            );
        };
        references.push(reference.clone());
        enhanced.push(AIEnhancedChange {
            change: payload.clone(),
            tags: reference.tag.clone(),
        });
    }

    AIComparisonData {
        phase: AIComparisonPhase::Completed,
        tagged_changes: Some(references),
        ai_enhanced_changes: Some(enhanced),
        ..data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OperationType;

    fn payload(id: &str) -> AIADocumentChangePayload {
        AIADocumentChangePayload {
            id: id.to_string(),
            change_type: OperationType::Insert,
            text: "x".to_string(),
            context_before: String::new(),
            context_after: String::new(),
            page: 0,
        }
    }

    fn loading(operation_type: AiOperationType, categories: &[&str]) -> AIComparisonData {
        transition(
            AIComparisonData::default(),
            AIComparisonEvent::Submitted {
                operation_type,
                categories: categories.iter().map(|c| c.to_string()).collect(),
            },
        )
    }

    fn tagging(ids: &[&str]) -> AIComparisonData {
        transition(
            loading(AiOperationType::Tag, &["Legal", "Formatting"]),
            AIComparisonEvent::StructuralReady {
                changes: None,
                payloads: ids.iter().map(|id| payload(id)).collect(),
            },
        )
    }

    fn reference(id: &str, tags: &[&str]) -> TaggedChangeReference {
        TaggedChangeReference {
            id: id.to_string(),
            tag: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_analysis_happy_path() {
        let data = loading(AiOperationType::Analyze, &[]);
        assert_eq!(data.phase, AIComparisonPhase::Loading);

        let data = transition(
            data,
            AIComparisonEvent::StructuralReady {
                changes: None,
                payloads: vec![payload("0-0-1")],
            },
        );
        assert_eq!(data.phase, AIComparisonPhase::Analyzing);

        let data = transition(
            data,
            AIComparisonEvent::AnalysisReceived(AIADocumentChangesAnalysisResponse {
                summary: "Payment terms changed.".into(),
                categories: vec!["Legal".into()],
            }),
        );
        assert_eq!(data.phase, AIComparisonPhase::Completed);
        assert_eq!(data.summary.as_deref(), Some("Payment terms changed."));
        assert!(data.result().unwrap().is_analysis());
    }

    #[test]
    fn test_empty_summary_is_analysis_error() {
        let data = transition(
            loading(AiOperationType::Analyze, &[]),
            AIComparisonEvent::StructuralReady {
                changes: None,
                payloads: vec![payload("0-0-1")],
            },
        );
        let data = transition(
            data,
            AIComparisonEvent::AnalysisReceived(AIADocumentChangesAnalysisResponse {
                summary: "  ".into(),
                categories: vec!["Legal".into()],
            }),
        );
        assert_eq!(data.phase, AIComparisonPhase::Error);
        let error = data.error.unwrap();
        assert_eq!(error.phase, AIErrorPhase::Analysis);
        assert_eq!(error.code, "ERR_MALFORMED_RESPONSE");
        assert!(error.details.is_some());
    }

    #[test]
    fn test_tagging_drops_unrequested_categories() {
        let data = transition(
            tagging(&["a", "b", "c"]),
            AIComparisonEvent::TaggingReceived(AIADocumentChangesTaggingResponse {
                references: vec![
                    reference("c", &["Formatting"]),
                    reference("a", &["Legal", "Finance"]),
                    reference("b", &["Legal", "Formatting", "Legal"]),
                ],
            }),
        );
        assert_eq!(data.phase, AIComparisonPhase::Completed);
        let tagged = data.tagged_changes.unwrap();
        let ids: Vec<&str> = tagged.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(tagged[0].tag, vec!["Legal"]);
        assert_eq!(tagged[1].tag, vec!["Legal", "Formatting"]);
        assert_eq!(data.ai_enhanced_changes.unwrap()[2].tags, vec!["Formatting"]);
    }

    #[test]
    fn test_tagging_without_known_category_is_malformed() {
        let data = transition(
            tagging(&["a"]),
            AIComparisonEvent::TaggingReceived(AIADocumentChangesTaggingResponse {
                references: vec![reference("a", &["Finance"])],
            }),
        );
        assert_eq!(data.phase, AIComparisonPhase::Error);
        assert_eq!(data.error.unwrap().phase, AIErrorPhase::Tagging);
    }

    #[test]
    fn test_missing_reference_is_malformed() {
        let data = transition(
            tagging(&["a", "b"]),
            AIComparisonEvent::TaggingReceived(AIADocumentChangesTaggingResponse {
                references: vec![reference("a", &["Legal"])],
            }),
        );
        assert_eq!(data.phase, AIComparisonPhase::Error);
    }

    #[test]
    fn test_failure_while_loading_is_attributed_to_requested_operation() {
        let data = transition(
            loading(AiOperationType::Tag, &["Legal"]),
            AIComparisonEvent::Failed(ExError::new(ExErrorKind::ExternalService)),
        );
        assert_eq!(data.phase, AIComparisonPhase::Error);
        assert_eq!(data.error.unwrap().phase, AIErrorPhase::Tagging);
    }

    #[test]
    fn test_timeout_keeps_structural_result() {
        let changes = DocumentComparisonResult {
            document_comparison_results: Vec::new(),
        };
        let data = transition(
            loading(AiOperationType::Tag, &["Legal"]),
            AIComparisonEvent::StructuralReady {
                changes: Some(changes.clone()),
                payloads: vec![payload("0-0-0")],
            },
        );
        let data = transition(
            data,
            AIComparisonEvent::Failed(
                ExError::new(ExErrorKind::Timeout).with_message("AI service timed out"),
            ),
        );
        assert_eq!(data.phase, AIComparisonPhase::Error);
        assert_eq!(data.error.as_ref().unwrap().phase, AIErrorPhase::Tagging);
        assert_eq!(data.changes, Some(changes));
    }

    #[test]
    fn test_terminal_phases_are_final() {
        let data = transition(
            loading(AiOperationType::Analyze, &[]),
            AIComparisonEvent::Cancelled,
        );
        assert_eq!(data.phase, AIComparisonPhase::Error);
        assert_eq!(data.error.as_ref().unwrap().code, "ERR_CANCELLED");

        let after = transition(
            data.clone(),
            AIComparisonEvent::Submitted {
                operation_type: AiOperationType::Analyze,
                categories: Vec::new(),
            },
        );
        assert_eq!(after, data);
    }

    #[test]
    fn test_out_of_order_event_is_ignored() {
        let idle = AIComparisonData::default();
        let after = transition(
            idle.clone(),
            AIComparisonEvent::AnalysisReceived(AIADocumentChangesAnalysisResponse {
                summary: "s".into(),
                categories: vec!["c".into()],
            }),
        );
        assert_eq!(after, idle);
    }

    #[test]
    fn test_no_changes_completes_without_service() {
        let data = tagging(&[]);
        assert_eq!(data.phase, AIComparisonPhase::Completed);
        assert_eq!(data.tagged_changes, Some(Vec::new()));
    }
}
