//! AI comparison data model

use serde::{Deserialize, Serialize};

use crate::errors::ExError;
use crate::model::{DocumentComparisonResult, DocumentSide, OperationType};
use crate::operation::AiOperationType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AIComparisonPhase {
    #[default]
    Idle,
    Loading,
    Analyzing,
    Tagging,
    Completed,
    Error,
}

impl AIComparisonPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AIComparisonPhase::Completed | AIComparisonPhase::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AIComparisonPhase::Idle => "IDLE",
            AIComparisonPhase::Loading => "LOADING",
            AIComparisonPhase::Analyzing => "ANALYZING",
            AIComparisonPhase::Tagging => "TAGGING",
            AIComparisonPhase::Completed => "COMPLETED",
            AIComparisonPhase::Error => "ERROR",
        }
    }
}

/// Sub-operation an AI error is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AIErrorPhase {
    Analysis,
    Tagging,
}

impl From<AiOperationType> for AIErrorPhase {
    fn from(op: AiOperationType) -> Self {
        match op {
            AiOperationType::Analyze => AIErrorPhase::Analysis,
            AiOperationType::Tag => AIErrorPhase::Tagging,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIComparisonError {
    pub phase: AIErrorPhase,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<String>,
    /// Stable `ERR_*` code of the underlying failure
    pub code: String,
    /// Document that could not be loaded, for failures before the AI call
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub side: Option<DocumentSide>,
}

impl AIComparisonError {
    pub fn from_ex_error(phase: AIErrorPhase, err: &ExError) -> Self {
        let message = if err.message().is_empty() {
            err.to_string()
        } else {
            err.message().to_string()
        };
        Self {
            phase,
            message,
            details: err.details().map(str::to_string),
            code: err.code().to_string(),
            side: err.side(),
        }
    }
}

/// One insert/delete submitted to the AI service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIADocumentChangePayload {
    pub id: String,
    #[serde(rename = "type")]
    pub change_type: OperationType,
    pub text: String,
    pub context_before: String,
    pub context_after: String,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AIADocumentChangesAnalysisResponse {
    pub summary: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedChangeReference {
    pub id: String,
    pub tag: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AIADocumentChangesTaggingResponse {
    pub references: Vec<TaggedChangeReference>,
}

/// What the AI service answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AiServiceResponse {
    Analysis(AIADocumentChangesAnalysisResponse),
    Tagging(AIADocumentChangesTaggingResponse),
}

/// A submitted change joined with the tags the service assigned to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIEnhancedChange {
    #[serde(flatten)]
    pub change: AIADocumentChangePayload,
    pub tags: Vec<String>,
}

/// Observable snapshot of one AI orchestration
///
/// `changes` is the structural result the AI stage runs on; it is set once
/// and never altered by later phases.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIComparisonData {
    pub phase: AIComparisonPhase,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ai_operation_type: Option<AiOperationType>,
    #[serde(default)]
    pub requested_categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub changes: Option<DocumentComparisonResult>,
    #[serde(default)]
    pub error: Option<AIComparisonError>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tagged_changes: Option<Vec<TaggedChangeReference>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub transformed_changes: Option<Vec<AIADocumentChangePayload>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ai_enhanced_changes: Option<Vec<AIEnhancedChange>>,
}

impl AIComparisonData {
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Final result once the orchestration completed
    pub fn result(&self) -> Option<AIDocumentComparisonResult> {
        if self.phase != AIComparisonPhase::Completed {
            return None;
        }
        match self.ai_operation_type? {
            AiOperationType::Analyze => Some(AIDocumentComparisonResult::Analysis {
                summary: self.summary.clone().unwrap_or_default(),
                categories: self.categories.clone(),
                changes: self.changes.clone(),
            }),
            AiOperationType::Tag => Some(AIDocumentComparisonResult::Tagging {
                references: self.tagged_changes.clone().unwrap_or_default(),
                changes: self.changes.clone(),
            }),
        }
    }
}

/// Completed AI comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AIDocumentComparisonResult {
    Analysis {
        summary: String,
        categories: Vec<String>,
        changes: Option<DocumentComparisonResult>,
    },
    Tagging {
        references: Vec<TaggedChangeReference>,
        changes: Option<DocumentComparisonResult>,
    },
}

impl AIDocumentComparisonResult {
    pub fn is_analysis(&self) -> bool {
        matches!(self, AIDocumentComparisonResult::Analysis { .. })
    }

    pub fn is_tagging(&self) -> bool {
        matches!(self, AIDocumentComparisonResult::Tagging { .. })
    }

    /// Structural result the AI stage ran on
    pub fn changes(&self) -> Option<&DocumentComparisonResult> {
        match self {
            AIDocumentComparisonResult::Analysis { changes, .. }
            | AIDocumentComparisonResult::Tagging { changes, .. } => changes.as_ref(),
        }
    }
}

pub fn is_analysis_result(result: &AIDocumentComparisonResult) -> bool {
    result.is_analysis()
}

pub fn is_tagging_result(result: &AIDocumentComparisonResult) -> bool {
    result.is_tagging()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_wire_names() {
        assert_eq!(
            serde_json::to_string(&AIComparisonPhase::Tagging).unwrap(),
            "\"TAGGING\""
        );
        assert_eq!(
            serde_json::to_string(&AIErrorPhase::Analysis).unwrap(),
            "\"ANALYSIS\""
        );
    }

    #[test]
    fn test_service_response_shapes() {
        let analysis: AiServiceResponse =
            serde_json::from_str(r#"{"summary":"Rent raised","categories":["Legal"]}"#).unwrap();
        assert!(matches!(analysis, AiServiceResponse::Analysis(_)));

        let tagging: AiServiceResponse =
            serde_json::from_str(r#"{"references":[{"id":"0-0-1","tag":["Legal"]}]}"#).unwrap();
        assert!(matches!(tagging, AiServiceResponse::Tagging(_)));
    }

    #[test]
    fn test_discriminators() {
        let analysis = AIDocumentComparisonResult::Analysis {
            summary: "s".into(),
            categories: vec!["c".into()],
            changes: None,
        };
        let tagging = AIDocumentComparisonResult::Tagging {
            references: Vec::new(),
            changes: None,
        };
        assert!(is_analysis_result(&analysis) && !is_tagging_result(&analysis));
        assert!(is_tagging_result(&tagging) && !is_analysis_result(&tagging));
    }

    #[test]
    fn test_result_only_when_completed() {
        let mut data = AIComparisonData {
            ai_operation_type: Some(AiOperationType::Analyze),
            summary: Some("done".into()),
            categories: vec!["Legal".into()],
            ..Default::default()
        };
        assert!(data.result().is_none());
        data.phase = AIComparisonPhase::Completed;
        assert!(data.result().unwrap().is_analysis());
    }
}
