//! Comparison configuration value
//!
//! A `ComparisonOperation` is built once by the caller and selects which
//! pipeline runs: the plain structural diff, or the structural diff followed
//! by AI analysis/tagging.

use serde::{Deserialize, Serialize};

use crate::align::Granularity;
use crate::errors::{CompareError, Result};

/// Options shared by both pipelines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextComparisonOptions {
    /// Words of unchanged text kept around each change
    pub number_of_context_words: usize,
    /// Diff whole words (true) or individual code points (false)
    pub word_level: bool,
}

impl Default for TextComparisonOptions {
    fn default() -> Self {
        Self {
            number_of_context_words: 0,
            word_level: true,
        }
    }
}

impl TextComparisonOptions {
    pub fn granularity(&self) -> Granularity {
        if self.word_level {
            Granularity::Word
        } else {
            Granularity::Character
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiOperationType {
    Analyze,
    Tag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiComparisonOptions {
    #[serde(flatten)]
    pub text: TextComparisonOptions,
    pub ai_operation_type: AiOperationType,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options", rename_all = "lowercase")]
pub enum ComparisonOperation {
    Text(TextComparisonOptions),
    Ai(AiComparisonOptions),
}

impl Default for ComparisonOperation {
    fn default() -> Self {
        ComparisonOperation::Text(TextComparisonOptions::default())
    }
}

impl ComparisonOperation {
    pub fn text(number_of_context_words: usize, word_level: bool) -> Self {
        ComparisonOperation::Text(TextComparisonOptions {
            number_of_context_words,
            word_level,
        })
    }

    pub fn analyze(text: TextComparisonOptions) -> Self {
        ComparisonOperation::Ai(AiComparisonOptions {
            text,
            ai_operation_type: AiOperationType::Analyze,
            categories: Vec::new(),
        })
    }

    pub fn tag<I, S>(text: TextComparisonOptions, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ComparisonOperation::Ai(AiComparisonOptions {
            text,
            ai_operation_type: AiOperationType::Tag,
            categories: categories.into_iter().map(Into::into).collect(),
        })
    }

    /// Options of the structural diff, which both pipelines run
    pub fn text_options(&self) -> &TextComparisonOptions {
        match self {
            ComparisonOperation::Text(options) => options,
            ComparisonOperation::Ai(options) => &options.text,
        }
    }

    pub fn ai_options(&self) -> Option<&AiComparisonOptions> {
        match self {
            ComparisonOperation::Text(_) => None,
            ComparisonOperation::Ai(options) => Some(options),
        }
    }

    /// Reject combinations the pipeline cannot run, before any I/O
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` when tagging has no categories to tag with,
    /// `InvalidInput` for blank or duplicate category names.
    pub fn validate(&self) -> Result<()> {
        let Some(ai) = self.ai_options() else {
            return Ok(());
        };

        if ai.ai_operation_type == AiOperationType::Tag && ai.categories.is_empty() {
            return Err(CompareError::UnsupportedOperation {
                reason: "tagging requires at least one category".to_string(),
            });
        }

        for (i, category) in ai.categories.iter().enumerate() {
            if category.trim().is_empty() {
                return Err(CompareError::InvalidInput {
                    reason: format!("category #{} is blank", i),
                });
            }
            if ai.categories[..i].contains(category) {
                return Err(CompareError::InvalidInput {
                    reason: format!("category '{}' is listed twice", category),
                });
            }
        }
        Ok(())
    }
}
