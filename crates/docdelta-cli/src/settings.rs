//! CLI settings file
//!
//! ```toml
//! context_words = 3
//! granularity = "word"
//! format = "summary"
//! log = "production"
//!
//! [engine]
//! ai_timeout_ms = 30000
//!
//! [engine.plain_text]
//! line_height = 14.0
//! ```

use std::path::Path;

use docdelta_core::align::Granularity;
use docdelta_engine::EngineSettings;
use serde::Deserialize;

use crate::commands::compare::{LogProfile, OutputFormat};

/// Defaults for `compare`, overridden by command-line flags
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliSettings {
    pub context_words: Option<usize>,
    pub granularity: Option<Granularity>,
    pub format: Option<OutputFormat>,
    pub log: Option<LogProfile>,
    pub engine: EngineSettings,
}

impl CliSettings {
    /// Read `path`, or fall back to defaults when no file was given
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read settings file {}: {}", path.display(), e))?;
        Self::parse(&text).map_err(|e| format!("invalid settings file {}: {}", path.display(), e).into())
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let settings = CliSettings::parse(
            r#"
            context_words = 3
            granularity = "character"
            format = "summary"
            log = "off"

            [engine]
            ai_timeout_ms = 1500

            [engine.plain_text]
            line_height = 14.0
            "#,
        )
        .unwrap();

        assert_eq!(settings.context_words, Some(3));
        assert_eq!(settings.granularity, Some(Granularity::Character));
        assert_eq!(settings.format, Some(OutputFormat::Summary));
        assert_eq!(settings.log, Some(LogProfile::Off));
        assert_eq!(settings.engine.ai_timeout_ms, Some(1500));
        assert_eq!(settings.engine.plain_text.line_height, 14.0);
        assert_eq!(settings.engine.plain_text.glyph_width, 6.0);
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let settings = CliSettings::parse("").unwrap();
        assert!(settings.context_words.is_none());
        assert_eq!(settings.engine, EngineSettings::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(CliSettings::parse("contxt_words = 3").is_err());
    }
}
