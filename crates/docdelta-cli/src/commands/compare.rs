//! Compare command
//!
//! Usage: docdelta compare <ORIGINAL> <CHANGED> [--context-words <N>]
//!        [--granularity word|character] [--format json|summary]
//!        [--original-pages <SEL>] [--changed-pages <SEL>] [--output <FILE>]
//!
//! Inputs are UTF-8 text files; form feeds separate pages.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use docdelta_core::align::Granularity;
use docdelta_core::logging_facility::{init, Profile};
use docdelta_core::model::PageSelection;
use docdelta_core::{
    render_human_summary, ComparisonDocuments, ComparisonOperation, DocumentDescriptor,
    TextComparisonOptions,
};
use docdelta_engine::Comparator;
use serde::Deserialize;

use crate::settings::CliSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured result as JSON (`null` when nothing differs)
    Json,
    /// Markdown summary
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogProfile {
    Off,
    Development,
    Production,
}

impl From<LogProfile> for Profile {
    fn from(profile: LogProfile) -> Self {
        match profile {
            LogProfile::Off => Profile::Test,
            LogProfile::Development => Profile::Development,
            LogProfile::Production => Profile::Production,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GranularityArg {
    Word,
    Character,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Word => Granularity::Word,
            GranularityArg::Character => Granularity::Character,
        }
    }
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Original document
    pub original: PathBuf,

    /// Changed document
    pub changed: PathBuf,

    /// Words of unchanged text kept around each change
    #[arg(short = 'C', long)]
    pub context_words: Option<usize>,

    /// Diff unit
    #[arg(short, long, value_enum)]
    pub granularity: Option<GranularityArg>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pages of the original document, e.g. `0,2-4` (default: all)
    #[arg(long)]
    pub original_pages: Option<String>,

    /// Pages of the changed document, e.g. `1` (default: all)
    #[arg(long)]
    pub changed_pages: Option<String>,

    /// Log output on stderr
    #[arg(long, value_enum)]
    pub log: Option<LogProfile>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute compare command
pub fn execute(args: CompareArgs, settings: CliSettings) -> Result<(), Box<dyn std::error::Error>> {
    init(args.log.or(settings.log).unwrap_or(LogProfile::Off).into());

    let granularity = args
        .granularity
        .map(Granularity::from)
        .or(settings.granularity)
        .unwrap_or_default();
    let options = TextComparisonOptions {
        number_of_context_words: args.context_words.or(settings.context_words).unwrap_or(0),
        word_level: granularity == Granularity::Word,
    };
    let format = args.format.or(settings.format).unwrap_or(OutputFormat::Json);

    let documents = ComparisonDocuments::new(
        descriptor(args.original, args.original_pages.as_deref())?,
        descriptor(args.changed, args.changed_pages.as_deref())?,
    );

    let comparator = Comparator::plain_text(settings.engine);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(comparator.compare(documents, ComparisonOperation::Text(options)))?;

    let rendered = match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&outcome.changes())?;
            json.push('\n');
            json
        }
        OutputFormat::Summary => render_human_summary(outcome.changes()),
    };

    // Output
    if let Some(output_path) = args.output {
        std::fs::write(&output_path, rendered)?;
        println!("✓ Wrote comparison to {}", output_path.display());
    } else {
        print!("{}", rendered);
    }

    Ok(())
}

fn descriptor(
    path: PathBuf,
    pages: Option<&str>,
) -> Result<DocumentDescriptor, Box<dyn std::error::Error>> {
    let descriptor = DocumentDescriptor::from_path(path);
    Ok(match pages {
        Some(pages) => descriptor.with_pages(parse_pages(pages)?),
        None => descriptor,
    })
}

/// Parse a page list such as `0,2-4`; an empty string selects no pages
pub fn parse_pages(text: &str) -> Result<Vec<PageSelection>, String> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('-') {
            Some((start, end)) => Ok(PageSelection::Range([
                parse_index(start)?,
                parse_index(end)?,
            ])),
            None => parse_index(part).map(PageSelection::Index),
        })
        .collect()
}

fn parse_index(text: &str) -> Result<u32, String> {
    text.trim()
        .parse()
        .map_err(|_| format!("invalid page index '{}'", text.trim()))
}
