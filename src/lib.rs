//! # untextract
//!
//! Text and form extraction on top of a remote document-analysis service.
//!
//! Documents are analyzed either in one synchronous call or as asynchronous
//! jobs that are polled to completion. The service answers with a flat list
//! of typed, cross-referencing blocks; this crate indexes them into a
//! [`BlockGraph`] and reconstructs line text and form key/value pairs.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use untextract::{config::Settings, DocumentSource, Extractor, HttpService, OutputMode};
//!
//! # async fn run() -> untextract::Result<()> {
//! let settings = Settings::load()?;
//! let service = Arc::new(HttpService::from_settings(&settings)?);
//!
//! let document = DocumentSource::storage(settings.bucket()?, "invoice.pdf");
//! let extraction = Extractor::new(service)
//!     .extract_async(&document, OutputMode::Forms, None)
//!     .await?
//!     .into_result()?;
//!
//! if let Some(pairs) = extraction.pairs() {
//!     for (key, value) in pairs.sorted() {
//!         println!("{}: {}", key, value);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Bounded polling**: request count and deadline limits, cancellation
//! - **Paginated results**: every page is collected, terminal pages drained
//! - **Tolerant graph resolution**: dangling ids and cycles never abort a run
//! - **Raw result dumps**: the service response is kept next to the input

pub mod config;
pub mod detect;
pub mod dump;
pub mod error;
pub mod extract;
pub mod graph;
pub mod model;
pub mod poll;
pub mod render;
pub mod service;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, DocumentFormat};
pub use error::{Error, Result};
pub use extract::{ExtractedContent, Extraction, ExtractionOutcome, Extractor, OutputMode};
pub use graph::{resolve_text, BlockGraph, KeyValuePair, KeyValuePairs};
pub use model::{
    Block, BlockType, DocumentMetadata, DocumentSource, EntityType, FeatureSet, Job, JobId,
    JobStatus, NotificationChannel, Relationship, RelationshipType, ResultPage, TerminalStatus,
    Warning,
};
pub use poll::{spawn_poll, JobOutcome, JobPoller, PollOptions, PollState};
pub use render::{JsonFormat, OutputFormat};
pub use service::{AnalysisService, Credentials, PageRequest};
#[cfg(feature = "http")]
pub use service::{HttpConfig, HttpService};

use std::path::Path;

/// Read a saved result (one page or a merged job result) from a JSON file.
///
/// # Example
///
/// ```no_run
/// use untextract::{parse_result_file, BlockGraph};
///
/// let page = parse_result_file("scan.json").unwrap();
/// let graph = BlockGraph::build([page]);
/// println!("{} blocks", graph.len());
/// ```
pub fn parse_result_file<P: AsRef<Path>>(path: P) -> Result<ResultPage> {
    let data = std::fs::read(path)?;
    parse_result_bytes(&data)
}

/// Read a saved result from JSON bytes.
pub fn parse_result_bytes(data: &[u8]) -> Result<ResultPage> {
    serde_json::from_slice(data).map_err(|e| Error::Decode(e.to_string()))
}

/// Extract LINE texts from result pages.
///
/// # Example
///
/// ```no_run
/// use untextract::{extract_lines, parse_result_file};
///
/// let page = parse_result_file("scan.json").unwrap();
/// for line in extract_lines([page]) {
///     println!("{}", line);
/// }
/// ```
pub fn extract_lines<I>(pages: I) -> Vec<String>
where
    I: IntoIterator<Item = ResultPage>,
{
    BlockGraph::build(pages).line_texts()
}

/// Extract form key/value pairs from result pages.
pub fn extract_form_pairs<I>(pages: I) -> KeyValuePairs
where
    I: IntoIterator<Item = ResultPage>,
{
    graph::extract_pairs(&BlockGraph::build(pages))
}

/// Extract content from a saved result in the given mode.
pub fn extract_from_file<P: AsRef<Path>>(path: P, mode: OutputMode) -> Result<ExtractedContent> {
    let page = parse_result_file(path)?;
    Ok(match mode {
        OutputMode::Lines => ExtractedContent::Lines(extract_lines([page])),
        OutputMode::Forms => ExtractedContent::Forms(extract_form_pairs([page])),
    })
}
