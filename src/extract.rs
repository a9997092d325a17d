//! End-to-end extraction of one document.
//!
//! [`Extractor`] submits a document, waits for the result when the job is
//! asynchronous, optionally dumps the raw result to disk, builds the
//! [`BlockGraph`] and pulls out either the LINE texts or the form fields.

use crate::dump::write_dump;
use crate::error::{Error, Result};
use crate::graph::{extract_pairs, BlockGraph, KeyValuePairs};
use crate::model::{DocumentSource, FeatureSet, Job, JobId, NotificationChannel, ResultPage, Warning};
use crate::poll::{JobPoller, PollOptions};
use crate::service::AnalysisService;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

/// What to extract from the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// The text of every LINE block
    #[default]
    Lines,
    /// Key/value pairs of form fields
    Forms,
}

impl OutputMode {
    /// Analysis the service has to run for this mode.
    pub fn features(&self) -> FeatureSet {
        match self {
            OutputMode::Lines => FeatureSet::Text,
            OutputMode::Forms => FeatureSet::Forms,
        }
    }

    fn extract(&self, graph: &BlockGraph) -> ExtractedContent {
        match self {
            OutputMode::Lines => ExtractedContent::Lines(graph.line_texts()),
            OutputMode::Forms => ExtractedContent::Forms(extract_pairs(graph)),
        }
    }
}

/// Extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedContent {
    /// LINE texts in arrival order
    Lines(Vec<String>),
    /// Form fields
    Forms(KeyValuePairs),
}

/// A completed extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Every block of the result
    pub graph: BlockGraph,
    /// What was extracted
    pub content: ExtractedContent,
    /// Page count reported by the service
    pub pages: Option<u32>,
    /// Warnings reported by the service
    pub warnings: Vec<Warning>,
    /// Job that produced the result (asynchronous path only)
    pub job_id: Option<JobId>,
    /// Where the raw result was written, if it was
    pub dump_path: Option<PathBuf>,
}

impl Extraction {
    /// Extracted lines, if this was a line extraction.
    pub fn lines(&self) -> Option<&[String]> {
        match &self.content {
            ExtractedContent::Lines(lines) => Some(lines),
            ExtractedContent::Forms(_) => None,
        }
    }

    /// Extracted pairs, if this was a form extraction.
    pub fn pairs(&self) -> Option<&KeyValuePairs> {
        match &self.content {
            ExtractedContent::Forms(pairs) => Some(pairs),
            ExtractedContent::Lines(_) => None,
        }
    }
}

/// Result of running an extraction.
#[derive(Debug, Clone)]
pub enum ExtractionOutcome {
    /// The service produced a result and it was extracted
    Completed(Extraction),
    /// The remote job failed; nothing was extracted
    JobFailed {
        /// Failed job
        job_id: JobId,
        /// Reason reported by the service
        message: Option<String>,
    },
}

impl ExtractionOutcome {
    /// Return the extraction, or [`Error::JobFailed`].
    pub fn into_result(self) -> Result<Extraction> {
        match self {
            ExtractionOutcome::Completed(extraction) => Ok(extraction),
            ExtractionOutcome::JobFailed { job_id, message } => Err(Error::JobFailed {
                job_id: job_id.to_string(),
                message,
            }),
        }
    }
}

/// Runs extractions against a shared service.
pub struct Extractor<S: AnalysisService + ?Sized> {
    service: Arc<S>,
    options: PollOptions,
    dump_to: Option<PathBuf>,
}

impl<S: AnalysisService + ?Sized> Extractor<S> {
    /// Create an extractor with default poll options and no result dump.
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            options: PollOptions::default(),
            dump_to: None,
        }
    }

    /// Set the poll options for asynchronous jobs.
    pub fn with_poll_options(mut self, options: PollOptions) -> Self {
        self.options = options;
        self
    }

    /// Write the raw result to `path` before extracting.
    pub fn with_dump(mut self, path: impl Into<PathBuf>) -> Self {
        self.dump_to = Some(path.into());
        self
    }

    /// Analyze a document in a single call.
    pub async fn extract_sync(
        &self,
        source: &DocumentSource,
        mode: OutputMode,
    ) -> Result<ExtractionOutcome> {
        log::info!("Analyzing {:?} ({})", source, mode.features().as_str());
        let page = self.service.analyze(source, mode.features()).await?;
        let dump_path = self.dump(&page);

        Ok(ExtractionOutcome::Completed(finish(page, mode, None, dump_path)))
    }

    /// Start a job for a stored document and extract once it completes.
    pub async fn extract_async(
        &self,
        source: &DocumentSource,
        mode: OutputMode,
        notification: Option<&NotificationChannel>,
    ) -> Result<ExtractionOutcome> {
        self.extract_async_until(source, mode, notification, std::future::pending::<()>())
            .await
    }

    /// Like [`Extractor::extract_async`], but stop waiting with
    /// [`Error::Cancelled`] once `shutdown` completes.
    pub async fn extract_async_until<F>(
        &self,
        source: &DocumentSource,
        mode: OutputMode,
        notification: Option<&NotificationChannel>,
        shutdown: F,
    ) -> Result<ExtractionOutcome>
    where
        F: Future,
    {
        if source.is_inline() {
            return Err(Error::InvalidRequest(
                "asynchronous jobs need a stored document, not inline bytes".to_string(),
            ));
        }

        let features = mode.features();
        let job_id = self.service.start(source, features, notification).await?;
        log::info!("Started {} job {}", features.as_str(), job_id);

        let poller = JobPoller::new(self.service.as_ref(), self.options.clone());
        let outcome = poller
            .poll_until(Job::new(job_id, features), shutdown)
            .await?;

        if !outcome.is_success() {
            log::info!("Job {} failed, nothing to extract", outcome.job.id);
            return Ok(ExtractionOutcome::JobFailed {
                job_id: outcome.job.id,
                message: outcome.job.status_message,
            });
        }

        let job = outcome.job;
        let page = job.to_result_page();
        let dump_path = self.dump(&page);

        Ok(ExtractionOutcome::Completed(finish(
            page,
            mode,
            Some(job.id),
            dump_path,
        )))
    }

    /// Write the dump if one is configured; a failed write only logs.
    fn dump(&self, page: &ResultPage) -> Option<PathBuf> {
        let path = self.dump_to.as_deref()?;
        match write_dump(page, path) {
            Ok(()) => Some(path.to_path_buf()),
            Err(e) => {
                log::warn!("Could not write result dump to {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn finish(
    page: ResultPage,
    mode: OutputMode,
    job_id: Option<JobId>,
    dump_path: Option<PathBuf>,
) -> Extraction {
    let pages = page.page_count();
    let warnings = page.warnings;
    let graph = BlockGraph::from_blocks(page.blocks);
    let content = mode.extract(&graph);

    Extraction {
        graph,
        content,
        pages,
        warnings,
        job_id,
        dump_path,
    }
}
