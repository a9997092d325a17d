//! Asynchronous analysis jobs.

use super::{Block, DocumentMetadata, FeatureSet, ResultPage, Warning};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque job identifier issued by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Status reported by a status/result query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    /// Still running
    #[default]
    InProgress,
    /// Finished successfully
    Succeeded,
    /// Finished with an error
    Failed,
    /// Any other value; treated as not yet finished
    Other(String),
}

impl JobStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Succeeded => "SUCCEEDED",
            JobStatus::Failed => "FAILED",
            JobStatus::Other(name) => name,
        }
    }

    /// The terminal status, if this is one.
    pub fn terminal(&self) -> Option<TerminalStatus> {
        match self {
            JobStatus::Succeeded => Some(TerminalStatus::Succeeded),
            JobStatus::Failed => Some(TerminalStatus::Failed),
            _ => None,
        }
    }

    /// Check if no further polling is needed.
    pub fn is_terminal(&self) -> bool {
        self.terminal().is_some()
    }
}

impl From<String> for JobStatus {
    fn from(name: String) -> Self {
        match name.as_str() {
            "IN_PROGRESS" => JobStatus::InProgress,
            "SUCCEEDED" => JobStatus::Succeeded,
            "FAILED" => JobStatus::Failed,
            _ => JobStatus::Other(name),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status from which no further polling occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    /// The job produced a result
    Succeeded,
    /// The job failed remotely
    Failed,
}

impl From<TerminalStatus> for JobStatus {
    fn from(status: TerminalStatus) -> Self {
        match status {
            TerminalStatus::Succeeded => JobStatus::Succeeded,
            TerminalStatus::Failed => JobStatus::Failed,
        }
    }
}

/// A submitted job and everything its status queries returned so far.
///
/// Only the poller mutates a job: it records each page as it arrives.
#[derive(Debug, Clone)]
pub struct Job {
    /// Identifier issued on submission
    pub id: JobId,

    /// Analysis requested on submission
    pub features: FeatureSet,

    /// Most recent status reported
    pub status: JobStatus,

    /// Blocks from every page, in arrival order
    pub blocks: Vec<Block>,

    /// Document metadata from the first page that carried it
    pub document_metadata: Option<DocumentMetadata>,

    /// Warnings from every page
    pub warnings: Vec<Warning>,

    /// Latest status message
    pub status_message: Option<String>,

    /// Number of status/result pages recorded
    pub pages_fetched: u32,

    /// When the job value was created locally
    pub submitted_at: DateTime<Utc>,
}

impl Job {
    /// Create a job in its initial state.
    pub fn new(id: JobId, features: FeatureSet) -> Self {
        Self {
            id,
            features,
            status: JobStatus::InProgress,
            blocks: Vec::new(),
            document_metadata: None,
            warnings: Vec::new(),
            status_message: None,
            pages_fetched: 0,
            submitted_at: Utc::now(),
        }
    }

    /// Record one status/result page and return its continuation token.
    ///
    /// Blocks are appended before the status is updated, so a terminal page
    /// never loses the blocks it carries.
    pub fn record_page(&mut self, page: ResultPage) -> Option<String> {
        self.pages_fetched += 1;
        self.blocks.extend(page.blocks);
        self.warnings.extend(page.warnings);
        if self.document_metadata.is_none() {
            self.document_metadata = page.document_metadata;
        }
        if page.status_message.is_some() {
            self.status_message = page.status_message;
        }
        if let Some(status) = page.job_status {
            self.status = status;
        }
        page.next_token.filter(|token| !token.is_empty())
    }

    /// Check if the job reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Merge everything recorded into a single result page.
    pub fn to_result_page(&self) -> ResultPage {
        ResultPage {
            blocks: self.blocks.clone(),
            document_metadata: self.document_metadata.clone(),
            job_status: Some(self.status.clone()),
            next_token: None,
            status_message: self.status_message.clone(),
            warnings: self.warnings.clone(),
            ..ResultPage::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_terminal() {
        assert!(!JobStatus::InProgress.is_terminal());
        assert!(!JobStatus::Other("PARTIAL".into()).is_terminal());
        assert_eq!(JobStatus::Succeeded.terminal(), Some(TerminalStatus::Succeeded));
        assert_eq!(JobStatus::Failed.terminal(), Some(TerminalStatus::Failed));
    }

    #[test]
    fn test_job_status_wire_names() {
        let status: JobStatus = serde_json::from_str("\"SUCCEEDED\"").unwrap();
        assert_eq!(status, JobStatus::Succeeded);
        let status: JobStatus = serde_json::from_str("\"PARTIAL_SUCCESS\"").unwrap();
        assert_eq!(status, JobStatus::Other("PARTIAL_SUCCESS".into()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"PARTIAL_SUCCESS\"");
    }

    #[test]
    fn test_record_page_appends_blocks_and_status() {
        let before = Utc::now();
        let mut job = Job::new(JobId::new("job-1"), FeatureSet::Text);
        assert!(job.submitted_at >= before && job.submitted_at <= Utc::now());

        let token = job.record_page(ResultPage {
            blocks: vec![Block::line("l1", "Hello")],
            job_status: Some(JobStatus::InProgress),
            next_token: Some("t1".into()),
            ..Default::default()
        });
        assert_eq!(token.as_deref(), Some("t1"));
        assert!(!job.is_terminal());

        let token = job.record_page(ResultPage {
            blocks: vec![Block::line("l2", "World")],
            job_status: Some(JobStatus::Succeeded),
            document_metadata: Some(DocumentMetadata { pages: Some(1) }),
            ..Default::default()
        });
        assert_eq!(token, None);
        assert!(job.is_terminal());
        assert_eq!(job.blocks.len(), 2);
        assert_eq!(job.blocks[0].id(), Some("l1"));
        assert_eq!(job.pages_fetched, 2);
    }

    #[test]
    fn test_record_page_ignores_empty_token() {
        let mut job = Job::new(JobId::new("job-1"), FeatureSet::Forms);
        let token = job.record_page(ResultPage {
            next_token: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(token, None);
    }

    #[test]
    fn test_to_result_page() {
        let mut job = Job::new(JobId::new("job-1"), FeatureSet::Text);
        job.record_page(ResultPage {
            blocks: vec![Block::line("l1", "Hello")],
            job_status: Some(JobStatus::Succeeded),
            next_token: Some("more".into()),
            ..Default::default()
        });

        let page = job.to_result_page();
        assert_eq!(page.blocks.len(), 1);
        assert_eq!(page.job_status, Some(JobStatus::Succeeded));
        assert_eq!(page.next_token, None);
    }
}
