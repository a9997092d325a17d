//! Result pages returned by the analysis service.

use super::{Block, JobStatus};
use serde::{Deserialize, Serialize};

/// Document-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentMetadata {
    /// Number of pages in the analyzed document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
}

/// A non-fatal problem the service reported for some pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Warning {
    /// Error code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,

    /// Affected pages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<u32>,
}

/// One response of the service.
///
/// The synchronous call returns a single page with no job status. Status
/// queries return one page per request, carrying the job status and, when
/// more blocks remain, a continuation token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultPage {
    /// Blocks on this page, in service order
    #[serde(default)]
    pub blocks: Vec<Block>,

    /// Document-level metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_metadata: Option<DocumentMetadata>,

    /// Job status (status queries only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_status: Option<JobStatus>,

    /// Cursor for the next page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,

    /// Reason for a FAILED status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,

    /// Per-page warnings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,

    /// Model version of text detection results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detect_document_text_model_version: Option<String>,

    /// Model version of document analysis results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyze_document_model_version: Option<String>,
}

impl ResultPage {
    /// Create a page holding the given blocks.
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            ..Self::default()
        }
    }

    /// Set the job status.
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.job_status = Some(status);
        self
    }

    /// Set the continuation token.
    pub fn with_next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }

    /// Number of pages reported in the document metadata.
    pub fn page_count(&self) -> Option<u32> {
        self.document_metadata.as_ref().and_then(|m| m.pages)
    }
}
