//! Remote analysis service interface.
//!
//! The rest of the crate talks to the service only through
//! [`AnalysisService`], so the poller and the extractor can be driven by the
//! HTTP client in production and by scripted doubles in tests.

#[cfg(feature = "http")]
mod http;
pub mod signing;

#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpService};
pub use signing::Credentials;

use crate::error::Result;
use crate::model::{DocumentSource, FeatureSet, JobId, NotificationChannel, ResultPage};
use async_trait::async_trait;

/// Default cap on blocks returned per status/result page.
pub const DEFAULT_MAX_RESULTS: u32 = 1000;

/// Parameters of one status/result query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Job to query
    pub job_id: JobId,
    /// Analysis the job was started with
    pub features: FeatureSet,
    /// Maximum blocks per page
    pub max_results: u32,
    /// Cursor from the previous page
    pub next_token: Option<String>,
}

impl PageRequest {
    /// Query the first page of a job.
    pub fn first(job_id: JobId, features: FeatureSet) -> Self {
        Self {
            job_id,
            features,
            max_results: DEFAULT_MAX_RESULTS,
            next_token: None,
        }
    }

    /// Set the page size cap.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Set the continuation token.
    pub fn with_next_token(mut self, token: Option<String>) -> Self {
        self.next_token = token;
        self
    }
}

/// Operations of the remote document-analysis service.
///
/// Implementations hold no per-document state and can be shared across
/// concurrent submissions.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Analyze a document in one call and return the whole result.
    async fn analyze(&self, document: &DocumentSource, features: FeatureSet)
        -> Result<ResultPage>;

    /// Start an asynchronous job and return its identifier.
    async fn start(
        &self,
        document: &DocumentSource,
        features: FeatureSet,
        notification: Option<&NotificationChannel>,
    ) -> Result<JobId>;

    /// Query a job's status and one page of its result.
    async fn fetch(&self, request: &PageRequest) -> Result<ResultPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_builder() {
        let request = PageRequest::first(JobId::new("job-1"), FeatureSet::Forms)
            .with_max_results(50)
            .with_next_token(Some("t".into()));

        assert_eq!(request.max_results, 50);
        assert_eq!(request.next_token.as_deref(), Some("t"));
        assert_eq!(request.features, FeatureSet::Forms);
    }

    #[test]
    fn test_page_request_defaults() {
        let request = PageRequest::first(JobId::new("job-1"), FeatureSet::Text);
        assert_eq!(request.max_results, DEFAULT_MAX_RESULTS);
        assert!(request.next_token.is_none());
    }
}
