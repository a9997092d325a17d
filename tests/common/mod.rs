//! Scripted analysis service shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use untextract::error::{Error, Result};
use untextract::model::{
    Block, DocumentSource, FeatureSet, JobId, JobStatus, NotificationChannel, ResultPage,
};
use untextract::service::{AnalysisService, PageRequest};

/// Service double that answers status requests from a script.
///
/// Once the script runs out, the `repeat` page (if any) is returned forever;
/// otherwise the request fails with a transport error.
#[derive(Default)]
pub struct ScriptedService {
    script: Mutex<VecDeque<Result<ResultPage>>>,
    repeat: Option<ResultPage>,
    analyze_page: Option<ResultPage>,
    fetch_delay: Duration,
    requests: Mutex<Vec<PageRequest>>,
    starts: Mutex<Vec<(DocumentSource, FeatureSet, Option<NotificationChannel>)>>,
    analyses: Mutex<Vec<FeatureSet>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages<I: IntoIterator<Item = ResultPage>>(pages: I) -> Self {
        Self {
            script: Mutex::new(pages.into_iter().map(Ok).collect()),
            ..Self::default()
        }
    }

    pub fn then_error(self, error: Error) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn repeating(mut self, page: ResultPage) -> Self {
        self.repeat = Some(page);
        self
    }

    pub fn with_analyze_page(mut self, page: ResultPage) -> Self {
        self.analyze_page = Some(page);
        self
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn starts(&self) -> Vec<(DocumentSource, FeatureSet, Option<NotificationChannel>)> {
        self.starts.lock().unwrap().clone()
    }

    pub fn analyses(&self) -> Vec<FeatureSet> {
        self.analyses.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisService for ScriptedService {
    async fn analyze(&self, _document: &DocumentSource, features: FeatureSet) -> Result<ResultPage> {
        self.analyses.lock().unwrap().push(features);
        self.analyze_page
            .clone()
            .ok_or_else(|| Error::Transport("no analyze result scripted".into()))
    }

    async fn start(
        &self,
        document: &DocumentSource,
        features: FeatureSet,
        notification: Option<&NotificationChannel>,
    ) -> Result<JobId> {
        self.starts
            .lock()
            .unwrap()
            .push((document.clone(), features, notification.cloned()));
        Ok(JobId::new("job-1"))
    }

    async fn fetch(&self, request: &PageRequest) -> Result<ResultPage> {
        self.requests.lock().unwrap().push(request.clone());
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(step) => step,
            None => self
                .repeat
                .clone()
                .ok_or_else(|| Error::Transport("script exhausted".into())),
        }
    }
}

/// A status page carrying the given blocks.
pub fn page(status: JobStatus, blocks: Vec<Block>) -> ResultPage {
    ResultPage::with_blocks(blocks).with_status(status)
}

/// A status page with no blocks.
pub fn in_progress() -> ResultPage {
    page(JobStatus::InProgress, Vec::new())
}

/// Blocks of one form field: KEY -> VALUE, each with a single word.
pub fn form_field(prefix: &str, key: &str, value: &str) -> Vec<Block> {
    let key_id = format!("{}-key", prefix);
    let value_id = format!("{}-value", prefix);
    let key_word = format!("{}-kw", prefix);
    let value_word = format!("{}-vw", prefix);

    vec![
        Block::key(key_id.as_str())
            .with_values([value_id.as_str()])
            .with_children([key_word.as_str()]),
        Block::value(value_id.as_str()).with_children([value_word.as_str()]),
        Block::word(key_word, key),
        Block::word(value_word, value),
    ]
}
