//! HTTP client for the Textract JSON 1.1 protocol.

use super::signing::{sign_json_request, Credentials, JSON_CONTENT_TYPE};
use super::{AnalysisService, PageRequest};
use crate::error::{Error, Result};
use crate::model::{DocumentSource, FeatureSet, JobId, NotificationChannel, ResultPage};
use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const SERVICE_NAME: &str = "textract";
const TARGET_PREFIX: &str = "Textract";

/// Connection settings for [`HttpService`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Region the requests are signed for
    pub region: String,
    /// Endpoint override; defaults to the regional endpoint
    pub endpoint: Option<String>,
    /// Signing credentials
    pub credentials: Credentials,
    /// Per-request timeout
    pub timeout: Duration,
}

impl HttpConfig {
    /// Create a configuration for the regional endpoint.
    pub fn new(region: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            region: region.into(),
            endpoint: None,
            credentials,
            timeout: Duration::from_secs(60),
        }
    }

    /// Send requests to a custom endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint URL requests are sent to.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}.{}.amazonaws.com", SERVICE_NAME, self.region),
        }
    }
}

/// [`AnalysisService`] backed by the remote HTTP API.
#[derive(Debug, Clone)]
pub struct HttpService {
    client: reqwest::Client,
    config: HttpConfig,
    url: Url,
    host: String,
}

impl HttpService {
    /// Build a client for the given configuration.
    pub fn new(config: HttpConfig) -> Result<Self> {
        let url = Url::parse(&config.endpoint_url())
            .map_err(|e| Error::Config(format!("invalid endpoint: {}", e)))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(Error::Config(format!("endpoint has no host: {}", url))),
        };

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("untextract/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            config,
            url,
            host,
        })
    }

    /// Build a client from loaded settings.
    pub fn from_settings(settings: &crate::config::Settings) -> Result<Self> {
        let mut config = HttpConfig::new(settings.region()?, settings.credentials()?);
        if let Some(endpoint) = settings.endpoint() {
            config = config.with_endpoint(endpoint);
        }
        Self::new(config)
    }

    async fn call(&self, operation: &str, body: &Value) -> Result<Value> {
        let payload = serde_json::to_vec(body).map_err(|e| Error::Decode(e.to_string()))?;
        let target = format!("{}.{}", TARGET_PREFIX, operation);
        let signed = sign_json_request(
            &self.config.credentials,
            &self.config.region,
            SERVICE_NAME,
            &self.host,
            &target,
            &payload,
            Utc::now(),
        )?;

        log::debug!("POST {} ({} bytes)", target, payload.len());

        let mut request = self
            .client
            .post(self.url.clone())
            .header("Content-Type", JSON_CONTENT_TYPE)
            .header("X-Amz-Target", &target)
            .header("X-Amz-Date", &signed.amz_date)
            .header("Authorization", &signed.authorization);
        if let Some(token) = &self.config.credentials.session_token {
            request = request.header("X-Amz-Security-Token", token);
        }

        let response = request.body(payload).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(service_error(status.as_u16(), &bytes));
        }

        serde_json::from_slice(&bytes).map_err(|e| Error::Decode(format!("{}: {}", target, e)))
    }
}

#[async_trait]
impl AnalysisService for HttpService {
    async fn analyze(&self, document: &DocumentSource, features: FeatureSet) -> Result<ResultPage> {
        let (operation, body) = analyze_body(document, features)?;
        let response = self.call(operation, &body).await?;
        decode_page(response)
    }

    async fn start(
        &self,
        document: &DocumentSource,
        features: FeatureSet,
        notification: Option<&NotificationChannel>,
    ) -> Result<JobId> {
        let (operation, body) = start_body(document, features, notification)?;
        let response: StartResponse = serde_json::from_value(self.call(operation, &body).await?)
            .map_err(|e| Error::Decode(e.to_string()))?;
        Ok(JobId::new(response.job_id))
    }

    async fn fetch(&self, request: &PageRequest) -> Result<ResultPage> {
        let (operation, body) = fetch_body(request);
        let response = self.call(operation, &body).await?;
        decode_page(response)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StartResponse {
    job_id: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type", default)]
    kind: Option<String>,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

fn service_error(status: u16, body: &[u8]) -> Error {
    let parsed: Option<ErrorBody> = serde_json::from_slice(body).ok();
    let (kind, message) = parsed
        .map(|b| (b.kind, b.message))
        .unwrap_or((None, None));

    // "__type" may carry a namespace prefix: "com.amazon...#InvalidParameterException"
    let code = kind
        .map(|k| k.rsplit('#').next().unwrap_or(&k).to_string())
        .unwrap_or_else(|| format!("HTTP {}", status));
    let message = message.unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());

    Error::Service { code, message }
}

fn decode_page(value: Value) -> Result<ResultPage> {
    serde_json::from_value(value).map_err(|e| Error::Decode(e.to_string()))
}

fn document_json(document: &DocumentSource) -> Value {
    match document {
        DocumentSource::Bytes(data) => {
            json!({ "Bytes": base64::engine::general_purpose::STANDARD.encode(data) })
        }
        DocumentSource::StorageObject { .. } => json!({ "S3Object": storage_json(document) }),
    }
}

fn storage_json(document: &DocumentSource) -> Value {
    match document {
        DocumentSource::StorageObject {
            bucket,
            name,
            version,
        } => {
            let mut object = json!({ "Bucket": bucket, "Name": name });
            if let Some(version) = version {
                object["Version"] = json!(version);
            }
            object
        }
        DocumentSource::Bytes(_) => Value::Null,
    }
}

fn analyze_body(document: &DocumentSource, features: FeatureSet) -> Result<(&'static str, Value)> {
    let document = document_json(document);
    Ok(match features {
        FeatureSet::Text => ("DetectDocumentText", json!({ "Document": document })),
        FeatureSet::Forms => (
            "AnalyzeDocument",
            json!({ "Document": document, "FeatureTypes": ["FORMS"] }),
        ),
    })
}

fn start_body(
    document: &DocumentSource,
    features: FeatureSet,
    notification: Option<&NotificationChannel>,
) -> Result<(&'static str, Value)> {
    if document.is_inline() {
        return Err(Error::InvalidRequest(
            "asynchronous jobs read the document from storage, not inline bytes".to_string(),
        ));
    }

    let mut body = json!({ "DocumentLocation": { "S3Object": storage_json(document) } });
    if let Some(channel) = notification {
        body["NotificationChannel"] = json!({
            "RoleArn": channel.role_arn,
            "SNSTopicArn": channel.topic_arn,
        });
    }

    Ok(match features {
        FeatureSet::Text => ("StartDocumentTextDetection", body),
        FeatureSet::Forms => {
            body["FeatureTypes"] = json!(["FORMS"]);
            ("StartDocumentAnalysis", body)
        }
    })
}

fn fetch_body(request: &PageRequest) -> (&'static str, Value) {
    let mut body = json!({
        "JobId": request.job_id.as_str(),
        "MaxResults": request.max_results,
    });
    if let Some(token) = &request.next_token {
        body["NextToken"] = json!(token);
    }

    let operation = match request.features {
        FeatureSet::Text => "GetDocumentTextDetection",
        FeatureSet::Forms => "GetDocumentAnalysis",
    };
    (operation, body)
}
