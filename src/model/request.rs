//! What gets submitted to the analysis service.

use crate::detect::{detect_format_from_bytes, DocumentFormat};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Where the service reads the document from.
#[derive(Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Document content sent inline with the request
    Bytes(Vec<u8>),

    /// Object in the service's external storage
    StorageObject {
        /// Bucket name
        bucket: String,
        /// Object key
        name: String,
        /// Object version, if versioning is enabled
        version: Option<String>,
    },
}

impl DocumentSource {
    /// Read a local file into an inline source.
    ///
    /// Fails with [`crate::Error::Io`] if the file cannot be read and with
    /// [`crate::Error::InvalidRequest`] if it is not a supported image or PDF.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        detect_format_from_bytes(&data)?;
        Ok(DocumentSource::Bytes(data))
    }

    /// Reference an object in storage.
    pub fn storage(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        DocumentSource::StorageObject {
            bucket: bucket.into(),
            name: name.into(),
            version: None,
        }
    }

    /// Check if the document is sent inline.
    pub fn is_inline(&self) -> bool {
        matches!(self, DocumentSource::Bytes(_))
    }

    /// Detected format of inline content.
    pub fn format(&self) -> Option<DocumentFormat> {
        match self {
            DocumentSource::Bytes(data) => detect_format_from_bytes(data).ok(),
            DocumentSource::StorageObject { .. } => None,
        }
    }
}

impl fmt::Debug for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::Bytes(data) => write!(f, "Bytes({} bytes)", data.len()),
            DocumentSource::StorageObject {
                bucket,
                name,
                version,
            } => f
                .debug_struct("StorageObject")
                .field("bucket", bucket)
                .field("name", name)
                .field("version", version)
                .finish(),
        }
    }
}

/// Which analysis the service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSet {
    /// Plain text detection (pages, lines, words)
    #[default]
    Text,
    /// Form analysis (adds key/value containers)
    Forms,
}

impl FeatureSet {
    /// Name used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureSet::Text => "text",
            FeatureSet::Forms => "forms",
        }
    }
}

/// Where the service announces job completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    /// Role the service assumes to publish
    pub role_arn: String,
    /// Topic that receives the completion message
    pub topic_arn: String,
}

impl NotificationChannel {
    /// Create a notification channel.
    pub fn new(role_arn: impl Into<String>, topic_arn: impl Into<String>) -> Self {
        Self {
            role_arn: role_arn.into(),
            topic_arn: topic_arn.into(),
        }
    }
}
