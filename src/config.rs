//! Run settings: credentials, region, bucket and endpoint.
//!
//! Settings come from an optional `.env` file of `key=value` lines, then
//! from `UNTEXTRACT_`-prefixed environment variables, which take precedence.
//! A file ending in `.toml` is read as TOML instead.

use crate::error::{Error, Result};
use crate::model::NotificationChannel;
use crate::service::Credentials;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default settings file.
pub const DEFAULT_SETTINGS_FILE: &str = ".env";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "UNTEXTRACT";

/// Setting keys.
pub mod keys {
    /// Access key id
    pub const ACCESS_KEY: &str = "awsaccesskey";
    /// Secret access key
    pub const SECRET: &str = "awssecret";
    /// Session token
    pub const TOKEN: &str = "awstoken";
    /// Region
    pub const REGION: &str = "awsregion";
    /// Bucket holding documents for asynchronous jobs
    pub const BUCKET: &str = "awss3bucket";
    /// Role the service assumes to publish completion notices
    pub const ROLE_ARN: &str = "awsrolearn";
    /// Topic receiving completion notices
    pub const TOPIC_ARN: &str = "awssnstopic";
    /// Endpoint override
    pub const ENDPOINT: &str = "endpoint";
}

/// Loaded settings.
#[derive(Debug, Clone)]
pub struct Settings {
    inner: Config,
}

impl Settings {
    /// Load from `./.env` and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_SETTINGS_FILE)
    }

    /// Load from the given file (which may be absent) and the environment.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => FileFormat::Toml,
            _ => FileFormat::Ini,
        };
        log::debug!("Loading settings from {}", path.display());

        let inner = Config::builder()
            .add_source(File::new(&path.to_string_lossy(), format).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Ok(Self { inner })
    }

    /// Wrap an already built configuration.
    pub fn from_config(inner: Config) -> Self {
        Self { inner }
    }

    /// Get a string setting that must be present.
    pub fn required(&self, key: &str) -> Result<String> {
        match self.inner.get_string(key) {
            Ok(value) => Ok(value),
            Err(config::ConfigError::NotFound(_)) => {
                Err(Error::Config(format!("missing setting '{}'", key)))
            }
            Err(e) => Err(Error::Config(format!("setting '{}' is not a string: {}", key, e))),
        }
    }

    /// Get a string setting, treating an empty value as absent.
    pub fn optional(&self, key: &str) -> Option<String> {
        self.inner.get_string(key).ok().filter(|v| !v.is_empty())
    }

    /// Signing credentials.
    pub fn credentials(&self) -> Result<Credentials> {
        Ok(Credentials::new(
            self.required(keys::ACCESS_KEY)?,
            self.required(keys::SECRET)?,
            self.optional(keys::TOKEN),
        ))
    }

    /// Service region.
    pub fn region(&self) -> Result<String> {
        self.required(keys::REGION)
    }

    /// Bucket for asynchronous jobs.
    pub fn bucket(&self) -> Result<String> {
        self.required(keys::BUCKET)
    }

    /// Endpoint override, if any.
    pub fn endpoint(&self) -> Option<String> {
        self.optional(keys::ENDPOINT)
    }

    /// Completion notification channel.
    ///
    /// Both the role and the topic must be set for a channel to be used;
    /// setting only one of them is an error.
    pub fn notification_channel(&self) -> Result<Option<NotificationChannel>> {
        match (self.optional(keys::ROLE_ARN), self.optional(keys::TOPIC_ARN)) {
            (Some(role), Some(topic)) => Ok(Some(NotificationChannel::new(role, topic))),
            (None, None) => Ok(None),
            (Some(_), None) => Err(Error::Config(format!(
                "'{}' is set but '{}' is missing",
                keys::ROLE_ARN,
                keys::TOPIC_ARN
            ))),
            (None, Some(_)) => Err(Error::Config(format!(
                "'{}' is set but '{}' is missing",
                keys::TOPIC_ARN,
                keys::ROLE_ARN
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let mut builder = Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(*key, *value).unwrap();
        }
        Settings::from_config(builder.build().unwrap())
    }

    #[test]
    fn test_required_present() {
        let s = settings(&[("awsregion", "us-east-1")]);
        assert_eq!(s.region().unwrap(), "us-east-1");
    }

    #[test]
    fn test_required_missing_names_key() {
        let s = settings(&[]);
        let err = s.bucket().unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("awss3bucket")));
    }

    #[test]
    fn test_required_wrong_type() {
        let config = Config::builder()
            .set_override("awsregion", vec!["a", "b"])
            .unwrap()
            .build()
            .unwrap();
        let err = Settings::from_config(config).region().unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("not a string")));
    }

    #[test]
    fn test_credentials_with_optional_token() {
        let s = settings(&[("awsaccesskey", "AK"), ("awssecret", "SK")]);
        let creds = s.credentials().unwrap();
        assert_eq!(creds.access_key_id, "AK");
        assert!(creds.session_token.is_none());

        let s = settings(&[("awsaccesskey", "AK"), ("awssecret", "SK"), ("awstoken", "T")]);
        assert_eq!(s.credentials().unwrap().session_token.as_deref(), Some("T"));
    }

    #[test]
    fn test_notification_channel() {
        assert!(settings(&[]).notification_channel().unwrap().is_none());

        let s = settings(&[("awsrolearn", "arn:role"), ("awssnstopic", "arn:topic")]);
        assert_eq!(
            s.notification_channel().unwrap(),
            Some(NotificationChannel::new("arn:role", "arn:topic"))
        );

        let s = settings(&[("awsrolearn", "arn:role")]);
        assert!(matches!(s.notification_channel(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "awsregion=eu-west-1").unwrap();
        writeln!(file, "awss3bucket=scans").unwrap();
        writeln!(file, "endpoint=").unwrap();

        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.region().unwrap(), "eu-west-1");
        assert_eq!(s.bucket().unwrap(), "scans");
        assert!(s.endpoint().is_none());
    }

    #[test]
    fn test_load_from_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load_from(dir.path().join("absent.env")).unwrap();
        assert!(s.optional("awss3bucket").is_none());
    }
}
