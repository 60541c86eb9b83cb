use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Settings read once at process start and shared read-only afterwards.
#[derive(Clone)]
pub struct ArchiveConfig {
    bucket: String,
    prefix: Option<String>,
    source_base_url: Url,
    source_api_key: String,
    request_timeout: Duration,
}

impl ArchiveConfig {
    pub fn new(
        bucket: impl Into<String>,
        prefix: Option<String>,
        source_base_url: &str,
        source_api_key: impl Into<String>,
        request_timeout_secs: u64,
    ) -> CoreResult<Self> {
        let bucket = bucket.into();
        if bucket.trim().is_empty() {
            return Err(CoreError::InvalidInput("bucket name is empty".to_string()));
        }

        let prefix = prefix.filter(|p| !p.is_empty());
        if let Some(p) = &prefix {
            if p.starts_with('/') || p.ends_with('/') || p.split('/').any(str::is_empty) {
                return Err(CoreError::InvalidInput(format!(
                    "key prefix {:?} must not start or end with '/' or contain empty segments",
                    p
                )));
            }
        }

        let source_base_url = Url::parse(source_base_url).map_err(|e| {
            CoreError::InvalidInput(format!("alert source URL {:?}: {}", source_base_url, e))
        })?;
        if !matches!(source_base_url.scheme(), "http" | "https") || source_base_url.cannot_be_a_base()
        {
            return Err(CoreError::InvalidInput(format!(
                "alert source URL must be http(s): {}",
                source_base_url
            )));
        }

        if request_timeout_secs == 0 {
            return Err(CoreError::InvalidInput(
                "request timeout must be at least one second".to_string(),
            ));
        }

        Ok(Self {
            bucket,
            prefix,
            source_base_url,
            source_api_key: source_api_key.into(),
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn source_base_url(&self) -> &Url {
        &self.source_base_url
    }

    pub fn source_api_key(&self) -> &str {
        &self.source_api_key
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl fmt::Debug for ArchiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveConfig")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("source_base_url", &self.source_base_url.as_str())
            .field("source_api_key", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
