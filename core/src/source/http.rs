use crate::config::ArchiveConfig;
use crate::error::{CoreError, CoreResult};
use crate::model::AlertRecord;
use crate::source::AlertSource;
use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Threat-detection API client. Blocks the calling thread for each request;
/// connections are pooled across requests.
pub struct HttpAlertSource {
    base_url: Url,
    api_key: String,
    client: Client,
}

impl HttpAlertSource {
    pub fn new(cfg: &ArchiveConfig) -> CoreResult<Self> {
        let client = Client::builder()
            .timeout(cfg.request_timeout())
            .build()
            .map_err(|e| CoreError::InvalidInput(format!("build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: cfg.source_base_url().clone(),
            api_key: cfg.source_api_key().to_string(),
            client,
        })
    }

    /// `{base}/alerts/{id}` with the id encoded as one path segment.
    pub fn alert_url(&self, alert_id: &str) -> CoreResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CoreError::InvalidInput(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push("alerts")
            .push(alert_id);
        Ok(url)
    }

    pub fn probe_url(&self) -> CoreResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CoreError::InvalidInput(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push("alerts");
        url.query_pairs_mut().append_pair("count", "1");
        Ok(url)
    }

    fn get_json(&self, url: Url) -> CoreResult<Value> {
        debug!(%url, "requesting alert source");
        let resp = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, &self.api_key)
            .send()
            .map_err(|e| CoreError::SourceUnavailable(format!("GET {}: {}", url, e)))?;

        if !resp.status().is_success() {
            return Err(api_error(resp));
        }
        resp.json::<Value>()
            .map_err(|e| CoreError::SourceUnavailable(format!("decode body of {}: {}", url, e)))
    }
}

fn api_error(resp: Response) -> CoreError {
    let status = resp.status();
    let is_json = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);
    let body = if is_json {
        resp.json::<Value>().ok()
    } else {
        None
    };
    CoreError::SourceApi {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        body,
    }
}

impl AlertSource for HttpAlertSource {
    fn fetch_by_id(&self, alert_id: &str) -> CoreResult<AlertRecord> {
        let url = self.alert_url(alert_id)?;
        let body = self.get_json(url)?;
        AlertRecord::try_from(body).map_err(|other| {
            CoreError::SourceUnavailable(format!(
                "alert {} lookup returned a non-object body: {}",
                alert_id, other
            ))
        })
    }

    fn probe(&self) -> CoreResult<bool> {
        let url = self.probe_url()?;
        self.get_json(url)?;
        Ok(true)
    }
}
