//! Pub/sub notification-provider handshake messages.

use crate::error::{CoreError, CoreResult};
use serde::Deserialize;
use url::Url;

pub const MESSAGE_TYPE_HEADER: &str = "x-amz-sns-message-type";

const CONFIRMATION_HOST_SUFFIX: &str = ".amazonaws.com";

/// Which `SubscribeURL`s the service is willing to call back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub require_https: bool,
    pub host_suffix: String,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            require_https: true,
            host_suffix: CONFIRMATION_HOST_SUFFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    SubscriptionConfirmation,
    UnsubscribeConfirmation,
    Notification,
    /// No recognised header: a webhook posted straight by the alert source.
    Direct,
}

impl MessageType {
    pub fn classify(header: Option<&str>) -> Self {
        match header.map(str::trim) {
            Some("SubscriptionConfirmation") => Self::SubscriptionConfirmation,
            Some("UnsubscribeConfirmation") => Self::UnsubscribeConfirmation,
            Some("Notification") => Self::Notification,
            _ => Self::Direct,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionConfirmation {
    #[serde(rename = "Type", default)]
    pub message_type: Option<String>,
    #[serde(rename = "TopicArn", default)]
    pub topic_arn: Option<String>,
    #[serde(rename = "Token", default)]
    pub token: Option<String>,
    #[serde(rename = "SubscribeURL")]
    pub subscribe_url: String,
}

impl SubscriptionConfirmation {
    /// The provider sends these without a JSON content type, so the raw body
    /// is decoded here.
    pub fn from_body(body: &[u8]) -> CoreResult<Self> {
        serde_json::from_slice(body).map_err(|e| {
            CoreError::SubscriptionConfirmation(format!("unreadable confirmation message: {}", e))
        })
    }

    /// `SubscribeURL`, accepted only for https endpoints of the provider.
    pub fn confirmation_url(&self) -> CoreResult<Url> {
        self.confirmation_url_with(&ConfirmationPolicy::default())
    }

    pub fn confirmation_url_with(&self, policy: &ConfirmationPolicy) -> CoreResult<Url> {
        let url = Url::parse(&self.subscribe_url).map_err(|e| {
            CoreError::SubscriptionConfirmation(format!("SubscribeURL {:?}: {}", self.subscribe_url, e))
        })?;
        if policy.require_https && url.scheme() != "https" {
            return Err(CoreError::SubscriptionConfirmation(format!(
                "SubscribeURL must use https: {}",
                url
            )));
        }
        let host = url.host_str().unwrap_or_default();
        if host.is_empty() || !host.ends_with(policy.host_suffix.as_str()) {
            return Err(CoreError::SubscriptionConfirmation(format!(
                "SubscribeURL host {:?} is not a provider endpoint",
                host
            )));
        }
        Ok(url)
    }
}
