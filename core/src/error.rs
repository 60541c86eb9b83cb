use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no webhook data found in request: {0}")]
    MissingPayload(String),

    #[error("webhook lacks alerts: {0}")]
    MissingAlerts(String),

    #[error("alert lacks valid '{field}' field: {detail}")]
    InvalidAlert { field: &'static str, detail: String },

    #[error("unable to parse date: {0}")]
    DateParse(String),

    #[error("request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("subscription confirmation rejected: {0}")]
    SubscriptionConfirmation(String),

    #[error("alert source unreachable: {0}")]
    SourceUnavailable(String),

    #[error("alert source returned {status} {reason}")]
    SourceApi {
        status: u16,
        reason: String,
        body: Option<serde_json::Value>,
    },

    #[error("object store unavailable: {0}")]
    StorageUnavailable(String),

    #[error("malformed webhook pointer key: {0}")]
    MalformedKey(String),

    #[error("pointer exists but no record is stored for alert {0}")]
    RecordNotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Wire name reported in the `error.type` field of the response envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingPayload(_) => "MissingPayloadError",
            Self::MissingAlerts(_) => "MissingAlertsError",
            Self::InvalidAlert { .. } => "InvalidAlertError",
            Self::DateParse(_) => "DateParseError",
            Self::PayloadTooLarge(_) => "PayloadTooLargeError",
            Self::SubscriptionConfirmation(_) => "SubscriptionConfirmationError",
            Self::SourceUnavailable(_) => "SourceUnavailableError",
            Self::SourceApi { .. } => "SourceAPIError",
            Self::StorageUnavailable(_) => "StorageUnavailableError",
            Self::MalformedKey(_) => "MalformedKeyError",
            Self::RecordNotFound(_) => "RecordNotFoundError",
            Self::InvalidInput(_) => "InvalidInputError",
            Self::Json(_) => "JsonError",
        }
    }

    /// Caller mistakes map to 4xx, everything upstream of the caller to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingPayload(_)
            | Self::MissingAlerts(_)
            | Self::InvalidAlert { .. }
            | Self::DateParse(_)
            | Self::SubscriptionConfirmation(_)
            | Self::InvalidInput(_) => 400,
            Self::PayloadTooLarge(_) => 413,
            Self::SourceUnavailable(_)
            | Self::SourceApi { .. }
            | Self::StorageUnavailable(_)
            | Self::MalformedKey(_)
            | Self::RecordNotFound(_)
            | Self::Json(_) => 500,
        }
    }

    /// A pointer without its record, or a key that does not parse, means a
    /// prior partial write or tampering with the bucket.
    pub fn is_integrity_fault(&self) -> bool {
        matches!(self, Self::MalformedKey(_) | Self::RecordNotFound(_))
    }

    pub fn message_args(&self) -> Vec<String> {
        match self {
            Self::SourceApi {
                status,
                reason,
                body,
            } => {
                let mut args = vec![reason.clone(), status.to_string()];
                if let Some(body) = body {
                    args.push(body.to_string());
                }
                args
            }
            other => vec![other.to_string()],
        }
    }
}
