use std::sync::Arc;

use alert_archive_core::error::{CoreError, CoreResult};
use alert_archive_core::sns::{MessageType, SubscriptionConfirmation, MESSAGE_TYPE_HEADER};
use alert_archive_core::timestamp::parse_iso8601;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::info;

use super::error::ApiError;
use super::state::AppState;

/// `GET /status`: probes the object store and the alert source.
pub async fn status(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let status = state.run_blocking(|archive| archive.status()).await?;
    Ok(Json(json!({
        "success": status.success(),
        "s3": {"success": status.store},
        "threatstack": {"success": status.source},
    })))
}

/// `POST /alert`: archive a webhook, or answer a provider handshake.
pub async fn put_alert(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body = body.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::from(CoreError::PayloadTooLarge(e.body_text()))
        } else {
            ApiError::Unexpected(format!("read request body: {}", e))
        }
    })?;
    let message_type = MessageType::classify(
        headers
            .get(MESSAGE_TYPE_HEADER)
            .and_then(|v| v.to_str().ok()),
    );

    match message_type {
        MessageType::SubscriptionConfirmation => confirm_subscription(&state, &body).await,
        MessageType::UnsubscribeConfirmation => {
            info!("unsubscribe confirmation acknowledged");
            Ok(Json(json!({"success": true})).into_response())
        }
        MessageType::Notification | MessageType::Direct => {
            // The provider posts without a JSON content type.
            let payload: Value = serde_json::from_slice(&body).map_err(|e| {
                CoreError::MissingPayload(format!("request body is not JSON: {}", e))
            })?;
            let archived = state
                .run_blocking(move |archive| archive.archive_payload(&payload))
                .await?;
            info!(count = archived.len(), "webhook archived");
            Ok(Json(json!({"success": true})).into_response())
        }
    }
}

async fn confirm_subscription(state: &AppState, body: &[u8]) -> Result<Response, ApiError> {
    let message = SubscriptionConfirmation::from_body(body)?;
    let url = message.confirmation_url_with(&state.confirmation_policy)?;
    info!(topic_arn = ?message.topic_arn, "confirming subscription");

    let resp = state
        .http_client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| ApiError::Unexpected(format!("GET {}: {}", url, e)))?;
    let status = resp.status();
    info!(status = status.as_u16(), "subscription confirmation answered");
    Ok((status, Json(json!({"success": status.is_success()}))).into_response())
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

fn range_bound(name: &str, value: Option<&str>) -> CoreResult<OffsetDateTime> {
    match value {
        Some(text) => parse_iso8601(text),
        None => Err(CoreError::DateParse(format!(
            "missing '{}' query parameter",
            name
        ))),
    }
}

/// `GET /alert?start=..&end=..`: both bounds exclusive.
pub async fn get_alerts_by_range(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RangeParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) =
        query.map_err(|e| CoreError::DateParse(format!("query string: {}", e.body_text())))?;
    let start = range_bound("start", params.start.as_deref())?;
    let end = range_bound("end", params.end.as_deref())?;
    let alerts = state
        .run_blocking(move |archive| archive.query_by_range(start, end))
        .await?;
    Ok(Json(json!({"success": true, "alerts": alerts})))
}

/// `GET /alert/{id}`
pub async fn get_alert_by_id(
    State(state): State<Arc<AppState>>,
    Path(alert_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let alert = state
        .run_blocking(move |archive| archive.get_by_id(&alert_id))
        .await?;
    Ok(Json(json!({"success": true, "alert": alert})))
}
