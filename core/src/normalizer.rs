use crate::error::{CoreError, CoreResult};
use crate::keys::{epoch_ms_to_utc, validate_alert_id};
use crate::model::{AlertBatch, AlertStub};
use serde_json::Value;
use std::borrow::Cow;

const TOPIC_ARN: &str = "TopicArn";
const MESSAGE: &str = "Message";

/// Resolve the value that should hold the alert batch.
///
/// A pub/sub envelope (`TopicArn` + `Message`) is unwrapped when `Message` is
/// an object, or a string that decodes to one. Any other `Message` resolves to
/// nothing. Payloads without an envelope are the batch themselves.
pub fn resolve_batch(payload: &Value) -> Option<Cow<'_, Value>> {
    let obj = payload.as_object()?;
    if !(obj.contains_key(TOPIC_ARN) && obj.contains_key(MESSAGE)) {
        return Some(Cow::Borrowed(payload));
    }
    match obj.get(MESSAGE) {
        Some(inner @ Value::Object(_)) => Some(Cow::Borrowed(inner)),
        Some(Value::String(raw)) => serde_json::from_str::<Value>(raw)
            .ok()
            .filter(Value::is_object)
            .map(Cow::Owned),
        _ => None,
    }
}

/// Unwrap and validate an inbound notification into ordered alert stubs.
pub fn normalize(payload: &Value) -> CoreResult<AlertBatch> {
    let batch = resolve_batch(payload).ok_or_else(|| CoreError::MissingPayload(payload.to_string()))?;

    let alerts = match batch.get("alerts") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(CoreError::MissingAlerts(batch.to_string())),
    };

    let mut stubs = Vec::with_capacity(alerts.len());
    for (idx, alert) in alerts.iter().enumerate() {
        stubs.push(parse_stub(idx, alert)?);
    }
    Ok(AlertBatch { alerts: stubs })
}

fn parse_stub(idx: usize, alert: &Value) -> CoreResult<AlertStub> {
    let invalid = |field: &'static str, why: &str| CoreError::InvalidAlert {
        field,
        detail: format!("alerts[{}] {}: {}", idx, why, alert),
    };

    let fields = alert
        .as_object()
        .ok_or_else(|| invalid("id", "is not an object"))?;

    let id = match fields.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Null) | None => return Err(invalid("id", "has no id")),
        Some(_) => return Err(invalid("id", "id is not a non-empty string")),
    };
    validate_alert_id(&id)?;

    let created_at = match fields.get("created_at") {
        Some(Value::Null) | None => return Err(invalid("created_at", "has no created_at")),
        Some(v) => v
            .as_i64()
            .ok_or_else(|| invalid("created_at", "created_at is not integer epoch milliseconds"))?,
    };
    epoch_ms_to_utc(created_at)?;

    let mut extra = fields.clone();
    extra.remove("id");
    extra.remove("created_at");

    Ok(AlertStub {
        id,
        created_at,
        extra,
    })
}
