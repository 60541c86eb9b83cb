use crate::error::{CoreError, CoreResult};
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

pub const ALERTS_SEGMENT: &str = "alerts";
pub const WEBHOOKS_SEGMENT: &str = "webhooks";
pub const MIN_ALERT_ID_CHARS: usize = 4;

/// A webhook pointer key decoded back into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerKey {
    /// UTC, truncated to the minute.
    pub timestamp: OffsetDateTime,
    pub alert_id: String,
}

/// Alert ids become path segments, and the first four characters become
/// shard directories.
pub fn validate_alert_id(id: &str) -> CoreResult<()> {
    if id.chars().count() < MIN_ALERT_ID_CHARS {
        return Err(CoreError::InvalidAlert {
            field: "id",
            detail: format!(
                "alert id must be at least {} characters: {:?}",
                MIN_ALERT_ID_CHARS, id
            ),
        });
    }
    if id.contains(&['/', '\\'][..]) || id.chars().any(char::is_control) {
        return Err(CoreError::InvalidAlert {
            field: "id",
            detail: format!("alert id must not contain separators or control characters: {:?}", id),
        });
    }
    let (shard_a, shard_b) = shards(id);
    if [shard_a.as_str(), shard_b.as_str()]
        .iter()
        .any(|s| *s == "." || *s == "..")
    {
        return Err(CoreError::InvalidAlert {
            field: "id",
            detail: format!("alert id shards must not be '.' or '..': {:?}", id),
        });
    }
    Ok(())
}

fn shards(id: &str) -> (String, String) {
    let mut chars = id.chars();
    let shard_a: String = chars.by_ref().take(2).collect();
    let shard_b: String = chars.take(2).collect();
    (shard_a, shard_b)
}

fn with_prefix(prefix: Option<&str>, key: String) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{}/{}", p, key),
        _ => key,
    }
}

/// `[prefix/]alerts/{id[0:2]}/{id[2:4]}/{id}`
pub fn record_key(id: &str, prefix: Option<&str>) -> CoreResult<String> {
    validate_alert_id(id)?;
    let (shard_a, shard_b) = shards(id);
    Ok(with_prefix(
        prefix,
        format!("{}/{}/{}/{}", ALERTS_SEGMENT, shard_a, shard_b, id),
    ))
}

/// `[prefix/]webhooks`, the listing root for range queries.
pub fn webhooks_prefix(prefix: Option<&str>) -> String {
    with_prefix(prefix, WEBHOOKS_SEGMENT.to_string())
}

pub fn epoch_ms_to_utc(created_at_ms: i64) -> CoreResult<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(created_at_ms) * 1_000_000).map_err(
        |e| CoreError::InvalidAlert {
            field: "created_at",
            detail: format!("{} is not a representable timestamp: {}", created_at_ms, e),
        },
    )
}

/// `[prefix/]webhooks/{YYYY}/{MM}/{DD}/{HH}/{mm}/{id}` from the UTC minute of
/// `created_at_ms`.
pub fn webhook_pointer_key(
    id: &str,
    created_at_ms: i64,
    prefix: Option<&str>,
) -> CoreResult<String> {
    validate_alert_id(id)?;
    let ts = epoch_ms_to_utc(created_at_ms)?;
    Ok(format!(
        "{}/{:04}/{:02}/{:02}/{:02}/{:02}/{}",
        webhooks_prefix(prefix),
        ts.year(),
        u8::from(ts.month()),
        ts.day(),
        ts.hour(),
        ts.minute(),
        id
    ))
}

pub fn parse_pointer_key(key: &str, prefix: Option<&str>) -> CoreResult<PointerKey> {
    let malformed = |why: &str| CoreError::MalformedKey(format!("{}: {}", key, why));

    let base = webhooks_prefix(prefix);
    let rest = key
        .strip_prefix(base.as_str())
        .and_then(|r| r.strip_prefix('/'))
        .ok_or_else(|| malformed(&format!("not under {}/", base)))?;
    let (time_path, alert_id) = rest
        .rsplit_once('/')
        .ok_or_else(|| malformed("missing time path"))?;
    if alert_id.is_empty() {
        return Err(malformed("empty alert id"));
    }

    let segments: Vec<&str> = time_path.split('/').collect();
    if segments.len() != 5 {
        return Err(malformed(&format!(
            "expected 5 time segments, found {}",
            segments.len()
        )));
    }
    let year: i32 = segments[0]
        .parse()
        .map_err(|_| malformed("year is not an integer"))?;
    let mut small = [0u8; 4];
    for (slot, raw) in small.iter_mut().zip(&segments[1..]) {
        *slot = raw
            .parse()
            .map_err(|_| malformed(&format!("{:?} is not an integer", raw)))?;
    }
    let [month, day, hour, minute] = small;

    let month = Month::try_from(month).map_err(|e| malformed(&e.to_string()))?;
    let date = Date::from_calendar_date(year, month, day).map_err(|e| malformed(&e.to_string()))?;
    let time = Time::from_hms(hour, minute, 0).map_err(|e| malformed(&e.to_string()))?;

    Ok(PointerKey {
        timestamp: PrimitiveDateTime::new(date, time).assume_utc(),
        alert_id: alert_id.to_string(),
    })
}
