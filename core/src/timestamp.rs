use crate::error::{CoreError, CoreResult};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Parse a range-query bound. Offsets are honoured and normalised to UTC;
/// naive date-times and bare dates are taken as UTC.
pub fn parse_iso8601(text: &str) -> CoreResult<OffsetDateTime> {
    let trimmed = text.trim();

    if let Ok(ts) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(ts.to_offset(UtcOffset::UTC));
    }
    if let Ok(ts) = OffsetDateTime::parse(trimmed, &Iso8601::DEFAULT) {
        return Ok(ts.to_offset(UtcOffset::UTC));
    }
    if let Ok(naive) = PrimitiveDateTime::parse(trimmed, &Iso8601::DEFAULT) {
        return Ok(naive.assume_utc());
    }

    if let Ok(date) = Date::parse(trimmed, format_description!("[year]-[month]-[day]")) {
        return Ok(date.midnight().assume_utc());
    }

    Err(CoreError::DateParse(text.to_string()))
}
