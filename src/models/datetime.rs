use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Parses an event date from either a date-time string or a bare date.
/// `2024-05-01T14:30:00` is taken as-is; `2024-05-01` means midnight.
pub fn parse_flexible(s: &str) -> Result<NaiveDateTime, String> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    Err(format!(
        "Unable to parse date: {s}. Expected format: yyyy-MM-dd or yyyy-MM-ddTHH:mm:ss"
    ))
}

/// Serde helper for optional date fields carrying the flexible format.
/// A missing field stays `None` via `#[serde(default)]` on the caller side.
pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => parse_flexible(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}
