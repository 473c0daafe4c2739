pub mod batch;
pub mod earning;
pub mod lead;
pub mod order;
pub mod puja;
pub mod selection;

use chrono::{DateTime, Utc};

/// Parse a backend timestamp (RFC 3339 string); anything unparseable is treated as absent.
pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let trimmed = raw?.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Several backend fields flip between JSON numbers and strings across deployments.
pub(crate) fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
