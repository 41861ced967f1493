//! Recency buckets and lenient timestamp parsing

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Coarse recency bucket of an event's start time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Ring {
    /// Starts within the next 24 hours
    Today,
    /// Starts within the next 7 days
    ThisWeek,
    /// Starts later, already started, or start unknown
    Later,
}

impl Ring {
    pub fn as_i32(self) -> i32 {
        match self {
            Ring::Today => 0,
            Ring::ThisWeek => 1,
            Ring::Later => 2,
        }
    }
}

/// Ring reported for person nodes
pub const PERSON_RING: i32 = -1;

/// Classifies a start time relative to `now`.
///
/// Past events share the `Later` bucket with far-future ones.
pub fn classify(starts_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Ring {
    let Some(starts_at) = starts_at else {
        return Ring::Later;
    };

    let delta = starts_at - now;
    if delta < Duration::zero() {
        Ring::Later
    } else if delta <= Duration::hours(24) {
        Ring::Today
    } else if delta <= Duration::days(7) {
        Ring::ThisWeek
    } else {
        Ring::Later
    }
}

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parses an ISO-8601 timestamp into UTC.
///
/// Offsets are honoured, a trailing `Z` means UTC, timestamps without a
/// zone are taken as UTC and a bare date is UTC midnight. Anything else
/// yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serde helper for optional timestamps that must never fail to load.
///
/// Unparseable values become `None` instead of an error.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Seconds since the Unix epoch, with sub-second precision
pub fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp() as f64 + f64::from(at.timestamp_subsec_nanos()) * 1e-9
}
