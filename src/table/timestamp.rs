use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, SecondsFormat, TimeZone, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("failed to parse timestamp '{value}': {source}")]
    ParseError {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Naive layouts accepted after RFC 3339 fails, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a `start_date` cell.
///
/// Accepts RFC 3339 with an explicit offset, or one of the naive layouts in
/// [`NAIVE_FORMATS`]. Naive values keep their wall-clock time and get a zero
/// offset, so the time of day read back is the one written.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, TimestampError> {
    let value = value.trim();

    let rfc_err = match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => return Ok(dt),
        Err(e) => e,
    };

    for format in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Utc.fix().from_utc_datetime(&ndt));
        }
    }

    Err(TimestampError::ParseError {
        value: value.to_string(),
        source: rfc_err,
    })
}

/// ISO 8601 rendering used for every written `start_date`.
pub fn format_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Serde adapter pairing [`format_timestamp`] with [`parse_timestamp`].
pub mod lenient {
    use super::{format_timestamp, parse_timestamp};
    use chrono::{DateTime, FixedOffset};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_timestamp(dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_timestamp(&s).map_err(serde::de::Error::custom)
    }
}
