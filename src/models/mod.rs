//! Wire shapes exchanged with the backend REST API.
//!
//! Backend responses vary in field naming (`_id`/`id`, `cpeScore`/`cpePoints`,
//! `eventsAttended`/`attendedEvents`); everything is normalized here, once,
//! into the domain records.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::domain::types::{TypeConstraintError, WebUrl};

#[cfg(feature = "server")]
pub mod config;
pub mod event;
pub mod registration;
pub mod user;

/// Parses RFC 3339, naive ISO 8601 or bare dates into UTC naive timestamps.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, TypeConstraintError> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(at);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TypeConstraintError::InvalidValue(format!("invalid timestamp: {value}")))
}

/// Drops blank strings coming from optional form or wire fields.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Optional URL; blanks and malformed values are treated as absent.
pub fn optional_url(value: Option<String>) -> Option<WebUrl> {
    non_blank(value).and_then(|url| WebUrl::new(url).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_timestamp_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-03-10T09:00:00.000Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-10T11:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-10T09:00:00").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-03-10").unwrap(),
            expected.date().and_hms_opt(0, 0, 0).unwrap()
        );
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn blank_urls_are_absent() {
        assert_eq!(optional_url(Some("  ".to_string())), None);
        assert_eq!(optional_url(Some("not a url".to_string())), None);
        assert!(optional_url(Some("https://isaca-sv.org".to_string())).is_some());
    }
}
