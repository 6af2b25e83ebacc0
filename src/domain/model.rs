use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A remote course record. Every field is optional; the widget renders
/// whatever is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Course {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub price: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub link: Option<String>,
    #[serde(alias = "registrationUrl", deserialize_with = "lenient_string")]
    pub registration_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub start: Option<String>,
    #[serde(alias = "startTime", deserialize_with = "lenient_string")]
    pub start_time: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub opening: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub closing: Option<String>,
}

/// The `{ "result": [...] }` body returned by the course endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseEnvelope {
    pub result: Vec<Course>,
}

impl Course {
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start.as_deref().and_then(parse_date)
    }

    pub fn start_time_of_day(&self) -> Option<NaiveTime> {
        self.start_time.as_deref().and_then(parse_time)
    }

    pub fn opening_at(&self) -> Option<DateTime<Utc>> {
        self.opening.as_deref().and_then(parse_instant)
    }

    pub fn closing_at(&self) -> Option<DateTime<Utc>> {
        self.closing.as_deref().and_then(parse_instant)
    }

    /// `(no opening or opening <= now) && (no closing or closing >= now)`.
    pub fn registration_open_at(&self, now: DateTime<Utc>) -> bool {
        let opened = self.opening_at().map_or(true, |opening| opening <= now);
        let not_closed = self.closing_at().map_or(true, |closing| closing >= now);
        opened && not_closed
    }
}

/// Accepts RFC 3339, naive `YYYY-MM-DD[T ]HH:MM[:SS]` (read as UTC) and bare
/// dates (midnight UTC). Anything else is treated as absent.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc()),
        Err(_) => {
            tracing::debug!("Ignoring unparseable date value: {}", raw);
            None
        }
    }
}

/// The calendar day as written. An offset timestamp keeps its own local day
/// rather than the UTC one.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(dt) => Some(dt.date_naive()),
        Err(_) => parse_instant(raw).map(|dt| dt.date_naive()),
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// Text fields may arrive as strings, numbers or booleans. Empty strings and
/// any other shape become `None`.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_course_deserializes_with_missing_and_odd_fields() {
        let course: Course = serde_json::from_value(serde_json::json!({
            "name": "Salsa",
            "price": 120,
            "registrationUrl": "https://example.com/register",
            "startTime": "18:30",
            "description": null,
            "link": {"nested": true}
        }))
        .unwrap();

        assert_eq!(course.name.as_deref(), Some("Salsa"));
        assert_eq!(course.price.as_deref(), Some("120"));
        assert_eq!(
            course.registration_url.as_deref(),
            Some("https://example.com/register")
        );
        assert_eq!(course.start_time.as_deref(), Some("18:30"));
        assert!(course.description.is_none());
        assert!(course.link.is_none());
        assert!(course.start.is_none());
    }

    #[test]
    fn test_envelope_rejects_non_list_result() {
        let parsed: std::result::Result<CourseEnvelope, _> =
            serde_json::from_value(serde_json::json!({"result": {"name": "x"}}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parse_instant_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 6, 3, 18, 30, 0).unwrap();
        assert_eq!(parse_instant("2025-06-03T18:30:00Z"), Some(expected));
        assert_eq!(parse_instant("2025-06-03T20:30:00+02:00"), Some(expected));
        assert_eq!(parse_instant("2025-06-03 18:30:00"), Some(expected));
        assert_eq!(parse_instant("2025-06-03T18:30"), Some(expected));
        assert_eq!(
            parse_instant("2025-06-03"),
            Some(Utc.with_ymd_and_hms(2025, 6, 3, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_instant("next tuesday"), None);
        assert_eq!(parse_instant(""), None);
    }

    #[test]
    fn test_registration_window_bounds_are_inclusive() {
        let now = Utc.with_ymd_and_hms(2025, 6, 3, 12, 0, 0).unwrap();
        let course = Course {
            opening: Some("2025-06-03T12:00:00Z".to_string()),
            closing: Some("2025-06-03T12:00:00Z".to_string()),
            ..Default::default()
        };
        assert!(course.registration_open_at(now));
    }

    #[test]
    fn test_start_date_keeps_local_calendar_day() {
        let course = Course {
            start: Some("2025-06-03T00:30:00+02:00".to_string()),
            ..Default::default()
        };
        assert_eq!(course.start_date(), NaiveDate::from_ymd_opt(2025, 6, 3));

        let late = Course {
            start: Some("2025-06-03T23:30:00-05:00".to_string()),
            ..Default::default()
        };
        assert_eq!(late.start_date(), NaiveDate::from_ymd_opt(2025, 6, 3));
    }

    #[test]
    fn test_start_time_parsing() {
        let course = Course {
            start_time: Some("07:05:00".to_string()),
            ..Default::default()
        };
        assert_eq!(
            course.start_time_of_day(),
            NaiveTime::from_hms_opt(7, 5, 0)
        );
    }
}
