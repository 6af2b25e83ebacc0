use crate::domain::model::Course;
use chrono::{DateTime, Utc};

/// Drops courses whose registration window is not open at `now`, unless
/// `show_closed` is set. Order is preserved.
pub fn filter_courses(courses: Vec<Course>, now: DateTime<Utc>, show_closed: bool) -> Vec<Course> {
    if show_closed {
        return courses;
    }
    courses
        .into_iter()
        .filter(|course| course.registration_open_at(now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn course(name: &str, opening: Option<&str>, closing: Option<&str>) -> Course {
        Course {
            name: Some(name.to_string()),
            opening: opening.map(str::to_string),
            closing: closing.map(str::to_string),
            ..Default::default()
        }
    }

    fn names(courses: &[Course]) -> Vec<&str> {
        courses.iter().filter_map(|c| c.name.as_deref()).collect()
    }

    fn fixture() -> Vec<Course> {
        vec![
            course("unbounded", None, None),
            course("open", Some("2025-01-01"), Some("2025-12-31")),
            course("not-yet", Some("2025-07-01"), None),
            course("closed", None, Some("2025-05-01")),
            course("opened-no-close", Some("2025-01-01T00:00:00Z"), None),
            course("closes-later", None, Some("2026-01-01T00:00:00Z")),
        ]
    }

    #[test]
    fn test_hides_courses_outside_registration_window() {
        let now = Utc.with_ymd_and_hms(2025, 6, 3, 12, 0, 0).unwrap();
        let kept = filter_courses(fixture(), now, false);
        assert_eq!(
            names(&kept),
            vec!["unbounded", "open", "opened-no-close", "closes-later"]
        );
    }

    #[test]
    fn test_show_closed_is_identity() {
        let now = Utc.with_ymd_and_hms(2025, 6, 3, 12, 0, 0).unwrap();
        let all = fixture();
        assert_eq!(filter_courses(all.clone(), now, true), all);
    }

    #[test]
    fn test_filter_reads_the_given_instant() {
        let courses = vec![course("window", Some("2025-06-01"), Some("2025-06-10"))];
        let before = Utc.with_ymd_and_hms(2025, 5, 31, 0, 0, 0).unwrap();
        let during = Utc.with_ymd_and_hms(2025, 6, 5, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap();

        assert!(filter_courses(courses.clone(), before, false).is_empty());
        assert_eq!(filter_courses(courses.clone(), during, false).len(), 1);
        assert!(filter_courses(courses, after, false).is_empty());
    }
}
