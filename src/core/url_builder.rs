use crate::config::settings::Settings;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://onbeat.dance/api/get_courses";

/// Builds `GET {endpoint}/{public_token}[?course_type=..|course_id=..]`.
///
/// Filter precedence: a non-empty course-type list wins over a course id;
/// with neither present no filter is sent and the endpoint returns every
/// course. A base that cannot be parsed as an absolute URL is returned
/// unchanged so the fetch fails against it.
pub fn build_request_url(base: &str, settings: &Settings) -> String {
    let mut url = match Url::parse(base) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Course endpoint '{}' is not a valid URL: {}", base, e);
            return base.to_string();
        }
    };

    let token = settings.public_token.as_deref().unwrap_or_default();
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.pop_if_empty().push(token);
        }
        Err(()) => {
            tracing::warn!("Course endpoint '{}' cannot carry path segments", base);
            return base.to_string();
        }
    }

    if let Some(types) = settings.course_type.filter_values() {
        url.query_pairs_mut()
            .append_pair("course_type", &types.join(","));
    } else if let Some(course_id) = settings.course_id.as_ref().and_then(|id| id.single()) {
        url.query_pairs_mut().append_pair("course_id", &course_id);
    }

    url.to_string()
}
