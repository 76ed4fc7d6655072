//! Response-shape inspection for the Mochi endpoints.
//!
//! Submission and status responses carry the video URL under several field
//! names. Both are read through the same ordered extractor list.

use serde_json::Value;

/// Where a video URL may live in a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlField {
    /// A top-level string field.
    Top(&'static str),
    /// A string field inside a top-level object.
    Nested(&'static str, &'static str),
}

impl UrlField {
    /// Extract a non-empty string at this location.
    pub fn extract<'a>(&self, body: &'a Value) -> Option<&'a str> {
        let value = match *self {
            UrlField::Top(name) => body.get(name),
            UrlField::Nested(outer, inner) => body.get(outer).and_then(|v| v.get(inner)),
        };
        value.and_then(Value::as_str).filter(|s| !s.is_empty())
    }
}

/// Video URL locations in priority order.
pub const VIDEO_URL_FIELDS: [UrlField; 4] = [
    UrlField::Top("video_url"),
    UrlField::Top("video"),
    UrlField::Top("output_url"),
    UrlField::Nested("video", "url"),
];

/// First video URL found, checking [`VIDEO_URL_FIELDS`] in order.
pub fn extract_video_url(body: &Value) -> Option<String> {
    VIDEO_URL_FIELDS
        .iter()
        .find_map(|field| field.extract(body))
        .map(str::to_string)
}

/// Asynchronous job identifier from a submission response.
pub fn extract_job_id(body: &Value) -> Option<String> {
    body.get("request_id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// First non-empty string among `fields`.
pub fn first_message(body: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|name| body.get(*name).and_then(Value::as_str).filter(|s| !s.is_empty()))
        .map(str::to_string)
}

/// Job state reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Completed,
    Failed,
    /// Any other (or missing) status value.
    Processing,
}

impl JobStatus {
    pub fn from_body(body: &Value) -> Self {
        let status = body.get("status").and_then(Value::as_str).unwrap_or_default();
        if status.eq_ignore_ascii_case("completed") {
            JobStatus::Completed
        } else if status.eq_ignore_ascii_case("failed") {
            JobStatus::Failed
        } else {
            JobStatus::Processing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_video_url_priority_order() {
        let body = json!({
            "output_url": "http://x/output.mp4",
            "video": "http://x/video.mp4",
            "video_url": "http://x/video_url.mp4",
        });
        assert_eq!(extract_video_url(&body).as_deref(), Some("http://x/video_url.mp4"));

        let body = json!({"output_url": "http://x/output.mp4", "video": "http://x/video.mp4"});
        assert_eq!(extract_video_url(&body).as_deref(), Some("http://x/video.mp4"));

        let body = json!({"output_url": "http://x/output.mp4"});
        assert_eq!(extract_video_url(&body).as_deref(), Some("http://x/output.mp4"));
    }

    #[test]
    fn test_nested_video_url() {
        let body = json!({"video": {"url": "http://x/nested.mp4", "content_type": "video/mp4"}});
        assert_eq!(extract_video_url(&body).as_deref(), Some("http://x/nested.mp4"));
    }

    #[test]
    fn test_empty_and_non_string_values_are_skipped() {
        let body = json!({"video_url": "", "video": 42, "output_url": null});
        assert_eq!(extract_video_url(&body), None);
        assert_eq!(extract_video_url(&json!({})), None);
    }

    #[test]
    fn test_job_id() {
        assert_eq!(extract_job_id(&json!({"request_id": "abc"})).as_deref(), Some("abc"));
        assert_eq!(extract_job_id(&json!({"request_id": ""})), None);
        assert_eq!(extract_job_id(&json!({"video_url": "http://x"})), None);
    }

    #[test]
    fn test_first_message() {
        let body = json!({"detail": "bad key", "message": "quota"});
        assert_eq!(first_message(&body, &["message", "detail"]).as_deref(), Some("quota"));
        assert_eq!(first_message(&body, &["detail"]).as_deref(), Some("bad key"));
        assert_eq!(first_message(&json!({}), &["message", "detail"]), None);
    }

    #[test]
    fn test_job_status_is_case_insensitive() {
        assert_eq!(JobStatus::from_body(&json!({"status": "completed"})), JobStatus::Completed);
        assert_eq!(JobStatus::from_body(&json!({"status": "COMPLETED"})), JobStatus::Completed);
        assert_eq!(JobStatus::from_body(&json!({"status": "Failed"})), JobStatus::Failed);
        assert_eq!(JobStatus::from_body(&json!({"status": "IN_QUEUE"})), JobStatus::Processing);
        assert_eq!(JobStatus::from_body(&json!({})), JobStatus::Processing);
    }
}
