//! Maps failed responses to the message shown to the user.

use crate::notify::{FORBIDDEN, NOT_FOUND, SERVER_ERROR};
use reqwest::{Response, StatusCode};
use serde_json::Value;

/// Maximum number of characters of a server-supplied message surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

/// Fixed texts for 403/404/500, otherwise the best message the body offers.
pub(crate) fn notification_message(status: StatusCode, body: Option<&Value>) -> String {
    match status {
        StatusCode::FORBIDDEN => FORBIDDEN.to_string(),
        StatusCode::NOT_FOUND => NOT_FOUND.to_string(),
        StatusCode::INTERNAL_SERVER_ERROR => SERVER_ERROR.to_string(),
        _ => error_message(status, body),
    }
}

/// `detail`, then `message`, then a generic fallback naming the status.
pub(crate) fn error_message(status: StatusCode, body: Option<&Value>) -> String {
    body_field(body, "detail")
        .or_else(|| body_field(body, "message"))
        .unwrap_or_else(|| format!("Request failed ({})", status.as_u16()))
}

fn body_field(body: Option<&Value>, key: &str) -> Option<String> {
    let value = body?.get(key)?.as_str()?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.chars().take(MAX_ERROR_CHARS).collect())
    }
}

/// Reads the body of a failed response as JSON, if it is JSON at all.
pub(crate) async fn read_error_body(response: Response) -> Option<Value> {
    let bytes = response.bytes().await.ok()?;
    if bytes.is_empty() {
        return None;
    }
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fixed_statuses_ignore_body() {
        let body = json!({"detail": "server said something"});
        assert_eq!(
            notification_message(StatusCode::FORBIDDEN, Some(&body)),
            FORBIDDEN
        );
        assert_eq!(
            notification_message(StatusCode::NOT_FOUND, Some(&body)),
            NOT_FOUND
        );
        assert_eq!(
            notification_message(StatusCode::INTERNAL_SERVER_ERROR, Some(&body)),
            SERVER_ERROR
        );
    }

    #[test]
    fn other_statuses_prefer_detail_then_message() {
        let both = json!({"detail": "Username already exists", "message": "ignored"});
        assert_eq!(
            notification_message(StatusCode::BAD_REQUEST, Some(&both)),
            "Username already exists"
        );

        let message_only = json!({"message": "Too many requests"});
        assert_eq!(
            notification_message(StatusCode::TOO_MANY_REQUESTS, Some(&message_only)),
            "Too many requests"
        );

        let empty_detail = json!({"detail": "  ", "message": "fallback message"});
        assert_eq!(
            notification_message(StatusCode::CONFLICT, Some(&empty_detail)),
            "fallback message"
        );
    }

    #[test]
    fn missing_or_non_string_fields_fall_back_to_status() {
        assert_eq!(
            notification_message(StatusCode::BAD_GATEWAY, None),
            "Request failed (502)"
        );

        let structured = json!({"detail": {"field": ["bad"]}});
        assert_eq!(
            notification_message(StatusCode::BAD_REQUEST, Some(&structured)),
            "Request failed (400)"
        );
    }

    #[test]
    fn long_messages_are_truncated() {
        let body = json!({"detail": "x".repeat(500)});
        let message = error_message(StatusCode::BAD_REQUEST, Some(&body));
        assert_eq!(message.chars().count(), MAX_ERROR_CHARS);
    }
}
