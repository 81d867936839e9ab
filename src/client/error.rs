//! Turning backend error responses into `DeskError`s.
//!
//! The backend reports failures as `{"detail": "..."}`. Validation failures
//! may instead carry a list of `{"msg": "...", ...}` objects under `detail`.

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::DeskError;
use crate::types::TicketId;

/// Pull a human-readable message out of an error body, if it has one.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

/// Build the error for a non-success response.
///
/// A 404 on a single-ticket route becomes `TicketNotFound`, keeping any `detail`.
pub fn api_error(status: StatusCode, body: &str, ticket: Option<TicketId>) -> DeskError {
    if status == StatusCode::NOT_FOUND
        && let Some(id) = ticket
    {
        return DeskError::TicketNotFound(id, extract_detail(body));
    }

    let detail = extract_detail(body).unwrap_or_else(|| {
        format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )
    });

    DeskError::Api {
        status: status.as_u16(),
        detail,
    }
}

/// Whether retrying the same read could succeed.
pub fn is_transient(error: &DeskError) -> bool {
    match error {
        DeskError::Api { status, .. } => *status >= 500 || *status == 429,
        DeskError::Http(e) => e.is_timeout() || e.is_connect(),
        _ => false,
    }
}
