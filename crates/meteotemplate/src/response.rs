//! Classification of the server's answer.

use serde_json::Value;

use crate::error::{Error, Result};

/// Longest slice of the body carried into an error message.
const MAX_DETAIL_LEN: usize = 200;

/// Decide whether the server accepted an upload.
///
/// Accepted means a 2xx status and a body that is either the plain text
/// `success` / `ok` (case-insensitive, surrounding whitespace ignored) or a
/// JSON object whose `status` or `result` member is one of those words.
pub fn check_response(status: u16, body: &str) -> Result<()> {
    let body = body.trim();
    if !(200..300).contains(&status) {
        return Err(Error::Rejected {
            status,
            message: detail(body, "no response body"),
        });
    }

    if is_success_word(body) {
        return Ok(());
    }

    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(body) {
        let accepted = ["status", "result"]
            .iter()
            .filter_map(|key| obj.get(*key).and_then(Value::as_str))
            .any(is_success_word);
        if accepted {
            return Ok(());
        }
        let message = ["message", "error"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .map(|m| detail(m, ""))
            .unwrap_or_else(|| detail(body, ""));
        return Err(Error::Rejected { status, message });
    }

    Err(Error::Rejected {
        status,
        message: detail(body, "empty response body"),
    })
}

fn is_success_word(text: &str) -> bool {
    text.eq_ignore_ascii_case("success") || text.eq_ignore_ascii_case("ok")
}

fn detail(text: &str, fallback: &str) -> String {
    if text.is_empty() {
        return fallback.to_string();
    }
    match text.char_indices().nth(MAX_DETAIL_LEN) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
