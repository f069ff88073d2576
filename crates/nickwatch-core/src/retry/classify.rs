//! Map a claim response (status + body) to an [`Outcome`] and a display message.

use super::policy::Outcome;
use serde_json::Value;

/// Substrings (lowercase) in a 403 error that mean "held now, free later".
/// The platform answers in Russian; `занят` is "occupied".
pub const CONTESTED_MARKERS: [&str; 2] = ["занят", "occupied"];

/// Response body as received: JSON when it parses, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Empty,
}

impl ResponseBody {
    pub fn parse(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return ResponseBody::Empty;
        }
        match serde_json::from_slice(bytes) {
            Ok(v) => ResponseBody::Json(v),
            Err(_) => ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    /// Top-level `errors` field of a JSON object body.
    fn errors(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(v) => v.get("errors"),
            _ => None,
        }
    }
}

/// Result of classifying one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub outcome: Outcome,
    /// Human-readable, for logs only.
    pub message: String,
}

impl Classification {
    fn new(outcome: Outcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            message: message.into(),
        }
    }
}

/// Classify a claim response. Never fails: unknown shapes fall through to
/// [`Outcome::Unrecognized`] or the generic branch of their status code.
/// `status_code == 0` means the request never got an HTTP response.
///
/// Messages are English on purpose and are not localized; only the
/// platform's own error text (e.g. the Russian occupied marker) is matched
/// in its original language.
pub fn classify(status_code: u32, body: &ResponseBody) -> Classification {
    match status_code {
        0 => Classification::new(Outcome::NetworkError, "network error"),
        200 => Classification::new(Outcome::Success, "username claimed"),
        400 => classify_bad_request(body),
        401 => Classification::new(Outcome::Unauthorized, "unauthorized, check the API token"),
        403 => classify_forbidden(body),
        404 => Classification::new(Outcome::NotFound, "user not found"),
        429 => Classification::new(Outcome::RateLimited, "rate limit exceeded"),
        code if code >= 500 => {
            Classification::new(Outcome::ServerError, format!("server error ({code})"))
        }
        code => Classification::new(Outcome::Unrecognized, format!("unexpected status ({code})")),
    }
}

fn classify_bad_request(body: &ResponseBody) -> Classification {
    let Some(errors) = body.errors() else {
        return Classification::new(Outcome::Unrecognized, "bad request (400)");
    };
    let Some(username) = errors.get("username") else {
        return Classification::new(Outcome::Unrecognized, format!("bad request: {errors}"));
    };
    let text = value_text(username);
    let lower = text.to_lowercase();
    if lower.contains("taken") {
        Classification::new(Outcome::Taken, "username is already taken")
    } else if lower.contains("invalid") {
        Classification::new(Outcome::InvalidName, "username is not allowed")
    } else {
        Classification::new(Outcome::InvalidName, format!("username rejected: {text}"))
    }
}

fn classify_forbidden(body: &ResponseBody) -> Classification {
    let first = match body.errors() {
        Some(Value::Array(list)) => list.first(),
        Some(other) => {
            return Classification::new(Outcome::Unrecognized, format!("forbidden: {other}"))
        }
        None => None,
    };
    let Some(first) = first else {
        return Classification::new(Outcome::Unrecognized, "access denied");
    };
    let text = value_text(first);
    let lower = text.to_lowercase();
    if CONTESTED_MARKERS.iter().any(|m| lower.contains(m)) {
        Classification::new(
            Outcome::ContestedTemporary,
            "username is held for now, waiting for it to free up",
        )
    } else {
        Classification::new(Outcome::Unrecognized, format!("forbidden: {text}"))
    }
}

/// Strings as-is, anything else as compact JSON.
fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
