use super::classify::{classify, ResponseBody};
use super::policy::Outcome;

/// One classified claim attempt. Built once per attempt, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptResult {
    /// HTTP status, or 0 when the request failed below HTTP.
    pub status_code: u32,
    pub outcome: Outcome,
    pub message: String,
    pub raw_body: ResponseBody,
}

impl AttemptResult {
    /// Classify an HTTP response.
    pub fn from_response(status_code: u32, body: &[u8]) -> Self {
        let raw_body = ResponseBody::parse(body);
        let c = classify(status_code, &raw_body);
        Self {
            status_code,
            outcome: c.outcome,
            message: c.message,
            raw_body,
        }
    }

    /// Attempt that failed at the transport layer (DNS, connect, timeout...).
    pub fn network_error(err: &dyn std::fmt::Display) -> Self {
        let c = classify(0, &ResponseBody::Empty);
        Self {
            status_code: 0,
            outcome: c.outcome,
            message: format!("{}: {}", c.message, err),
            raw_body: ResponseBody::Empty,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}
