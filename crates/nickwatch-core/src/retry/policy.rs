use std::time::Duration;

/// Semantic result of one claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The platform accepted the rename (200).
    Success,
    /// Name is held by someone else (400, "taken").
    Taken,
    /// Name rejected by the platform's rules (400, username error).
    InvalidName,
    /// Token rejected (401).
    Unauthorized,
    /// Name is held but expected to free up later (403 with the occupied marker).
    ContestedTemporary,
    /// Account not found (404).
    NotFound,
    /// Server asked us to slow down (429).
    RateLimited,
    /// Any 5xx.
    ServerError,
    /// The request never produced an HTTP status.
    NetworkError,
    /// Anything the table above does not cover.
    Unrecognized,
}

impl Outcome {
    /// Platform-side transient failures that get a fixed cool-down.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Outcome::RateLimited | Outcome::ServerError | Outcome::NetworkError
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Taken => "taken",
            Outcome::InvalidName => "invalid_name",
            Outcome::Unauthorized => "unauthorized",
            Outcome::ContestedTemporary => "contested",
            Outcome::NotFound => "not_found",
            Outcome::RateLimited => "rate_limited",
            Outcome::ServerError => "server_error",
            Outcome::NetworkError => "network_error",
            Outcome::Unrecognized => "unrecognized",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// The name was claimed; stop the loop.
    Stop,
    /// Try again after the given delay.
    RetryAfter(Duration),
}

/// Tiered wait policy.
///
/// Transient platform failures get fixed cool-downs that ignore the
/// operator's interval; every business rejection waits exactly the
/// configured interval. There is no attempt cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait after a 429.
    pub rate_limited: Duration,
    /// Wait after a transport failure.
    pub network_error: Duration,
    /// Wait after a 5xx.
    pub server_error: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            rate_limited: Duration::from_secs(60),
            network_error: Duration::from_secs(30),
            server_error: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Wait before the next attempt, given the outcome of the last one and
    /// the operator's polling interval.
    pub fn decide(&self, outcome: Outcome, interval: Duration) -> RetryDecision {
        match outcome {
            Outcome::Success => RetryDecision::Stop,
            Outcome::RateLimited => RetryDecision::RetryAfter(self.rate_limited),
            Outcome::NetworkError => RetryDecision::RetryAfter(self.network_error),
            Outcome::ServerError => RetryDecision::RetryAfter(self.server_error),
            Outcome::Taken
            | Outcome::InvalidName
            | Outcome::Unauthorized
            | Outcome::ContestedTemporary
            | Outcome::NotFound
            | Outcome::Unrecognized => RetryDecision::RetryAfter(interval),
        }
    }
}
