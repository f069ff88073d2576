//! Attempt classification and retry scheduling.
//!
//! A claim response is turned into an [`Outcome`] by [`classify`], and the
//! outcome is turned into a wait by [`RetryPolicy`]. Keeping both here lets
//! the monitor loop stay a thin driver with no status-code knowledge.

mod attempt;
mod classify;
mod policy;

pub use attempt::AttemptResult;
pub use classify::{classify, Classification, ResponseBody, CONTESTED_MARKERS};
pub use policy::{Outcome, RetryDecision, RetryPolicy};
