pub mod config;
pub mod logging;

pub mod client;
pub mod clock;
pub mod control;
pub mod monitor;
pub mod retry;
pub mod schedule;
