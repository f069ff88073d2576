//! CLI command handlers, one per file.

mod configure;
mod run;
mod show;

pub use configure::{run_configure, ConfigureArgs};
pub use run::run_monitor;
pub use show::run_show;
