//! Logging init: stdout for the operator plus an append-only file under the
//! XDG state dir, timestamps in UTC+3. Falls back to stderr only.

use crate::clock::monitor_offset;
use anyhow::Result;
use chrono::Utc;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,nickwatch=debug";

/// Event timestamps in the monitor's fixed UTC+3 offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitorTime;

impl FormatTime for MonitorTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = Utc::now().with_timezone(&monitor_offset());
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Writer that is either a file or stderr (used when file clone fails).
enum FileOrStderr {
    File(std::fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct FileMakeWriter(std::fs::File);

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileOrStderr;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(FileOrStderr::File)
            .unwrap_or(FileOrStderr::Stderr)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("nickwatch")?;
    Ok(xdg_dirs.get_state_home().join("monitor.log"))
}

/// Initialize logging to stdout and `~/.local/state/nickwatch/monitor.log`.
/// On failure (e.g. state dir unwritable), returns Err so the caller can fall back to stderr.
pub fn init_logging() -> Result<()> {
    let log_file_path = log_path()?;
    if let Some(dir) = log_file_path.parent() {
        fs::create_dir_all(dir)?;
    }

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_timer(MonitorTime)
        .with_target(false);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_timer(MonitorTime)
        .with_writer(FileMakeWriter(file))
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    tracing::debug!("logging to {}", log_file_path.display());

    Ok(())
}

/// Initialize logging to stderr only (no file). Use when init_logging() fails so the CLI doesn't crash.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_timer(MonitorTime)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
