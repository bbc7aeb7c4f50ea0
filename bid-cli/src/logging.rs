//! Log output for one `bidcap` run.
//!
//! Everything is known up front (level, `--quiet`, `--log-file`), so the
//! subscriber is built once: an [`EnvFilter`] in front of a short stderr
//! layer and an optional append-mode file layer. Stdout stays free for
//! command output.

use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Where log lines go and how many of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    /// Bare level or full `EnvFilter` directive. `RUST_LOG` overrides it.
    pub level: String,
    pub stderr: bool,
    pub file: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            stderr: true,
            file: None,
        }
    }
}

/// Line layout. The terminal gets `LEVEL message fields`; the file also
/// gets a local timestamp and the target module.
#[derive(Debug, Clone, Copy)]
struct LineFormat {
    detailed: bool,
}

fn level_colour(level: Level) -> &'static str {
    match level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[34m",
        Level::TRACE => "\x1b[35m",
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        if self.detailed {
            write!(writer, "{} ", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))?;
        }
        if writer.has_ansi_escapes() {
            write!(writer, "{}{:>5}\x1b[0m ", level_colour(*meta.level()), meta.level())?;
        } else {
            write!(writer, "{:>5} ", meta.level())?;
        }
        if self.detailed {
            write!(writer, "[{}] ", meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// `RUST_LOG` when it is set and valid, otherwise `level`.
fn level_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).with_context(|| format!("Invalid log level '{level}'"))
}

fn open_log_file(path: &Path) -> Result<File> {
    File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Cannot open log file '{}'", path.display()))
}

/// Installs the global subscriber. Fails on a bad level or an unwritable
/// log file, and when a subscriber is already installed.
pub fn init_logging(options: &LogOptions) -> Result<()> {
    let filter = level_filter(&options.level)?;
    let file = options.file.as_deref().map(open_log_file).transpose()?;

    let stderr_layer = options.stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .event_format(LineFormat { detailed: false })
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr)
    });
    let file_layer = file.map(|file| {
        tracing_subscriber::fmt::layer()
            .event_format(LineFormat { detailed: true })
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Logging was already initialised")
}
