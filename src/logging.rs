//! Tracing subscriber setup: a console layer on stderr and a logfile layer
//! that stays empty until [`Logging::start_logfile`] is called.

use crate::constants::LOG_FILE_NAME;
use anyhow::Context;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

type FileLayer = fmt::Layer<Registry, DefaultFields, Format, NonBlocking>;

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    /// Suppress console output.
    pub quiet: bool,
    /// Append to `<log_path>/mbackup.log` once started.
    pub logfile: bool,
    pub log_path: PathBuf,
}

impl LogOptions {
    /// Console only, as used by commands that never touch the logfile.
    pub fn console(level: &str) -> Self {
        Self {
            level: level.to_string(),
            quiet: false,
            logfile: false,
            log_path: PathBuf::new(),
        }
    }
}

/// Handle on the installed subscriber.
///
/// Dropping it flushes the logfile writer.
pub struct Logging {
    logfile: bool,
    log_path: PathBuf,
    handle: reload::Handle<Option<FileLayer>, Registry>,
    guard: Option<WorkerGuard>,
}

/// Installs the global subscriber with the console layer only.
pub fn init(options: &LogOptions) -> anyhow::Result<Logging> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&options.level))
        .context("Failed to create log filter")?;

    let (file_layer, handle) = reload::Layer::new(None::<FileLayer>);

    let console = (!options.quiet).then(|| {
        fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_target(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(filter)
        .with(console)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(Logging {
        logfile: options.logfile,
        log_path: options.log_path.clone(),
        handle,
        guard: None,
    })
}

impl Logging {
    /// Starts writing to the logfile, if enabled.
    ///
    /// A logfile that cannot be opened is reported once on the console and
    /// otherwise ignored.
    pub fn start_logfile(&mut self) {
        if !self.logfile || self.guard.is_some() {
            return;
        }
        let (writer, guard) = match open_logfile(&self.log_path) {
            Ok(appender) => tracing_appender::non_blocking(appender),
            Err(e) => {
                tracing::warn!("{e:#}; logging to the console only");
                return;
            }
        };
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false);
        match self.handle.reload(Some(layer)) {
            Ok(()) => self.guard = Some(guard),
            Err(e) => tracing::warn!("Unable to start the logfile: {e}"),
        }
    }
}

fn open_logfile(log_path: &Path) -> anyhow::Result<RollingFileAppender> {
    fs::create_dir_all(log_path)
        .with_context(|| format!("Unable to create log path '{}'", log_path.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(log_path)
        .with_context(|| {
            format!(
                "Unable to open log file '{}'",
                log_path.join(LOG_FILE_NAME).display()
            )
        })
}
