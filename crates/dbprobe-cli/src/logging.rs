use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use clap::ValueEnum;
use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file {path}: {source}")]
    OpenFile { path: String, source: io::Error },
    #[error("cannot install subscriber: {0}")]
    Init(String),
}

/// Console log encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Human,
    Json,
}

/// Install the global subscriber.
///
/// Console output goes to stderr so reports on stdout stay clean. Level comes
/// from `RUST_LOG`, defaulting to `info`. With `log_file`, JSON lines are also
/// appended there.
pub fn init_logging(format: LogFormat, log_file: Option<&Path>) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = match format {
        LogFormat::Human => tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(io::stderr)
            .boxed(),
    };

    let file = match log_file {
        Some(path) => Some(json_file_layer(path)?),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|err| LoggingError::Init(err.to_string()))
}

fn json_file_layer<S>(path: &Path) -> Result<Box<dyn tracing_subscriber::Layer<S> + Send + Sync>, LoggingError>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenFile {
            path: path.display().to_string(),
            source,
        })?;
    let writer = LogFileWriter::new(file);
    let make_writer = BoxMakeWriter::new(move || writer.clone());

    Ok(tracing_subscriber::fmt::layer()
        .json()
        .with_ansi(false)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(make_writer)
        .boxed())
}

/// Cloneable handle onto the `--log-file` target; every event writer the
/// subscriber creates appends through the same file.
#[derive(Clone)]
struct LogFileWriter {
    target: Arc<Mutex<File>>,
}

impl LogFileWriter {
    fn new(file: File) -> Self {
        Self {
            target: Arc::new(Mutex::new(file)),
        }
    }

    fn with_target<T>(&self, op: impl FnOnce(&mut File) -> io::Result<T>) -> io::Result<T> {
        let mut file = self
            .target
            .lock()
            .map_err(|_| io::Error::other("--log-file writer panicked mid-event"))?;
        op(&mut file)
    }
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_target(|file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_target(|file| file.flush())
    }
}
