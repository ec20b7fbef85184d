//! Access and error log sinks.
//!
//! # Responsibilities
//! - Open append-only log files (or wrap any writer)
//! - Format access lines for rejected and forwarded requests
//! - Format error lines for transport failures
//!
//! # Design Decisions
//! - Lines are assembled in memory and written with one `write_all` under a lock
//! - Every line is flushed before the request completes, so the file is current
//!   even if the process is killed; the write runs on the request's worker
//!   thread and a slow disk delays that worker
//! - A failed write is reported via tracing and never fails the request
//! - Absent sinks silently disable the corresponding log

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::http::{Method, StatusCode};

/// Reason appended to access lines for rejected requests.
pub const REJECTED_REASON: &str = "Path is not allowed by proxy!";

/// Timestamp in RFC 3339 with nanosecond precision.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Shared, line-oriented, append-only writer.
#[derive(Clone)]
pub struct LogSink {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink").finish_non_exhaustive()
    }
}

impl LogSink {
    /// Open (creating if needed) a file in append mode.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from_writer(file))
    }

    /// Wrap an arbitrary writer.
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Write one line and flush it. The trailing newline is added here.
    ///
    /// Blocking: callers on the async runtime pay for the file write inline.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        let mut writer = self.inner.lock();
        writer.write_all(buf.as_bytes())?;
        writer.flush()
    }
}

fn emit(sink: &Option<LogSink>, kind: &'static str, line: &str) {
    if let Some(sink) = sink {
        if let Err(e) = sink.write_line(line) {
            tracing::warn!(sink = kind, error = %e, "Failed to write log line");
        }
    }
}

/// Access log: one line per request, admitted or not.
#[derive(Debug, Clone, Default)]
pub struct AccessLog {
    prefix: String,
    sink: Option<LogSink>,
}

impl AccessLog {
    pub fn new(prefix: impl Into<String>, sink: Option<LogSink>) -> Self {
        Self {
            prefix: prefix.into(),
            sink,
        }
    }

    /// Record a request turned away by the allowlist.
    pub fn rejected(&self, client: SocketAddr, method: &Method, uri: &str) {
        let line = format!(
            "{} {} {} {} {} {} {}",
            self.prefix,
            timestamp(),
            client,
            method,
            uri,
            StatusCode::NOT_FOUND.as_u16(),
            REJECTED_REASON,
        );
        emit(&self.sink, "access", &line);
    }

    /// Record a forwarded request and the downstream status line.
    pub fn forwarded(&self, client: SocketAddr, method: &Method, uri: &str, status: StatusCode) {
        let line = format!(
            "{} {} {} {} {} {}",
            self.prefix,
            timestamp(),
            client,
            method,
            uri,
            status_text(status),
        );
        emit(&self.sink, "access", &line);
    }
}

/// Error log: transport failures while forwarding.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    prefix: String,
    sink: Option<LogSink>,
}

impl ErrorLog {
    pub fn new(prefix: impl Into<String>, sink: Option<LogSink>) -> Self {
        Self {
            prefix: prefix.into(),
            sink,
        }
    }

    pub fn transport_failure(&self, client: SocketAddr, method: &Method, uri: &str, error: &str) {
        let line = format!(
            "{} {} {} {} {} {}",
            self.prefix,
            timestamp(),
            client,
            method,
            uri,
            error,
        );
        emit(&self.sink, "error", &line);
    }
}

/// Status line text, e.g. `200 OK` or `599` for unregistered codes.
pub fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
