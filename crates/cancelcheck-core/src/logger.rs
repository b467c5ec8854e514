//! Backend-prefixed diagnostics on the host's output stream.
//!
//! Every line goes to the host stream as `Level [backend]: message` and is
//! mirrored as a `tracing` event.

use std::fmt;
use std::io::Write;

use parking_lot::Mutex;

/// Severity of a logged line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Informational
    Info,
    /// Recoverable problem
    Warning,
    /// Rejected input or failed step
    Error,
}

impl LogLevel {
    fn prefix(self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

/// Logger bound to one backend name and one host stream.
pub struct BackendLogger {
    name: &'static str,
    stream: Mutex<Box<dyn Write + Send>>,
}

impl BackendLogger {
    /// Wrap `stream` for the backend called `name`.
    pub fn new(name: &'static str, stream: Box<dyn Write + Send>) -> Self {
        Self {
            name,
            stream: Mutex::new(stream),
        }
    }

    /// Backend name used as prefix.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Log at `level`.
    pub fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        match level {
            LogLevel::Info => tracing::info!(backend = self.name, "{args}"),
            LogLevel::Warning => tracing::warn!(backend = self.name, "{args}"),
            LogLevel::Error => tracing::error!(backend = self.name, "{args}"),
        }
        let mut stream = self.stream.lock();
        let written = writeln!(stream, "{} [{}]: {}", level.prefix(), self.name, args)
            .and_then(|()| stream.flush());
        if let Err(e) = written {
            tracing::warn!(error = %e, "failed to write to host output stream");
        }
    }

    /// Log an informational line.
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    /// Log a warning.
    pub fn warning(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Warning, args);
    }

    /// Log an error.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }
}

impl fmt::Debug for BackendLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendLogger")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Shared in-memory stream, handy for capturing logger output.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(std::sync::Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
