//! # Diagnostics
//!
//! One sink for every failure the user should see: backend calls that
//! failed or timed out, clipboard reads that were refused, terminal writes
//! that broke. Each report is logged and kept, and the caller prints
//! [`Diagnostic::line`] into the terminal so nothing fails silently.
//!
//! Panics are the exception: the hook runs with no session to record into,
//! so [`panic_report`] only logs and hands back the line for stderr.

use log::{error, warn};
use std::backtrace::Backtrace;
use std::fmt;
use std::io;

use crate::backend::BackendError;
use crate::core::clipboard::ClipboardError;

/// Where a diagnostic came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticSource {
    /// A backend capability, by wire name (e.g. `submit_command`).
    Backend(&'static str),
    Clipboard,
    /// Writing to the terminal itself failed.
    Terminal,
    Panic,
}

impl fmt::Display for DiagnosticSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSource::Backend(capability) => write!(f, "backend {capability}"),
            DiagnosticSource::Clipboard => write!(f, "paste"),
            DiagnosticSource::Terminal => write!(f, "terminal"),
            DiagnosticSource::Panic => write!(f, "panic"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub source: DiagnosticSource,
    pub message: String,
}

impl Diagnostic {
    /// The one-line form printed into the terminal.
    pub fn line(&self) -> String {
        format!("[error] {}: {}", self.source, self.message)
    }
}

/// Keeps a bounded record of recent diagnostics.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    recent: Vec<Diagnostic>,
}

impl DiagnosticSink {
    const KEEP: usize = 50;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(&mut self, capability: &'static str, err: &BackendError) -> &Diagnostic {
        error!("Backend call {} failed: {}", capability, err);
        self.record(DiagnosticSource::Backend(capability), err.to_string())
    }

    pub fn clipboard(&mut self, err: &ClipboardError) -> &Diagnostic {
        warn!("Paste failed: {}", err);
        self.record(DiagnosticSource::Clipboard, err.to_string())
    }

    pub fn terminal(&mut self, err: &io::Error) -> &Diagnostic {
        error!("Terminal write failed: {}", err);
        self.record(DiagnosticSource::Terminal, err.to_string())
    }

    pub fn recent(&self) -> &[Diagnostic] {
        &self.recent
    }

    fn record(&mut self, source: DiagnosticSource, message: String) -> &Diagnostic {
        if self.recent.len() == Self::KEEP {
            self.recent.remove(0);
        }
        self.recent.push(Diagnostic { source, message });
        self.recent.last().expect("just pushed")
    }
}

/// Logs a panic with its backtrace and returns the line to show on stderr.
pub fn panic_report(message: &str, backtrace: &Backtrace) -> Diagnostic {
    error!("Panic: {}\n{}", message, backtrace);
    Diagnostic {
        source: DiagnosticSource::Panic,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_diagnostic_line() {
        let mut sink = DiagnosticSink::new();
        let line = sink
            .backend("submit_command", &BackendError::Network("connection refused".into()))
            .line();
        assert_eq!(
            line,
            "[error] backend submit_command: network error: connection refused"
        );
        assert_eq!(sink.recent().len(), 1);
    }

    #[test]
    fn test_clipboard_diagnostic_line() {
        let mut sink = DiagnosticSink::new();
        let line = sink.clipboard(&ClipboardError::Empty).line();
        assert_eq!(line, "[error] paste: clipboard holds no text");
    }

    #[test]
    fn test_terminal_failure_recorded() {
        let mut sink = DiagnosticSink::new();
        let err = io::Error::new(io::ErrorKind::BrokenPipe, "tty gone");
        assert_eq!(sink.terminal(&err).line(), "[error] terminal: tty gone");
        assert_eq!(sink.recent()[0].source, DiagnosticSource::Terminal);
    }

    #[test]
    fn test_panic_report_line() {
        let report = panic_report("index out of bounds", &Backtrace::disabled());
        assert_eq!(report.line(), "[error] panic: index out of bounds");
    }

    #[test]
    fn test_sink_is_bounded() {
        let mut sink = DiagnosticSink::new();
        for _ in 0..(DiagnosticSink::KEEP + 5) {
            sink.clipboard(&ClipboardError::Empty);
        }
        assert_eq!(sink.recent().len(), DiagnosticSink::KEEP);
    }
}
