//! User-facing diagnostics and the generation-wide sink.

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with an optional file location and context lines.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
    pub location: Option<PathBuf>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            location: None,
            notes: Vec::new(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            location: None,
            notes: Vec::new(),
        }
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let severity = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
                Severity::Note => "\x1b[1;36mnote\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
            }
        };

        let mut output = format!("{}: {}\n", severity, self.message);
        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }
        for note in &self.notes {
            output.push_str(&format!("  note: {}\n", note));
        }
        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Generation-wide diagnostic channel.
///
/// Targets are generated independently, possibly from several threads;
/// appends are serialized so reports never interleave. The enclosing
/// generator decides whether a failed target halts the whole run.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diags: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic.
    pub fn report(&self, diag: Diagnostic) {
        self.diags.lock().unwrap().push(diag);
    }

    /// True if any error-severity diagnostic has been reported.
    pub fn has_errors(&self) -> bool {
        self.diags
            .lock()
            .unwrap()
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Drain all collected diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diags.lock().unwrap())
    }
}
