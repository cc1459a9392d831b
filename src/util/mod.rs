//! Shared utilities

pub mod diagnostic;
pub mod fs;
pub mod paths;

pub use diagnostic::{Diagnostic, DiagnosticSink};
