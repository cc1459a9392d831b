//! Slipway - a build-graph generator core for C and C++ projects.
//!
//! This crate implements the jumbo source aggregation subsystem of the
//! generator: per-target configuration ingestion, partitioning of eligible
//! sources into generated aggregate ("jumbo") files, and change-detecting
//! emission of those files.

pub mod core;
pub mod gen;
pub mod util;

pub use crate::core::{
    context::BuildContext,
    source_file::{SourceDir, SourceFile, SourceType},
    target::{JumboFile, Label, OutputKind, Target},
    value::{DeclaredValues, Origin, Value},
};

pub use crate::gen::{generate_target, GenError};
pub use crate::util::diagnostic::{Diagnostic, DiagnosticSink};
