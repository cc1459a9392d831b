//! Core data model for the generator.

pub mod context;
pub mod source_file;
pub mod target;
pub mod value;

pub use context::BuildContext;
pub use source_file::{SourceDir, SourceFile, SourceType, SourceTypeSet};
pub use target::{JumboFile, Label, OutputKind, Target};
pub use value::{DeclaredValue, DeclaredValues, Origin, Value};
