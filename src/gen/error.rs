//! Error taxonomy for target generation.
//!
//! Ingestion errors reference the declaration site of the offending value;
//! the message text is what users see, so it stays stable.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::value::Origin;

/// A fatal problem while generating one target.
#[derive(Debug, Error, Diagnostic)]
pub enum GenError {
    /// A configuration value has the wrong declared type.
    #[error("expected {expected} for `{name}`, got {found}")]
    #[diagnostic(code(slipway::gen::type_mismatch))]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
        origin: Origin,
    },

    #[error("Value must be greater than 1.")]
    #[diagnostic(
        code(slipway::gen::value_out_of_range),
        help("`jumbo_file_merge_limit` caps how many sources one aggregate may include; use 2 or more")
    )]
    MergeLimitOutOfRange { limit: i64, origin: Origin },

    #[error("Excluded file not in sources. The file \"{file}\" was not in \"sources\".")]
    #[diagnostic(code(slipway::gen::excluded_file_not_in_sources))]
    ExcludedFileNotInSources { file: String, origin: Origin },

    #[error(
        "Label not in deps. The label \"{label}\" was not in the deps of this target. \
         allow_circular_includes_from only allows targets present in the deps."
    )]
    #[diagnostic(code(slipway::gen::label_not_in_deps))]
    LabelNotInDeps { label: String, origin: Origin },

    #[error("invalid label `{label}`: {reason}")]
    #[diagnostic(code(slipway::gen::invalid_label))]
    InvalidLabel {
        label: String,
        reason: &'static str,
        origin: Origin,
    },

    #[error(
        "Only source, header, and object files belong in the sources of a {output_kind}. \
         {file} is not one of the valid types."
    )]
    #[diagnostic(code(slipway::gen::unsupported_source_kind))]
    UnsupportedSourceKind {
        output_kind: &'static str,
        file: String,
        origin: Origin,
    },

    #[error(
        "More than one language used in target sources. Mixed sources are not allowed, \
         unless they are compilation-compatible (e.g. Objective C and C++)."
    )]
    #[diagnostic(code(slipway::gen::mixed_languages))]
    MixedLanguages { target: String },

    #[error("`{name}` is set but jumbo is not allowed for this target.")]
    #[diagnostic(
        code(slipway::gen::jumbo_not_allowed),
        help("set `jumbo_allowed = true` on the target or drop the option")
    )]
    JumboNotAllowed { name: String, origin: Origin },

    /// Directory creation or file write failed during emission.
    #[error("failed to emit {path}: {cause:#}")]
    #[diagnostic(code(slipway::gen::io_failure))]
    Io {
        path: PathBuf,
        cause: anyhow::Error,
    },
}

impl GenError {
    /// Declaration site the error refers to, when it has one.
    pub fn origin(&self) -> Option<&Origin> {
        match self {
            GenError::TypeMismatch { origin, .. }
            | GenError::MergeLimitOutOfRange { origin, .. }
            | GenError::ExcludedFileNotInSources { origin, .. }
            | GenError::LabelNotInDeps { origin, .. }
            | GenError::InvalidLabel { origin, .. }
            | GenError::UnsupportedSourceKind { origin, .. }
            | GenError::JumboNotAllowed { origin, .. } => Some(origin),
            GenError::MixedLanguages { .. } | GenError::Io { .. } => None,
        }
    }
}
