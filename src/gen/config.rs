//! Target configuration ingestion.
//!
//! Reads the declared build-description values into a [`Target`], checking
//! types and cross-field invariants. The fill order is fixed: sources are
//! filled and validated before any jumbo option is read, so the exclusion
//! subset check always runs against the final source list.

use crate::core::source_file::SourceType;
use crate::core::target::{Label, Target};
use crate::core::value::{DeclaredValue, DeclaredValues};
use crate::gen::error::GenError;

/// Symbolic names recognized from the build description.
pub mod variables {
    pub const SOURCES: &str = "sources";
    pub const ALLOW_CIRCULAR_INCLUDES_FROM: &str = "allow_circular_includes_from";
    pub const CRATE_ROOT: &str = "crate_root";
    pub const JUMBO_ALLOWED: &str = "jumbo_allowed";
    pub const JUMBO_EXCLUDED_SOURCES: &str = "jumbo_excluded_sources";
    pub const JUMBO_FILE_MERGE_LIMIT: &str = "jumbo_file_merge_limit";
}

/// Populates a target's fields from its declared values.
pub struct TargetConfigGenerator<'a> {
    target: &'a mut Target,
    values: &'a mut DeclaredValues,
}

impl<'a> TargetConfigGenerator<'a> {
    pub fn new(target: &'a mut Target, values: &'a mut DeclaredValues) -> Self {
        TargetConfigGenerator { target, values }
    }

    /// Run every fill step in order. The first error aborts ingestion for
    /// this target; no later step observes partially validated state.
    pub fn run(&mut self) -> Result<(), GenError> {
        self.fill_sources()?;
        self.fill_allow_circular_includes_from()?;
        self.validate_sources()?;
        self.fill_jumbo_allowed()?;
        self.fill_jumbo_excluded_sources()?;
        self.fill_jumbo_file_merge_limit()?;
        Ok(())
    }

    fn fill_sources(&mut self) -> Result<(), GenError> {
        let Some(declared) = self.values.get(variables::SOURCES, true).cloned() else {
            return Ok(());
        };
        let entries = require_string_list(&declared, variables::SOURCES)?;

        let mut sources = Vec::with_capacity(entries.len());
        for entry in &entries {
            let source = self.target.label_dir.resolve_file(entry);
            if source.source_type() == SourceType::Unknown {
                return Err(GenError::UnsupportedSourceKind {
                    output_kind: self.target.output_kind.as_str(),
                    file: source.value().to_string(),
                    origin: declared.origin.clone(),
                });
            }
            self.target.source_types_used.set(source.source_type());
            sources.push(source);
        }
        self.target.sources = sources;
        Ok(())
    }

    fn fill_allow_circular_includes_from(&mut self) -> Result<(), GenError> {
        let Some(declared) = self
            .values
            .get(variables::ALLOW_CIRCULAR_INCLUDES_FROM, true)
            .cloned()
        else {
            return Ok(());
        };
        let entries = require_string_list(&declared, variables::ALLOW_CIRCULAR_INCLUDES_FROM)?;

        for entry in &entries {
            let label =
                Label::resolve(entry, &self.target.label_dir).map_err(|e| GenError::InvalidLabel {
                    label: e.label,
                    reason: e.reason,
                    origin: declared.origin.clone(),
                })?;
            if !self.target.deps.contains(&label) {
                return Err(GenError::LabelNotInDeps {
                    label: label.to_string(),
                    origin: declared.origin.clone(),
                });
            }
            self.target.allow_circular_includes_from.insert(label);
        }
        Ok(())
    }

    fn validate_sources(&mut self) -> Result<(), GenError> {
        // A declared crate root makes this a Rust target even when the
        // source list omits the root file. Presence check only, so the
        // assignment still counts as unconsumed for the Rust-values pass.
        if self.values.get(variables::CRATE_ROOT, false).is_some() {
            self.target.source_types_used.set(SourceType::Rust);
        }

        if self.target.source_types_used.mixed_language_used() {
            return Err(GenError::MixedLanguages {
                target: self.target.name.clone(),
            });
        }
        Ok(())
    }

    fn fill_jumbo_allowed(&mut self) -> Result<(), GenError> {
        let Some(declared) = self.values.get(variables::JUMBO_ALLOWED, true).cloned() else {
            return Ok(());
        };
        self.target.jumbo_allowed = require_bool(&declared, variables::JUMBO_ALLOWED)?;
        Ok(())
    }

    fn fill_jumbo_excluded_sources(&mut self) -> Result<(), GenError> {
        let Some(declared) = self
            .values
            .get(variables::JUMBO_EXCLUDED_SOURCES, true)
            .cloned()
        else {
            return Ok(());
        };
        if !self.target.jumbo_allowed {
            return Err(GenError::JumboNotAllowed {
                name: variables::JUMBO_EXCLUDED_SOURCES.to_string(),
                origin: declared.origin.clone(),
            });
        }
        let entries = require_string_list(&declared, variables::JUMBO_EXCLUDED_SOURCES)?;

        // Exclusion lists name the handful of files that break when merged,
        // so the linear scan per entry stays cheap.
        let mut excluded = Vec::with_capacity(entries.len());
        for entry in &entries {
            let file = self.target.label_dir.resolve_file(entry);
            if !self.target.sources.contains(&file) {
                return Err(GenError::ExcludedFileNotInSources {
                    file: file.value().to_string(),
                    origin: declared.origin.clone(),
                });
            }
            excluded.push(file);
        }
        self.target.jumbo_excluded_sources = excluded;
        Ok(())
    }

    fn fill_jumbo_file_merge_limit(&mut self) -> Result<(), GenError> {
        let Some(declared) = self
            .values
            .get(variables::JUMBO_FILE_MERGE_LIMIT, true)
            .cloned()
        else {
            return Ok(());
        };
        if !self.target.jumbo_allowed {
            return Err(GenError::JumboNotAllowed {
                name: variables::JUMBO_FILE_MERGE_LIMIT.to_string(),
                origin: declared.origin.clone(),
            });
        }
        let limit = require_integer(&declared, variables::JUMBO_FILE_MERGE_LIMIT)?;
        if limit < 2 {
            return Err(GenError::MergeLimitOutOfRange {
                limit,
                origin: declared.origin.clone(),
            });
        }
        self.target.jumbo_file_merge_limit = limit as usize;
        Ok(())
    }
}

fn require_bool(declared: &DeclaredValue, name: &str) -> Result<bool, GenError> {
    declared.value.as_bool().ok_or_else(|| GenError::TypeMismatch {
        name: name.to_string(),
        expected: "boolean",
        found: declared.value.type_name(),
        origin: declared.origin.clone(),
    })
}

fn require_integer(declared: &DeclaredValue, name: &str) -> Result<i64, GenError> {
    declared
        .value
        .as_integer()
        .ok_or_else(|| GenError::TypeMismatch {
            name: name.to_string(),
            expected: "integer",
            found: declared.value.type_name(),
            origin: declared.origin.clone(),
        })
}

fn require_string_list(declared: &DeclaredValue, name: &str) -> Result<Vec<String>, GenError> {
    let items = declared.value.as_list().ok_or_else(|| GenError::TypeMismatch {
        name: name.to_string(),
        expected: "list",
        found: declared.value.type_name(),
        origin: declared.origin.clone(),
    })?;

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let s = item.as_str().ok_or_else(|| GenError::TypeMismatch {
            name: name.to_string(),
            expected: "string",
            found: item.type_name(),
            origin: declared.origin.clone(),
        })?;
        out.push(s.to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::BuildContext;
    use crate::core::source_file::SourceDir;
    use crate::core::target::{OutputKind, DEFAULT_JUMBO_FILE_MERGE_LIMIT};
    use crate::core::value::{Origin, Value};

    fn test_target() -> Target {
        let ctx = BuildContext::new("/work/src", SourceDir::new("//out/Debug/"));
        Target::new(
            "bar",
            SourceDir::new("//foo/"),
            OutputKind::StaticLibrary,
            &ctx,
        )
    }

    fn origin() -> Origin {
        Origin::new("foo/BUILD", 7)
    }

    fn run(target: &mut Target, values: &mut DeclaredValues) -> Result<(), GenError> {
        TargetConfigGenerator::new(target, values).run()
    }

    #[test]
    fn fills_sources_and_jumbo_fields() {
        let mut target = test_target();
        let mut values = DeclaredValues::new();
        values.insert(
            variables::SOURCES,
            Value::string_list(["a.cc", "sub/b.cc", "a.h"]),
            origin(),
        );
        values.insert(variables::JUMBO_ALLOWED, Value::Bool(true), origin());
        values.insert(
            variables::JUMBO_EXCLUDED_SOURCES,
            Value::string_list(["sub/b.cc"]),
            origin(),
        );
        values.insert(variables::JUMBO_FILE_MERGE_LIMIT, Value::Integer(8), origin());

        run(&mut target, &mut values).unwrap();

        let sources: Vec<&str> = target.sources.iter().map(|s| s.value()).collect();
        assert_eq!(sources, vec!["//foo/a.cc", "//foo/sub/b.cc", "//foo/a.h"]);
        assert!(target.jumbo_allowed);
        assert_eq!(target.jumbo_excluded_sources.len(), 1);
        assert_eq!(target.jumbo_excluded_sources[0].value(), "//foo/sub/b.cc");
        assert_eq!(target.jumbo_file_merge_limit, 8);
    }

    #[test]
    fn merge_limit_defaults_to_fifty() {
        let mut target = test_target();
        let mut values = DeclaredValues::new();
        values.insert(variables::SOURCES, Value::string_list(["a.cc"]), origin());

        run(&mut target, &mut values).unwrap();
        assert_eq!(target.jumbo_file_merge_limit, DEFAULT_JUMBO_FILE_MERGE_LIMIT);
        assert_eq!(DEFAULT_JUMBO_FILE_MERGE_LIMIT, 50);
    }

    #[test]
    fn merge_limit_of_one_is_rejected() {
        let mut target = test_target();
        let mut values = DeclaredValues::new();
        values.insert(variables::JUMBO_ALLOWED, Value::Bool(true), origin());
        values.insert(variables::JUMBO_FILE_MERGE_LIMIT, Value::Integer(1), origin());

        let err = run(&mut target, &mut values).unwrap_err();
        assert_eq!(err.to_string(), "Value must be greater than 1.");
    }

    #[test]
    fn merge_limit_of_two_is_accepted() {
        let mut target = test_target();
        let mut values = DeclaredValues::new();
        values.insert(variables::JUMBO_ALLOWED, Value::Bool(true), origin());
        values.insert(variables::JUMBO_FILE_MERGE_LIMIT, Value::Integer(2), origin());

        run(&mut target, &mut values).unwrap();
        assert_eq!(target.jumbo_file_merge_limit, 2);
    }

    #[test]
    fn merge_limit_requires_integer() {
        let mut target = test_target();
        let mut values = DeclaredValues::new();
        values.insert(variables::JUMBO_ALLOWED, Value::Bool(true), origin());
        values.insert(
            variables::JUMBO_FILE_MERGE_LIMIT,
            Value::String("50".into()),
            origin(),
        );

        let err = run(&mut target, &mut values).unwrap_err();
        assert!(matches!(err, GenError::TypeMismatch { .. }));
    }

    #[test]
    fn jumbo_allowed_requires_boolean() {
        let mut target = test_target();
        let mut values = DeclaredValues::new();
        values.insert(variables::JUMBO_ALLOWED, Value::Integer(1), origin());

        let err = run(&mut target, &mut values).unwrap_err();
        assert!(matches!(err, GenError::TypeMismatch { .. }));
    }

    #[test]
    fn excluded_file_must_be_in_sources() {
        let mut target = test_target();
        let mut values = DeclaredValues::new();
        values.insert(variables::SOURCES, Value::string_list(["a.cc"]), origin());
        values.insert(variables::JUMBO_ALLOWED, Value::Bool(true), origin());
        values.insert(
            variables::JUMBO_EXCLUDED_SOURCES,
            Value::string_list(["missing.cc"]),
            origin(),
        );

        let err = run(&mut target, &mut values).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Excluded file not in sources."));
    }

    #[test]
    fn jumbo_options_require_jumbo_allowed() {
        let mut target = test_target();
        let mut values = DeclaredValues::new();
        values.insert(variables::SOURCES, Value::string_list(["a.cc"]), origin());
        values.insert(
            variables::JUMBO_EXCLUDED_SOURCES,
            Value::string_list(["a.cc"]),
            origin(),
        );

        let err = run(&mut target, &mut values).unwrap_err();
        assert!(matches!(err, GenError::JumboNotAllowed { .. }));

        let mut target = test_target();
        let mut values = DeclaredValues::new();
        values.insert(variables::JUMBO_FILE_MERGE_LIMIT, Value::Integer(4), origin());

        let err = run(&mut target, &mut values).unwrap_err();
        assert!(matches!(err, GenError::JumboNotAllowed { .. }));
    }

    #[test]
    fn unknown_source_kind_is_rejected() {
        let mut target = test_target();
        let mut values = DeclaredValues::new();
        values.insert(
            variables::SOURCES,
            Value::string_list(["a.cc", "notes.txt"]),
            origin(),
        );

        let err = run(&mut target, &mut values).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with(
            "Only source, header, and object files belong in the sources of a static_library."
        ));
        assert!(message.contains("//foo/notes.txt"));
    }

    #[test]
    fn mixed_languages_are_rejected() {
        let mut target = test_target();
        let mut values = DeclaredValues::new();
        values.insert(
            variables::SOURCES,
            Value::string_list(["a.cc", "b.rs"]),
            origin(),
        );

        let err = run(&mut target, &mut values).unwrap_err();
        assert!(matches!(err, GenError::MixedLanguages { .. }));
    }

    #[test]
    fn compatible_families_pass_validation() {
        let mut target = test_target();
        let mut values = DeclaredValues::new();
        values.insert(
            variables::SOURCES,
            Value::string_list(["a.cc", "b.c", "c.m", "d.mm", "e.h", "f.S"]),
            origin(),
        );

        run(&mut target, &mut values).unwrap();
    }

    #[test]
    fn crate_root_marks_rust_usage() {
        let mut target = test_target();
        let mut values = DeclaredValues::new();
        values.insert(variables::SOURCES, Value::string_list(["a.cc"]), origin());
        values.insert(variables::CRATE_ROOT, Value::String("lib.rs".into()), origin());

        let err = run(&mut target, &mut values).unwrap_err();
        assert!(matches!(err, GenError::MixedLanguages { .. }));

        // Rust-only target with a crate root is fine.
        let mut target = test_target();
        let mut values = DeclaredValues::new();
        values.insert(variables::SOURCES, Value::string_list(["util.rs"]), origin());
        values.insert(variables::CRATE_ROOT, Value::String("lib.rs".into()), origin());

        run(&mut target, &mut values).unwrap();
        assert!(target.source_types_used.rust_used());
    }

    #[test]
    fn circular_includes_must_name_deps() {
        let mut target = test_target();
        target.deps.push(Label::resolve("//base:util", &target.label_dir).unwrap());
        let mut values = DeclaredValues::new();
        values.insert(
            variables::ALLOW_CIRCULAR_INCLUDES_FROM,
            Value::string_list(["//base:util"]),
            origin(),
        );

        run(&mut target, &mut values).unwrap();
        assert_eq!(target.allow_circular_includes_from.len(), 1);

        let mut target = test_target();
        let mut values = DeclaredValues::new();
        values.insert(
            variables::ALLOW_CIRCULAR_INCLUDES_FROM,
            Value::string_list(["//base:util"]),
            origin(),
        );

        let err = run(&mut target, &mut values).unwrap_err();
        assert!(err.to_string().starts_with("Label not in deps."));
    }
}
