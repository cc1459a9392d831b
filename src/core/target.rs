//! Build targets and their jumbo aggregation state.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::context::BuildContext;
use crate::core::source_file::{SourceDir, SourceFile, SourceTypeSet};

/// Default cap on how many sources one aggregate may include.
pub const DEFAULT_JUMBO_FILE_MERGE_LIMIT: usize = 50;

/// The kind of artifact a binary target produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Executable,
    LoadableModule,
    SharedLibrary,
    SourceSet,
    StaticLibrary,
}

impl OutputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Executable => "executable",
            OutputKind::LoadableModule => "loadable_module",
            OutputKind::SharedLibrary => "shared_library",
            OutputKind::SourceSet => "source_set",
            OutputKind::StaticLibrary => "static_library",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from parsing a label reference in the build description.
#[derive(Debug, Clone, Error)]
#[error("invalid label `{label}`: {reason}")]
pub struct LabelError {
    pub label: String,
    pub reason: &'static str,
}

/// A target reference: directory plus target name, shown as `//dir:name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Label {
    dir: SourceDir,
    name: String,
}

impl Label {
    pub fn new(dir: SourceDir, name: impl Into<String>) -> Self {
        Label {
            dir,
            name: name.into(),
        }
    }

    /// Resolve a user-facing label reference against the directory of the
    /// declaration it appears in. Accepts `//dir:name`, `//dir` (name
    /// defaults to the last path component), `:name`, and relative forms.
    pub fn resolve(input: &str, current: &SourceDir) -> Result<Label, LabelError> {
        if input.is_empty() {
            return Err(LabelError {
                label: input.to_string(),
                reason: "empty label",
            });
        }

        let (path_part, name_part) = match input.split_once(':') {
            Some((path, name)) => (path, Some(name)),
            None => (input, None),
        };

        if let Some(name) = name_part {
            if name.is_empty() {
                return Err(LabelError {
                    label: input.to_string(),
                    reason: "empty target name after `:`",
                });
            }
        }

        let dir = if path_part.is_empty() {
            current.clone()
        } else if path_part.starts_with("//") {
            SourceDir::new(path_part)
        } else {
            current.resolve_dir(path_part)
        };

        let name = match name_part {
            Some(name) => name.to_string(),
            None => {
                let implied = path_part.trim_end_matches('/').rsplit('/').next();
                match implied {
                    Some(last) if !last.is_empty() => last.to_string(),
                    _ => {
                        return Err(LabelError {
                            label: input.to_string(),
                            reason: "label names no target",
                        })
                    }
                }
            }
        };

        Ok(Label { dir, name })
    }

    pub fn dir(&self) -> &SourceDir {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trimmed = self.dir.value().trim_end_matches('/');
        let dir = if trimmed.is_empty() { "//" } else { trimmed };
        write!(f, "{}:{}", dir, self.name)
    }
}

/// A planned aggregate: the generated output file plus the indices (into
/// [`Target::sources`]) of the sources it includes, in inclusion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumboFile {
    output: SourceFile,
    included: Vec<usize>,
}

impl JumboFile {
    pub(crate) fn new(output: SourceFile) -> Self {
        JumboFile {
            output,
            included: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, source_index: usize) {
        self.included.push(source_index);
    }

    pub fn output(&self) -> &SourceFile {
        &self.output
    }

    pub fn included(&self) -> &[usize] {
        &self.included
    }
}

/// A binary target, reduced to the fields the jumbo subsystem works with.
///
/// Configuration fields are written once during ingestion; `jumbo_files`
/// is produced once by planning and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Short target name; forms aggregate file names.
    pub name: String,

    /// Kind of artifact this target produces.
    pub output_kind: OutputKind,

    /// Directory of the declaration site; relative paths resolve here.
    pub label_dir: SourceDir,

    /// Output directory for files generated on behalf of this target.
    pub generated_dir: SourceDir,

    /// Declared sources, in declaration order.
    pub sources: Vec<SourceFile>,

    /// Linked dependencies, for referential checks.
    pub deps: Vec<Label>,

    /// Dependencies allowed to include this target's headers circularly.
    pub allow_circular_includes_from: BTreeSet<Label>,

    /// Which source types appear in `sources`.
    pub source_types_used: SourceTypeSet,

    /// Whether jumbo aggregation may run for this target.
    pub jumbo_allowed: bool,

    /// Sources to leave out of aggregation; each must appear in `sources`.
    pub jumbo_excluded_sources: Vec<SourceFile>,

    /// Max number of sources merged into one aggregate.
    pub jumbo_file_merge_limit: usize,

    /// Planned aggregates, populated once after ingestion.
    pub jumbo_files: Vec<JumboFile>,
}

impl Target {
    pub fn new(
        name: impl Into<String>,
        label_dir: SourceDir,
        output_kind: OutputKind,
        ctx: &BuildContext,
    ) -> Self {
        let generated_dir = ctx.gen_dir_for(&label_dir);
        Target {
            name: name.into(),
            output_kind,
            label_dir,
            generated_dir,
            sources: Vec::new(),
            deps: Vec::new(),
            allow_circular_includes_from: BTreeSet::new(),
            source_types_used: SourceTypeSet::new(),
            jumbo_allowed: false,
            jumbo_excluded_sources: Vec::new(),
            jumbo_file_merge_limit: DEFAULT_JUMBO_FILE_MERGE_LIMIT,
            jumbo_files: Vec::new(),
        }
    }

    /// The label of this target, `//<label_dir>:<name>`.
    pub fn label(&self) -> Label {
        Label::new(self.label_dir.clone(), self.name.clone())
    }

    /// The files the downstream writer should compile when aggregation is
    /// in effect: aggregate outputs first, then every source no aggregate
    /// swallowed (excluded sources, headers, assembly, objects), in
    /// declaration order.
    pub fn compile_sources(&self) -> Vec<SourceFile> {
        let mut swallowed = vec![false; self.sources.len()];
        for jumbo in &self.jumbo_files {
            for &index in jumbo.included() {
                swallowed[index] = true;
            }
        }

        let mut out: Vec<SourceFile> = self
            .jumbo_files
            .iter()
            .map(|jumbo| jumbo.output().clone())
            .collect();
        out.extend(
            self.sources
                .iter()
                .zip(swallowed.iter())
                .filter(|(_, taken)| !**taken)
                .map(|(source, _)| source.clone()),
        );
        out
    }
}
