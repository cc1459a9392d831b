//! Path rewriting for generated file contents.

use std::path::{Component, Path, PathBuf};

use crate::core::source_file::{SourceDir, SourceFile};

/// Format `file` as the string that should appear inside an `#include`
/// directive written from `base`. Always forward slashes, no escaping.
pub fn rebase_for_include(file: &SourceFile, base: &SourceDir) -> String {
    let file_rel = file.value().trim_start_matches('/');
    let base_rel = base.value().trim_start_matches('/');

    let diff = pathdiff::diff_paths(Path::new(file_rel), Path::new(base_rel))
        .unwrap_or_else(|| PathBuf::from(file_rel));

    let mut parts: Vec<String> = Vec::new();
    for comp in diff.components() {
        match comp {
            Component::ParentDir => parts.push("..".to_string()),
            Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
            _ => {}
        }
    }
    parts.join("/")
}
