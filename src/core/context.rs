//! Build context: the directories the generator works within.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::source_file::{SourceDir, SourceFile};

/// Paths shared by every target of one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildContext {
    /// Absolute filesystem path of the source tree root (what `//` means).
    source_root: PathBuf,

    /// Build output directory, source-absolute (e.g. `//out/Debug/`).
    build_dir: SourceDir,
}

impl BuildContext {
    pub fn new(source_root: impl Into<PathBuf>, build_dir: SourceDir) -> Self {
        BuildContext {
            source_root: source_root.into(),
            build_dir,
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn build_dir(&self) -> &SourceDir {
        &self.build_dir
    }

    /// Generated-file directory for a target declared in `label_dir`:
    /// `<build_dir>/gen/<label_dir>`.
    pub fn gen_dir_for(&self, label_dir: &SourceDir) -> SourceDir {
        let label_rel = label_dir.value().trim_start_matches('/');
        self.build_dir.resolve_dir(&format!("gen/{}", label_rel))
    }

    /// Absolute filesystem path for a source file. Source-absolute values
    /// resolve against the source root; anything else joins as-is.
    pub fn full_path(&self, file: &SourceFile) -> PathBuf {
        self.source_root
            .join(file.value().trim_start_matches('/'))
    }
}
