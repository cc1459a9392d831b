//! Source file paths and type classification.
//!
//! A [`SourceFile`] is an opaque, comparable path value tagged with a
//! [`SourceType`] derived from its extension at construction. Paths are
//! usually source-absolute (`//dir/file.cc`, relative to the source root)
//! but the representation does not require it.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Classified kind of a source file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// C source (`.c`)
    C,
    /// C++ source (`.cc`, `.cpp`, `.cxx`)
    Cpp,
    /// Objective-C++ source (`.mm`)
    Mm,
    /// Header (`.h`, `.hpp`, `.hxx`, `.hh`)
    H,
    /// Objective-C source (`.m`)
    M,
    /// Assembler requiring an assembler tool (`.asm`)
    Asm,
    /// Assembler run through the C preprocessor (`.S`, `.s`)
    S,
    /// Precompiled object (`.o`, `.obj`)
    Object,
    /// Linker module definition (`.def`)
    Def,
    /// Windows resource script (`.rc`)
    Rc,
    /// Go source (`.go`)
    Go,
    /// Rust source (`.rs`)
    Rust,
    /// Anything the generator cannot classify.
    Unknown,
}

/// Language family of a source type, for mixed-source validation.
///
/// C, C++, Objective-C and Objective-C++ compile together; Go and Rust do
/// not mix with them or with each other. Headers, assembly, objects and
/// auxiliary inputs carry no family and combine with anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageFamily {
    CFamily,
    Go,
    Rust,
}

impl SourceType {
    pub(crate) const COUNT: usize = 13;

    /// Classify a file extension. The match is case-sensitive: `.S` and
    /// `.s` are both preprocessed assembly, but `.C` is not a C source.
    pub fn from_extension(ext: &str) -> SourceType {
        match ext {
            "c" => SourceType::C,
            "cc" | "cpp" | "cxx" => SourceType::Cpp,
            "mm" => SourceType::Mm,
            "h" | "hpp" | "hxx" | "hh" => SourceType::H,
            "m" => SourceType::M,
            "asm" => SourceType::Asm,
            "S" | "s" => SourceType::S,
            "o" | "obj" => SourceType::Object,
            "def" => SourceType::Def,
            "rc" => SourceType::Rc,
            "go" => SourceType::Go,
            "rs" => SourceType::Rust,
            _ => SourceType::Unknown,
        }
    }

    /// Whether sources of this type may be merged into a jumbo aggregate.
    pub fn is_aggregatable(&self) -> bool {
        matches!(self, SourceType::C | SourceType::Cpp | SourceType::Mm)
    }

    /// Extension used for generated aggregate files of this type, or `None`
    /// if the type cannot form an aggregate.
    pub fn jumbo_extension(&self) -> Option<&'static str> {
        match self {
            SourceType::C => Some("c"),
            SourceType::Cpp => Some("cc"),
            SourceType::Mm => Some("mm"),
            _ => None,
        }
    }

    /// Language family for mixed-source validation, or `None` for neutral
    /// inputs (headers, assembly, objects, `.def`, `.rc`).
    pub fn language_family(&self) -> Option<LanguageFamily> {
        match self {
            SourceType::C | SourceType::Cpp | SourceType::M | SourceType::Mm => {
                Some(LanguageFamily::CFamily)
            }
            SourceType::Go => Some(LanguageFamily::Go),
            SourceType::Rust => Some(LanguageFamily::Rust),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        match self {
            SourceType::C => 0,
            SourceType::Cpp => 1,
            SourceType::Mm => 2,
            SourceType::H => 3,
            SourceType::M => 4,
            SourceType::Asm => 5,
            SourceType::S => 6,
            SourceType::Object => 7,
            SourceType::Def => 8,
            SourceType::Rc => 9,
            SourceType::Go => 10,
            SourceType::Rust => 11,
            SourceType::Unknown => 12,
        }
    }
}

/// The set of source types seen in a target's source list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTypeSet {
    used: [bool; SourceType::COUNT],
}

impl SourceTypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, ty: SourceType) {
        self.used[ty.index()] = true;
    }

    pub fn contains(&self, ty: SourceType) -> bool {
        self.used[ty.index()]
    }

    pub fn rust_used(&self) -> bool {
        self.contains(SourceType::Rust)
    }

    /// True when more than one non-compatible language family is present.
    pub fn mixed_language_used(&self) -> bool {
        let mut families = [
            (LanguageFamily::CFamily, false),
            (LanguageFamily::Go, false),
            (LanguageFamily::Rust, false),
        ];
        for (ty, used) in ALL_TYPES.iter().zip(self.used.iter()) {
            if !used {
                continue;
            }
            if let Some(family) = ty.language_family() {
                for entry in families.iter_mut() {
                    if entry.0 == family {
                        entry.1 = true;
                    }
                }
            }
        }
        families.iter().filter(|(_, used)| *used).count() > 1
    }
}

const ALL_TYPES: [SourceType; SourceType::COUNT] = [
    SourceType::C,
    SourceType::Cpp,
    SourceType::Mm,
    SourceType::H,
    SourceType::M,
    SourceType::Asm,
    SourceType::S,
    SourceType::Object,
    SourceType::Def,
    SourceType::Rc,
    SourceType::Go,
    SourceType::Rust,
    SourceType::Unknown,
];

/// An opaque source file path. Equality is by path identity; the type tag
/// is derived from the path and never diverges from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile {
    value: String,
    ty: SourceType,
}

impl SourceFile {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let ty = classify(&value);
        SourceFile { value, ty }
    }

    /// The path as written, e.g. `//foo/a.cc`.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn source_type(&self) -> SourceType {
        self.ty
    }

    /// True for paths relative to the source root (`//...`).
    pub fn is_source_absolute(&self) -> bool {
        self.value.starts_with("//")
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl Serialize for SourceFile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SourceFile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(SourceFile::new(String::deserialize(deserializer)?))
    }
}

fn classify(value: &str) -> SourceType {
    let file_name = value.rsplit('/').next().unwrap_or(value);
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => SourceType::from_extension(ext),
        _ => SourceType::Unknown,
    }
}

/// A directory within the source tree. The stored value always carries a
/// trailing slash; `//` alone denotes the source root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceDir {
    value: String,
}

impl SourceDir {
    pub fn new(value: impl Into<String>) -> Self {
        let mut value = value.into();
        if !value.ends_with('/') {
            value.push('/');
        }
        SourceDir { value }
    }

    /// The path as written, with a trailing slash.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Resolve a user-facing path against this directory. Source-absolute
    /// inputs pass through untouched; relative inputs are joined and
    /// normalized (`.` and `..` components are folded away).
    pub fn resolve_file(&self, path: &str) -> SourceFile {
        if path.starts_with("//") {
            return SourceFile::new(path);
        }
        SourceFile::new(join_and_normalize(&self.value, path))
    }

    /// Resolve a relative directory path against this directory.
    pub fn resolve_dir(&self, path: &str) -> SourceDir {
        if path.starts_with("//") {
            return SourceDir::new(path);
        }
        SourceDir::new(join_and_normalize(&self.value, path))
    }
}

impl fmt::Display for SourceDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl Serialize for SourceDir {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SourceDir {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(SourceDir::new(String::deserialize(deserializer)?))
    }
}

fn join_and_normalize(base: &str, rel: &str) -> String {
    let (prefix, base_path) = match base.strip_prefix("//") {
        Some(stripped) => ("//", stripped),
        None => ("", base),
    };

    let mut parts: Vec<&str> = base_path
        .split('/')
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();
    for comp in rel.split('/') {
        match comp {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("{}{}", prefix, parts.join("/"))
}
