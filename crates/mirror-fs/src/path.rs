//! Normalized path handling for cross-tree identity

use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// How relative paths are compared when matching source entries to replica
/// entries.
///
/// The default is [`CaseSensitivity::Insensitive`], which matches the
/// behavior of case-insensitive filesystems (NTFS, APFS defaults).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    Sensitive,
    #[default]
    Insensitive,
}

impl CaseSensitivity {
    /// Fold a path string into its comparison key.
    pub fn fold(self, path: &str) -> String {
        match self {
            Self::Sensitive => path.to_string(),
            Self::Insensitive => path.to_lowercase(),
        }
    }
}

/// A relative path inside a tree, in two forms.
///
/// The native form keeps the exact OS spelling and is the only form used for
/// I/O, so names that are not valid UTF-8 or that contain a backslash on Unix
/// survive untouched. The display form uses forward slashes with empty and
/// `.` segments dropped; it is used for keys, ordering and output. A
/// backslash is a separator only on Windows.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedPath {
    /// Forward-slash display form, lossy for non UTF-8 names
    inner: String,
    native: PathBuf,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let native: PathBuf = path
            .as_ref()
            .components()
            .filter(|component| !matches!(component, Component::CurDir))
            .collect();
        Self {
            inner: clean(&native.to_string_lossy()),
            native,
        }
    }

    /// Compute the path of `path` relative to `root`.
    ///
    /// Returns `None` when `path` is not inside `root`.
    pub fn relative_to(root: &Path, path: &Path) -> Option<Self> {
        path.strip_prefix(root).ok().map(Self::new)
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// The exact platform-native path.
    pub fn to_native(&self) -> PathBuf {
        self.native.clone()
    }

    /// Resolve this relative path against a tree root.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(&self.native)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: impl AsRef<Path>) -> Self {
        Self::new(self.native.join(segment))
    }

    /// Iterate over the native path segments.
    pub fn segments(&self) -> impl Iterator<Item = &OsStr> {
        self.native.iter()
    }

    /// Nesting depth measured as the number of separators.
    ///
    /// `a` has depth 0, `a/b/c` has depth 2.
    pub fn depth(&self) -> usize {
        self.native
            .components()
            .filter(|component| matches!(component, Component::Normal(_) | Component::ParentDir))
            .count()
            .saturating_sub(1)
    }

    /// Comparison key for matching entries across trees.
    pub fn key(&self, case: CaseSensitivity) -> String {
        case.fold(&self.inner)
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }
}

fn clean(raw: &str) -> String {
    #[cfg(windows)]
    let raw = raw.replace('\\', "/");
    let (prefix, rest) = if raw.starts_with("//") && !raw.starts_with("///") {
        ("//", &raw[2..])
    } else if raw.starts_with('/') {
        ("/", raw.trim_start_matches('/'))
    } else {
        ("", &raw[..])
    };

    let segments: Vec<&str> = rest
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    format!("{prefix}{}", segments.join("/"))
}

/// Returns true if `inner` lies at or below `outer`.
///
/// Both paths are compared component-wise, so `/a/bc` is not inside `/a/b`.
pub fn is_within(inner: &Path, outer: &Path) -> bool {
    let outer: Vec<Component<'_>> = outer.components().collect();
    let inner: Vec<Component<'_>> = inner.components().collect();
    inner.len() >= outer.len() && inner[..outer.len()] == outer[..]
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        &self.native
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Serialize for NormalizedPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner)
    }
}

impl<'de> Deserialize<'de> for NormalizedPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
