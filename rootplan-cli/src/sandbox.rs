//! Root containment for caller-supplied relative paths.
//!
//! Every path-bearing field of an operation goes through [`RootDir::resolve`]
//! before the executor touches the filesystem.

use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

use crate::core::{Result, RootPlanError};

/// A normalized, absolute plan root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDir {
    path: PathBuf,

    /// String form with a trailing separator, used for the prefix check
    prefix: String,
}

impl RootDir {
    /// Make `root` absolute and lexically normalized.
    ///
    /// The root does not have to exist; operations against a missing root
    /// fail individually.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if root.as_os_str().is_empty() || root.to_string_lossy().trim().is_empty() {
            return Err(RootPlanError::InvalidRoot("root must not be empty".to_string()));
        }

        let absolute = std::path::absolute(root)
            .map_err(|e| RootPlanError::io(root.display().to_string(), e))?;
        let path = normalize_lexically(&absolute);

        let mut prefix = path.to_string_lossy().into_owned();
        if !prefix.ends_with(MAIN_SEPARATOR) {
            prefix.push(MAIN_SEPARATOR);
        }

        Ok(Self { path, prefix })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root as reported back to callers, without the trailing separator
    pub fn display(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// Resolve a root-relative path to an absolute path inside the root.
    ///
    /// Leading separators are stripped, so `/etc/passwd` means
    /// `<root>/etc/passwd`. A path that resolves to the root itself or
    /// anywhere outside it is a [`RootPlanError::PathEscape`].
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        if relative.trim().is_empty() {
            return Err(RootPlanError::InvalidPath);
        }

        let stripped = relative.trim_start_matches(['/', '\\']);
        let mut resolved = self.path.clone();

        for component in Path::new(stripped).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    resolved.pop();
                }
                // Drive prefixes and stray roots would make the join absolute
                Component::Prefix(_) | Component::RootDir => {
                    return Err(self.escape(relative));
                }
            }
        }

        if resolved == self.path || !resolved.to_string_lossy().starts_with(&self.prefix) {
            return Err(self.escape(relative));
        }

        Ok(resolved)
    }

    /// Root-relative, forward-slash form of an absolute path inside the root
    pub fn relative(&self, absolute: &Path) -> String {
        let rel = absolute.strip_prefix(&self.path).unwrap_or(absolute);
        to_forward_slashes(rel)
    }

    fn escape(&self, relative: &str) -> RootPlanError {
        RootPlanError::PathEscape {
            path: relative.to_string(),
        }
    }
}

/// Join path components with `/` regardless of the host separator
pub fn to_forward_slashes(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
