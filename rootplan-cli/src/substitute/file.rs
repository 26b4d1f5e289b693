use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use super::replacer::{Substituted, Substitution};
use crate::core::{Result, RootPlanError};

/// Default upper bound for files handled by text replacement (2 MiB)
pub const DEFAULT_MAX_FILE_BYTES: u64 = 2 * 1024 * 1024;

/// A computed, not yet written, replacement for one file
#[derive(Debug, Clone)]
pub struct FileReplacement {
    pub path: PathBuf,
    pub original: String,
    pub result: Substituted,
}

impl FileReplacement {
    pub fn count(&self) -> usize {
        self.result.count
    }

    pub fn is_unchanged(&self) -> bool {
        self.result.is_unchanged(&self.original)
    }
}

/// Read `path` and compute the substitution without writing anything.
///
/// `rel` is the root-relative name used in error messages.
pub async fn compute_replacement(
    path: &Path,
    rel: &str,
    substitution: &Substitution,
    max_bytes: u64,
) -> Result<FileReplacement> {
    let meta = fs::metadata(path)
        .await
        .map_err(|e| RootPlanError::io(rel, e))?;

    if !meta.is_file() {
        return Err(RootPlanError::NotAFile(rel.to_string()));
    }

    if meta.len() > max_bytes {
        return Err(RootPlanError::FileTooLarge {
            path: rel.to_string(),
            size: meta.len(),
            limit: max_bytes,
        });
    }

    let bytes = fs::read(path)
        .await
        .map_err(|e| RootPlanError::io(rel, e))?;
    let original =
        String::from_utf8(bytes).map_err(|_| RootPlanError::NotUtf8(rel.to_string()))?;

    let result = substitution.apply(&original);
    debug!("{}: {} match(es)", rel, result.count);

    Ok(FileReplacement {
        path: path.to_path_buf(),
        original,
        result,
    })
}

/// Replace the file's contents through a sibling temp file and a rename,
/// keeping the original permissions.
pub async fn write_atomic(path: &Path, rel: &str, contents: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| RootPlanError::NotAFile(rel.to_string()))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".rootplan-tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let permissions = fs::metadata(path)
        .await
        .map_err(|e| RootPlanError::io(rel, e))?
        .permissions();

    let written = async {
        fs::write(&tmp_path, contents).await?;
        fs::set_permissions(&tmp_path, permissions).await?;
        fs::rename(&tmp_path, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(RootPlanError::io(rel, e));
    }

    Ok(())
}
