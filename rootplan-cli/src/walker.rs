use std::fs::Metadata;
use std::time::UNIX_EPOCH;

use tracing::debug;
use walkdir::WalkDir;

use crate::core::{Entry, EntryKind, Result, RootPlanError};
use crate::sandbox::{to_forward_slashes, RootDir};

/// Recursively list `root`, stopping once `max_entries` entries are collected.
///
/// Directories appear before their children. Symlinks, devices and sockets
/// are skipped, as are subtrees that cannot be read. Order is by file name
/// within each directory, so it is stable for a given snapshot.
pub fn list_entries(root: &RootDir, max_entries: usize) -> Result<Vec<Entry>> {
    if max_entries == 0 {
        return Err(RootPlanError::InvalidOperation(
            "maxEntries must be positive".to_string(),
        ));
    }

    let root_path = root.path();
    let meta = std::fs::metadata(root_path)
        .map_err(|e| RootPlanError::io(root.display(), e))?;
    if !meta.is_dir() {
        return Err(RootPlanError::NotADirectory(root.display()));
    }

    let mut entries = Vec::new();

    for item in WalkDir::new(root_path)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let file_type = item.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            continue;
        };

        let meta = match item.metadata() {
            Ok(meta) => meta,
            Err(e) => {
                debug!("Skipping {}: {}", item.path().display(), e);
                continue;
            }
        };

        let rel = item.path().strip_prefix(root_path).unwrap_or(item.path());
        entries.push(Entry {
            path: to_forward_slashes(rel),
            kind,
            size: if kind == EntryKind::Dir { 0 } else { meta.len() },
            mtime_ms: mtime_ms(&meta),
        });

        if entries.len() >= max_entries {
            debug!("Listing of {} capped at {} entries", root.display(), max_entries);
            break;
        }
    }

    Ok(entries)
}

/// Async wrapper that keeps the blocking walk off the runtime threads
pub async fn list_entries_async(root: RootDir, max_entries: usize) -> Result<Vec<Entry>> {
    let root_display = root.display();
    tokio::task::spawn_blocking(move || list_entries(&root, max_entries))
        .await
        .map_err(|e| RootPlanError::io(root_display, std::io::Error::other(e)))?
}

fn mtime_ms(meta: &Metadata) -> u64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src/nested")).unwrap();
        fs::write(temp.path().join("README.md"), "hello").unwrap();
        fs::write(temp.path().join("src/lib.rs"), "pub fn x() {}").unwrap();
        fs::write(temp.path().join("src/nested/deep.txt"), "").unwrap();
        temp
    }

    #[test]
    fn test_lists_directories_and_their_children() {
        let temp = fixture();
        let root = RootDir::new(temp.path()).unwrap();

        let entries = list_entries(&root, 100).unwrap();
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();

        assert_eq!(
            paths,
            vec!["README.md", "src", "src/lib.rs", "src/nested", "src/nested/deep.txt"]
        );

        let src = entries.iter().find(|e| e.path == "src").unwrap();
        assert_eq!(src.kind, EntryKind::Dir);
        assert_eq!(src.size, 0);

        let readme = entries.iter().find(|e| e.path == "README.md").unwrap();
        assert_eq!(readme.kind, EntryKind::File);
        assert_eq!(readme.size, 5);
        assert!(readme.mtime_ms > 0);
    }

    #[test]
    fn test_cap_applies_across_whole_walk() {
        let temp = TempDir::new().unwrap();
        for i in 0..5 {
            fs::write(temp.path().join(format!("file{}.txt", i)), "x").unwrap();
        }
        let root = RootDir::new(temp.path()).unwrap();

        let entries = list_entries(&root, 2).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_zero_cap_is_rejected() {
        let temp = fixture();
        let root = RootDir::new(temp.path()).unwrap();
        assert!(list_entries(&root, 0).is_err());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let root = RootDir::new(temp.path().join("missing")).unwrap();
        assert!(matches!(
            list_entries(&root, 10).unwrap_err(),
            RootPlanError::Io { .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_skipped() {
        let temp = fixture();
        std::os::unix::fs::symlink(temp.path().join("README.md"), temp.path().join("link.md"))
            .unwrap();
        let root = RootDir::new(temp.path()).unwrap();

        let entries = list_entries(&root, 100).unwrap();
        assert!(entries.iter().all(|e| e.path != "link.md"));
    }
}
