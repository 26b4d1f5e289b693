use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;
use tracing::debug;

use super::{ExecutionMode, ExecutorConfig};
use crate::config::DestinationPolicy;
use crate::core::{Operation, PreviewLine, ReplaceMode, Result, RootPlanError};
use crate::sandbox::RootDir;
use crate::substitute::{compute_replacement, write_atomic, Substitution};

/// Run one operation. Every path is resolved before any filesystem call.
pub(super) async fn run(
    config: &ExecutorConfig,
    root: &RootDir,
    op: &Operation,
    mode: ExecutionMode,
) -> Result<PreviewLine> {
    match op {
        Operation::CreateDirectory { path } => create_directory(root, path, mode).await,
        Operation::Move { from, to } => move_entry(config, root, from, to, mode).await,
        Operation::Delete { path } => delete(root, path, mode).await,
        Operation::ReplaceText {
            path,
            mode: replace_mode,
            search,
            replace,
            flags,
        } => {
            replace_text(
                config,
                root,
                path,
                *replace_mode,
                search,
                replace,
                flags.as_deref(),
                mode,
            )
            .await
        }
    }
}

async fn create_directory(root: &RootDir, path: &str, mode: ExecutionMode) -> Result<PreviewLine> {
    let abs = root.resolve(path)?;
    let rel = root.relative(&abs);

    if mode.is_commit() {
        fs::create_dir_all(&abs)
            .await
            .map_err(|e| RootPlanError::io(&rel, e))?;
    }

    Ok(PreviewLine::new(format!(
        "{} directory {}",
        mode.verb("would create", "created"),
        rel
    )))
}

async fn move_entry(
    config: &ExecutorConfig,
    root: &RootDir,
    from: &str,
    to: &str,
    mode: ExecutionMode,
) -> Result<PreviewLine> {
    let from_abs = root.resolve(from)?;
    let to_abs = root.resolve(to)?;
    let from_rel = root.relative(&from_abs);
    let to_rel = root.relative(&to_abs);

    let line = PreviewLine::new(format!(
        "{} {} -> {}",
        mode.verb("would move", "moved"),
        from_rel,
        to_rel
    ));

    if from_abs != to_abs && (from_abs.starts_with(&to_abs) || to_abs.starts_with(&from_abs)) {
        return Err(RootPlanError::InvalidOperation(format!(
            "cannot move {} -> {}: one path contains the other",
            from_rel, to_rel
        )));
    }

    if !mode.is_commit() {
        return Ok(line);
    }

    fs::symlink_metadata(&from_abs)
        .await
        .map_err(|e| RootPlanError::io(&from_rel, e))?;

    if from_abs == to_abs {
        return Ok(line.with_detail("source and destination are the same"));
    }

    if let Some(existing) = metadata_if_exists(&to_abs, &to_rel).await? {
        match config.on_destination_exists {
            DestinationPolicy::Fail => return Err(RootPlanError::DestinationExists(to_rel)),
            DestinationPolicy::Overwrite => {
                debug!("Replacing existing destination {}", to_rel);
                remove_existing(&to_abs, existing.is_dir())
                    .await
                    .map_err(|e| RootPlanError::io(&to_rel, e))?;
            }
        }
    }

    if let Some(parent) = to_abs.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| RootPlanError::io(&to_rel, e))?;
    }

    fs::rename(&from_abs, &to_abs)
        .await
        .map_err(|e| RootPlanError::io(&from_rel, e))?;

    Ok(line)
}

async fn delete(root: &RootDir, path: &str, mode: ExecutionMode) -> Result<PreviewLine> {
    let abs = root.resolve(path)?;
    let rel = root.relative(&abs);
    let line = PreviewLine::new(format!("{} {}", mode.verb("would delete", "deleted"), rel));

    if !mode.is_commit() {
        return Ok(line);
    }

    match metadata_if_exists(&abs, &rel).await? {
        None => Ok(line.with_detail("already absent")),
        Some(meta) => {
            remove_existing(&abs, meta.is_dir())
                .await
                .map_err(|e| RootPlanError::io(&rel, e))?;
            Ok(line)
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn replace_text(
    config: &ExecutorConfig,
    root: &RootDir,
    path: &str,
    replace_mode: ReplaceMode,
    search: &str,
    replace: &str,
    flags: Option<&str>,
    mode: ExecutionMode,
) -> Result<PreviewLine> {
    let abs = root.resolve(path)?;
    let rel = root.relative(&abs);

    let substitution = Substitution::new(replace_mode, search, replace, flags)?;
    let replacement = compute_replacement(&abs, &rel, &substitution, config.max_file_bytes).await?;
    let unchanged = replacement.is_unchanged();

    if mode.is_commit() && !unchanged {
        write_atomic(&abs, &rel, &replacement.result.output).await?;
    }

    let count = replacement.count();
    let mut detail = format!("{} {}", count, if count == 1 { "match" } else { "matches" });
    if unchanged {
        detail.push_str(" (no change)");
    }

    Ok(PreviewLine::new(format!(
        "{} text in {}",
        mode.verb("would replace", "replaced"),
        rel
    ))
    .with_detail(detail))
}

/// `lstat` that maps a missing path to `None`
async fn metadata_if_exists(abs: &Path, rel: &str) -> Result<Option<std::fs::Metadata>> {
    match fs::symlink_metadata(abs).await {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(RootPlanError::io(rel, e)),
    }
}

async fn remove_existing(abs: &Path, is_dir: bool) -> std::io::Result<()> {
    if is_dir {
        fs::remove_dir_all(abs).await
    } else {
        fs::remove_file(abs).await
    }
}
