//! Operation executor.
//!
//! Runs a plan's operations strictly in submission order. Each operation
//! yields either a preview line or an error message; one failure never stops
//! the rest of the plan. In dry-run mode no write, create, delete or rename
//! call is issued.

mod cancel;
mod locks;
mod steps;

pub use cancel::CancelFlag;
pub use locks::RootLocks;

use tracing::{debug, info, warn};

use crate::config::{DestinationPolicy, Settings};
use crate::core::{PlanRequest, PlanResult, PlanStep, PreviewLine, Result, RootPlanError};
use crate::sandbox::RootDir;

/// Whether a plan touches the disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Compute previews only
    DryRun,

    /// Apply every operation
    Commit,
}

impl ExecutionMode {
    pub fn from_commit(commit: bool) -> Self {
        if commit {
            ExecutionMode::Commit
        } else {
            ExecutionMode::DryRun
        }
    }

    pub fn is_commit(self) -> bool {
        self == ExecutionMode::Commit
    }

    /// Pick the preview verb for this mode
    pub fn verb(self, dry_run: &'static str, commit: &'static str) -> &'static str {
        match self {
            ExecutionMode::DryRun => dry_run,
            ExecutionMode::Commit => commit,
        }
    }
}

/// Limits and policies the executor applies to every plan
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorConfig {
    pub max_file_bytes: u64,
    pub on_destination_exists: DestinationPolicy,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for ExecutorConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            max_file_bytes: settings.replace.max_file_bytes,
            on_destination_exists: settings.moves.on_destination_exists,
        }
    }
}

/// Turns plan requests into plan results
#[derive(Debug, Default)]
pub struct PlanExecutor {
    config: ExecutorConfig,
    locks: RootLocks,
}

impl PlanExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            locks: RootLocks::new(),
        }
    }

    /// Run a plan to completion
    pub async fn execute(&self, request: &PlanRequest) -> Result<PlanResult> {
        self.execute_with_cancel(request, &CancelFlag::new()).await
    }

    /// Run a plan, stopping at the next operation boundary once `cancel` is set.
    ///
    /// Only a malformed root is returned as `Err`; every per-operation
    /// failure lands in [`PlanResult::errors`].
    pub async fn execute_with_cancel(
        &self,
        request: &PlanRequest,
        cancel: &CancelFlag,
    ) -> Result<PlanResult> {
        let root = RootDir::new(&request.root)?;
        let mode = ExecutionMode::from_commit(request.commit);

        // Dry runs never mutate, so they don't need to wait on commits
        let _guard = if mode.is_commit() {
            Some(self.locks.lock(&root).await)
        } else {
            None
        };

        info!(
            root = %root.display(),
            operations = request.operations.len(),
            ?mode,
            "Executing plan"
        );

        let mut result = PlanResult::new(root.display());

        for (index, step) in request.operations.iter().enumerate() {
            if cancel.is_cancelled() {
                result.add_error(RootPlanError::Cancelled.to_string());
                continue;
            }

            match self.run_step(&root, step, mode).await {
                Ok(line) => {
                    debug!(index, title = %line.title, "Operation succeeded");
                    result.add_preview(line);
                }
                Err(e) => {
                    warn!(index, "Operation failed: {}", e);
                    result.add_error(e.to_string());
                }
            }
        }

        info!(
            previews = result.preview.len(),
            errors = result.errors.len(),
            ok = result.ok,
            "Plan finished"
        );

        Ok(result)
    }

    async fn run_step(&self, root: &RootDir, step: &PlanStep, mode: ExecutionMode) -> Result<PreviewLine> {
        let op = step.operation()?;
        steps::run(&self.config, root, &op, mode).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Operation, ReplaceMode};
    use std::fs;
    use tempfile::TempDir;

    fn request(root: &TempDir, operations: Vec<Operation>, commit: bool) -> PlanRequest {
        PlanRequest::new(root.path().to_string_lossy(), operations, commit)
    }

    #[tokio::test]
    async fn test_dry_run_does_not_touch_disk() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "hello").unwrap();
        fs::create_dir(temp.path().join("tmp")).unwrap();

        let executor = PlanExecutor::default();
        let result = executor
            .execute(&request(
                &temp,
                vec![
                    Operation::CreateDirectory { path: "out".to_string() },
                    Operation::Move { from: "a.txt".to_string(), to: "out/a.txt".to_string() },
                    Operation::Delete { path: "tmp".to_string() },
                    Operation::ReplaceText {
                        path: "a.txt".to_string(),
                        mode: ReplaceMode::Literal,
                        search: "l".to_string(),
                        replace: "L".to_string(),
                        flags: None,
                    },
                ],
                false,
            ))
            .await
            .unwrap();

        assert!(result.ok, "{:?}", result.errors);
        assert_eq!(result.preview.len(), 4);
        assert_eq!(result.preview[0].title, "would create directory out");
        assert_eq!(result.preview[1].title, "would move a.txt -> out/a.txt");
        assert_eq!(result.preview[2].title, "would delete tmp");
        assert_eq!(result.preview[3].title, "would replace text in a.txt");
        assert_eq!(result.preview[3].detail.as_deref(), Some("2 matches"));

        assert!(!temp.path().join("out").exists());
        assert!(temp.path().join("tmp").exists());
        assert_eq!(fs::read_to_string(temp.path().join("a.txt")).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        let temp = TempDir::new().unwrap();

        let executor = PlanExecutor::default();
        let result = executor
            .execute(&request(
                &temp,
                vec![
                    Operation::Delete { path: "../outside".to_string() },
                    Operation::CreateDirectory { path: "kept".to_string() },
                ],
                true,
            ))
            .await
            .unwrap();

        assert!(!result.ok);
        assert_eq!(result.errors, vec!["Path escapes root: ../outside".to_string()]);
        assert_eq!(result.preview.len(), 1);
        assert!(temp.path().join("kept").is_dir());
    }

    #[tokio::test]
    async fn test_move_onto_existing_destination_fails_by_default() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "a").unwrap();
        fs::write(temp.path().join("b.txt"), "b").unwrap();

        let executor = PlanExecutor::default();
        let result = executor
            .execute(&request(
                &temp,
                vec![Operation::Move { from: "a.txt".to_string(), to: "b.txt".to_string() }],
                true,
            ))
            .await
            .unwrap();

        assert_eq!(result.errors, vec!["Destination already exists: b.txt".to_string()]);
        assert_eq!(fs::read_to_string(temp.path().join("a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(temp.path().join("b.txt")).unwrap(), "b");
    }

    #[tokio::test]
    async fn test_move_overwrite_policy_replaces_destination() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "a").unwrap();
        fs::write(temp.path().join("b.txt"), "b").unwrap();

        let executor = PlanExecutor::new(ExecutorConfig {
            on_destination_exists: DestinationPolicy::Overwrite,
            ..ExecutorConfig::default()
        });
        let result = executor
            .execute(&request(
                &temp,
                vec![Operation::Move { from: "a.txt".to_string(), to: "b.txt".to_string() }],
                true,
            ))
            .await
            .unwrap();

        assert!(result.ok, "{:?}", result.errors);
        assert!(!temp.path().join("a.txt").exists());
        assert_eq!(fs::read_to_string(temp.path().join("b.txt")).unwrap(), "a");
    }

    #[tokio::test]
    async fn test_move_between_nested_paths_is_rejected() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        fs::write(temp.path().join("a/b/keep.txt"), "keep").unwrap();

        let executor = PlanExecutor::new(ExecutorConfig {
            on_destination_exists: DestinationPolicy::Overwrite,
            ..ExecutorConfig::default()
        });

        for commit in [false, true] {
            let result = executor
                .execute(&request(
                    &temp,
                    vec![
                        Operation::Move { from: "a/b".to_string(), to: "a".to_string() },
                        Operation::Move { from: "a".to_string(), to: "a/b/c".to_string() },
                    ],
                    commit,
                ))
                .await
                .unwrap();

            assert!(result.preview.is_empty());
            assert_eq!(
                result.errors,
                vec![
                    "Invalid operation: cannot move a/b -> a: one path contains the other".to_string(),
                    "Invalid operation: cannot move a -> a/b/c: one path contains the other".to_string(),
                ]
            );
        }
        assert_eq!(fs::read_to_string(temp.path().join("a/b/keep.txt")).unwrap(), "keep");
    }

    #[tokio::test]
    async fn test_move_of_missing_source_reports_source() {
        let temp = TempDir::new().unwrap();

        let executor = PlanExecutor::default();
        let result = executor
            .execute(&request(
                &temp,
                vec![Operation::Move { from: "ghost.txt".to_string(), to: "deep/x.txt".to_string() }],
                true,
            ))
            .await
            .unwrap();

        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("ghost.txt: "));
        assert!(!temp.path().join("deep").exists());
    }

    #[tokio::test]
    async fn test_unchanged_replacement_skips_write() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.txt");
        fs::write(&path, "nothing to see").unwrap();
        let before = fs::metadata(&path).unwrap().modified().unwrap();

        let executor = PlanExecutor::default();
        let result = executor
            .execute(&request(
                &temp,
                vec![Operation::ReplaceText {
                    path: "a.txt".to_string(),
                    mode: ReplaceMode::Literal,
                    search: "absent".to_string(),
                    replace: "present".to_string(),
                    flags: None,
                }],
                true,
            ))
            .await
            .unwrap();

        assert!(result.ok);
        assert_eq!(result.preview[0].title, "replaced text in a.txt");
        assert_eq!(result.preview[0].detail.as_deref(), Some("0 matches (no change)"));
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
    }

    #[tokio::test]
    async fn test_cancelled_plan_skips_remaining_operations() {
        let temp = TempDir::new().unwrap();
        let cancel = CancelFlag::new();
        cancel.cancel();

        let executor = PlanExecutor::default();
        let result = executor
            .execute_with_cancel(
                &request(
                    &temp,
                    vec![
                        Operation::CreateDirectory { path: "a".to_string() },
                        Operation::CreateDirectory { path: "b".to_string() },
                    ],
                    true,
                ),
                &cancel,
            )
            .await
            .unwrap();

        assert!(result.preview.is_empty());
        assert_eq!(result.errors.len(), 2);
        assert!(!temp.path().join("a").exists());
    }

    #[tokio::test]
    async fn test_blank_root_is_a_malformed_request() {
        let executor = PlanExecutor::default();
        let err = executor
            .execute(&PlanRequest::new("  ", vec![], false))
            .await
            .unwrap_err();
        assert!(matches!(err, RootPlanError::InvalidRoot(_)));
    }
}
