use anyhow::{Context, Result};
use std::io::Read;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Settings;
use crate::core::{OutputFormat, OutputWriter, PlanRequest};
use crate::executor::{CancelFlag, ExecutorConfig, PlanExecutor};

/// Load a plan document, apply command-line overrides, run it and print the result.
///
/// Returns whether every operation succeeded.
pub async fn run(
    plan: Option<PathBuf>,
    root: Option<String>,
    commit: Option<bool>,
    settings: &Settings,
    format: OutputFormat,
) -> Result<bool> {
    let request = load_request(plan, root, commit)?;
    let output = OutputWriter::new(format);

    let cancel = CancelFlag::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping after the current operation");
                cancel.cancel();
            }
        })
    };

    let executor = PlanExecutor::new(ExecutorConfig::from(settings));
    let result = executor
        .execute_with_cancel(&request, &cancel)
        .await
        .context("Failed to execute plan")?;
    ctrl_c.abort();

    info!(ok = result.ok, "Plan {}", if request.commit { "committed" } else { "previewed" });
    output.write_plan_result(&result, request.commit)?;

    Ok(result.ok)
}

/// Read a `PlanRequest` from `plan` (stdin when absent or `-`).
pub fn load_request(
    plan: Option<PathBuf>,
    root: Option<String>,
    commit: Option<bool>,
) -> Result<PlanRequest> {
    let raw = match plan {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read plan file: {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read plan from stdin")?;
            buf
        }
    };

    let mut document: serde_json::Value =
        serde_json::from_str(&raw).context("Plan is not valid JSON")?;
    let object = document
        .as_object_mut()
        .context("Plan must be a JSON object")?;

    if let Some(root) = root {
        object.insert("root".to_string(), serde_json::Value::String(root));
    }
    if let Some(commit) = commit {
        object.insert("commit".to_string(), serde_json::Value::Bool(commit));
    }

    serde_json::from_value(document).context("Plan is missing a root or operations list")
}
