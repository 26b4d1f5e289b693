use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content},
    tool, ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::Settings;
use crate::core::{Entry, PlanRequest, PlanResult, PlanStep, Result};
use crate::executor::{ExecutorConfig, PlanExecutor};
use crate::sandbox::RootDir;
use crate::walker::list_entries_async;

/// Rootplan MCP Service
#[derive(Clone)]
pub struct RootPlanService {
    tool_router: ToolRouter<Self>,
    executor: Arc<PlanExecutor>,
    settings: Arc<Settings>,
}

impl std::fmt::Debug for RootPlanService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootPlanService")
            .field("settings", &self.settings)
            .finish()
    }
}

impl RootPlanService {
    pub fn new(settings: Settings) -> Self {
        Self {
            tool_router: Self::tool_router(),
            executor: Arc::new(PlanExecutor::new(ExecutorConfig::from(&settings))),
            settings: Arc::new(settings),
        }
    }

    pub async fn list(&self, params: ListEntriesParams) -> Result<Vec<Entry>> {
        let root = RootDir::new(&params.root)?;
        let cap = params.max_entries.unwrap_or(self.settings.walker.max_entries);
        list_entries_async(root, cap).await
    }

    pub async fn apply(&self, params: ApplyPlanParams) -> Result<PlanResult> {
        let operations = params
            .operations
            .into_iter()
            .map(PlanStep::Raw)
            .collect();

        let request = PlanRequest {
            root: params.root,
            operations,
            commit: params.commit,
        };
        self.executor.execute(&request).await
    }
}

// Tool parameter types
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListEntriesParams {
    /// Absolute path of the directory to list
    pub root: String,

    /// Maximum number of entries to return (defaults to the configured cap)
    #[serde(default, rename = "maxEntries")]
    pub max_entries: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ApplyPlanParams {
    /// Absolute path of the directory all operations are confined to
    pub root: String,

    /// Ordered operations. Each is one of:
    /// {"op":"mkdir","path"}, {"op":"move","from","to"}, {"op":"delete","path"},
    /// {"op":"replaceText","path","mode":"literal"|"regex","search","replace","flags"?}
    pub operations: Vec<serde_json::Value>,

    /// Apply the operations (false previews them without touching disk)
    #[serde(default)]
    pub commit: bool,
}

fn json_result<T: serde::Serialize>(value: &T) -> CallToolResult {
    match serde_json::to_string_pretty(value) {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => CallToolResult::error(vec![Content::text(format!(
            "Failed to serialize result: {}",
            e
        ))]),
    }
}

// Tool implementations
#[rmcp::tool_router]
impl RootPlanService {
    /// List a directory tree
    #[tool(description = "Recursively list files and directories under a root. Returns root-relative paths with type, size and mtimeMs. Use it to build context before planning.")]
    async fn list_entries(
        &self,
        Parameters(params): Parameters<ListEntriesParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.list(params).await {
            Ok(entries) => Ok(json_result(&entries)),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Failed to list entries: {}",
                e
            ))])),
        }
    }

    /// Preview or commit a plan
    #[tool(description = "Create directories, move, delete, or replace text in files under a root. ALWAYS run with commit=false first to preview, then re-run the same operations with commit=true.")]
    async fn apply_plan(
        &self,
        Parameters(params): Parameters<ApplyPlanParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.apply(params).await {
            Ok(result) => Ok(json_result(&result)),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Failed to apply plan: {}",
                e
            ))])),
        }
    }
}

// Server handler implementation
#[rmcp::tool_handler]
impl ServerHandler for RootPlanService {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        use rmcp::model::{Implementation, ProtocolVersion, ServerCapabilities, ToolsCapability};

        rmcp::model::ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: None }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "rootplan".to_string(),
                title: Some("Rootplan MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Rootplan applies batches of filesystem operations confined to one root \
                 directory. Use list_entries to see the tree, then apply_plan with \
                 commit=false to preview before committing."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_apply_keeps_unknown_operations_per_step() {
        let temp = TempDir::new().unwrap();
        let service = RootPlanService::new(Settings::default());

        let result = service
            .apply(ApplyPlanParams {
                root: temp.path().to_string_lossy().into_owned(),
                operations: vec![
                    json!({"op": "copy", "from": "a", "to": "b"}),
                    json!({"op": "mkdir", "path": "out"}),
                ],
                commit: true,
            })
            .await
            .unwrap();

        assert_eq!(result.errors, vec!["Unknown operation: copy".to_string()]);
        assert_eq!(result.preview.len(), 1);
        assert!(temp.path().join("out").is_dir());
    }

    #[tokio::test]
    async fn test_list_uses_requested_cap() {
        let temp = TempDir::new().unwrap();
        for name in ["a", "b", "c"] {
            std::fs::write(temp.path().join(name), "x").unwrap();
        }
        let service = RootPlanService::new(Settings::default());

        let entries = service
            .list(ListEntriesParams {
                root: temp.path().to_string_lossy().into_owned(),
                max_entries: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
    }
}
