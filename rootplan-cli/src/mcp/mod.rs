//! MCP surface for LLM planners: `list_entries` and `apply_plan`.

mod server;
mod tools;

pub use server::run_mcp_server;
pub use tools::{ApplyPlanParams, ListEntriesParams, RootPlanService};
