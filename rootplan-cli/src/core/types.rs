use serde::{Deserialize, Serialize};

use super::error::RootPlanError;

/// Kind of a filesystem node found by the walker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Dir,
}

/// One node discovered under a root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Root-relative, forward-slash separated
    pub path: String,

    #[serde(rename = "type")]
    pub kind: EntryKind,

    /// Byte size, 0 for directories
    pub size: u64,

    /// Last modification time in milliseconds since the Unix epoch
    pub mtime_ms: u64,
}

/// How the search string of a text replacement is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceMode {
    Literal,
    #[serde(rename = "regex")]
    Pattern,
}

/// A single filesystem mutation. All paths are relative to the plan root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    #[serde(rename = "mkdir")]
    CreateDirectory { path: String },

    Move { from: String, to: String },

    Delete { path: String },

    ReplaceText {
        path: String,
        mode: ReplaceMode,
        search: String,
        replace: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flags: Option<String>,
    },
}

impl Operation {
    pub const TAGS: [&'static str; 4] = ["mkdir", "move", "delete", "replaceText"];

    /// The wire tag of this operation
    pub fn tag(&self) -> &'static str {
        match self {
            Operation::CreateDirectory { .. } => "mkdir",
            Operation::Move { .. } => "move",
            Operation::Delete { .. } => "delete",
            Operation::ReplaceText { .. } => "replaceText",
        }
    }

    /// Parse one operation object, separating unknown tags from malformed known ones.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, RootPlanError> {
        let tag = match value.get("op") {
            Some(serde_json::Value::String(tag)) => tag.as_str(),
            Some(other) => return Err(RootPlanError::UnknownOperation(other.to_string())),
            None => return Err(RootPlanError::UnknownOperation("<missing op>".to_string())),
        };

        if !Self::TAGS.contains(&tag) {
            return Err(RootPlanError::UnknownOperation(tag.to_string()));
        }

        serde_json::from_value(value.clone())
            .map_err(|e| RootPlanError::InvalidOperation(format!("{}: {}", tag, e)))
    }
}

/// One entry of a submitted plan.
///
/// Well-formed operations deserialize as `Typed`; anything else is kept
/// verbatim so the executor can report it without rejecting the whole plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanStep {
    Typed(Operation),
    Raw(serde_json::Value),
}

impl PlanStep {
    pub fn operation(&self) -> Result<Operation, RootPlanError> {
        match self {
            PlanStep::Typed(op) => Ok(op.clone()),
            PlanStep::Raw(value) => Operation::from_value(value),
        }
    }
}

impl From<Operation> for PlanStep {
    fn from(op: Operation) -> Self {
        PlanStep::Typed(op)
    }
}

/// `{ root, operations[], commit }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub root: String,

    #[serde(default)]
    pub operations: Vec<PlanStep>,

    #[serde(default)]
    pub commit: bool,
}

impl PlanRequest {
    pub fn new(root: impl Into<String>, operations: Vec<Operation>, commit: bool) -> Self {
        Self {
            root: root.into(),
            operations: operations.into_iter().map(PlanStep::from).collect(),
            commit,
        }
    }
}

/// Human-readable description of one operation's effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewLine {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl PreviewLine {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// `{ ok, root, preview[], errors[] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResult {
    pub ok: bool,
    pub root: String,
    pub preview: Vec<PreviewLine>,
    pub errors: Vec<String>,
}

impl PlanResult {
    pub fn new(root: String) -> Self {
        Self {
            ok: true,
            root,
            preview: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn add_preview(&mut self, line: PreviewLine) {
        self.preview.push(line);
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
        self.ok = false;
    }
}

/// `{ root, maxEntries? }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    pub root: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
}
