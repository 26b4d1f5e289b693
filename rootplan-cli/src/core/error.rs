use thiserror::Error;

#[derive(Error, Debug)]
pub enum RootPlanError {
    #[error("Invalid path: path must not be empty")]
    InvalidPath,

    #[error("Path escapes root: {path}")]
    PathEscape { path: String },

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("File too large: {path} is {size} bytes (limit {limit})")]
    FileTooLarge { path: String, size: u64, limit: u64 },

    #[error("File is not valid UTF-8 text: {0}")]
    NotUtf8(String),

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Destination already exists: {0}")]
    DestinationExists(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Invalid root: {0}")]
    InvalidRoot(String),

    #[error("Plan cancelled before this operation ran")]
    Cancelled,

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

impl RootPlanError {
    /// Wrap a host I/O error with the root-relative path it concerns.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = RootPlanError> = std::result::Result<T, E>;
