pub mod error;
pub mod output;
pub mod types;

pub use error::{Result, RootPlanError};
pub use output::{OutputFormat, OutputWriter};
pub use types::*;
