use anyhow::{Context, Result};

use crate::config::Settings;
use crate::core::{OutputFormat, OutputWriter};
use crate::sandbox::RootDir;
use crate::walker::list_entries_async;

pub async fn run(
    root: String,
    max_entries: Option<usize>,
    settings: &Settings,
    format: OutputFormat,
) -> Result<()> {
    let output = OutputWriter::new(format);
    let root = RootDir::new(&root)?;
    let cap = max_entries.unwrap_or(settings.walker.max_entries);

    let entries = list_entries_async(root.clone(), cap)
        .await
        .with_context(|| format!("Failed to list {}", root.display()))?;

    tracing::debug!("Listed {} entries under {}", entries.len(), root.display());
    output.write_entries(&entries)
}
