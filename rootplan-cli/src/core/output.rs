use crate::core::types::*;
use anyhow::Result;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn write_plan_result(&self, result: &PlanResult, commit: bool) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
            OutputFormat::Text => print!("{}", format_plan_text(result, commit)),
            OutputFormat::Markdown => print!("{}", format_plan_markdown(result, commit)),
        }
        Ok(())
    }

    pub fn write_entries(&self, entries: &[Entry]) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(entries)?);
            }
            OutputFormat::Text => {
                for entry in entries {
                    match entry.kind {
                        EntryKind::Dir => println!("{}/", entry.path),
                        EntryKind::File => println!("{} ({} bytes)", entry.path, entry.size),
                    }
                }
            }
            OutputFormat::Markdown => {
                println!("| Path | Type | Size |");
                println!("|------|------|------|");
                for entry in entries {
                    let kind = match entry.kind {
                        EntryKind::Dir => "dir",
                        EntryKind::File => "file",
                    };
                    println!("| `{}` | {} | {} |", entry.path, kind, entry.size);
                }
            }
        }
        Ok(())
    }

    /// Report a failure that produced no plan result
    pub fn write_error(&self, error: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", format_error_json(error)?),
            OutputFormat::Text | OutputFormat::Markdown => eprintln!("Error: {}", error),
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    ok: bool,
    error: &'a str,
}

/// `{"ok": false, "error": ...}` for callers that parse stdout as JSON
pub fn format_error_json(error: &str) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ErrorResponse { ok: false, error })?)
}

fn plural(n: usize, word: &str) -> String {
    format!("{} {}{}", n, word, if n == 1 { "" } else { "s" })
}

fn format_line(line: &PreviewLine) -> String {
    match &line.detail {
        Some(detail) => format!("{} ({})", line.title, detail),
        None => line.title.clone(),
    }
}

/// Human-readable rendering of a plan result
pub fn format_plan_text(result: &PlanResult, commit: bool) -> String {
    let mut output = String::new();

    output.push_str("========================================\n");
    output.push_str(if commit {
        "             PLAN COMMITTED\n"
    } else {
        "            PLAN PREVIEW\n"
    });
    output.push_str("========================================\n\n");
    output.push_str(&format!("📁 {}\n", result.root));
    output.push_str(&format!(
        "📊 {}, {}\n\n",
        plural(result.preview.len(), "change"),
        plural(result.errors.len(), "error")
    ));

    for line in &result.preview {
        output.push_str(&format!("  • {}\n", format_line(line)));
    }

    if !result.errors.is_empty() {
        output.push_str("\n⚠️  Errors:\n");
        for error in &result.errors {
            output.push_str(&format!("   {}\n", error));
        }
    }

    if !commit && result.ok && !result.preview.is_empty() {
        output.push_str("\n💡 Run with --commit to apply changes\n");
    }

    output.push_str("\n========================================\n");
    output
}

/// Markdown rendering of a plan result
pub fn format_plan_markdown(result: &PlanResult, commit: bool) -> String {
    let mut output = String::new();

    output.push_str(if commit { "# Plan committed\n\n" } else { "# Plan preview\n\n" });
    output.push_str(&format!("**Root:** `{}`\n\n", result.root));

    output.push_str("## Changes\n\n");
    if result.preview.is_empty() {
        output.push_str("_None_\n");
    }
    for line in &result.preview {
        output.push_str(&format!("- {}\n", format_line(line)));
    }

    if !result.errors.is_empty() {
        output.push_str("\n## Errors\n\n");
        for error in &result.errors {
            output.push_str(&format!("- {}\n", error));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PlanResult {
        let mut result = PlanResult::new("/proj".to_string());
        result.add_preview(PreviewLine::new("would create directory out"));
        result.add_preview(PreviewLine::new("would replace text in a.txt").with_detail("3 matches"));
        result
    }

    #[test]
    fn test_text_lists_every_preview_line() {
        let text = format_plan_text(&sample(), false);
        assert!(text.contains("PLAN PREVIEW"));
        assert!(text.contains("2 changes, 0 errors"));
        assert!(text.contains("• would replace text in a.txt (3 matches)"));
        assert!(text.contains("--commit"));
    }

    #[test]
    fn test_text_shows_errors() {
        let mut result = sample();
        result.add_error("Path escapes root: ../x".to_string());

        let text = format_plan_text(&result, true);
        assert!(text.contains("PLAN COMMITTED"));
        assert!(text.contains("1 error"));
        assert!(text.contains("Path escapes root: ../x"));
        assert!(!text.contains("--commit"));
    }

    #[test]
    fn test_markdown_sections() {
        let mut result = sample();
        result.add_error("Unknown operation: copy".to_string());

        let md = format_plan_markdown(&result, false);
        assert!(md.starts_with("# Plan preview"));
        assert!(md.contains("- would create directory out\n"));
        assert!(md.contains("## Errors\n\n- Unknown operation: copy"));
    }

    #[test]
    fn test_error_json_is_parseable() {
        let json = format_error_json("Plan is not valid JSON: expected value").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"], "Plan is not valid JSON: expected value");
    }
}
