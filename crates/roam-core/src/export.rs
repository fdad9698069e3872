//! Diary export helpers.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::DiaryEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

/// Render entries as pretty-printed JSON, in the stored shape.
pub fn render_json_export(entries: &[DiaryEntry]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entries)
}

/// Render entries in Markdown, one frontmatter block per entry.
///
/// Frontmatter values are written as quoted strings. The entry text follows
/// verbatim, so a text line reading `---` is not escaped.
pub fn render_markdown_export(entries: &[DiaryEntry]) -> serde_json::Result<String> {
    let mut output = String::new();

    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }

        let _ = writeln!(output, "---");
        let _ = writeln!(output, "location: {}", quoted(entry.location_label())?);
        let _ = writeln!(output, "created_at: {}", quoted(&entry.created_at_iso())?);
        let _ = writeln!(output, "image: {}", quoted(entry.image_ref().as_str())?);
        let _ = writeln!(output, "---");
        let _ = writeln!(output);
        output.push_str(entry.text());
        output.push('\n');
    }

    Ok(output)
}

// JSON strings are valid YAML double-quoted scalars.
fn quoted(value: &str) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

pub fn render_entries_export(
    entries: &[DiaryEntry],
    format: ExportFormat,
) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(entries),
        ExportFormat::Markdown => render_markdown_export(entries),
    }
}

/// Deterministic default file name for an export taken at `now`.
#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, now: DateTime<Utc>) -> String {
    format!(
        "roam-export-{}.{}",
        now.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}
