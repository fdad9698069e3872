use std::path::{Path, PathBuf};

use chrono::Utc;
use roam_core::export::{render_entries_export, suggested_export_file_name, ExportFormat};

use crate::commands::common::{write_output, Workspace};
use crate::error::CliError;

pub async fn run_export(
    workspace: &Workspace,
    format: ExportFormat,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let entries = workspace.entry_store().load().await?;
    let rendered = render_entries_export(&entries, format)?;
    let target = output_path.map(|path| export_target(path, format));
    write_output(&rendered, target.as_deref())
}

/// A directory output gets a timestamped file name inside it.
fn export_target(path: &Path, format: ExportFormat) -> PathBuf {
    if path.is_dir() {
        path.join(suggested_export_file_name(format, Utc::now()))
    } else {
        path.to_path_buf()
    }
}
