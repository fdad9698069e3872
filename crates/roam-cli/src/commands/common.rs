use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use roam_core::config::{config_path, load_config_from_path, DiaryConfig};
use roam_core::gallery::DirectoryMediaLibrary;
use roam_core::location::{FixedPosition, NominatimGeocoder};
use roam_core::notify::LogNotifier;
use roam_core::storage::{EntryStore, FileBlobStore};
use roam_core::{DiaryEntry, DiaryServices, Platform};
use serde::Serialize;

use crate::error::CliError;
use crate::permissions::TerminalPermissions;

/// Resolved data directory and the config loaded from it.
pub struct Workspace {
    pub data_dir: PathBuf,
    pub config: DiaryConfig,
}

impl Workspace {
    pub fn open(data_dir: PathBuf) -> Self {
        let config = load_config_from_path(&config_path(&data_dir));
        Self { data_dir, config }
    }

    pub fn config_path(&self) -> PathBuf {
        config_path(&self.data_dir)
    }

    /// Where captured photos are copied.
    pub fn media_dir(&self) -> PathBuf {
        self.data_dir.join("media")
    }

    pub fn gallery_dir(&self) -> PathBuf {
        self.config
            .gallery_dir
            .clone()
            .or_else(dirs::picture_dir)
            .unwrap_or_else(|| self.data_dir.join("gallery"))
    }

    pub fn entry_store(&self) -> EntryStore {
        EntryStore::new(Arc::new(FileBlobStore::new(&self.data_dir)))
    }

    pub fn services(&self) -> Result<DiaryServices, CliError> {
        let platform = Platform {
            permissions: Arc::new(TerminalPermissions::new(self.config.permissions)),
            library: Arc::new(DirectoryMediaLibrary::new(self.gallery_dir())),
            position: Arc::new(FixedPosition::new(self.config.position)),
            geocoder: Arc::new(NominatimGeocoder::new(self.config.geocoder_url.clone())?),
            notifier: Arc::new(LogNotifier),
            blobs: Arc::new(FileBlobStore::new(&self.data_dir)),
        };
        Ok(DiaryServices::new(platform, &self.config))
    }
}

#[derive(Debug, Serialize)]
pub struct EntryListItem {
    pub index: usize,
    pub location: String,
    pub text: String,
    pub image: String,
    pub created_at: String,
    pub relative_time: String,
}

pub fn entry_to_list_item(index: usize, entry: &DiaryEntry, now: DateTime<Utc>) -> EntryListItem {
    EntryListItem {
        index,
        location: entry.location_label().to_string(),
        text: entry.text().to_string(),
        image: entry.image_ref().to_string(),
        created_at: entry.created_at_iso(),
        relative_time: format_relative_time(entry.created_at(), now),
    }
}

pub fn format_entry_lines(entries: &[DiaryEntry], now: DateTime<Utc>) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let location = entry_preview(entry.location_label(), 24);
            let preview = entry_preview(entry.text(), 40);
            let relative_time = format_relative_time(entry.created_at(), now);
            format!("{index:>3}  {location:<24}  {preview:<40}  {relative_time}")
        })
        .collect()
}

pub const EMPTY_LIST_MESSAGE: &str = "No travel entries yet.";

/// Lines printed by `roam list`, with a notice for an empty diary.
pub fn format_entry_list(entries: &[DiaryEntry], now: DateTime<Utc>) -> Vec<String> {
    if entries.is_empty() {
        return vec![EMPTY_LIST_MESSAGE.to_string()];
    }
    format_entry_lines(entries, now)
}

/// First line of `text`, whitespace-collapsed and cut to `max_chars`.
pub fn entry_preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - timestamp).num_milliseconds().max(0);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn resolve_entry_text(text_parts: &[String]) -> Result<String, CliError> {
    if let Some(text) = normalize_content(&text_parts.join(" ")) {
        return Ok(text);
    }
    read_piped_stdin()?.ok_or(CliError::EmptyText)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn resolve_data_dir(cli_data_dir: Option<PathBuf>) -> PathBuf {
    cli_data_dir
        .or_else(|| env::var_os("ROAM_DATA_DIR").map(PathBuf::from))
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(default_data_dir)
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::data_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roam")
}

pub fn write_output(rendered: &str, output_path: Option<&Path>) -> Result<(), CliError> {
    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }
    Ok(())
}
