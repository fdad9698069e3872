//! Diary entry model

use std::fmt;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ordered diary contents, oldest first.
pub type EntryList = Vec<DiaryEntry>;

/// Opaque reference to a locally resolvable image (file path or URI).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Wrap a non-blank reference.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput(
                "Image reference cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted record of one captured moment.
///
/// Entries are immutable and can only be built through [`DiaryEntry::new`],
/// so every instance carries an image, a location and non-blank text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EntryRecord", into = "EntryRecord")]
pub struct DiaryEntry {
    image_ref: ImageRef,
    location_label: String,
    text: String,
    created_at: DateTime<Utc>,
}

impl DiaryEntry {
    /// Build an entry, trimming the label and text.
    ///
    /// The timestamp is truncated to millisecond precision, which is what
    /// the stored format keeps.
    pub fn new(
        image_ref: ImageRef,
        location_label: &str,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let location_label = location_label.trim();
        if location_label.is_empty() {
            return Err(Error::InvalidEntry("location label is empty".to_string()));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidEntry("entry text is blank".to_string()));
        }

        Ok(Self {
            image_ref,
            location_label: location_label.to_string(),
            text: text.to_string(),
            created_at: created_at.trunc_subsecs(3),
        })
    }

    #[must_use]
    pub const fn image_ref(&self) -> &ImageRef {
        &self.image_ref
    }

    #[must_use]
    pub fn location_label(&self) -> &str {
        &self.location_label
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// ISO-8601 timestamp as stored, e.g. `2026-10-19T08:30:00.000Z`
    #[must_use]
    pub fn created_at_iso(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Wire shape of one stored entry. Field names are part of the storage format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryRecord {
    image_ref: String,
    location_label: String,
    text: String,
    created_at: String,
}

impl TryFrom<EntryRecord> for DiaryEntry {
    type Error = Error;

    fn try_from(record: EntryRecord) -> Result<Self> {
        let created_at = DateTime::parse_from_rfc3339(&record.created_at)
            .map_err(|error| {
                Error::InvalidEntry(format!(
                    "createdAt '{}' is not an ISO-8601 timestamp: {error}",
                    record.created_at
                ))
            })?
            .with_timezone(&Utc);
        let image_ref = ImageRef::new(record.image_ref)
            .map_err(|_| Error::InvalidEntry("imageRef is empty".to_string()))?;
        Self::new(image_ref, &record.location_label, &record.text, created_at)
    }
}

impl From<DiaryEntry> for EntryRecord {
    fn from(entry: DiaryEntry) -> Self {
        let created_at = entry.created_at_iso();
        Self {
            image_ref: entry.image_ref.0,
            location_label: entry.location_label,
            text: entry.text,
            created_at,
        }
    }
}
