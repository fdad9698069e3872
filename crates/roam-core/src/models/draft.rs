//! In-progress entry composed on the capture screen

use super::entry::ImageRef;

/// The unpersisted entry the user is composing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub image_ref: Option<ImageRef>,
    pub location_label: Option<String>,
    pub text: String,
}

impl Draft {
    #[must_use]
    pub const fn has_image(&self) -> bool {
        self.image_ref.is_some()
    }

    #[must_use]
    pub const fn has_location(&self) -> bool {
        self.location_label.is_some()
    }

    /// Whitespace-only text counts as missing.
    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Names of the readiness fields that are still missing.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.has_image() {
            missing.push("image");
        }
        if !self.has_location() {
            missing.push("location");
        }
        if !self.has_text() {
            missing.push("text");
        }
        missing
    }
}
