//! Common types shared across hardware device implementations.
//!
//! This module defines the values that cross the device boundary: device
//! information, raw tag reads, captured frames and output levels.

use bytes::Bytes;
use doorway_core::TagId;
use serde::{Deserialize, Serialize};

/// Generic device information.
///
/// Contains metadata about a hardware device such as name, model and
/// optional location (device path, pin number).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "MFRC522", "Mock Camera").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Where the device is attached, if meaningful (e.g. "/dev/video0").
    pub location: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            location: None,
        }
    }

    /// Set the device location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} ({}) at {}", self.name, self.model, location),
            None => write!(f, "{} ({})", self.name, self.model),
        }
    }
}

/// Result of one blocking read on the tag reader.
///
/// `id` is `None` when no tag entered the field before the reader's own
/// timeout expired. `text` is whatever the tag's data block held; the
/// controller never uses it for access decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRead {
    pub id: Option<TagId>,
    pub text: String,
}

impl TagRead {
    /// A read that found a tag.
    pub fn tag(id: impl Into<TagId>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            text: text.into(),
        }
    }

    /// A read that timed out without a tag.
    pub fn empty() -> Self {
        Self {
            id: None,
            text: String::new(),
        }
    }
}

/// One captured camera frame.
///
/// The buffer layout is driver-specific; only the matching
/// [`CodeDecoder`](crate::traits::CodeDecoder) knows how to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw frame bytes.
    pub data: Bytes,

    /// Capture time.
    pub captured_at: chrono::DateTime<chrono::Utc>,
}

impl Frame {
    /// Create a frame stamped with the current time.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            captured_at: chrono::Utc::now(),
        }
    }

    /// Create a frame whose buffer holds newline-separated text payloads.
    ///
    /// This is the layout understood by
    /// [`TextDecoder`](crate::line::TextDecoder).
    pub fn from_payloads<S: AsRef<str>>(payloads: &[S]) -> Self {
        let text = payloads
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
        Self::new(text.into_bytes())
    }

    /// Returns `true` if the frame carries no data.
    pub fn is_blank(&self) -> bool {
        self.data.is_empty()
    }
}

/// Logic level of an output pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// De-energized: lock closed, buzzer silent.
    Low,
    /// Energized: lock open, buzzer sounding.
    High,
}

impl Level {
    /// Returns `true` for [`Level::High`].
    pub fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

impl From<bool> for Level {
    fn from(energized: bool) -> Self {
        if energized { Self::High } else { Self::Low }
    }
}
