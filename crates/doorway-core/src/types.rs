use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque tag identifier as reported by the reader.
///
/// Readers hand out either a numeric UID or a string; both are kept in their
/// textual form since the authority only ever sees the string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagId(String);

impl TagId {
    /// Create a tag identifier.
    ///
    /// Surrounding whitespace is trimmed. The identifier may be empty; the
    /// dispatcher drops empty credentials without side effects.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        TagId(id.trim().to_string())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier carries no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<u64> for TagId {
    fn from(id: u64) -> Self {
        TagId(id.to_string())
    }
}

impl From<&str> for TagId {
    fn from(id: &str) -> Self {
        TagId::new(id)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which channel a credential arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// Contactless tag presented to the reader.
    Tag,
    /// Optical code shown to the camera.
    Code,
}

impl CredentialKind {
    /// Short label used in feedback lines.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CredentialKind::Tag => "NFC",
            CredentialKind::Code => "QR",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A credential read from one of the two input channels.
///
/// Produced by a source loop and consumed exactly once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credential {
    /// Tag identifier, verified by lookup.
    Tag { id: TagId },
    /// Decoded code payload, verified as a signed token.
    Code { payload: String },
}

impl Credential {
    /// Wrap a tag identifier.
    pub fn tag(id: impl Into<TagId>) -> Self {
        Credential::Tag { id: id.into() }
    }

    /// Wrap a decoded code payload.
    pub fn code(payload: impl Into<String>) -> Self {
        Credential::Code {
            payload: payload.into(),
        }
    }

    /// The channel this credential came from.
    #[must_use]
    pub fn kind(&self) -> CredentialKind {
        match self {
            Credential::Tag { .. } => CredentialKind::Tag,
            Credential::Code { .. } => CredentialKind::Code,
        }
    }

    /// Returns `true` when there is nothing to verify.
    ///
    /// Tag ids are trimmed on construction, so a blank id is empty. A code
    /// payload is kept as decoded and is empty only when it has no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Credential::Tag { id } => id.is_empty(),
            Credential::Code { payload } => payload.is_empty(),
        }
    }
}

/// Answer of the remote authority, as seen by the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    Accepted,
    Denied,
}

impl VerificationOutcome {
    /// Returns `true` if access was granted.
    #[inline]
    #[must_use]
    pub fn is_accepted(self) -> bool {
        matches!(self, VerificationOutcome::Accepted)
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VerificationOutcome::Accepted => write!(f, "accepted"),
            VerificationOutcome::Denied => write!(f, "denied"),
        }
    }
}

/// One human-readable audit line per gate-passing attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// When the outcome was known.
    pub at: DateTime<Local>,

    /// Channel the credential arrived on.
    pub kind: CredentialKind,

    /// What the authority decided.
    pub outcome: VerificationOutcome,
}

impl FeedbackRecord {
    /// Create a record stamped with the current local time.
    #[must_use]
    pub fn now(kind: CredentialKind, outcome: VerificationOutcome) -> Self {
        Self {
            at: Local::now(),
            kind,
            outcome,
        }
    }
}

impl fmt::Display for FeedbackRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {} {}",
            self.at.format("%Y-%m-%d %H:%M:%S%.6f"),
            self.kind,
            self.outcome
        )
    }
}
