//! Subdomain labels and the claims users hold on them.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ParentDomain, UserId};

/// Maximum length of a single DNS label.
pub const LABEL_MAX: usize = 63;

/// Reasons a candidate subdomain label is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabelError {
    #[error("subdomain name cannot be empty")]
    Empty,
    #[error("subdomain name must be between 1 and {max} characters")]
    TooLong { max: usize },
    #[error("subdomain name can only contain letters, numbers, and hyphens")]
    InvalidCharacters,
    #[error("subdomain name cannot start or end with hyphen")]
    HyphenBoundary,
}

static LABEL_RE: OnceLock<Regex> = OnceLock::new();

fn label_regex() -> &'static Regex {
    LABEL_RE.get_or_init(|| {
        // Length and hyphen placement are checked separately for clearer errors.
        Regex::new("^[a-z0-9-]+$")
            .unwrap_or_else(|error| panic!("label regex failed to compile: {error}"))
    })
}

/// Validated single-label subdomain, normalised to lowercase.
///
/// # Examples
/// ```
/// use subdomain_registry::domain::SubdomainLabel;
///
/// let label = SubdomainLabel::new("Alice").expect("valid label");
/// assert_eq!(label.as_ref(), "alice");
/// assert!(SubdomainLabel::new("-alice").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubdomainLabel(String);

impl SubdomainLabel {
    /// Validate and normalise a label.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, LabelError> {
        let label = raw.as_ref().to_ascii_lowercase();
        if label.is_empty() {
            return Err(LabelError::Empty);
        }
        if label.len() > LABEL_MAX {
            return Err(LabelError::TooLong { max: LABEL_MAX });
        }
        if !label_regex().is_match(&label) {
            return Err(LabelError::InvalidCharacters);
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(LabelError::HyphenBoundary);
        }
        Ok(Self(label))
    }

    /// Rehydrate a label that was validated before it was stored.
    pub fn from_stored(label: String) -> Self {
        Self(label)
    }

    /// Fully-qualified root of this subdomain under `parent`.
    pub fn under(&self, parent: &ParentDomain) -> String {
        format!("{}.{}", self.0, parent.as_ref())
    }
}

impl AsRef<str> for SubdomainLabel {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SubdomainLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SubdomainLabel> for String {
    fn from(value: SubdomainLabel) -> Self {
        value.0
    }
}

impl TryFrom<String> for SubdomainLabel {
    type Error = LabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Identifier of a subdomain claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(Uuid);

impl ClaimId {
    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a stored UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user's exclusive reservation of one label under the parent domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdomainClaim {
    pub id: ClaimId,
    pub user_id: UserId,
    pub label: SubdomainLabel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubdomainClaim {
    /// Start a new claim timestamped now.
    pub fn new(user_id: UserId, label: SubdomainLabel) -> Self {
        let now = Utc::now();
        Self {
            id: ClaimId::random(),
            user_id,
            label,
            created_at: now,
            updated_at: now,
        }
    }
}
