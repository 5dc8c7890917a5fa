//! DNS record intents tracked by the registry.
//!
//! A [`DnsRecord`] is active exactly when it carries a [`RemoteRecordId`];
//! the flag is derived, never stored separately in memory.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{RecordName, UserId};

/// Maximum accepted length of a record value.
pub const VALUE_MAX: usize = 2048;

/// Identifier of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
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

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Why a record type string was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordTypeError {
    /// Delegation and mail types are never manageable by tenants.
    #[error("{record_type} records are not allowed")]
    Forbidden { record_type: String },
    #[error("unsupported record type: {record_type}")]
    Unsupported { record_type: String },
}

/// Record types tenants may manage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Txt,
}

impl RecordType {
    /// Wire form used by storage and the DNS provider.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Txt => "TXT",
        }
    }

    /// Whether the caller must hold the owning subdomain claim.
    pub fn requires_claim(self) -> bool {
        !matches!(self, Self::Txt)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = RecordTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "A" => Ok(Self::A),
            "AAAA" => Ok(Self::Aaaa),
            "CNAME" => Ok(Self::Cname),
            "TXT" => Ok(Self::Txt),
            "NS" | "MX" => Err(RecordTypeError::Forbidden { record_type: upper }),
            _ => Err(RecordTypeError::Unsupported { record_type: upper }),
        }
    }
}

/// Time to live in seconds. `1` asks the provider to choose automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ttl(u32);

/// TTL outside the provider's accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("ttl must be 1 (automatic) or between {min} and {max} seconds, got {value}")]
pub struct TtlError {
    pub value: u32,
    pub min: u32,
    pub max: u32,
}

impl Ttl {
    /// Provider-managed TTL.
    pub const AUTOMATIC: Self = Self(1);
    const MIN: u32 = 60;
    const MAX: u32 = 86_400;

    /// Validate a requested TTL; missing and zero mean automatic.
    pub fn new(requested: Option<u32>) -> Result<Self, TtlError> {
        match requested {
            None | Some(0 | 1) => Ok(Self::AUTOMATIC),
            Some(value) if (Self::MIN..=Self::MAX).contains(&value) => Ok(Self(value)),
            Some(value) => Err(TtlError {
                value,
                min: Self::MIN,
                max: Self::MAX,
            }),
        }
    }

    /// Rehydrate a stored TTL.
    pub fn from_stored(value: u32) -> Self {
        Self(value)
    }

    /// Seconds, with `1` meaning automatic.
    pub fn seconds(self) -> u32 {
        self.0
    }
}

/// Why a record value was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("record value is required")]
    Empty,
    #[error("record value must be at most {max} characters")]
    TooLong { max: usize },
    #[error("A records need an IPv4 address")]
    NotIpv4,
    #[error("AAAA records need an IPv6 address")]
    NotIpv6,
    #[error("CNAME records need a hostname target")]
    NotHostname,
    #[error("changing a record to {record_type} needs a new value")]
    RequiredForTypeChange { record_type: String },
}

/// Record content as published, type-checked against its record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordValue(String);

impl RecordValue {
    /// Validate `raw` for `record_type`. TXT values are wrapped in double
    /// quotes unless already quoted.
    ///
    /// # Examples
    /// ```
    /// use subdomain_registry::domain::{RecordType, RecordValue};
    ///
    /// let txt = RecordValue::for_type(RecordType::Txt, "hello").expect("txt");
    /// assert_eq!(txt.as_ref(), "\"hello\"");
    /// let again = RecordValue::for_type(RecordType::Txt, "\"hello\"").expect("txt");
    /// assert_eq!(again, txt);
    /// assert!(RecordValue::for_type(RecordType::A, "::1").is_err());
    /// ```
    pub fn for_type(record_type: RecordType, raw: &str) -> Result<Self, ValueError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(ValueError::Empty);
        }
        if value.chars().count() > VALUE_MAX {
            return Err(ValueError::TooLong { max: VALUE_MAX });
        }
        let normalised = match record_type {
            RecordType::A => {
                value.parse::<Ipv4Addr>().map_err(|_| ValueError::NotIpv4)?;
                value.to_owned()
            }
            RecordType::Aaaa => value
                .parse::<Ipv6Addr>()
                .map_err(|_| ValueError::NotIpv6)?
                .to_string(),
            RecordType::Cname => {
                let target = value.trim_end_matches('.').to_ascii_lowercase();
                if !is_hostname(&target) {
                    return Err(ValueError::NotHostname);
                }
                target
            }
            RecordType::Txt => {
                if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
                    value.to_owned()
                } else {
                    format!("\"{value}\"")
                }
            }
        };
        Ok(Self(normalised))
    }

    /// Rehydrate a value that was validated before it was stored.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for RecordValue {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

fn is_hostname(target: &str) -> bool {
    !target.is_empty()
        && target.len() <= 253
        && target.contains('.')
        && target.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
}

/// Provider-assigned identifier of a published record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteRecordId(String);

impl RemoteRecordId {
    /// Wrap a provider identifier. Returns `None` for blank input.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }
}

impl AsRef<str> for RemoteRecordId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RemoteRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a record says: the part mirrored to the DNS provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordContent {
    pub name: RecordName,
    pub record_type: RecordType,
    pub value: RecordValue,
    pub ttl: Ttl,
}

/// A DNS record intent owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub id: RecordId,
    pub user_id: UserId,
    pub content: RecordContent,
    pub remote_id: Option<RemoteRecordId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DnsRecord {
    /// Build a new record, optionally already published as `remote_id`.
    pub fn new(user_id: UserId, content: RecordContent, remote_id: Option<RemoteRecordId>) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::random(),
            user_id,
            content,
            remote_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the record is live on the DNS provider.
    pub fn is_active(&self) -> bool {
        self.remote_id.is_some()
    }

    /// Whether `user_id` owns this record.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
