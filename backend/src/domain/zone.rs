//! Names within the shared parent zone and the placement rules that bind
//! record types to claimed subdomains.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{LabelError, RecordType, SubdomainLabel};

/// Maximum length of a fully-qualified name.
pub const NAME_MAX: usize = 253;

const NAME_LABEL_MAX: usize = 63;

static NAME_LABEL_RE: OnceLock<Regex> = OnceLock::new();

fn name_label_regex() -> &'static Regex {
    NAME_LABEL_RE.get_or_init(|| {
        // Underscores are allowed for service and verification labels.
        Regex::new("^[a-z0-9_](?:[a-z0-9_-]*[a-z0-9_])?$")
            .unwrap_or_else(|error| panic!("name label regex failed to compile: {error}"))
    })
}

/// Reasons a record name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("record name is required")]
    Empty,
    #[error("record name must be at most {max} characters")]
    TooLong { max: usize },
    #[error("record name contains an invalid label: {label:?}")]
    InvalidLabel { label: String },
    #[error("records cannot target the parent domain itself")]
    Apex,
    #[error("invalid owning subdomain: {0}")]
    OwningLabel(#[from] LabelError),
}

/// The fixed suffix under which every user subdomain lives.
///
/// # Examples
/// ```
/// use subdomain_registry::domain::ParentDomain;
///
/// let parent = ParentDomain::new("Example.COM.").expect("valid domain");
/// assert_eq!(parent.as_ref(), "example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentDomain(String);

impl ParentDomain {
    /// Validate a dotted domain name, normalising case and trailing dot.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, NameError> {
        let domain = raw
            .as_ref()
            .trim()
            .trim_end_matches('.')
            .to_ascii_lowercase();
        validate_labels(&domain)?;
        Ok(Self(domain))
    }
}

impl AsRef<str> for ParentDomain {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ParentDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully-qualified, lowercase record name inside the parent zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordName(String);

impl RecordName {
    /// Normalise a requested name, appending the parent domain when the
    /// caller supplied a relative name.
    ///
    /// # Examples
    /// ```
    /// use subdomain_registry::domain::{ParentDomain, RecordName};
    ///
    /// let parent = ParentDomain::new("example.com").expect("parent");
    /// let short = RecordName::qualify("Alice", &parent).expect("name");
    /// let full = RecordName::qualify("alice.example.com", &parent).expect("name");
    /// assert_eq!(short, full);
    /// assert_eq!(full.as_ref(), "alice.example.com");
    /// ```
    pub fn qualify(raw: &str, parent: &ParentDomain) -> Result<Self, NameError> {
        let name = raw.trim().trim_end_matches('.').to_ascii_lowercase();
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name == parent.as_ref() {
            return Err(NameError::Apex);
        }
        let qualified = if name.ends_with(&format!(".{parent}")) {
            name
        } else {
            format!("{name}.{parent}")
        };
        validate_labels(&qualified)?;
        Ok(Self(qualified))
    }

    /// Rehydrate a name that was validated before it was stored.
    pub fn from_stored(name: String) -> Self {
        Self(name)
    }

    /// The label immediately left of the parent domain, which identifies the
    /// subdomain claim that governs this name.
    pub fn owning_label(&self, parent: &ParentDomain) -> Result<SubdomainLabel, NameError> {
        let relative = self
            .0
            .strip_suffix(parent.as_ref())
            .and_then(|rest| rest.strip_suffix('.'))
            .ok_or(NameError::Apex)?;
        let owner = relative.rsplit('.').next().unwrap_or(relative);
        Ok(SubdomainLabel::new(owner)?)
    }
}

impl AsRef<str> for RecordName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RecordName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_labels(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.len() > NAME_MAX {
        return Err(NameError::TooLong { max: NAME_MAX });
    }
    match name
        .split('.')
        .find(|label| label.len() > NAME_LABEL_MAX || !name_label_regex().is_match(label))
    {
        Some(label) => Err(NameError::InvalidLabel {
            label: label.to_owned(),
        }),
        None => Ok(()),
    }
}

/// Violations of the record placement rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("{record_type} records are not allowed")]
    ForbiddenType { record_type: String },
    #[error("{record_type} records can only be created for the root subdomain ({root})")]
    RootOnly { record_type: RecordType, root: String },
    #[error("TXT records can only be created for the root subdomain or sub-labels under {root}")]
    OutsideSubdomain { root: String },
    #[error("records cannot target the parent domain itself")]
    ParentApex,
}

/// Check that `record_type` may live at `name` within `owner`'s subdomain.
///
/// A, AAAA and CNAME records sit only at the subdomain root; TXT records may
/// also sit on any label beneath it.
pub fn check_placement(
    name: &RecordName,
    record_type: RecordType,
    owner: &SubdomainLabel,
    parent: &ParentDomain,
) -> Result<(), PlacementError> {
    let root = owner.under(parent);
    let name = name.as_ref();
    match record_type {
        RecordType::Txt => {
            if name == root || name.ends_with(&format!(".{root}")) {
                Ok(())
            } else {
                Err(PlacementError::OutsideSubdomain { root })
            }
        }
        RecordType::A | RecordType::Aaaa | RecordType::Cname => {
            if name == root {
                Ok(())
            } else {
                Err(PlacementError::RootOnly { record_type, root })
            }
        }
    }
}

/// Immutable registry configuration injected at composition time.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub parent_domain: ParentDomain,
}

impl RegistryConfig {
    /// Build a configuration for the given parent domain.
    pub fn new(parent_domain: ParentDomain) -> Self {
        Self { parent_domain }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn parent() -> ParentDomain {
        ParentDomain::new("example.com").expect("parent domain")
    }

    fn name(raw: &str, parent: &ParentDomain) -> RecordName {
        RecordName::qualify(raw, parent).expect("record name")
    }

    fn alice() -> SubdomainLabel {
        SubdomainLabel::new("alice").expect("label")
    }

    #[rstest]
    #[case("alice", "alice.example.com")]
    #[case("alice.example.com", "alice.example.com")]
    #[case("ALICE.Example.com.", "alice.example.com")]
    #[case("_acme-challenge.alice", "_acme-challenge.alice.example.com")]
    fn qualifies_names(parent: ParentDomain, #[case] raw: &str, #[case] expected: &str) {
        assert_eq!(name(raw, &parent).as_ref(), expected);
    }

    #[rstest]
    #[case("", NameError::Empty)]
    #[case("example.com", NameError::Apex)]
    #[case("bad..name", NameError::InvalidLabel { label: String::new() })]
    #[case("-bad", NameError::InvalidLabel { label: "-bad".to_owned() })]
    #[case("sp ace", NameError::InvalidLabel { label: "sp ace".to_owned() })]
    fn rejects_malformed_names(
        parent: ParentDomain,
        #[case] raw: &str,
        #[case] expected: NameError,
    ) {
        assert_eq!(RecordName::qualify(raw, &parent).expect_err("invalid"), expected);
    }

    #[rstest]
    fn rejects_overlong_names(parent: ParentDomain) {
        let raw = vec!["a".repeat(60); 5].join(".");
        assert_eq!(
            RecordName::qualify(&raw, &parent).expect_err("too long"),
            NameError::TooLong { max: NAME_MAX }
        );
    }

    #[rstest]
    #[case("alice", "alice")]
    #[case("www.alice", "alice")]
    #[case("_acme.deep.alice", "alice")]
    fn owning_label_is_adjacent_to_parent(
        parent: ParentDomain,
        #[case] raw: &str,
        #[case] expected: &str,
    ) {
        let owner = name(raw, &parent).owning_label(&parent).expect("owner");
        assert_eq!(owner.as_ref(), expected);
    }

    #[rstest]
    fn owning_label_rejects_underscore_subdomains(parent: ParentDomain) {
        let err = name("_dmarc", &parent)
            .owning_label(&parent)
            .expect_err("underscore owner");
        assert!(matches!(err, NameError::OwningLabel(_)));
    }

    #[rstest]
    #[case(RecordType::A)]
    #[case(RecordType::Aaaa)]
    #[case(RecordType::Cname)]
    fn address_records_only_at_root(parent: ParentDomain, #[case] record_type: RecordType) {
        assert!(check_placement(&name("alice", &parent), record_type, &alice(), &parent).is_ok());
        let err = check_placement(&name("www.alice", &parent), record_type, &alice(), &parent)
            .expect_err("sub-label rejected");
        assert!(matches!(err, PlacementError::RootOnly { .. }));
    }

    #[rstest]
    #[case("alice")]
    #[case("_acme-challenge.alice")]
    #[case("a.b.alice")]
    fn txt_records_at_root_or_below(parent: ParentDomain, #[case] raw: &str) {
        assert!(check_placement(&name(raw, &parent), RecordType::Txt, &alice(), &parent).is_ok());
    }

    #[rstest]
    fn txt_records_outside_subdomain_rejected(parent: ParentDomain) {
        let err = check_placement(&name("malice", &parent), RecordType::Txt, &alice(), &parent)
            .expect_err("outside subdomain");
        assert!(matches!(err, PlacementError::OutsideSubdomain { .. }));
    }
}
