//! Driving port for the subdomain claim ledger.
//!
//! Inbound adapters pass the caller's [`UserId`] by value; the ledger never
//! learns how the identity was established.

use async_trait::async_trait;

use crate::domain::{RegistryError, SubdomainClaim, UserId};

/// A claim together with the fully-qualified domain it reserves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedSubdomain {
    pub claim: SubdomainClaim,
    /// `label.parent`, for example `alice.example.com`.
    pub full_domain: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubdomainClaims: Send + Sync {
    /// Reserve `label` for `user_id`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidLabel`] for malformed labels.
    /// - [`RegistryError::AlreadyClaimed`] when the user already holds a claim.
    /// - [`RegistryError::LabelTaken`] when another user holds the label.
    async fn claim(&self, user_id: &UserId, label: &str)
    -> Result<ClaimedSubdomain, RegistryError>;

    /// Give up the caller's claim, returning what was removed.
    async fn release(&self, user_id: &UserId) -> Result<ClaimedSubdomain, RegistryError>;

    /// The caller's claim, if any.
    async fn claim_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ClaimedSubdomain>, RegistryError>;

    /// The claim on `label`, if any. Malformed labels are never claimed.
    async fn claim_for_label(&self, label: &str)
    -> Result<Option<ClaimedSubdomain>, RegistryError>;
}
