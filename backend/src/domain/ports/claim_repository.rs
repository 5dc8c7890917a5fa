//! Port abstraction for subdomain claim persistence.
//!
//! Adapters must enforce both uniqueness rules (one claim per user, one
//! claim per label) in storage and report violations through the dedicated
//! variants so concurrent claims cannot slip past the ledger's read checks.
use async_trait::async_trait;

use crate::domain::{ClaimId, SubdomainClaim, SubdomainLabel, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by claim repository adapters.
    pub enum ClaimRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "claim repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "claim repository query failed: {message}",
        /// The user already holds a claim.
        UserAlreadyClaimed => "user already holds a subdomain claim",
        /// Another claim already uses the label.
        LabelTaken { label: String } => "subdomain {label} is already claimed",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClaimRepository: Send + Sync {
    /// Fetch the claim held by a user.
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SubdomainClaim>, ClaimRepositoryError>;

    /// Fetch the claim on a label.
    async fn find_by_label(
        &self,
        label: &SubdomainLabel,
    ) -> Result<Option<SubdomainClaim>, ClaimRepositoryError>;

    /// Insert a new claim.
    async fn insert(&self, claim: &SubdomainClaim) -> Result<(), ClaimRepositoryError>;

    /// Delete a claim, returning whether a row was removed.
    async fn delete(&self, id: &ClaimId) -> Result<bool, ClaimRepositoryError>;
}
