//! Claim ledger held in process memory.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::ports::{ClaimRepository, ClaimRepositoryError};
use crate::domain::{ClaimId, SubdomainClaim, SubdomainLabel, UserId};

/// Claims keyed by insertion order; at most one per user and per label.
#[derive(Debug, Default)]
pub struct MemoryClaimRepository {
    claims: Mutex<Vec<SubdomainClaim>>,
}

impl MemoryClaimRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClaimRepository for MemoryClaimRepository {
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SubdomainClaim>, ClaimRepositoryError> {
        let claims = self.claims.lock().await;
        Ok(claims.iter().find(|c| &c.user_id == user_id).cloned())
    }

    async fn find_by_label(
        &self,
        label: &SubdomainLabel,
    ) -> Result<Option<SubdomainClaim>, ClaimRepositoryError> {
        let claims = self.claims.lock().await;
        Ok(claims.iter().find(|c| &c.label == label).cloned())
    }

    async fn insert(&self, claim: &SubdomainClaim) -> Result<(), ClaimRepositoryError> {
        let mut claims = self.claims.lock().await;
        if claims.iter().any(|c| c.user_id == claim.user_id) {
            return Err(ClaimRepositoryError::user_already_claimed());
        }
        if claims.iter().any(|c| c.label == claim.label) {
            return Err(ClaimRepositoryError::label_taken(claim.label.as_ref()));
        }
        claims.push(claim.clone());
        Ok(())
    }

    async fn delete(&self, id: &ClaimId) -> Result<bool, ClaimRepositoryError> {
        let mut claims = self.claims.lock().await;
        let before = claims.len();
        claims.retain(|c| &c.id != id);
        Ok(claims.len() != before)
    }
}
