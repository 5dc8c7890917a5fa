//! Subdomain claim ledger service.
//!
//! Read-then-write checks give friendly failures for the common case; the
//! repository's unique constraints settle concurrent claims for the same
//! user or label.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{ClaimRepository, ClaimedSubdomain, SubdomainClaims};
use crate::domain::{RegistryConfig, RegistryError, SubdomainClaim, SubdomainLabel, UserId};

/// Claim ledger implementing the [`SubdomainClaims`] driving port.
#[derive(Clone)]
pub struct SubdomainClaimService<C> {
    claims: Arc<C>,
    config: RegistryConfig,
}

impl<C> SubdomainClaimService<C> {
    /// Create a ledger over the given repository.
    pub fn new(claims: Arc<C>, config: RegistryConfig) -> Self {
        Self { claims, config }
    }

    fn describe(&self, claim: SubdomainClaim) -> ClaimedSubdomain {
        let full_domain = claim.label.under(&self.config.parent_domain);
        ClaimedSubdomain { claim, full_domain }
    }
}

#[async_trait]
impl<C> SubdomainClaims for SubdomainClaimService<C>
where
    C: ClaimRepository,
{
    async fn claim(
        &self,
        user_id: &UserId,
        label: &str,
    ) -> Result<ClaimedSubdomain, RegistryError> {
        let label = SubdomainLabel::new(label)?;

        if self.claims.find_by_user(user_id).await?.is_some() {
            return Err(RegistryError::AlreadyClaimed);
        }
        if self.claims.find_by_label(&label).await?.is_some() {
            return Err(RegistryError::LabelTaken {
                label: label.to_string(),
            });
        }

        let claim = SubdomainClaim::new(user_id.clone(), label);
        self.claims.insert(&claim).await?;
        info!(user_id = %user_id, label = %claim.label, "subdomain claimed");
        Ok(self.describe(claim))
    }

    async fn release(&self, user_id: &UserId) -> Result<ClaimedSubdomain, RegistryError> {
        let claim = self
            .claims
            .find_by_user(user_id)
            .await?
            .ok_or(RegistryError::NoClaim)?;
        if !self.claims.delete(&claim.id).await? {
            // Released concurrently by another request from the same user.
            return Err(RegistryError::NoClaim);
        }
        info!(user_id = %user_id, label = %claim.label, "subdomain released");
        Ok(self.describe(claim))
    }

    async fn claim_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ClaimedSubdomain>, RegistryError> {
        let claim = self.claims.find_by_user(user_id).await?;
        Ok(claim.map(|claim| self.describe(claim)))
    }

    async fn claim_for_label(
        &self,
        label: &str,
    ) -> Result<Option<ClaimedSubdomain>, RegistryError> {
        // No claim can exist on a label that fails validation.
        let Ok(label) = SubdomainLabel::new(label) else {
            return Ok(None);
        };
        let claim = self.claims.find_by_label(&label).await?;
        Ok(claim.map(|claim| self.describe(claim)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParentDomain;
    use crate::domain::ports::{ClaimRepositoryError, MockClaimRepository};
    use rstest::rstest;

    fn service(repo: MockClaimRepository) -> SubdomainClaimService<MockClaimRepository> {
        let parent = ParentDomain::new("example.com").expect("parent");
        SubdomainClaimService::new(Arc::new(repo), RegistryConfig::new(parent))
    }

    fn label(raw: &str) -> SubdomainLabel {
        SubdomainLabel::new(raw).expect("label")
    }

    #[tokio::test]
    async fn claim_persists_a_new_claim() {
        let user_id = UserId::random();
        let mut repo = MockClaimRepository::new();
        repo.expect_find_by_user().times(1).return_once(|_| Ok(None));
        repo.expect_find_by_label().times(1).return_once(|_| Ok(None));
        repo.expect_insert()
            .withf(|claim| claim.label.as_ref() == "alice")
            .times(1)
            .return_once(|_| Ok(()));

        let claimed = service(repo)
            .claim(&user_id, "Alice")
            .await
            .expect("claim succeeds");
        assert_eq!(claimed.claim.user_id, user_id);
        assert_eq!(claimed.full_domain, "alice.example.com");
    }

    #[tokio::test]
    async fn second_claim_by_same_user_is_rejected() {
        let user_id = UserId::random();
        let existing = SubdomainClaim::new(user_id.clone(), label("alice"));
        let mut repo = MockClaimRepository::new();
        repo.expect_find_by_user()
            .times(1)
            .return_once(move |_| Ok(Some(existing)));
        repo.expect_insert().never();

        let err = service(repo)
            .claim(&user_id, "other")
            .await
            .expect_err("already claimed");
        assert_eq!(err, RegistryError::AlreadyClaimed);
    }

    #[tokio::test]
    async fn label_held_by_another_user_is_taken() {
        let owner = SubdomainClaim::new(UserId::random(), label("alice"));
        let mut repo = MockClaimRepository::new();
        repo.expect_find_by_user().times(1).return_once(|_| Ok(None));
        repo.expect_find_by_label()
            .times(1)
            .return_once(move |_| Ok(Some(owner)));
        repo.expect_insert().never();

        let err = service(repo)
            .claim(&UserId::random(), "alice")
            .await
            .expect_err("taken");
        assert_eq!(
            err,
            RegistryError::LabelTaken {
                label: "alice".to_owned()
            }
        );
    }

    #[rstest]
    #[case(ClaimRepositoryError::user_already_claimed(), RegistryError::AlreadyClaimed)]
    #[case(
        ClaimRepositoryError::label_taken("alice"),
        RegistryError::LabelTaken { label: "alice".to_owned() }
    )]
    #[tokio::test]
    async fn storage_constraint_races_surface_as_ledger_failures(
        #[case] storage: ClaimRepositoryError,
        #[case] expected: RegistryError,
    ) {
        let mut repo = MockClaimRepository::new();
        repo.expect_find_by_user().return_once(|_| Ok(None));
        repo.expect_find_by_label().return_once(|_| Ok(None));
        repo.expect_insert().return_once(move |_| Err(storage));

        let err = service(repo)
            .claim(&UserId::random(), "alice")
            .await
            .expect_err("race lost");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("")]
    #[case("-alice")]
    #[case("al_ice")]
    #[tokio::test]
    async fn malformed_labels_are_rejected_without_storage_access(#[case] raw: &str) {
        let repo = MockClaimRepository::new();
        let err = service(repo)
            .claim(&UserId::random(), raw)
            .await
            .expect_err("invalid label");
        assert_eq!(err.code(), "invalid_label");
    }

    #[tokio::test]
    async fn release_returns_the_removed_claim() {
        let user_id = UserId::random();
        let existing = SubdomainClaim::new(user_id.clone(), label("alice"));
        let id = existing.id;
        let mut repo = MockClaimRepository::new();
        repo.expect_find_by_user()
            .times(1)
            .return_once(move |_| Ok(Some(existing)));
        repo.expect_delete()
            .withf(move |claim_id| *claim_id == id)
            .times(1)
            .return_once(|_| Ok(true));

        let released = service(repo).release(&user_id).await.expect("released");
        assert_eq!(released.claim.id, id);
    }

    #[tokio::test]
    async fn release_without_claim_fails() {
        let mut repo = MockClaimRepository::new();
        repo.expect_find_by_user().times(1).return_once(|_| Ok(None));
        repo.expect_delete().never();

        let err = service(repo)
            .release(&UserId::random())
            .await
            .expect_err("no claim");
        assert_eq!(err, RegistryError::NoClaim);
    }

    #[tokio::test]
    async fn lookups_return_none_when_absent() {
        let mut repo = MockClaimRepository::new();
        repo.expect_find_by_user().return_once(|_| Ok(None));
        repo.expect_find_by_label().return_once(|_| Ok(None));
        let service = service(repo);

        assert!(
            service
                .claim_for_user(&UserId::random())
                .await
                .expect("lookup")
                .is_none()
        );
        assert!(
            service
                .claim_for_label("alice")
                .await
                .expect("lookup")
                .is_none()
        );
    }

    #[rstest]
    #[case("-alice")]
    #[case("al ice")]
    #[case("")]
    #[tokio::test]
    async fn malformed_labels_have_no_claim(#[case] label: &str) {
        let mut repo = MockClaimRepository::new();
        repo.expect_find_by_label().never();
        let service = service(repo);

        let found = service.claim_for_label(label).await.expect("lookup");
        assert!(found.is_none());
    }
}
