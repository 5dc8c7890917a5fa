//! Request validation, claim enforcement and placement checks.
//!
//! Everything here runs before any remote call, so failures have no side
//! effects.

use crate::domain::ports::{
    ClaimRepository, CreateRecordRequest, DnsGateway, RecordRepository, UpdateRecordRequest,
};
use crate::domain::{
    DnsRecord, RecordContent, RecordName, RecordType, RecordValue, RegistryError, Ttl, UserId,
    ValueError, check_placement,
};

use super::RecordService;

impl<R, C, G> RecordService<R, C, G>
where
    R: RecordRepository,
    C: ClaimRepository,
    G: DnsGateway,
{
    /// Validate a create request into record content the caller may own.
    pub(super) async fn resolve_create(
        &self,
        request: &CreateRecordRequest,
    ) -> Result<RecordContent, RegistryError> {
        let record_type = request.record_type.parse::<RecordType>()?;
        let name = RecordName::qualify(&request.name, &self.config.parent_domain)?;
        let value = RecordValue::for_type(record_type, &request.value)?;
        let ttl = Ttl::new(request.ttl)?;
        self.authorize(&request.user_id, &name, record_type).await?;
        Ok(RecordContent {
            name,
            record_type,
            value,
            ttl,
        })
    }

    /// Merge a partial update into the stored content.
    ///
    /// Claim and placement rules are re-checked when the name or type moves,
    /// and when an inactive record is being published again.
    pub(super) async fn merge_content(
        &self,
        request: &UpdateRecordRequest,
        existing: &DnsRecord,
    ) -> Result<RecordContent, RegistryError> {
        let current = &existing.content;
        let record_type = match &request.record_type {
            Some(raw) => raw.parse::<RecordType>()?,
            None => current.record_type,
        };
        let name = match &request.name {
            Some(raw) => RecordName::qualify(raw, &self.config.parent_domain)?,
            None => current.name.clone(),
        };
        let value = match &request.value {
            Some(raw) => RecordValue::for_type(record_type, raw)?,
            None if record_type != current.record_type => {
                return Err(ValueError::RequiredForTypeChange {
                    record_type: record_type.to_string(),
                }
                .into());
            }
            None => current.value.clone(),
        };
        let ttl = match request.ttl {
            Some(seconds) => Ttl::new(Some(seconds))?,
            None => current.ttl,
        };

        let moved = name != current.name || record_type != current.record_type;
        let activating = request.active == Some(true) && !existing.is_active();
        if moved || activating {
            self.authorize(&request.user_id, &name, record_type).await?;
        }
        Ok(RecordContent {
            name,
            record_type,
            value,
            ttl,
        })
    }

    /// Enforce claim ownership (all types but TXT) and placement.
    pub(super) async fn authorize(
        &self,
        user_id: &UserId,
        name: &RecordName,
        record_type: RecordType,
    ) -> Result<(), RegistryError> {
        let parent = &self.config.parent_domain;
        let owner = name.owning_label(parent)?;
        if record_type.requires_claim() {
            match self.claims.find_by_label(&owner).await? {
                None => {
                    return Err(RegistryError::SubdomainNotClaimed {
                        label: owner.to_string(),
                    });
                }
                Some(claim) if &claim.user_id != user_id => {
                    return Err(RegistryError::SubdomainForbidden {
                        label: owner.to_string(),
                    });
                }
                Some(_) => {}
            }
        }
        check_placement(name, record_type, &owner, parent)?;
        Ok(())
    }
}
