use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::domain::{
    Complaint, ComplaintDraft, ComplaintId, ComplaintWithResident, Resident, ResidentId,
};
use super::error::RegistryError;
use super::store::{ComplaintScope, RegistryStore};
use super::validation::{complaint_changes, new_complaint};

/// Complaint-centric operations, each complaint read back joined with its resident.
pub struct ComplaintLedger<S> {
    store: Arc<S>,
}

impl<S> ComplaintLedger<S>
where
    S: RegistryStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// File a complaint against an existing resident.
    ///
    /// The resident's reference list is extended as well so both sides stay linked.
    pub async fn create(
        &self,
        resident_id: &ResidentId,
        draft: ComplaintDraft,
    ) -> Result<Complaint, RegistryError> {
        self.store
            .find_resident(resident_id)
            .await?
            .ok_or_else(RegistryError::resident_not_found)?;

        let draft = ComplaintDraft {
            status: None,
            ..draft
        };
        let complaint = new_complaint(resident_id, draft, Utc::now())?;
        let stored = self.store.insert_complaint(complaint).await?;
        self.store
            .push_complaint_ref(resident_id, &stored.id)
            .await?;

        info!(complaint = %stored.id, resident = %resident_id, "complaint filed");
        Ok(stored)
    }

    pub async fn list(&self) -> Result<Vec<ComplaintWithResident>, RegistryError> {
        let complaints = self.store.list_complaints().await?;
        let residents: HashMap<ResidentId, Resident> = self
            .store
            .list_residents()
            .await?
            .into_iter()
            .map(|resident| (resident.id.clone(), resident))
            .collect();

        Ok(complaints
            .into_iter()
            .map(|complaint| {
                let resident = residents.get(&complaint.resident).cloned();
                ComplaintWithResident::join(complaint, resident)
            })
            .collect())
    }

    pub async fn get(&self, id: &ComplaintId) -> Result<ComplaintWithResident, RegistryError> {
        let complaint = self
            .store
            .find_complaint(&ComplaintScope::by_id(id))
            .await?
            .ok_or_else(RegistryError::complaint_not_found)?;
        self.with_resident(complaint).await
    }

    /// Overwrite only the supplied fields. Status values are accepted in any order.
    pub async fn update(
        &self,
        id: &ComplaintId,
        draft: ComplaintDraft,
    ) -> Result<ComplaintWithResident, RegistryError> {
        let changes = complaint_changes(draft)?;
        let updated = self
            .store
            .update_complaint(&ComplaintScope::by_id(id), &changes)
            .await?
            .ok_or_else(RegistryError::complaint_not_found)?;

        debug!(complaint = %id, ?changes, "complaint updated");
        self.with_resident(updated).await
    }

    /// Remove a complaint and prune it from its owner's reference list.
    pub async fn delete(&self, id: &ComplaintId) -> Result<(), RegistryError> {
        let removed = self
            .store
            .delete_complaint(&ComplaintScope::by_id(id))
            .await?
            .ok_or_else(RegistryError::complaint_not_found)?;
        self.store
            .pull_complaint_ref(&removed.resident, &removed.id)
            .await?;

        info!(complaint = %id, resident = %removed.resident, "complaint removed");
        Ok(())
    }

    async fn with_resident(
        &self,
        complaint: Complaint,
    ) -> Result<ComplaintWithResident, RegistryError> {
        let resident = self.store.find_resident(&complaint.resident).await?;
        Ok(ComplaintWithResident::join(complaint, resident))
    }
}
