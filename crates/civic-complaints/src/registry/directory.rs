use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{
    Complaint, ComplaintDraft, ComplaintId, NewResident, Resident, ResidentId,
    ResidentWithComplaints,
};
use super::error::RegistryError;
use super::store::{ComplaintScope, RegistryStore};
use super::validation::{complaint_changes, new_complaint, required_text};

pub const COMPLAINT_ADDED: &str = "Reclamação adicionada";

/// Outcome of filing a complaint by natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiledComplaint {
    pub message: &'static str,
    pub resident: Resident,
}

/// Resident-centric operations, including the cascades that keep both sides linked.
///
/// None of the multi-step flows here are atomic. A concurrent reader may observe a resident
/// whose reference list has not caught up yet, or a complaint whose resident is mid-delete.
pub struct ResidentDirectory<S> {
    store: Arc<S>,
}

impl<S> ResidentDirectory<S>
where
    S: RegistryStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Register a resident, optionally filing complaints inline.
    ///
    /// The reference list is rebuilt from whatever the store reports as owned by the new
    /// resident after the inserts, not from the inserts themselves.
    pub async fn create(
        &self,
        name: Option<String>,
        neighborhood: Option<String>,
        complaints: Vec<ComplaintDraft>,
    ) -> Result<ResidentWithComplaints, RegistryError> {
        let name = required_text("name", name)?;
        let neighborhood = required_text("neighborhood", neighborhood)?;
        let created_at = Utc::now();

        let resident = self
            .store
            .insert_resident(NewResident {
                name,
                neighborhood,
                created_at,
            })
            .await?;
        info!(resident = %resident.id, "resident registered");

        if !complaints.is_empty() {
            let drafts = complaints
                .into_iter()
                .map(|draft| new_complaint(&resident.id, draft, created_at))
                .collect::<Result<Vec<_>, _>>()?;
            self.store.insert_complaints(drafts).await?;

            let owned = self.store.complaints_of(&resident.id).await?;
            let refs = owned.iter().map(|complaint| complaint.id.clone()).collect();
            self.store.set_complaint_refs(&resident.id, refs).await?;
        }

        let stored = self
            .store
            .find_resident(&resident.id)
            .await?
            .ok_or_else(RegistryError::resident_not_found)?;
        self.resolve(stored).await
    }

    /// Look a resident up by (name, neighborhood), registering one when absent, then file a
    /// complaint for them.
    ///
    /// Lookup and creation are two separate store calls; two concurrent calls with the same
    /// key may both create a resident.
    pub async fn find_or_create_and_add_complaint(
        &self,
        name: Option<String>,
        neighborhood: Option<String>,
        draft: ComplaintDraft,
    ) -> Result<FiledComplaint, RegistryError> {
        let name = required_text("name", name)?;
        let neighborhood = required_text("neighborhood", neighborhood)?;

        let mut resident = match self
            .store
            .find_resident_by_key(&name, &neighborhood)
            .await?
        {
            Some(existing) => existing,
            None => {
                let created = self
                    .store
                    .insert_resident(NewResident {
                        name,
                        neighborhood,
                        created_at: Utc::now(),
                    })
                    .await?;
                info!(resident = %created.id, "resident registered by natural key");
                created
            }
        };

        let complaint = new_complaint(&resident.id, draft, Utc::now())?;
        let stored = self.store.insert_complaint(complaint).await?;
        self.store
            .push_complaint_ref(&resident.id, &stored.id)
            .await?;
        resident.complaints.push(stored.id.clone());

        info!(complaint = %stored.id, resident = %resident.id, "complaint filed by natural key");
        Ok(FiledComplaint {
            message: COMPLAINT_ADDED,
            resident,
        })
    }

    pub async fn list(&self) -> Result<Vec<ResidentWithComplaints>, RegistryError> {
        let residents = self.store.list_residents().await?;
        let mut resolved = Vec::with_capacity(residents.len());
        for resident in residents {
            resolved.push(self.resolve(resident).await?);
        }
        Ok(resolved)
    }

    /// File a complaint under a known resident identifier.
    pub async fn add_complaint(
        &self,
        resident_id: &ResidentId,
        draft: ComplaintDraft,
    ) -> Result<Complaint, RegistryError> {
        self.store
            .find_resident(resident_id)
            .await?
            .ok_or_else(RegistryError::resident_not_found)?;

        let complaint = new_complaint(resident_id, draft, Utc::now())?;
        let stored = self.store.insert_complaint(complaint).await?;
        if !self
            .store
            .push_complaint_ref(resident_id, &stored.id)
            .await?
        {
            warn!(resident = %resident_id, complaint = %stored.id, "resident vanished before link");
        }

        info!(complaint = %stored.id, resident = %resident_id, "complaint added to resident");
        Ok(stored)
    }

    /// Update a complaint only when it belongs to `resident_id`.
    pub async fn update_complaint(
        &self,
        resident_id: &ResidentId,
        complaint_id: &ComplaintId,
        draft: ComplaintDraft,
    ) -> Result<Complaint, RegistryError> {
        let changes = complaint_changes(draft)?;
        let updated = self
            .store
            .update_complaint(&ComplaintScope::owned_by(resident_id, complaint_id), &changes)
            .await?
            .ok_or_else(RegistryError::complaint_not_found)?;

        debug!(complaint = %complaint_id, resident = %resident_id, ?changes, "complaint updated");
        Ok(updated)
    }

    /// Delete a complaint owned by `resident_id`, then unlink it from the resident.
    pub async fn remove_complaint(
        &self,
        resident_id: &ResidentId,
        complaint_id: &ComplaintId,
    ) -> Result<(), RegistryError> {
        self.store
            .delete_complaint(&ComplaintScope::owned_by(resident_id, complaint_id))
            .await?
            .ok_or_else(RegistryError::complaint_not_found)?;
        self.store
            .pull_complaint_ref(resident_id, complaint_id)
            .await?;

        info!(
            complaint = %complaint_id,
            resident = %resident_id,
            "complaint removed from resident"
        );
        Ok(())
    }

    /// Cascade delete: complaints first, then the resident.
    ///
    /// The complaint deletion is not rolled back when the resident turns out to be missing.
    pub async fn delete(&self, resident_id: &ResidentId) -> Result<(), RegistryError> {
        let removed = self.store.delete_complaints_of(resident_id).await?;
        self.store
            .delete_resident(resident_id)
            .await?
            .ok_or_else(RegistryError::resident_not_found)?;

        info!(resident = %resident_id, complaints = removed, "resident deleted");
        Ok(())
    }

    /// Resolve the reference list in its stored order, dropping dangling ids.
    async fn resolve(&self, resident: Resident) -> Result<ResidentWithComplaints, RegistryError> {
        let mut by_id: HashMap<ComplaintId, Complaint> = self
            .store
            .complaints_by_ids(&resident.complaints)
            .await?
            .into_iter()
            .map(|complaint| (complaint.id.clone(), complaint))
            .collect();
        let complaints: Vec<Complaint> = resident
            .complaints
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();
        Ok(ResidentWithComplaints::join(resident, complaints))
    }
}
