use async_trait::async_trait;

use super::domain::{
    Complaint, ComplaintChanges, ComplaintId, NewComplaint, NewResident, Resident, ResidentId,
};

/// Restricts a complaint lookup to a single record, optionally under a given resident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintScope {
    pub complaint: ComplaintId,
    pub resident: Option<ResidentId>,
}

impl ComplaintScope {
    pub fn by_id(complaint: &ComplaintId) -> Self {
        Self {
            complaint: complaint.clone(),
            resident: None,
        }
    }

    pub fn owned_by(resident: &ResidentId, complaint: &ComplaintId) -> Self {
        Self {
            complaint: complaint.clone(),
            resident: Some(resident.clone()),
        }
    }

    pub fn matches(&self, complaint: &Complaint) -> bool {
        complaint.id == self.complaint
            && self
                .resident
                .as_ref()
                .map_or(true, |resident| &complaint.resident == resident)
    }
}

/// Document store holding residents and complaints.
///
/// Every call is a single store round trip. Nothing here spans more than one document
/// collection, so multi-step flows built on top are not atomic.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    async fn insert_resident(&self, resident: NewResident) -> Result<Resident, StoreError>;
    async fn find_resident(&self, id: &ResidentId) -> Result<Option<Resident>, StoreError>;
    async fn find_resident_by_key(
        &self,
        name: &str,
        neighborhood: &str,
    ) -> Result<Option<Resident>, StoreError>;
    async fn list_residents(&self) -> Result<Vec<Resident>, StoreError>;
    /// Replaces the reference list wholesale. Returns `false` when no resident matched.
    async fn set_complaint_refs(
        &self,
        id: &ResidentId,
        complaints: Vec<ComplaintId>,
    ) -> Result<bool, StoreError>;
    /// Atomic append to the reference list. Returns `false` when no resident matched.
    async fn push_complaint_ref(
        &self,
        id: &ResidentId,
        complaint: &ComplaintId,
    ) -> Result<bool, StoreError>;
    /// Removes every occurrence of `complaint` from the reference list.
    async fn pull_complaint_ref(
        &self,
        id: &ResidentId,
        complaint: &ComplaintId,
    ) -> Result<bool, StoreError>;
    async fn delete_resident(&self, id: &ResidentId) -> Result<Option<Resident>, StoreError>;

    async fn insert_complaint(&self, complaint: NewComplaint) -> Result<Complaint, StoreError>;
    async fn insert_complaints(
        &self,
        complaints: Vec<NewComplaint>,
    ) -> Result<Vec<Complaint>, StoreError>;
    async fn find_complaint(&self, scope: &ComplaintScope)
        -> Result<Option<Complaint>, StoreError>;
    async fn list_complaints(&self) -> Result<Vec<Complaint>, StoreError>;
    async fn complaints_of(&self, resident: &ResidentId) -> Result<Vec<Complaint>, StoreError>;
    async fn complaints_by_ids(&self, ids: &[ComplaintId]) -> Result<Vec<Complaint>, StoreError>;
    /// Applies `changes` and returns the record as it reads after the update.
    async fn update_complaint(
        &self,
        scope: &ComplaintScope,
        changes: &ComplaintChanges,
    ) -> Result<Option<Complaint>, StoreError>;
    async fn delete_complaint(&self, scope: &ComplaintScope)
        -> Result<Option<Complaint>, StoreError>;
    /// Returns the number of complaints removed.
    async fn delete_complaints_of(&self, resident: &ResidentId) -> Result<u64, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("stored document is malformed: {0}")]
    Corrupt(String),
}
