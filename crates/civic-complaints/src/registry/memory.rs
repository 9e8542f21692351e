use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::domain::{
    Complaint, ComplaintChanges, ComplaintId, NewComplaint, NewResident, Resident, ResidentId,
};
use super::store::{ComplaintScope, RegistryStore, StoreError};

/// Process-local store keeping records in insertion order.
///
/// Used by tests and by local runs that have no MongoDB instance configured.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    sequence: u64,
    residents: Vec<Resident>,
    complaints: Vec<Complaint>,
}

impl MemoryState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!("{prefix}-{:06}", self.sequence)
    }

    fn resident_mut(&mut self, id: &ResidentId) -> Option<&mut Resident> {
        self.residents.iter_mut().find(|resident| &resident.id == id)
    }

    fn store_complaint(&mut self, complaint: NewComplaint) -> Complaint {
        let record = Complaint {
            id: ComplaintId(self.next_id("cmp")),
            resident: complaint.resident,
            kind: complaint.kind,
            description: complaint.description,
            location: complaint.location,
            status: complaint.status,
            created_at: complaint.created_at,
        };
        self.complaints.push(record.clone());
        record
    }
}

impl InMemoryStore {
    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store mutex poisoned".to_string()))
    }

    pub fn resident_count(&self) -> usize {
        self.lock().map(|state| state.residents.len()).unwrap_or(0)
    }

    pub fn complaint_count(&self) -> usize {
        self.lock().map(|state| state.complaints.len()).unwrap_or(0)
    }
}

#[async_trait]
impl RegistryStore for InMemoryStore {
    async fn insert_resident(&self, resident: NewResident) -> Result<Resident, StoreError> {
        let mut state = self.lock()?;
        let record = Resident {
            id: ResidentId(state.next_id("res")),
            name: resident.name,
            neighborhood: resident.neighborhood,
            complaints: Vec::new(),
            created_at: resident.created_at,
        };
        state.residents.push(record.clone());
        Ok(record)
    }

    async fn find_resident(&self, id: &ResidentId) -> Result<Option<Resident>, StoreError> {
        let state = self.lock()?;
        Ok(state.residents.iter().find(|r| &r.id == id).cloned())
    }

    async fn find_resident_by_key(
        &self,
        name: &str,
        neighborhood: &str,
    ) -> Result<Option<Resident>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .residents
            .iter()
            .find(|r| r.name == name && r.neighborhood == neighborhood)
            .cloned())
    }

    async fn list_residents(&self) -> Result<Vec<Resident>, StoreError> {
        Ok(self.lock()?.residents.clone())
    }

    async fn set_complaint_refs(
        &self,
        id: &ResidentId,
        complaints: Vec<ComplaintId>,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        match state.resident_mut(id) {
            Some(resident) => {
                resident.complaints = complaints;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn push_complaint_ref(
        &self,
        id: &ResidentId,
        complaint: &ComplaintId,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        match state.resident_mut(id) {
            Some(resident) => {
                resident.complaints.push(complaint.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn pull_complaint_ref(
        &self,
        id: &ResidentId,
        complaint: &ComplaintId,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        match state.resident_mut(id) {
            Some(resident) => {
                resident.complaints.retain(|existing| existing != complaint);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_resident(&self, id: &ResidentId) -> Result<Option<Resident>, StoreError> {
        let mut state = self.lock()?;
        let position = state.residents.iter().position(|r| &r.id == id);
        Ok(position.map(|index| state.residents.remove(index)))
    }

    async fn insert_complaint(&self, complaint: NewComplaint) -> Result<Complaint, StoreError> {
        Ok(self.lock()?.store_complaint(complaint))
    }

    async fn insert_complaints(
        &self,
        complaints: Vec<NewComplaint>,
    ) -> Result<Vec<Complaint>, StoreError> {
        let mut state = self.lock()?;
        Ok(complaints
            .into_iter()
            .map(|complaint| state.store_complaint(complaint))
            .collect())
    }

    async fn find_complaint(
        &self,
        scope: &ComplaintScope,
    ) -> Result<Option<Complaint>, StoreError> {
        let state = self.lock()?;
        Ok(state.complaints.iter().find(|c| scope.matches(c)).cloned())
    }

    async fn list_complaints(&self) -> Result<Vec<Complaint>, StoreError> {
        Ok(self.lock()?.complaints.clone())
    }

    async fn complaints_of(&self, resident: &ResidentId) -> Result<Vec<Complaint>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .complaints
            .iter()
            .filter(|c| &c.resident == resident)
            .cloned()
            .collect())
    }

    async fn complaints_by_ids(&self, ids: &[ComplaintId]) -> Result<Vec<Complaint>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .complaints
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn update_complaint(
        &self,
        scope: &ComplaintScope,
        changes: &ComplaintChanges,
    ) -> Result<Option<Complaint>, StoreError> {
        let mut state = self.lock()?;
        Ok(state
            .complaints
            .iter_mut()
            .find(|c| scope.matches(c))
            .map(|complaint| {
                changes.apply(complaint);
                complaint.clone()
            }))
    }

    async fn delete_complaint(
        &self,
        scope: &ComplaintScope,
    ) -> Result<Option<Complaint>, StoreError> {
        let mut state = self.lock()?;
        let position = state.complaints.iter().position(|c| scope.matches(c));
        Ok(position.map(|index| state.complaints.remove(index)))
    }

    async fn delete_complaints_of(&self, resident: &ResidentId) -> Result<u64, StoreError> {
        let mut state = self.lock()?;
        let before = state.complaints.len();
        state.complaints.retain(|c| &c.resident != resident);
        Ok((before - state.complaints.len()) as u64)
    }
}
