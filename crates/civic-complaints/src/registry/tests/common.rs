use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use serde_json::Value;

use crate::registry::domain::{
    Complaint, ComplaintChanges, ComplaintDraft, ComplaintId, NewComplaint, NewResident,
    Resident, ResidentId,
};
use crate::registry::memory::InMemoryStore;
use crate::registry::store::{ComplaintScope, RegistryStore, StoreError};
use crate::registry::{ComplaintLedger, RegistryState, ResidentDirectory};

pub(super) fn pothole() -> ComplaintDraft {
    ComplaintDraft::new("buraco_rua", "Buraco grande", "Rua das Flores, 10")
}

pub(super) fn water_leak() -> ComplaintDraft {
    ComplaintDraft::new("vazamento_agua", "Cano estourado", "Av. Central, 200")
}

pub(super) fn build_services() -> (
    ComplaintLedger<InMemoryStore>,
    ResidentDirectory<InMemoryStore>,
    Arc<InMemoryStore>,
) {
    let store = Arc::new(InMemoryStore::default());
    (
        ComplaintLedger::new(store.clone()),
        ResidentDirectory::new(store.clone()),
        store,
    )
}

pub(super) fn build_state() -> (RegistryState<InMemoryStore>, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::default());
    (RegistryState::new(store.clone()), store)
}

pub(super) async fn register(
    directory: &ResidentDirectory<InMemoryStore>,
    name: &str,
    neighborhood: &str,
) -> ResidentId {
    directory
        .create(Some(name.to_string()), Some(neighborhood.to_string()), Vec::new())
        .await
        .expect("resident registers")
        .id
}

pub(super) fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serializable body")))
        .expect("valid request")
}

pub(super) fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("database offline".to_string()))
}

#[async_trait]
impl RegistryStore for UnavailableStore {
    async fn insert_resident(&self, _resident: NewResident) -> Result<Resident, StoreError> {
        offline()
    }

    async fn find_resident(&self, _id: &ResidentId) -> Result<Option<Resident>, StoreError> {
        offline()
    }

    async fn find_resident_by_key(
        &self,
        _name: &str,
        _neighborhood: &str,
    ) -> Result<Option<Resident>, StoreError> {
        offline()
    }

    async fn list_residents(&self) -> Result<Vec<Resident>, StoreError> {
        offline()
    }

    async fn set_complaint_refs(
        &self,
        _id: &ResidentId,
        _complaints: Vec<ComplaintId>,
    ) -> Result<bool, StoreError> {
        offline()
    }

    async fn push_complaint_ref(
        &self,
        _id: &ResidentId,
        _complaint: &ComplaintId,
    ) -> Result<bool, StoreError> {
        offline()
    }

    async fn pull_complaint_ref(
        &self,
        _id: &ResidentId,
        _complaint: &ComplaintId,
    ) -> Result<bool, StoreError> {
        offline()
    }

    async fn delete_resident(&self, _id: &ResidentId) -> Result<Option<Resident>, StoreError> {
        offline()
    }

    async fn insert_complaint(&self, _complaint: NewComplaint) -> Result<Complaint, StoreError> {
        offline()
    }

    async fn insert_complaints(
        &self,
        _complaints: Vec<NewComplaint>,
    ) -> Result<Vec<Complaint>, StoreError> {
        offline()
    }

    async fn find_complaint(
        &self,
        _scope: &ComplaintScope,
    ) -> Result<Option<Complaint>, StoreError> {
        offline()
    }

    async fn list_complaints(&self) -> Result<Vec<Complaint>, StoreError> {
        offline()
    }

    async fn complaints_of(&self, _resident: &ResidentId) -> Result<Vec<Complaint>, StoreError> {
        offline()
    }

    async fn complaints_by_ids(
        &self,
        _ids: &[ComplaintId],
    ) -> Result<Vec<Complaint>, StoreError> {
        offline()
    }

    async fn update_complaint(
        &self,
        _scope: &ComplaintScope,
        _changes: &ComplaintChanges,
    ) -> Result<Option<Complaint>, StoreError> {
        offline()
    }

    async fn delete_complaint(
        &self,
        _scope: &ComplaintScope,
    ) -> Result<Option<Complaint>, StoreError> {
        offline()
    }

    async fn delete_complaints_of(&self, _resident: &ResidentId) -> Result<u64, StoreError> {
        offline()
    }
}
