//! MongoDB-backed registry store.
//!
//! Documents carry BSON `ObjectId`s for `_id`, the complaint owner, and the resident's
//! reference list. The rest of the crate only sees their hex form; a string that does not
//! parse as an `ObjectId` cannot name a stored record and reads as absent.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{
    Complaint, ComplaintChanges, ComplaintId, ComplaintStatus, ComplaintType, NewComplaint,
    NewResident, Resident, ResidentId,
};
use super::store::{ComplaintScope, RegistryStore, StoreError};

pub const RESIDENT_COLLECTION: &str = "residents";
pub const COMPLAINT_COLLECTION: &str = "complaints";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResidentDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    neighborhood: String,
    #[serde(default)]
    complaints: Vec<ObjectId>,
    #[serde(
        rename = "createdAt",
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    created_at: DateTime<Utc>,
}

impl From<ResidentDocument> for Resident {
    fn from(value: ResidentDocument) -> Self {
        Self {
            id: ResidentId(value.id.to_hex()),
            name: value.name,
            neighborhood: value.neighborhood,
            complaints: value
                .complaints
                .into_iter()
                .map(|id| ComplaintId(id.to_hex()))
                .collect(),
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ComplaintDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    resident: ObjectId,
    #[serde(rename = "type")]
    kind: ComplaintType,
    description: String,
    location: String,
    #[serde(default)]
    status: ComplaintStatus,
    #[serde(
        rename = "createdAt",
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    created_at: DateTime<Utc>,
}

impl ComplaintDocument {
    fn new(complaint: NewComplaint) -> Result<Self, StoreError> {
        let resident = object_id(&complaint.resident.0).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "`{}` is not a valid resident id",
                complaint.resident
            ))
        })?;

        Ok(Self {
            id: ObjectId::new(),
            resident,
            kind: complaint.kind,
            description: complaint.description,
            location: complaint.location,
            status: complaint.status,
            created_at: complaint.created_at,
        })
    }
}

impl From<ComplaintDocument> for Complaint {
    fn from(value: ComplaintDocument) -> Self {
        Self {
            id: ComplaintId(value.id.to_hex()),
            resident: ResidentId(value.resident.to_hex()),
            kind: value.kind,
            description: value.description,
            location: value.location,
            status: value.status,
            created_at: value.created_at,
        }
    }
}

/// Store backed by two MongoDB collections.
#[derive(Clone)]
pub struct MongoStore {
    residents: Collection<ResidentDocument>,
    complaints: Collection<ComplaintDocument>,
}

impl MongoStore {
    /// Connect, verify the server answers a ping, and ensure lookup indexes exist.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        info!(database = db_name, "connecting to MongoDB");

        // Fail fast instead of hanging on an unreachable server.
        let timeout_uri = if uri.contains('?') {
            format!("{uri}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000")
        } else {
            format!("{uri}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000")
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| unavailable("failed to connect to MongoDB", e))?;
        let database = client.database(db_name);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| unavailable("MongoDB ping failed", e))?;

        let store = Self {
            residents: database.collection(RESIDENT_COLLECTION),
            complaints: database.collection(COMPLAINT_COLLECTION),
        };
        store.ensure_indexes().await?;

        info!(database = db_name, "connected to MongoDB");
        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let natural_key = IndexModel::builder()
            .keys(doc! { "name": 1, "neighborhood": 1 })
            .options(Some(
                IndexOptions::builder()
                    .name("name_neighborhood".to_string())
                    .build(),
            ))
            .build();
        self.residents
            .create_index(natural_key)
            .await
            .map_err(|e| unavailable("failed to create resident index", e))?;

        let owner = IndexModel::builder()
            .keys(doc! { "resident": 1 })
            .options(Some(
                IndexOptions::builder().name("resident".to_string()).build(),
            ))
            .build();
        self.complaints
            .create_index(owner)
            .await
            .map_err(|e| unavailable("failed to create complaint index", e))?;

        Ok(())
    }

    async fn find_residents(&self, filter: Document) -> Result<Vec<Resident>, StoreError> {
        let cursor = self
            .residents
            .find(filter)
            .await
            .map_err(|e| unavailable("resident query failed", e))?;
        let documents: Vec<ResidentDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| corrupt("resident cursor", e))?;
        Ok(documents.into_iter().map(Resident::from).collect())
    }

    async fn find_complaints(&self, filter: Document) -> Result<Vec<Complaint>, StoreError> {
        let cursor = self
            .complaints
            .find(filter)
            .await
            .map_err(|e| unavailable("complaint query failed", e))?;
        let documents: Vec<ComplaintDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| corrupt("complaint cursor", e))?;
        Ok(documents.into_iter().map(Complaint::from).collect())
    }

    async fn update_resident(&self, id: &ResidentId, update: Document) -> Result<bool, StoreError> {
        let Some(oid) = object_id(&id.0) else {
            return Ok(false);
        };
        let result = self
            .residents
            .update_one(doc! { "_id": oid }, update)
            .await
            .map_err(|e| unavailable("resident update failed", e))?;
        Ok(result.matched_count > 0)
    }
}

fn unavailable(context: &str, err: mongodb::error::Error) -> StoreError {
    StoreError::Unavailable(format!("{context}: {err}"))
}

fn corrupt(context: &str, err: mongodb::error::Error) -> StoreError {
    StoreError::Corrupt(format!("{context}: {err}"))
}

fn object_id(raw: &str) -> Option<ObjectId> {
    ObjectId::parse_str(raw).ok()
}

fn object_ids(ids: &[ComplaintId]) -> Vec<ObjectId> {
    ids.iter().filter_map(|id| object_id(&id.0)).collect()
}

/// `None` when either id is malformed, since no stored complaint can match it.
fn scope_filter(scope: &ComplaintScope) -> Option<Document> {
    let mut filter = doc! { "_id": object_id(&scope.complaint.0)? };
    if let Some(resident) = &scope.resident {
        filter.insert("resident", object_id(&resident.0)?);
    }
    Some(filter)
}

fn changes_document(changes: &ComplaintChanges) -> Document {
    let mut set = Document::new();
    if let Some(kind) = changes.kind {
        set.insert("type", kind.as_str());
    }
    if let Some(description) = &changes.description {
        set.insert("description", description.as_str());
    }
    if let Some(location) = &changes.location {
        set.insert("location", location.as_str());
    }
    if let Some(status) = changes.status {
        set.insert("status", status.as_str());
    }
    set
}

#[async_trait]
impl RegistryStore for MongoStore {
    async fn insert_resident(&self, resident: NewResident) -> Result<Resident, StoreError> {
        let document = ResidentDocument {
            id: ObjectId::new(),
            name: resident.name,
            neighborhood: resident.neighborhood,
            complaints: Vec::new(),
            created_at: resident.created_at,
        };
        self.residents
            .insert_one(&document)
            .await
            .map_err(|e| unavailable("resident insert failed", e))?;
        Ok(document.into())
    }

    async fn find_resident(&self, id: &ResidentId) -> Result<Option<Resident>, StoreError> {
        let Some(oid) = object_id(&id.0) else {
            return Ok(None);
        };
        let found = self
            .residents
            .find_one(doc! { "_id": oid })
            .await
            .map_err(|e| unavailable("resident lookup failed", e))?;
        Ok(found.map(Resident::from))
    }

    async fn find_resident_by_key(
        &self,
        name: &str,
        neighborhood: &str,
    ) -> Result<Option<Resident>, StoreError> {
        let found = self
            .residents
            .find_one(doc! { "name": name, "neighborhood": neighborhood })
            .await
            .map_err(|e| unavailable("resident lookup failed", e))?;
        Ok(found.map(Resident::from))
    }

    async fn list_residents(&self) -> Result<Vec<Resident>, StoreError> {
        self.find_residents(Document::new()).await
    }

    async fn set_complaint_refs(
        &self,
        id: &ResidentId,
        complaints: Vec<ComplaintId>,
    ) -> Result<bool, StoreError> {
        let refs = object_ids(&complaints);
        if refs.len() != complaints.len() {
            warn!(resident = %id, "dropping malformed complaint references");
        }
        self.update_resident(id, doc! { "$set": { "complaints": refs } })
            .await
    }

    async fn push_complaint_ref(
        &self,
        id: &ResidentId,
        complaint: &ComplaintId,
    ) -> Result<bool, StoreError> {
        let Some(complaint) = object_id(&complaint.0) else {
            return Ok(false);
        };
        self.update_resident(id, doc! { "$push": { "complaints": complaint } })
            .await
    }

    async fn pull_complaint_ref(
        &self,
        id: &ResidentId,
        complaint: &ComplaintId,
    ) -> Result<bool, StoreError> {
        let Some(complaint) = object_id(&complaint.0) else {
            return Ok(false);
        };
        self.update_resident(id, doc! { "$pull": { "complaints": complaint } })
            .await
    }

    async fn delete_resident(&self, id: &ResidentId) -> Result<Option<Resident>, StoreError> {
        let Some(oid) = object_id(&id.0) else {
            return Ok(None);
        };
        let deleted = self
            .residents
            .find_one_and_delete(doc! { "_id": oid })
            .await
            .map_err(|e| unavailable("resident delete failed", e))?;
        Ok(deleted.map(Resident::from))
    }

    async fn insert_complaint(&self, complaint: NewComplaint) -> Result<Complaint, StoreError> {
        let document = ComplaintDocument::new(complaint)?;
        self.complaints
            .insert_one(&document)
            .await
            .map_err(|e| unavailable("complaint insert failed", e))?;
        Ok(document.into())
    }

    async fn insert_complaints(
        &self,
        complaints: Vec<NewComplaint>,
    ) -> Result<Vec<Complaint>, StoreError> {
        if complaints.is_empty() {
            return Ok(Vec::new());
        }

        let documents = complaints
            .into_iter()
            .map(ComplaintDocument::new)
            .collect::<Result<Vec<_>, _>>()?;
        self.complaints
            .insert_many(&documents)
            .await
            .map_err(|e| unavailable("complaint bulk insert failed", e))?;
        Ok(documents.into_iter().map(Complaint::from).collect())
    }

    async fn find_complaint(
        &self,
        scope: &ComplaintScope,
    ) -> Result<Option<Complaint>, StoreError> {
        let Some(filter) = scope_filter(scope) else {
            return Ok(None);
        };
        let found = self
            .complaints
            .find_one(filter)
            .await
            .map_err(|e| unavailable("complaint lookup failed", e))?;
        Ok(found.map(Complaint::from))
    }

    async fn list_complaints(&self) -> Result<Vec<Complaint>, StoreError> {
        self.find_complaints(Document::new()).await
    }

    async fn complaints_of(&self, resident: &ResidentId) -> Result<Vec<Complaint>, StoreError> {
        let Some(oid) = object_id(&resident.0) else {
            return Ok(Vec::new());
        };
        self.find_complaints(doc! { "resident": oid }).await
    }

    async fn complaints_by_ids(&self, ids: &[ComplaintId]) -> Result<Vec<Complaint>, StoreError> {
        let oids = object_ids(ids);
        if oids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_complaints(doc! { "_id": { "$in": oids } })
            .await
    }

    async fn update_complaint(
        &self,
        scope: &ComplaintScope,
        changes: &ComplaintChanges,
    ) -> Result<Option<Complaint>, StoreError> {
        if changes.is_empty() {
            return self.find_complaint(scope).await;
        }
        let Some(filter) = scope_filter(scope) else {
            return Ok(None);
        };

        let updated = self
            .complaints
            .find_one_and_update(filter, doc! { "$set": changes_document(changes) })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| unavailable("complaint update failed", e))?;
        Ok(updated.map(Complaint::from))
    }

    async fn delete_complaint(
        &self,
        scope: &ComplaintScope,
    ) -> Result<Option<Complaint>, StoreError> {
        let Some(filter) = scope_filter(scope) else {
            return Ok(None);
        };
        let deleted = self
            .complaints
            .find_one_and_delete(filter)
            .await
            .map_err(|e| unavailable("complaint delete failed", e))?;
        Ok(deleted.map(Complaint::from))
    }

    async fn delete_complaints_of(&self, resident: &ResidentId) -> Result<u64, StoreError> {
        let Some(oid) = object_id(&resident.0) else {
            return Ok(0);
        };
        let result = self
            .complaints
            .delete_many(doc! { "resident": oid })
            .await
            .map_err(|e| unavailable("complaint bulk delete failed", e))?;
        Ok(result.deleted_count)
    }
}
