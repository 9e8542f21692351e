use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::directory::ResidentDirectory;
use super::domain::{ComplaintDraft, ComplaintId, ResidentId};
use super::error::RegistryError;
use super::ledger::ComplaintLedger;
use super::store::RegistryStore;
use super::validation::required_text;

pub const COMPLAINT_REMOVED: &str = "Reclamação removida com sucesso";
pub const INVALID_BODY: &str = "Corpo da requisição inválido";
pub const RESIDENT_REMOVED: &str = "Morador e suas reclamações foram removidos com sucesso";

/// Shared handles injected into every registry handler.
pub struct RegistryState<S> {
    pub ledger: Arc<ComplaintLedger<S>>,
    pub directory: Arc<ResidentDirectory<S>>,
}

impl<S> RegistryState<S>
where
    S: RegistryStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            ledger: Arc::new(ComplaintLedger::new(store.clone())),
            directory: Arc::new(ResidentDirectory::new(store)),
        }
    }
}

impl<S> Clone for RegistryState<S> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            directory: self.directory.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateComplaintRequest {
    #[serde(rename = "residentId", default)]
    pub(crate) resident_id: Option<String>,
    #[serde(flatten)]
    pub(crate) draft: ComplaintDraft,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateResidentRequest {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) neighborhood: Option<String>,
    #[serde(default)]
    pub(crate) complaints: Option<Vec<ComplaintDraft>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileComplaintRequest {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) neighborhood: Option<String>,
    #[serde(default)]
    pub(crate) complaint: Option<ComplaintDraft>,
}

/// Router builder exposing the resident and complaint endpoints.
pub fn registry_router<S>(state: RegistryState<S>) -> Router
where
    S: RegistryStore + 'static,
{
    Router::new()
        .route(
            "/complaints",
            post(create_complaint::<S>).get(list_complaints::<S>),
        )
        .route(
            "/complaints/:complaint_id",
            get(get_complaint::<S>)
                .put(update_complaint::<S>)
                .delete(delete_complaint::<S>),
        )
        .route(
            "/residents",
            post(create_resident::<S>).get(list_residents::<S>),
        )
        .route("/residents/addComplaint", post(file_complaint::<S>))
        .route(
            "/residents/:resident_id",
            axum::routing::delete(delete_resident::<S>),
        )
        .route(
            "/residents/:resident_id/complaints",
            post(add_resident_complaint::<S>),
        )
        .route(
            "/residents/:resident_id/complaints/:complaint_id",
            put(update_resident_complaint::<S>).delete(remove_resident_complaint::<S>),
        )
        .with_state(state)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RegistryError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| {
            RegistryError::Validation(format!("{INVALID_BODY}: {}", rejection.body_text()))
        })
}

fn removed(message: &'static str) -> Response {
    (StatusCode::OK, Json(json!({ "message": message }))).into_response()
}

pub(crate) async fn create_complaint<S>(
    State(state): State<RegistryState<S>>,
    payload: Result<Json<CreateComplaintRequest>, JsonRejection>,
) -> Result<Response, RegistryError>
where
    S: RegistryStore + 'static,
{
    let request = body(payload)?;
    let resident_id = ResidentId(required_text("residentId", request.resident_id)?);
    let complaint = state.ledger.create(&resident_id, request.draft).await?;
    Ok((StatusCode::CREATED, Json(complaint)).into_response())
}

pub(crate) async fn list_complaints<S>(
    State(state): State<RegistryState<S>>,
) -> Result<Response, RegistryError>
where
    S: RegistryStore + 'static,
{
    let complaints = state.ledger.list().await?;
    Ok((StatusCode::OK, Json(complaints)).into_response())
}

pub(crate) async fn get_complaint<S>(
    State(state): State<RegistryState<S>>,
    Path(complaint_id): Path<String>,
) -> Result<Response, RegistryError>
where
    S: RegistryStore + 'static,
{
    let complaint = state.ledger.get(&ComplaintId(complaint_id)).await?;
    Ok((StatusCode::OK, Json(complaint)).into_response())
}

pub(crate) async fn update_complaint<S>(
    State(state): State<RegistryState<S>>,
    Path(complaint_id): Path<String>,
    payload: Result<Json<ComplaintDraft>, JsonRejection>,
) -> Result<Response, RegistryError>
where
    S: RegistryStore + 'static,
{
    let draft = body(payload)?;
    let complaint = state
        .ledger
        .update(&ComplaintId(complaint_id), draft)
        .await?;
    Ok((StatusCode::OK, Json(complaint)).into_response())
}

pub(crate) async fn delete_complaint<S>(
    State(state): State<RegistryState<S>>,
    Path(complaint_id): Path<String>,
) -> Result<Response, RegistryError>
where
    S: RegistryStore + 'static,
{
    state.ledger.delete(&ComplaintId(complaint_id)).await?;
    Ok(removed(COMPLAINT_REMOVED))
}

pub(crate) async fn create_resident<S>(
    State(state): State<RegistryState<S>>,
    payload: Result<Json<CreateResidentRequest>, JsonRejection>,
) -> Result<Response, RegistryError>
where
    S: RegistryStore + 'static,
{
    let request = body(payload)?;
    let resident = state
        .directory
        .create(
            request.name,
            request.neighborhood,
            request.complaints.unwrap_or_default(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(resident)).into_response())
}

pub(crate) async fn file_complaint<S>(
    State(state): State<RegistryState<S>>,
    payload: Result<Json<FileComplaintRequest>, JsonRejection>,
) -> Result<Response, RegistryError>
where
    S: RegistryStore + 'static,
{
    let request = body(payload)?;
    let filed = state
        .directory
        .find_or_create_and_add_complaint(
            request.name,
            request.neighborhood,
            request.complaint.unwrap_or_default(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(filed)).into_response())
}

pub(crate) async fn list_residents<S>(
    State(state): State<RegistryState<S>>,
) -> Result<Response, RegistryError>
where
    S: RegistryStore + 'static,
{
    let residents = state.directory.list().await?;
    Ok((StatusCode::OK, Json(residents)).into_response())
}

pub(crate) async fn add_resident_complaint<S>(
    State(state): State<RegistryState<S>>,
    Path(resident_id): Path<String>,
    payload: Result<Json<ComplaintDraft>, JsonRejection>,
) -> Result<Response, RegistryError>
where
    S: RegistryStore + 'static,
{
    let draft = body(payload)?;
    let complaint = state
        .directory
        .add_complaint(&ResidentId(resident_id), draft)
        .await?;
    Ok((StatusCode::CREATED, Json(complaint)).into_response())
}

pub(crate) async fn update_resident_complaint<S>(
    State(state): State<RegistryState<S>>,
    Path((resident_id, complaint_id)): Path<(String, String)>,
    payload: Result<Json<ComplaintDraft>, JsonRejection>,
) -> Result<Response, RegistryError>
where
    S: RegistryStore + 'static,
{
    let draft = body(payload)?;
    let complaint = state
        .directory
        .update_complaint(
            &ResidentId(resident_id),
            &ComplaintId(complaint_id),
            draft,
        )
        .await?;
    Ok((StatusCode::OK, Json(complaint)).into_response())
}

pub(crate) async fn remove_resident_complaint<S>(
    State(state): State<RegistryState<S>>,
    Path((resident_id, complaint_id)): Path<(String, String)>,
) -> Result<Response, RegistryError>
where
    S: RegistryStore + 'static,
{
    state
        .directory
        .remove_complaint(&ResidentId(resident_id), &ComplaintId(complaint_id))
        .await?;
    Ok(removed(COMPLAINT_REMOVED))
}

pub(crate) async fn delete_resident<S>(
    State(state): State<RegistryState<S>>,
    Path(resident_id): Path<String>,
) -> Result<Response, RegistryError>
where
    S: RegistryStore + 'static,
{
    state.directory.delete(&ResidentId(resident_id)).await?;
    Ok(removed(RESIDENT_REMOVED))
}
