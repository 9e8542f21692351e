use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use super::domain::UnknownVariant;
use super::store::StoreError;

pub const RESIDENT_NOT_FOUND: &str = "Morador não encontrado";
pub const COMPLAINT_NOT_FOUND: &str = "Reclamação não encontrada";
pub const INTERNAL_ERROR: &str = "Erro interno do servidor";

/// Error raised by the resident directory and complaint ledger.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistryError {
    pub fn resident_not_found() -> Self {
        Self::NotFound(RESIDENT_NOT_FOUND)
    }

    pub fn complaint_not_found() -> Self {
        Self::NotFound(COMPLAINT_NOT_FOUND)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
            RegistryError::Validation(_) => StatusCode::BAD_REQUEST,
            RegistryError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UnknownVariant> for RegistryError {
    fn from(value: UnknownVariant) -> Self {
        Self::Validation(value.to_string())
    }
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            RegistryError::Store(err) => {
                error!(error = %err, "registry store failure");
                INTERNAL_ERROR.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({ "message": message }));
        (status, body).into_response()
    }
}
