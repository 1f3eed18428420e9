use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::model::{CatalogError, Id};
use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    NotFound,
    Gone,
    BadRequest,
    Conflict,
    Internal,
}

/// Failure of a lifecycle operation
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("Instance '{0}' not found.")]
    NotFound(Id),
    #[error("Instance '{0}' not found.")]
    Gone(Id),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Storage failure: {0:#}")]
    Store(anyhow::Error),
}

impl BrokerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BrokerError::NotFound(_) => ErrorKind::NotFound,
            BrokerError::Gone(_) => ErrorKind::Gone,
            BrokerError::Catalog(_) | BrokerError::BadRequest(_) => ErrorKind::BadRequest,
            BrokerError::Conflict(_) => ErrorKind::Conflict,
            BrokerError::Store(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Gone => StatusCode::GONE,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for BrokerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(message) => BrokerError::Conflict(message),
            StoreError::Backend(e) => BrokerError::Store(e),
        }
    }
}

impl From<JsonRejection> for BrokerError {
    fn from(rejection: JsonRejection) -> Self {
        BrokerError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for BrokerError {
    fn from(rejection: QueryRejection) -> Self {
        BrokerError::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub description: String,
}

impl ErrorResponse {
    pub fn new(error: &str, description: &str) -> Self {
        Self {
            error: error.to_string(),
            description: description.to_string(),
        }
    }
}

impl IntoResponse for BrokerError {
    fn into_response(self) -> Response {
        let error = format!("{:?}", self.kind());
        (self.status_code(), Json(ErrorResponse::new(&error, &self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_and_status_codes() {
        let cases = vec![
            (BrokerError::NotFound("i1".to_string()), ErrorKind::NotFound, StatusCode::NOT_FOUND),
            (BrokerError::Gone("i1".to_string()), ErrorKind::Gone, StatusCode::GONE),
            (
                BrokerError::Catalog(CatalogError::UnknownPlan("xl".to_string())),
                ErrorKind::BadRequest,
                StatusCode::BAD_REQUEST,
            ),
            (BrokerError::BadRequest("no".to_string()), ErrorKind::BadRequest, StatusCode::BAD_REQUEST),
            (BrokerError::Conflict("dup".to_string()), ErrorKind::Conflict, StatusCode::CONFLICT),
            (
                BrokerError::Store(anyhow::anyhow!("connection reset")),
                ErrorKind::Internal,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, kind, status) in cases {
            assert_eq!(err.kind(), kind);
            assert_eq!(err.status_code(), status);
        }
    }

    #[test]
    fn test_store_errors_convert() {
        let err: BrokerError = StoreError::Conflict("id taken".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "id taken");

        let err: BrokerError = StoreError::Backend(anyhow::anyhow!("timeout")).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_messages() {
        assert_eq!(BrokerError::NotFound("i1".to_string()).to_string(), "Instance 'i1' not found.");
        assert_eq!(
            BrokerError::from(CatalogError::UnknownService("db".to_string())).to_string(),
            "Unknown service ID 'db'."
        );
    }
}
