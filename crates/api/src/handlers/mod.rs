pub mod resource;
pub mod system;

pub use resource::{create_handler, delete_handler, fetch_handler, update_handler};
pub use system::{health_handler, metrics_handler};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use fitlog_domain::model::ResourceKind;
use fitlog_domain::storage::StorageError;
use metrics::counter;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, IntoStaticStr};
use thiserror::Error;
use tracing::error;

/// Body sent for every unexpected failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong!";

/// Everything a handler can fail with. Handlers only return these; the
/// `ResponseError` impl below is the single place that picks status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid {kind} ID")]
    InvalidIdentifier { kind: ResourceKind },
    #[error("{} not found", .kind.title())]
    NotFound { kind: ResourceKind },
    #[error("Invalid new {kind}")]
    InvalidEntity { kind: ResourceKind },
    #[error("No fields provided for update")]
    EmptyUpdate,
    #[error("Invalid update fields")]
    InvalidUpdateFields,
    #[error("Malformed JSON body")]
    MalformedBody(String),
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    InvalidIdentifier,
    NotFound,
    InvalidEntity,
    EmptyUpdate,
    InvalidUpdateFields,
    MalformedBody,
    InternalError,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidIdentifier { .. } => ErrorKind::InvalidIdentifier,
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            ApiError::InvalidEntity { .. } => ErrorKind::InvalidEntity,
            ApiError::EmptyUpdate => ErrorKind::EmptyUpdate,
            ApiError::InvalidUpdateFields => ErrorKind::InvalidUpdateFields,
            ApiError::MalformedBody(_) => ErrorKind::MalformedBody,
            ApiError::Storage(_) | ApiError::Serialization(_) => ErrorKind::InternalError,
        }
    }

    /// Maps a failed write: schema violations are the client's fault,
    /// anything else is internal.
    pub fn from_write(kind: ResourceKind, err: StorageError) -> Self {
        match err {
            StorageError::Schema(_) => ApiError::InvalidEntity { kind },
            other => ApiError::Storage(other),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidIdentifier
            | ErrorKind::InvalidEntity
            | ErrorKind::EmptyUpdate
            | ErrorKind::InvalidUpdateFields
            | ErrorKind::MalformedBody => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self.kind() {
            ErrorKind::InternalError => {
                error!(error = %self, "request failed unexpectedly");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            _ => self.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { error: message })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    Fetch,
    Delete,
    Create,
    Update,
}

pub(crate) fn observe<T>(kind: ResourceKind, op: Operation, result: &Result<T, ApiError>) {
    let outcome: &'static str = match result {
        Ok(_) => "ok",
        Err(err) => err.kind().into(),
    };
    let resource: &'static str = kind.into();
    let op: &'static str = op.into();
    counter!(
        "api_requests_total",
        "resource" => resource,
        "op" => op,
        "outcome" => outcome
    )
    .increment(1);
}
