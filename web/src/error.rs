use std::error::Error as StdError;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
};
use log::*;

use crate::response::ErrorResponse;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl Error {
    /// A request body that could not be parsed into the expected parameters.
    pub(crate) fn from_rejection(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {}", rejection.body_text());
        Self(DomainError::validation(rejection.body_text()))
    }
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

/// Maps a domain error kind onto the HTTP status returned to the client.
// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
pub(crate) fn status_code(error_kind: &DomainErrorKind) -> StatusCode {
    match error_kind {
        DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
            InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                EntityErrorKind::NotFound => StatusCode::NOT_FOUND,
                EntityErrorKind::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
                EntityErrorKind::Conflict(_) => StatusCode::CONFLICT,
                EntityErrorKind::DbTransaction | EntityErrorKind::Other(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            InternalErrorKind::Validation(_) => StatusCode::BAD_REQUEST,
            InternalErrorKind::Config(_) | InternalErrorKind::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
        DomainErrorKind::External(external_error_kind) => match external_error_kind {
            ExternalErrorKind::Network
            | ExternalErrorKind::Remote(_)
            | ExternalErrorKind::EmptyResponse(_) => StatusCode::BAD_GATEWAY,
            ExternalErrorKind::Extraction(_) | ExternalErrorKind::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = status_code(&self.0.error_kind);
        if status.is_server_error() {
            error!("Request failed with {status}: {:?}", self.0);
        } else {
            debug!("Request failed with {status}: {}", self.0);
        }

        (status, Json(ErrorResponse::new(self.0.to_string()))).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
