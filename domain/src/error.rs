//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries. Ex. `domain` is dependent on `entity_api`, and `web` is dependent on `domain`.
/// but `web` should not be dependent, directly, on `entity_api`. Ultimately the various
/// `error_kind`s are used by `web` to return appropriate HTTP status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    /// Input rejected before any I/O was attempted.
    Validation(String),
    /// Required configuration (e.g. a credential) is missing.
    Config(String),
    Other(String),
}

/// Enum representing the various kinds of entity errors that can bubble up from the "Entity" layer (`entity_api` and `entity`).
/// These errors are translated from the `entity_api` layer to the `domain` layer and reduced to a subset of error kinds
/// that are relevant to the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    Conflict(String),
    DbTransaction,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// A remote service reported its own failure. The message is the service's, verbatim.
    Remote(String),
    /// A well formed response that carried no usable content.
    EmptyResponse(String),
    /// The external media tool failed or produced no artifact. Holds the tool's output.
    Extraction(String),
    Other(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::internal(InternalErrorKind::Validation(message.into()))
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::internal(InternalErrorKind::Config(message.into()))
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::external(ExternalErrorKind::Remote(message.into()))
    }

    pub fn empty_response(message: impl Into<String>) -> Self {
        Self::external(ExternalErrorKind::EmptyResponse(message.into()))
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::external(ExternalErrorKind::Extraction(message.into()))
    }

    fn internal(kind: InternalErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(kind),
        }
    }

    fn external(kind: ExternalErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::External(kind),
        }
    }
}

impl fmt::Display for DomainErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DomainErrorKind::Internal(kind) => match kind {
                InternalErrorKind::Entity(EntityErrorKind::NotFound) => write!(f, "record not found"),
                InternalErrorKind::Entity(EntityErrorKind::Invalid) => write!(f, "invalid record"),
                InternalErrorKind::Entity(EntityErrorKind::Conflict(msg)) => write!(f, "{msg}"),
                InternalErrorKind::Entity(EntityErrorKind::DbTransaction) => {
                    write!(f, "database transaction failed")
                }
                InternalErrorKind::Entity(EntityErrorKind::Other(msg)) => {
                    write!(f, "database error: {msg}")
                }
                InternalErrorKind::Validation(msg) => write!(f, "{msg}"),
                InternalErrorKind::Config(msg) => write!(f, "{msg}"),
                InternalErrorKind::Other(msg) => write!(f, "internal error: {msg}"),
            },
            DomainErrorKind::External(kind) => match kind {
                ExternalErrorKind::Network => write!(f, "network error contacting remote service"),
                ExternalErrorKind::Remote(msg) => write!(f, "remote service error: {msg}"),
                ExternalErrorKind::EmptyResponse(msg) => write!(f, "{msg}"),
                ExternalErrorKind::Extraction(msg) => write!(f, "{msg}"),
                ExternalErrorKind::Other(msg) => write!(f, "{msg}"),
            },
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.error_kind)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::InvalidQueryTerm => EntityErrorKind::Invalid,
            EntityApiErrorKind::RecordNotInserted => EntityErrorKind::DbTransaction,
            _ => EntityErrorKind::Other(err.to_string()),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(format!(
                "I/O error: {err}"
            ))),
            source: Some(Box::new(err)),
        }
    }
}
