//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

use sea_orm::error::DbErr;

/// Errors while executing operations related to entities.
/// The intent is to categorize errors into two major types:
///  * Errors related to data. Ex DbErr::RecordNotFound
///  * Errors related to interactions with the database itself. Ex DbErr::Conn
#[derive(Debug, PartialEq)]
pub struct Error {
    // Underlying error emitted from seaORM internals
    pub source: Option<DbErr>,
    // Enum representing which category of error
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, PartialEq, Serialize)]
pub enum EntityApiErrorKind {
    // Invalid search term
    InvalidQueryTerm,
    // Record not found
    RecordNotFound,
    // Record not inserted
    RecordNotInserted,
    // Errors related to interactions with the database itself. Ex DbErr::Conn
    SystemError,
    // Other errors
    Other,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Entity API Error ({:?}): {source}", self.error_kind),
            None => write!(f, "Entity API Error: {:?}", self.error_kind),
        }
    }
}

impl StdError for Error {}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        let error_kind = match err {
            DbErr::RecordNotFound(_) => EntityApiErrorKind::RecordNotFound,
            DbErr::RecordNotInserted => EntityApiErrorKind::RecordNotInserted,
            DbErr::Type(_) | DbErr::Json(_) => EntityApiErrorKind::InvalidQueryTerm,
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) | DbErr::Exec(_) | DbErr::Query(_) => {
                EntityApiErrorKind::SystemError
            }
            _ => EntityApiErrorKind::Other,
        };

        Error {
            source: Some(err),
            error_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_not_found_maps_to_record_not_found_kind() {
        let err: Error = DbErr::RecordNotFound("users".to_string()).into();
        assert_eq!(err.error_kind, EntityApiErrorKind::RecordNotFound);
    }

    #[test]
    fn record_not_inserted_maps_to_record_not_inserted_kind() {
        let err: Error = DbErr::RecordNotInserted.into();
        assert_eq!(err.error_kind, EntityApiErrorKind::RecordNotInserted);
    }

    #[test]
    fn custom_db_error_maps_to_other_kind() {
        let err: Error = DbErr::Custom("boom".to_string()).into();
        assert_eq!(err.error_kind, EntityApiErrorKind::Other);
        assert!(err.to_string().contains("boom"));
    }
}
