//! Error types for the `domain` layer.
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. Ultimately the various `error_kind`s are used by `web` to
/// return appropriate HTTP status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config,
    Other(String),
}

/// Enum representing the kinds of errors raised about the records the domain
/// layer stores and reads.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    Unauthenticated,
    Other(String),
}

impl Error {
    pub(crate) fn entity(kind: EntityErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(kind)),
        }
    }

    pub(crate) fn not_found() -> Self {
        Self::entity(EntityErrorKind::NotFound)
    }

    pub(crate) fn invalid() -> Self {
        Self::entity(EntityErrorKind::Invalid)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// Any token that fails to decode or validate is treated as a missing identity.
impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        let internal_kind = match err.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidKeyFormat => InternalErrorKind::Config,
            _ => InternalErrorKind::Entity(EntityErrorKind::Unauthenticated),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(internal_kind),
        }
    }
}

impl From<events::Error> for Error {
    fn from(err: events::Error) -> Self {
        Error {
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(err.to_string())),
            source: Some(Box::new(err)),
        }
    }
}

// Handlers return domain errors to the bus, which logs them with their cause.
impl From<Error> for events::Error {
    fn from(err: Error) -> Self {
        events::Error::handler(err)
    }
}
