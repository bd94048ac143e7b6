//! Error types for the `events` crate.
//!
//! Follows the same pattern as the other layers: a root `Error` struct holding
//! an error kind and an optional source for chaining.

use crate::payload::EventType;
use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: EventErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum EventErrorKind {
    /// A handler asked for a payload type the event does not carry.
    PayloadMismatch {
        expected: EventType,
        found: EventType,
    },
    /// A handler failed while reacting to an event.
    Handler,
    /// The queued dispatcher is no longer accepting events.
    DispatcherClosed,
}

impl Error {
    /// Wraps a handler-side failure so the bus can log it with its cause.
    pub fn handler<E>(source: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Error {
            source: Some(source.into()),
            error_kind: EventErrorKind::Handler,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            EventErrorKind::PayloadMismatch { expected, found } => {
                write!(f, "expected a {expected} payload but the event carries {found}")
            }
            EventErrorKind::Handler => match &self.source {
                Some(source) => write!(f, "event handler failed: {source}"),
                None => write!(f, "event handler failed"),
            },
            EventErrorKind::DispatcherClosed => write!(f, "event dispatcher is closed"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}
