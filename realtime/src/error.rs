//! Error types for the `realtime` crate.

use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: RealtimeErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum RealtimeErrorKind {
    /// The event could not be serialized for the wire.
    Encode,
    /// The peer is gone; nothing more can be written.
    TransportClosed,
    /// Writing to the transport failed.
    Transport,
}

impl Error {
    pub fn transport_closed() -> Self {
        Error {
            source: None,
            error_kind: RealtimeErrorKind::TransportClosed,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.error_kind, &self.source) {
            (RealtimeErrorKind::TransportClosed, _) => write!(f, "transport closed"),
            (kind, Some(source)) => write!(f, "{kind:?}: {source}"),
            (kind, None) => write!(f, "{kind:?}"),
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

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: RealtimeErrorKind::Encode,
        }
    }
}

impl From<axum::Error> for Error {
    fn from(err: axum::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: RealtimeErrorKind::Transport,
        }
    }
}
