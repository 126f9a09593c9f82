use crate::domain::correlation::CorrelationMap;
use std::fmt;
use thiserror::Error;

/// What a failed lookup was looking for.
///
/// Kept distinct so operators can tell "no such peer" apart from
/// "no such prior request".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    Peer,
    Endpoint,
    OutgoingHandler,
    Request(CorrelationMap),
    OutgoingTransfer,
}

impl fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundKind::Peer => f.write_str("peer information"),
            NotFoundKind::Endpoint => f.write_str("endpoint"),
            NotFoundKind::OutgoingHandler => f.write_str("outgoing handler"),
            NotFoundKind::Request(map) => write!(f, "{map} request"),
            NotFoundKind::OutgoingTransfer => f.write_str("outgoing transfer leg"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SwitchError {
    #[error("no {kind} found for id={id}")]
    NotFound { kind: NotFoundKind, id: String },
    #[error("no route found for address={address}")]
    Unroutable { address: String },
    #[error("exchange rule cannot convert from {from} to {to}")]
    UnsupportedConversion { from: String, to: String },
    #[error("rule {rule} cannot handle requests while {state}")]
    InvalidState { rule: String, state: String },
    #[error("peer {id} is already registered")]
    AlreadyExists { id: String },
    #[error("invalid message: {0}")]
    InvalidMessage(String),
    #[error("failed to send packet to {peer}: {reason}")]
    Transport { peer: String, reason: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl SwitchError {
    pub fn not_found(kind: NotFoundKind, id: impl Into<String>) -> Self {
        SwitchError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SwitchError>;
