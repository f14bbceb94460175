use thiserror::Error;
use trackweave_proto::{NodeId, TxId};

/// Error type for every public operation of the crate.
#[derive(Debug, Error)]
pub enum RdtError {
    /// The caller broke an operation's contract. Raised before any ledger I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// A record that had to be decoded wasn't a valid node.
    #[error("record {tx_id} is not a valid node: {source}")]
    Decode { tx_id: TxId, source: DecodeError },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("insufficient arguments: tail or head must be defined")]
    MissingEdge,
    #[error("tail and head must differ, both are {0}")]
    SelfReferentialEdge(NodeId),
    #[error("insufficient arguments: a chain and/or a wallet must be provided")]
    MissingRootOrWallet,
}

/// Failures reported by a [`crate::ledger::Ledger`] implementation.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger answered with a non-success status.
    #[error("{status}: {message}")]
    Status { status: u16, message: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LedgerError {
    pub fn status(status: u16, message: impl Into<String>) -> Self { LedgerError::Status { status, message: message.into() } }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("missing tag {0}")]
    MissingTag(&'static str),
    #[error("invalid value {value:?} for tag {tag}")]
    InvalidValue { tag: &'static str, value: String },
    #[error("expected a {expected} record, found {found}")]
    UnexpectedType { expected: crate::tags::NodeType, found: crate::tags::NodeType },
}
