use plait_messages::MessageError;
use plait_types::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("block {number} has already been committed")]
    AlreadyFinalized { number: u64 },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("missing ancestor: {0}")]
    MissingAncestor(String),

    #[error("hash mismatch: {0}")]
    HashMismatch(String),

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("message error: {0}")]
    Message(#[from] MessageError),
}
