use super::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("required field is missing. field={0}")]
    MissingField(&'static str),
    #[error("client id must be 16 bytes (len={0})")]
    BadClientId(usize),
    #[error("group id must be 16 bytes (len={0})")]
    BadGroupId(usize),
    #[error("peer (peer_id={0}) not found")]
    PeerNotFound(PeerId),
    #[error("peer address is broken. address={0}")]
    BadAddress(String),
    #[error("exception type {0} is not registered")]
    UnknownExceptionType(String),
    #[error("failed to instantiate exception type {type_name}. reason={reason}")]
    ExceptionInstantiation { type_name: String, reason: String },
}
