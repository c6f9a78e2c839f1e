#![deny(unused_must_use)]

//! Marshaling of the client protocol of a replicated state machine.
//!
//! Requests and replies exchanged between a client and a cluster member are
//! plain value objects here. They are converted to and from the protobuf
//! messages in [`proto`], including the failures raised on the server side
//! (leadership redirection and state machine errors).

mod error;
pub use error::Error;

/// Wire messages generated from `proto/raft_client.proto`.
pub mod proto {
    tonic::include_proto!("raft_client");
}

/// Peer and group descriptors.
mod group;
pub use group::{Group, Peer};

/// Opaque application payload.
mod message;
pub use message::Message;

/// Identity and sequencing metadata of requests and replies.
pub mod header;
pub use header::{ReplyHeader, RequestHeader};

/// Codec of the four request kinds.
pub mod request;
pub use request::{
    ClientRequest, ReinitializeRequest, ServerInformationRequest, SetConfigurationRequest,
};

/// Codec of the two reply kinds.
pub mod reply;
pub use reply::{ClientReply, ReplyFailure, ServerInformationReply};

/// Server side failures carried by replies.
pub mod exception;
pub use exception::{
    AppException, ExceptionKind, ExceptionRegistry, NotLeaderError, StackFrame, StackTrace,
    StateMachineError,
};

/// One-line summaries of wire messages for logging.
pub mod debug;

/// gRPC service adapter for the server side.
pub mod service;

/// gRPC transport for the client side.
pub mod client;

/// Reflection service for the wire schema.
pub mod reflection;

use anyhow::Result;
use bytes::Bytes;
use derive_more::Display;
use tracing::{debug, warn};

/// Identifier of a call. Unique per client for the lifetime of a session.
pub type CallId = u64;

/// Sequence number of a call. Increases with each retransmission.
pub type SeqNum = u64;

/// Identifier of a client.
/// Always a UUID. Its wire form is exactly 16 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display)]
#[display("client-{}", _0.simple())]
pub struct ClientId(uuid::Uuid);

impl ClientId {
    pub fn new(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub(crate) fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.0.as_bytes())
    }

    pub(crate) fn from_bytes(x: &[u8]) -> Result<Self> {
        let uuid = uuid::Uuid::from_slice(x).map_err(|_| Error::BadClientId(x.len()))?;
        Ok(Self(uuid))
    }
}

/// Identifier of a cluster member.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.0.as_bytes())
    }

    pub(crate) fn from_bytes(x: &[u8]) -> Self {
        Self(String::from_utf8_lossy(x).into_owned())
    }
}

impl From<&str> for PeerId {
    fn from(x: &str) -> Self {
        Self::new(x)
    }
}

impl From<String> for PeerId {
    fn from(x: String) -> Self {
        Self(x)
    }
}

/// Identifier of a replication group.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display)]
#[display("group-{}", _0.simple())]
pub struct GroupId(uuid::Uuid);

impl GroupId {
    pub fn new(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub(crate) fn to_proto(&self) -> proto::GroupId {
        proto::GroupId {
            id: Bytes::copy_from_slice(self.0.as_bytes()),
        }
    }

    pub(crate) fn from_proto(p: &proto::GroupId) -> Result<Self> {
        let uuid = uuid::Uuid::from_slice(&p.id).map_err(|_| Error::BadGroupId(p.id.len()))?;
        Ok(Self(uuid))
    }
}
