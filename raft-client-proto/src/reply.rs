use super::*;
use exception::{decode_failure, encode_failure};
use header::{decode_reply_header, encode_reply_header};
use prost::Message as _;
use std::fmt;

fn take_header(p: Option<proto::RpcReplyHeader>) -> Result<ReplyHeader> {
    let p = p.ok_or(Error::MissingField("rpc_reply"))?;
    decode_reply_header(p)
}

/// Failure carried by a `ClientReply`. At most one kind is set.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum ReplyFailure {
    #[default]
    None,
    NotLeader(NotLeaderError),
    StateMachine(StateMachineError),
}

impl ReplyFailure {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn not_leader(&self) -> Option<&NotLeaderError> {
        match self {
            Self::NotLeader(e) => Some(e),
            _ => None,
        }
    }

    pub fn state_machine(&self) -> Option<&StateMachineError> {
        match self {
            Self::StateMachine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NotLeaderError> for ReplyFailure {
    fn from(e: NotLeaderError) -> Self {
        Self::NotLeader(e)
    }
}

impl From<StateMachineError> for ReplyFailure {
    fn from(e: StateMachineError) -> Self {
        Self::StateMachine(e)
    }
}

/// Reply to a `ClientRequest`, and to the administrative requests.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ClientReply {
    header: ReplyHeader,
    message: Option<Message>,
    failure: ReplyFailure,
}

impl ClientReply {
    pub fn new(header: ReplyHeader, message: Option<Message>, failure: ReplyFailure) -> Self {
        Self {
            header,
            message,
            failure,
        }
    }

    /// A successful reply to `req` carrying `message`.
    pub fn success(req: &RequestHeader, message: Option<Message>) -> Self {
        Self::new(req.to_reply_header(true), message, ReplyFailure::None)
    }

    /// A failed reply to `req`.
    /// A state machine error without a server id is attributed to the replying peer.
    pub fn failed(req: &RequestHeader, failure: impl Into<ReplyFailure>) -> Self {
        let failure = match failure.into() {
            ReplyFailure::StateMachine(e) if e.server_id().is_none() => {
                ReplyFailure::StateMachine(e.with_server_id(req.reply_id().clone()))
            }
            failure => failure,
        };
        Self::new(req.to_reply_header(false), None, failure)
    }

    pub fn header(&self) -> &ReplyHeader {
        &self.header
    }

    pub fn is_success(&self) -> bool {
        self.header.is_success()
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn failure(&self) -> &ReplyFailure {
        &self.failure
    }

    pub fn into_result(self) -> std::result::Result<Option<Message>, ReplyFailure> {
        match self.failure {
            ReplyFailure::None => Ok(self.message),
            failure => Err(failure),
        }
    }

    pub fn serialize(&self) -> Bytes {
        encode_client_reply(self).encode_to_vec().into()
    }

    pub fn deserialize(x: &[u8]) -> Result<Self> {
        decode_client_reply(proto::ClientReply::decode(x)?)
    }
}

impl fmt::Display for ClientReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.header;
        write!(f, "{}<-{}#{}", h.requestor_id(), h.reply_id(), h.call_id())
    }
}

pub fn encode_client_reply(reply: &ClientReply) -> proto::ClientReply {
    proto::ClientReply {
        rpc_reply: Some(encode_reply_header(&reply.header)),
        message: reply.message.as_ref().map(Message::to_proto),
        exception_details: encode_failure(&reply.failure),
    }
}

/// Decode a reply, rebuilding state machine errors with the built-in registry.
pub fn decode_client_reply(p: proto::ClientReply) -> Result<ClientReply> {
    decode_client_reply_with(p, &ExceptionRegistry::builtin())
}

pub fn decode_client_reply_with(
    p: proto::ClientReply,
    registry: &ExceptionRegistry,
) -> Result<ClientReply> {
    let header = take_header(p.rpc_reply)?;
    let failure = decode_failure(header.reply_id(), p.exception_details, registry);
    Ok(ClientReply {
        message: p.message.map(Message::from_proto),
        failure,
        header,
    })
}

/// Reply to a `ServerInformationRequest`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ServerInformationReply {
    header: ReplyHeader,
    group: Option<Group>,
}

impl ServerInformationReply {
    pub fn new(header: ReplyHeader, group: Option<Group>) -> Self {
        Self { header, group }
    }

    pub fn header(&self) -> &ReplyHeader {
        &self.header
    }

    pub fn group(&self) -> Option<&Group> {
        self.group.as_ref()
    }

    pub fn serialize(&self) -> Bytes {
        encode_server_information_reply(self).encode_to_vec().into()
    }

    pub fn deserialize(x: &[u8]) -> Result<Self> {
        decode_server_information_reply(proto::ServerInformationReply::decode(x)?)
    }
}

pub fn encode_server_information_reply(
    reply: &ServerInformationReply,
) -> proto::ServerInformationReply {
    proto::ServerInformationReply {
        rpc_reply: Some(encode_reply_header(&reply.header)),
        group: reply.group.as_ref().map(Group::to_proto),
    }
}

pub fn decode_server_information_reply(
    p: proto::ServerInformationReply,
) -> Result<ServerInformationReply> {
    let header = take_header(p.rpc_reply)?;
    let group = p.group.map(Group::from_proto).transpose()?;
    Ok(ServerInformationReply { header, group })
}
