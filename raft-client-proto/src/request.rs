use super::*;
use header::{decode_request_header, encode_request_header, encode_request_header_from_parts};
use prost::Message as _;
use std::fmt;

fn take_header(p: Option<proto::RpcRequestHeader>) -> Result<RequestHeader> {
    let p = p.ok_or(Error::MissingField("rpc_request"))?;
    decode_request_header(p)
}

/// A request carrying an application message to the state machine.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ClientRequest {
    header: RequestHeader,
    message: Message,
    read_only: bool,
}

impl ClientRequest {
    pub fn new(header: RequestHeader, message: impl Into<Message>, read_only: bool) -> Self {
        Self {
            header,
            message: message.into(),
            read_only,
        }
    }

    pub fn header(&self) -> &RequestHeader {
        &self.header
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn serialize(&self) -> Bytes {
        encode_client_request(self).encode_to_vec().into()
    }

    pub fn deserialize(x: &[u8]) -> Result<Self> {
        decode_client_request(proto::ClientRequest::decode(x)?)
    }
}

impl fmt::Display for ClientRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.header;
        write!(
            f,
            "{}->{}#{}-{}",
            h.requestor_id(),
            h.reply_id(),
            h.call_id(),
            h.seq_num()
        )
    }
}

/// Build the wire request without constructing the value object first.
pub fn encode_client_request_from_parts(
    requestor_id: &ClientId,
    reply_id: &PeerId,
    group_id: &GroupId,
    call_id: CallId,
    seq_num: SeqNum,
    content: Bytes,
    read_only: bool,
) -> proto::ClientRequest {
    proto::ClientRequest {
        rpc_request: Some(encode_request_header_from_parts(
            requestor_id,
            reply_id,
            group_id,
            call_id,
            seq_num,
        )),
        message: Some(proto::ClientMessage { content }),
        read_only,
    }
}

pub fn encode_client_request(req: &ClientRequest) -> proto::ClientRequest {
    proto::ClientRequest {
        rpc_request: Some(encode_request_header(&req.header)),
        message: Some(req.message.to_proto()),
        read_only: req.read_only,
    }
}

pub fn decode_client_request(p: proto::ClientRequest) -> Result<ClientRequest> {
    let header = take_header(p.rpc_request)?;
    // The content of a request is not optional. An unset message is empty.
    let message = p.message.map(Message::from_proto).unwrap_or_default();
    Ok(ClientRequest {
        header,
        message,
        read_only: p.read_only,
    })
}

/// A request to change the membership of the group.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SetConfigurationRequest {
    header: RequestHeader,
    peers: Vec<Peer>,
}

impl SetConfigurationRequest {
    pub fn new(header: RequestHeader, peers: Vec<Peer>) -> Self {
        Self { header, peers }
    }

    pub fn header(&self) -> &RequestHeader {
        &self.header
    }

    /// Peers of the new configuration.
    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn serialize(&self) -> Bytes {
        encode_set_configuration_request(self).encode_to_vec().into()
    }

    pub fn deserialize(x: &[u8]) -> Result<Self> {
        decode_set_configuration_request(proto::SetConfigurationRequest::decode(x)?)
    }
}

pub fn encode_set_configuration_request(
    req: &SetConfigurationRequest,
) -> proto::SetConfigurationRequest {
    proto::SetConfigurationRequest {
        rpc_request: Some(encode_request_header(&req.header)),
        peers: group::to_peer_protos(&req.peers),
    }
}

pub fn decode_set_configuration_request(
    p: proto::SetConfigurationRequest,
) -> Result<SetConfigurationRequest> {
    Ok(SetConfigurationRequest {
        header: take_header(p.rpc_request)?,
        peers: group::from_peer_protos(p.peers),
    })
}

/// A request to (re)start a peer as a member of the given group.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ReinitializeRequest {
    header: RequestHeader,
    group: Group,
}

impl ReinitializeRequest {
    pub fn new(header: RequestHeader, group: Group) -> Self {
        Self { header, group }
    }

    pub fn header(&self) -> &RequestHeader {
        &self.header
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn serialize(&self) -> Bytes {
        encode_reinitialize_request(self).encode_to_vec().into()
    }

    pub fn deserialize(x: &[u8]) -> Result<Self> {
        decode_reinitialize_request(proto::ReinitializeRequest::decode(x)?)
    }
}

pub fn encode_reinitialize_request(req: &ReinitializeRequest) -> proto::ReinitializeRequest {
    proto::ReinitializeRequest {
        rpc_request: Some(encode_request_header(&req.header)),
        group: Some(req.group.to_proto()),
    }
}

pub fn decode_reinitialize_request(p: proto::ReinitializeRequest) -> Result<ReinitializeRequest> {
    let header = take_header(p.rpc_request)?;
    let group = p.group.ok_or(Error::MissingField("group"))?;
    Ok(ReinitializeRequest {
        header,
        group: Group::from_proto(group)?,
    })
}

/// A request asking a peer which group it serves.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ServerInformationRequest {
    header: RequestHeader,
}

impl ServerInformationRequest {
    pub fn new(header: RequestHeader) -> Self {
        Self { header }
    }

    pub fn header(&self) -> &RequestHeader {
        &self.header
    }

    pub fn serialize(&self) -> Bytes {
        encode_server_information_request(self).encode_to_vec().into()
    }

    pub fn deserialize(x: &[u8]) -> Result<Self> {
        decode_server_information_request(proto::ServerInformationRequest::decode(x)?)
    }
}

pub fn encode_server_information_request(
    req: &ServerInformationRequest,
) -> proto::ServerInformationRequest {
    proto::ServerInformationRequest {
        rpc_request: Some(encode_request_header(&req.header)),
    }
}

pub fn decode_server_information_request(
    p: proto::ServerInformationRequest,
) -> Result<ServerInformationRequest> {
    Ok(ServerInformationRequest {
        header: take_header(p.rpc_request)?,
    })
}
