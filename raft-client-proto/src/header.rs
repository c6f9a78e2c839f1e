use super::*;

/// Header of every request.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RequestHeader {
    requestor_id: ClientId,
    reply_id: PeerId,
    group_id: GroupId,
    call_id: CallId,
    seq_num: SeqNum,
}

impl RequestHeader {
    pub fn new(
        requestor_id: ClientId,
        reply_id: PeerId,
        group_id: GroupId,
        call_id: CallId,
        seq_num: SeqNum,
    ) -> Self {
        Self {
            requestor_id,
            reply_id,
            group_id,
            call_id,
            seq_num,
        }
    }

    pub fn requestor_id(&self) -> ClientId {
        self.requestor_id
    }

    /// The peer the request is sent to and the reply comes from.
    pub fn reply_id(&self) -> &PeerId {
        &self.reply_id
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn call_id(&self) -> CallId {
        self.call_id
    }

    pub fn seq_num(&self) -> SeqNum {
        self.seq_num
    }

    /// The header of the reply answering this request.
    pub fn to_reply_header(&self, success: bool) -> ReplyHeader {
        ReplyHeader::new(
            self.requestor_id,
            self.reply_id.clone(),
            self.group_id,
            self.call_id,
            success,
        )
    }
}

/// Header of every reply.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ReplyHeader {
    requestor_id: ClientId,
    reply_id: PeerId,
    group_id: GroupId,
    call_id: CallId,
    success: bool,
}

impl ReplyHeader {
    pub fn new(
        requestor_id: ClientId,
        reply_id: PeerId,
        group_id: GroupId,
        call_id: CallId,
        success: bool,
    ) -> Self {
        Self {
            requestor_id,
            reply_id,
            group_id,
            call_id,
            success,
        }
    }

    pub fn requestor_id(&self) -> ClientId {
        self.requestor_id
    }

    pub fn reply_id(&self) -> &PeerId {
        &self.reply_id
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn call_id(&self) -> CallId {
        self.call_id
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

pub fn encode_request_header_from_parts(
    requestor_id: &ClientId,
    reply_id: &PeerId,
    group_id: &GroupId,
    call_id: CallId,
    seq_num: SeqNum,
) -> proto::RpcRequestHeader {
    proto::RpcRequestHeader {
        requestor_id: requestor_id.to_bytes(),
        reply_id: reply_id.to_bytes(),
        group_id: Some(group_id.to_proto()),
        call_id,
        seq_num,
    }
}

pub fn encode_request_header(header: &RequestHeader) -> proto::RpcRequestHeader {
    encode_request_header_from_parts(
        &header.requestor_id,
        &header.reply_id,
        &header.group_id,
        header.call_id,
        header.seq_num,
    )
}

pub fn decode_request_header(p: proto::RpcRequestHeader) -> Result<RequestHeader> {
    let group_id = p.group_id.ok_or(Error::MissingField("group_id"))?;
    Ok(RequestHeader {
        requestor_id: ClientId::from_bytes(&p.requestor_id)?,
        reply_id: PeerId::from_bytes(&p.reply_id),
        group_id: GroupId::from_proto(&group_id)?,
        call_id: p.call_id,
        seq_num: p.seq_num,
    })
}

pub fn encode_reply_header_from_parts(
    requestor_id: &ClientId,
    reply_id: &PeerId,
    group_id: &GroupId,
    call_id: CallId,
    success: bool,
) -> proto::RpcReplyHeader {
    proto::RpcReplyHeader {
        requestor_id: requestor_id.to_bytes(),
        reply_id: reply_id.to_bytes(),
        group_id: Some(group_id.to_proto()),
        call_id,
        success,
    }
}

pub fn encode_reply_header(header: &ReplyHeader) -> proto::RpcReplyHeader {
    encode_reply_header_from_parts(
        &header.requestor_id,
        &header.reply_id,
        &header.group_id,
        header.call_id,
        header.success,
    )
}

pub fn decode_reply_header(p: proto::RpcReplyHeader) -> Result<ReplyHeader> {
    let group_id = p.group_id.ok_or(Error::MissingField("group_id"))?;
    Ok(ReplyHeader {
        requestor_id: ClientId::from_bytes(&p.requestor_id)?,
        reply_id: PeerId::from_bytes(&p.reply_id),
        group_id: GroupId::from_proto(&group_id)?,
        call_id: p.call_id,
        success: p.success,
    })
}
