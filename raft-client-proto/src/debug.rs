use super::*;

fn requestor_to_string(x: &[u8]) -> String {
    match ClientId::from_bytes(x) {
        Ok(id) => id.to_string(),
        Err(_) => message::short_hex(x),
    }
}

/// `requestor->reply#call_id-seq_num`
pub fn client_request_to_string(p: &proto::ClientRequest) -> String {
    let rpc = p.rpc_request.clone().unwrap_or_default();
    format!(
        "{}->{}#{}-{}",
        requestor_to_string(&rpc.requestor_id),
        PeerId::from_bytes(&rpc.reply_id),
        rpc.call_id,
        rpc.seq_num
    )
}

/// `requestor<-reply#call_id`
pub fn client_reply_to_string(p: &proto::ClientReply) -> String {
    let rpc = p.rpc_reply.clone().unwrap_or_default();
    format!(
        "{}<-{}#{}",
        requestor_to_string(&rpc.requestor_id),
        PeerId::from_bytes(&rpc.reply_id),
        rpc.call_id
    )
}
