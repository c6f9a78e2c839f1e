use super::*;
use proto::raft_client_protocol_server::{RaftClientProtocol, RaftClientProtocolServer};
use std::sync::Arc;
use tonic::codegen::CompressionEncoding;

/// The application side of the client protocol.
/// Requests arrive decoded and replies are encoded by the service.
#[async_trait::async_trait]
pub trait ClientRequestHandler: Sync + Send + 'static {
    async fn submit(&self, req: ClientRequest) -> Result<ClientReply>;

    async fn set_configuration(&self, req: SetConfigurationRequest) -> Result<ClientReply>;

    async fn reinitialize(&self, req: ReinitializeRequest) -> Result<ClientReply>;

    async fn server_information(
        &self,
        req: ServerInformationRequest,
    ) -> Result<ServerInformationReply>;
}

/// Create a `RaftClientProtocol` service backed by `handler`.
pub fn new(
    handler: impl ClientRequestHandler,
) -> RaftClientProtocolServer<impl RaftClientProtocol> {
    let inner = ClientProtocolService {
        handler: Arc::new(handler),
    };
    RaftClientProtocolServer::new(inner)
        .send_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Zstd)
}

fn bad_request(e: anyhow::Error) -> tonic::Status {
    tonic::Status::invalid_argument(format!("{e:#}"))
}

fn handler_failed(e: anyhow::Error) -> tonic::Status {
    tonic::Status::internal(format!("{e:#}"))
}

#[doc(hidden)]
pub struct ClientProtocolService<H> {
    handler: Arc<H>,
}

#[tonic::async_trait]
impl<H: ClientRequestHandler> RaftClientProtocol for ClientProtocolService<H> {
    async fn submit(
        &self,
        request: tonic::Request<proto::ClientRequest>,
    ) -> std::result::Result<tonic::Response<proto::ClientReply>, tonic::Status> {
        let req = request.into_inner();
        debug!("submit {}", debug::client_request_to_string(&req));

        let req = request::decode_client_request(req).map_err(bad_request)?;
        let rep = self.handler.submit(req).await.map_err(handler_failed)?;
        let rep = reply::encode_client_reply(&rep);

        debug!("reply {}", debug::client_reply_to_string(&rep));
        Ok(tonic::Response::new(rep))
    }

    async fn set_configuration(
        &self,
        request: tonic::Request<proto::SetConfigurationRequest>,
    ) -> std::result::Result<tonic::Response<proto::ClientReply>, tonic::Status> {
        let req = request::decode_set_configuration_request(request.into_inner())
            .map_err(bad_request)?;
        debug!(
            "set configuration (call_id={}, n_peers={})",
            req.header().call_id(),
            req.peers().len()
        );

        let rep = self
            .handler
            .set_configuration(req)
            .await
            .map_err(handler_failed)?;
        let rep = reply::encode_client_reply(&rep);

        debug!("reply {}", debug::client_reply_to_string(&rep));
        Ok(tonic::Response::new(rep))
    }

    async fn reinitialize(
        &self,
        request: tonic::Request<proto::ReinitializeRequest>,
    ) -> std::result::Result<tonic::Response<proto::ClientReply>, tonic::Status> {
        let req = request::decode_reinitialize_request(request.into_inner())
            .map_err(bad_request)?;
        debug!(
            "reinitialize (call_id={}, group_id={})",
            req.header().call_id(),
            req.group().group_id()
        );

        let rep = self
            .handler
            .reinitialize(req)
            .await
            .map_err(handler_failed)?;
        let rep = reply::encode_client_reply(&rep);

        debug!("reply {}", debug::client_reply_to_string(&rep));
        Ok(tonic::Response::new(rep))
    }

    async fn server_information(
        &self,
        request: tonic::Request<proto::ServerInformationRequest>,
    ) -> std::result::Result<tonic::Response<proto::ServerInformationReply>, tonic::Status> {
        let req = request::decode_server_information_request(request.into_inner())
            .map_err(bad_request)?;
        debug!("server information (call_id={})", req.header().call_id());

        let rep = self
            .handler
            .server_information(req)
            .await
            .map_err(handler_failed)?;
        Ok(tonic::Response::new(
            reply::encode_server_information_reply(&rep),
        ))
    }
}
