use super::*;
use proto::raft_client_protocol_client::RaftClientProtocolClient;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tonic::codegen::CompressionEncoding;
use tonic::transport::{Channel, Endpoint, Uri};

type ProtocolClient = RaftClientProtocolClient<Channel>;

fn parse_address(address: &str) -> Result<Uri> {
    let address = if address.contains("://") {
        address.to_owned()
    } else {
        format!("http://{address}")
    };
    let uri = address
        .parse::<Uri>()
        .map_err(|_| Error::BadAddress(address.clone()))?;
    Ok(uri)
}

/// Client side transport of the client protocol.
///
/// A request is sent to the peer named by the reply id of its header.
/// Connections are established lazily and cached per peer.
pub struct RaftClientRpc {
    addresses: spin::RwLock<HashMap<PeerId, Uri>>,
    conn_cache: moka::sync::Cache<PeerId, ProtocolClient>,
    registry: Arc<ExceptionRegistry>,
}

impl RaftClientRpc {
    pub fn new() -> Self {
        let conn_cache = moka::sync::Cache::builder()
            .initial_capacity(3)
            .time_to_idle(Duration::from_secs(60))
            .build();
        Self {
            addresses: spin::RwLock::new(HashMap::new()),
            conn_cache,
            registry: ExceptionRegistry::builtin(),
        }
    }

    /// Decode state machine errors with `registry` instead of the built-in one.
    pub fn with_exception_registry(mut self, registry: Arc<ExceptionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Add or update the addresses of `peers`.
    /// Peers without an address are ignored.
    /// Nothing is updated if any address is broken.
    pub fn add_peers(&self, peers: &[Peer]) -> Result<()> {
        let mut parsed = vec![];
        for peer in peers {
            let Some(address) = peer.address() else {
                warn!("peer {} has no address", peer.id());
                continue;
            };
            parsed.push((peer.id().clone(), parse_address(address)?));
        }

        let mut addresses = self.addresses.write();
        for (id, uri) in parsed {
            let old = addresses.insert(id.clone(), uri.clone());
            if old.is_some_and(|old| old != uri) {
                self.conn_cache.invalidate(&id);
            }
        }
        Ok(())
    }

    fn connect(&self, id: &PeerId) -> Result<ProtocolClient> {
        let uri = self
            .addresses
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::PeerNotFound(id.clone()))?;
        let cli = self.conn_cache.get_with(id.clone(), || {
            debug!("connect to {id} ({uri})");
            let conn = Endpoint::from(uri).connect_lazy();
            RaftClientProtocolClient::new(conn)
                .send_compressed(CompressionEncoding::Zstd)
                .accept_compressed(CompressionEncoding::Zstd)
        });
        Ok(cli)
    }

    pub async fn submit(&self, req: &ClientRequest) -> Result<ClientReply> {
        let mut cli = self.connect(req.header().reply_id())?;
        let req = request::encode_client_request(req);
        debug!("submit {}", debug::client_request_to_string(&req));

        let rep = cli.submit(req).await?.into_inner();
        debug!("received {}", debug::client_reply_to_string(&rep));
        reply::decode_client_reply_with(rep, &self.registry)
    }

    pub async fn set_configuration(&self, req: &SetConfigurationRequest) -> Result<ClientReply> {
        let mut cli = self.connect(req.header().reply_id())?;
        let req = request::encode_set_configuration_request(req);
        let rep = cli.set_configuration(req).await?.into_inner();
        reply::decode_client_reply_with(rep, &self.registry)
    }

    pub async fn reinitialize(&self, req: &ReinitializeRequest) -> Result<ClientReply> {
        let mut cli = self.connect(req.header().reply_id())?;
        let req = request::encode_reinitialize_request(req);
        let rep = cli.reinitialize(req).await?.into_inner();
        reply::decode_client_reply_with(rep, &self.registry)
    }

    pub async fn server_information(
        &self,
        req: &ServerInformationRequest,
    ) -> Result<ServerInformationReply> {
        let mut cli = self.connect(req.header().reply_id())?;
        let req = request::encode_server_information_request(req);
        let rep = cli.server_information(req).await?.into_inner();
        reply::decode_server_information_reply(rep)
    }
}

impl Default for RaftClientRpc {
    fn default() -> Self {
        Self::new()
    }
}
