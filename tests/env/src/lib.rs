use anyhow::Result;
use bytes::Bytes;
use raft_client_proto::client::RaftClientRpc;
use raft_client_proto::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tonic::transport::{Endpoint, Uri};
use tracing::info;

mod app;
pub use app::{AppRequest, AppState, CounterApp};

fn peer_id(id: u8) -> PeerId {
    format!("p{id}").into()
}

struct Node {
    port: u16,
    abort_tx0: Option<tokio::sync::oneshot::Sender<()>>,
}
impl Node {
    pub fn new(id: u8, port: u16, app: CounterApp) -> Result<Self> {
        let nd_tag = format!("ND{port}>");
        let (tx, rx) = tokio::sync::oneshot::channel();

        let svc_task = async move {
            info!("add (id={id})");

            let client_svc = raft_client_proto::service::new(app);
            let reflection_svc = raft_client_proto::reflection::new().unwrap();

            let socket = format!("127.0.0.1:{port}").parse().unwrap();

            let mut builder = tonic::transport::Server::builder();
            builder
                .add_service(client_svc)
                .add_service(reflection_svc)
                .serve_with_shutdown(socket, async {
                    rx.await.ok();
                    info!("remove (id={id})");
                })
                .await
                .unwrap();
        };

        std::thread::Builder::new()
            .name(nd_tag.clone())
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .thread_name(nd_tag)
                    .enable_all()
                    .build()
                    .unwrap();
                runtime.block_on(svc_task);
            })?;

        Ok(Self {
            port,
            abort_tx0: Some(tx),
        })
    }

    fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}
impl Drop for Node {
    fn drop(&mut self) {
        if let Some(tx) = self.abort_tx0.take() {
            tx.send(()).ok();
        }
    }
}

/// A cluster of `CounterApp` servers on local ports and a client talking to them.
pub struct Env {
    nodes: HashMap<u8, Node>,
    group: Group,
    client_id: ClientId,
    call_id: AtomicU64,
    client: RaftClientRpc,
}
impl Env {
    /// Start `n` nodes named `p1`..`pn`. `leader` is the leader of the group.
    pub async fn new(n: u8, leader: u8) -> Result<Self> {
        let mut ports = HashMap::new();
        while ports.len() < n as usize {
            let port = port_check::free_local_ipv4_port()
                .ok_or_else(|| anyhow::anyhow!("no free port"))?;
            if ports.values().all(|&x| x != port) {
                ports.insert(ports.len() as u8 + 1, port);
            }
        }
        let peers = (1..=n)
            .map(|id| Peer::new(peer_id(id), format!("127.0.0.1:{}", ports[&id])))
            .collect();
        let group = Group::new(GroupId::random(), peers);

        let mut nodes = HashMap::new();
        for id in 1..=n {
            let app = CounterApp::new(peer_id(id), peer_id(leader), group.clone());
            let node = Node::new(id, ports[&id], app)?;
            nodes.insert(id, node);
        }

        let client = RaftClientRpc::new();
        client.add_peers(group.peers())?;

        let env = Self {
            nodes,
            group,
            client_id: ClientId::random(),
            call_id: AtomicU64::new(1),
            client,
        };
        for id in 1..=n {
            env.check_connectivity(id).await?;
        }
        Ok(env)
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn peer(&self, id: u8) -> Peer {
        Peer::new(peer_id(id), self.nodes[&id].address())
    }

    pub fn client(&self) -> &RaftClientRpc {
        &self.client
    }

    /// Replace the client with `client`, registering the peers of the group.
    pub fn set_client(&mut self, client: RaftClientRpc) -> Result<()> {
        client.add_peers(self.group.peers())?;
        self.client = client;
        Ok(())
    }

    /// A fresh header for a call to node `id`.
    pub fn header(&self, id: u8) -> RequestHeader {
        let call_id = self.call_id.fetch_add(1, Ordering::SeqCst);
        RequestHeader::new(
            self.client_id,
            peer_id(id),
            self.group.group_id(),
            call_id,
            0,
        )
    }

    pub fn remove_node(&mut self, id: u8) {
        if let Some(_node) = self.nodes.remove(&id) {
            // node is dropped
        }
    }

    /// Submit an application request to node `id`.
    pub async fn submit(&self, id: u8, req: AppRequest, read_only: bool) -> Result<ClientReply> {
        let req = ClientRequest::new(self.header(id), req.serialize(), read_only);
        self.client.submit(&req).await
    }

    pub async fn check_connectivity(&self, id: u8) -> Result<()> {
        let address = self.nodes[&id].address();
        let uri: Uri = format!("http://{address}").parse()?;
        for _ in 0..50 {
            let endpoint =
                Endpoint::from(uri.clone()).connect_timeout(Duration::from_millis(100));
            match endpoint.connect().await {
                Ok(_) => return Ok(()),
                Err(_) => {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
        anyhow::bail!("failed to connect to id={}", id);
    }
}
