use super::*;
use raft_client_proto::service::ClientRequestHandler;

#[derive(serde::Serialize, serde::Deserialize)]
pub enum AppRequest {
    Add(u64),
    Get,
    /// Make the state machine raise an exception of `type_name`.
    Fail {
        type_name: String,
        message: Option<String>,
    },
}
impl AppRequest {
    pub fn serialize(&self) -> Bytes {
        bincode::serialize(self).unwrap().into()
    }

    pub fn deserialize(bytes: &[u8]) -> Option<Self> {
        bincode::deserialize(bytes).ok()
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppState(pub u64);
impl AppState {
    pub fn serialize(&self) -> Bytes {
        bincode::serialize(&self).unwrap().into()
    }

    pub fn deserialize(bytes: &[u8]) -> Self {
        bincode::deserialize(bytes).unwrap()
    }
}

struct State {
    counter: u64,
    leader: PeerId,
    group: Group,
}

/// A counter replicated by a fixed leader.
/// Followers reject every request with a redirection to the leader.
pub struct CounterApp {
    id: PeerId,
    state: spin::Mutex<State>,
}
impl CounterApp {
    pub fn new(id: PeerId, leader: PeerId, group: Group) -> Self {
        Self {
            id,
            state: spin::Mutex::new(State {
                counter: 0,
                leader,
                group,
            }),
        }
    }

    fn check_leader(&self, req: &RequestHeader) -> Option<ClientReply> {
        let state = self.state.lock();
        if state.leader == self.id {
            return None;
        }
        let suggested = state.group.get_peer(&state.leader).cloned();
        let e = NotLeaderError::new(suggested, state.group.peers().to_vec());
        Some(ClientReply::failed(req, e))
    }

    fn apply(&self, req: AppRequest) -> std::result::Result<AppState, AppException> {
        let mut state = self.state.lock();
        match req {
            AppRequest::Add(n) => {
                let cur = state.counter;
                state.counter = cur.checked_add(n).ok_or_else(|| {
                    AppException::with_kind(
                        ExceptionKind::IllegalState,
                        Some(format!("counter overflow: {cur} + {n}")),
                    )
                })?;
                Ok(AppState(state.counter))
            }
            AppRequest::Get => Ok(AppState(state.counter)),
            AppRequest::Fail { type_name, message } => {
                Err(AppException::new(type_name, message))
            }
        }
    }
}

#[async_trait::async_trait]
impl ClientRequestHandler for CounterApp {
    async fn submit(&self, req: ClientRequest) -> Result<ClientReply> {
        if let Some(rep) = self.check_leader(req.header()) {
            return Ok(rep);
        }
        let Some(app_req) = AppRequest::deserialize(req.message()) else {
            anyhow::bail!("malformed request from {}", req.header().requestor_id());
        };
        if req.is_read_only() && !matches!(app_req, AppRequest::Get) {
            let cause = AppException::with_kind(
                ExceptionKind::InvalidArgument,
                Some("write in a read-only request".to_owned()),
            );
            let e = StateMachineError::from_cause(self.id.clone(), cause)
                .with_stack_trace(StackTrace::capture());
            return Ok(ClientReply::failed(req.header(), e));
        }

        let rep = match self.apply(app_req) {
            Ok(state) => ClientReply::success(req.header(), Some(state.serialize().into())),
            Err(cause) => {
                info!("state machine error: {cause}");
                let e = StateMachineError::from_cause(self.id.clone(), cause)
                    .with_stack_trace(StackTrace::capture());
                ClientReply::failed(req.header(), e)
            }
        };
        Ok(rep)
    }

    async fn set_configuration(&self, req: SetConfigurationRequest) -> Result<ClientReply> {
        if let Some(rep) = self.check_leader(req.header()) {
            return Ok(rep);
        }
        let mut state = self.state.lock();
        let group_id = state.group.group_id();
        state.group = Group::new(group_id, req.peers().to_vec());
        info!("configuration changed to {} peers", req.peers().len());
        Ok(ClientReply::success(req.header(), None))
    }

    async fn reinitialize(&self, req: ReinitializeRequest) -> Result<ClientReply> {
        let mut state = self.state.lock();
        state.group = req.group().clone();
        state.counter = 0;
        info!("reinitialized into {}", req.group().group_id());
        Ok(ClientReply::success(req.header(), None))
    }

    async fn server_information(
        &self,
        req: ServerInformationRequest,
    ) -> Result<ServerInformationReply> {
        let state = self.state.lock();
        Ok(ServerInformationReply::new(
            req.header().to_reply_header(true),
            Some(state.group.clone()),
        ))
    }
}
