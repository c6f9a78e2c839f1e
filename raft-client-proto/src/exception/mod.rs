use super::*;
use proto::client_reply::ExceptionDetails;

mod registry;
pub use registry::{Constructor, ExceptionRegistry};
mod stack_trace;
pub use stack_trace::{StackFrame, StackTrace};

/// Well-known exception kinds every peer can rebuild by name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display)]
pub enum ExceptionKind {
    InvalidArgument,
    IllegalState,
    Unsupported,
    NotFound,
    Io,
    Timeout,
    GroupMismatch,
    LeaderNotReady,
    ReconfigurationInProgress,
    StateMachine,
}

impl ExceptionKind {
    pub const ALL: [ExceptionKind; 10] = [
        Self::InvalidArgument,
        Self::IllegalState,
        Self::Unsupported,
        Self::NotFound,
        Self::Io,
        Self::Timeout,
        Self::GroupMismatch,
        Self::LeaderNotReady,
        Self::ReconfigurationInProgress,
        Self::StateMachine,
    ];

    /// The name recorded on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "raft.InvalidArgument",
            Self::IllegalState => "raft.IllegalState",
            Self::Unsupported => "raft.Unsupported",
            Self::NotFound => "raft.NotFound",
            Self::Io => "raft.Io",
            Self::Timeout => "raft.Timeout",
            Self::GroupMismatch => "raft.GroupMismatch",
            Self::LeaderNotReady => "raft.LeaderNotReady",
            Self::ReconfigurationInProgress => "raft.ReconfigurationInProgress",
            Self::StateMachine => "raft.StateMachine",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == name)
    }
}

/// An exception raised by the application running on the state machine.
#[derive(thiserror::Error, Clone, PartialEq, Eq, Debug)]
#[error("{type_name}: {}", .message.as_deref().unwrap_or_default())]
pub struct AppException {
    type_name: String,
    message: Option<String>,
}

impl AppException {
    pub fn new(type_name: impl Into<String>, message: Option<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message,
        }
    }

    pub fn with_kind(kind: ExceptionKind, message: Option<String>) -> Self {
        Self::new(kind.type_name(), message)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// `None` if the type is not a well-known kind.
    pub fn kind(&self) -> Option<ExceptionKind> {
        ExceptionKind::from_type_name(&self.type_name)
    }
}

impl From<std::io::Error> for AppException {
    fn from(e: std::io::Error) -> Self {
        Self::with_kind(ExceptionKind::Io, Some(e.to_string()))
    }
}

/// The contacted peer is not the leader of the group.
#[derive(thiserror::Error, Clone, PartialEq, Eq, Debug)]
#[error("not leader (suggested_leader={suggested_leader:?}, n_peers={})", .peers.len())]
pub struct NotLeaderError {
    suggested_leader: Option<Peer>,
    peers: Vec<Peer>,
}

impl NotLeaderError {
    pub fn new(suggested_leader: Option<Peer>, peers: Vec<Peer>) -> Self {
        Self {
            suggested_leader,
            peers,
        }
    }

    /// A peer the client should retry on, if the replying peer knows one.
    pub fn suggested_leader(&self) -> Option<&Peer> {
        self.suggested_leader.as_ref()
    }

    /// Peers of the current configuration.
    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }
}

/// The application raised an error while processing the request.
#[derive(thiserror::Error, Clone, PartialEq, Eq, Debug)]
#[error("{message}")]
pub struct StateMachineError {
    server_id: Option<PeerId>,
    message: String,
    #[source]
    cause: Option<AppException>,
    stack_trace: StackTrace,
}

impl StateMachineError {
    /// An error without a typed cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            server_id: None,
            message: message.into(),
            cause: None,
            stack_trace: StackTrace::default(),
        }
    }

    /// Wrap an application exception raised on `server_id`.
    pub fn from_cause(server_id: PeerId, cause: AppException) -> Self {
        let message = format!(
            "{} from Server {}: {}",
            cause.type_name(),
            server_id,
            cause.message().unwrap_or_default()
        );
        Self {
            server_id: Some(server_id),
            message,
            cause: Some(cause),
            stack_trace: StackTrace::default(),
        }
    }

    pub fn with_server_id(mut self, server_id: PeerId) -> Self {
        self.server_id = Some(server_id);
        self
    }

    pub fn with_stack_trace(mut self, stack_trace: StackTrace) -> Self {
        self.stack_trace = stack_trace;
        self
    }

    pub fn server_id(&self) -> Option<&PeerId> {
        self.server_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&AppException> {
        self.cause.as_ref()
    }

    pub fn stack_trace(&self) -> &StackTrace {
        &self.stack_trace
    }
}

fn encode_not_leader(e: &NotLeaderError) -> proto::NotLeaderException {
    proto::NotLeaderException {
        suggested_leader: e.suggested_leader.as_ref().map(Peer::to_proto),
        peers_in_conf: group::to_peer_protos(&e.peers),
    }
}

fn encode_state_machine_error(e: &StateMachineError) -> proto::StateMachineException {
    // Only the cause crosses the wire. The wrapper itself is sent
    // only when there is nothing to unwrap.
    let (exception_type, error_msg) = match &e.cause {
        Some(cause) => (cause.type_name.clone(), cause.message.clone()),
        None => (
            ExceptionKind::StateMachine.type_name().to_owned(),
            Some(e.message.clone()),
        ),
    };
    proto::StateMachineException {
        exception_type: Some(exception_type),
        error_msg,
        stack_trace: e.stack_trace.serialize(),
    }
}

/// Encode the failure of a reply into the wire oneof.
pub fn encode_failure(failure: &ReplyFailure) -> Option<ExceptionDetails> {
    match failure {
        ReplyFailure::None => None,
        ReplyFailure::NotLeader(e) => Some(ExceptionDetails::NotLeaderException(
            encode_not_leader(e),
        )),
        ReplyFailure::StateMachine(e) => Some(ExceptionDetails::StateMachineException(
            encode_state_machine_error(e),
        )),
    }
}

fn decode_not_leader(p: proto::NotLeaderException) -> NotLeaderError {
    NotLeaderError {
        suggested_leader: p.suggested_leader.map(Peer::from_proto),
        peers: group::from_peer_protos(p.peers_in_conf),
    }
}

fn decode_state_machine_error(
    server_id: &PeerId,
    p: proto::StateMachineException,
    registry: &ExceptionRegistry,
) -> StateMachineError {
    let e = match p.exception_type {
        None => StateMachineError::new(p.error_msg.unwrap_or_default()),
        // A wrapper sent without a cause.
        Some(type_name) if type_name == ExceptionKind::StateMachine.type_name() => {
            StateMachineError::new(p.error_msg.unwrap_or_default())
        }
        Some(type_name) => match registry.instantiate(&type_name, p.error_msg.clone()) {
            Ok(cause) => StateMachineError::from_cause(server_id.clone(), cause),
            Err(err) => {
                debug!("fallback to a generic state machine error: {err:#}");
                StateMachineError::new(format!(
                    "{type_name}: {}",
                    p.error_msg.as_deref().unwrap_or_default()
                ))
            }
        },
    };
    e.with_server_id(server_id.clone())
        .with_stack_trace(StackTrace::deserialize(&p.stack_trace))
}

/// Decode the wire oneof of a reply sent by `server_id`.
///
/// This never fails. A state machine error whose type can't be rebuilt
/// degrades to a generic error carrying the type name and the message.
pub fn decode_failure(
    server_id: &PeerId,
    details: Option<ExceptionDetails>,
    registry: &ExceptionRegistry,
) -> ReplyFailure {
    match details {
        None => ReplyFailure::None,
        Some(ExceptionDetails::NotLeaderException(p)) => {
            ReplyFailure::NotLeader(decode_not_leader(p))
        }
        Some(ExceptionDetails::StateMachineException(p)) => {
            ReplyFailure::StateMachine(decode_state_machine_error(server_id, p, registry))
        }
    }
}
