use super::*;

/// A cluster member and, if known, the address it serves on.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display)]
#[display("{id}")]
pub struct Peer {
    id: PeerId,
    address: Option<String>,
}

impl Peer {
    pub fn new(id: impl Into<PeerId>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: Some(address.into()),
        }
    }

    /// A peer whose address is not known to the sender.
    pub fn without_address(id: impl Into<PeerId>) -> Self {
        Self {
            id: id.into(),
            address: None,
        }
    }

    pub fn id(&self) -> &PeerId {
        &self.id
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub(crate) fn to_proto(&self) -> proto::Peer {
        proto::Peer {
            id: self.id.to_bytes(),
            address: self.address.clone(),
        }
    }

    pub(crate) fn from_proto(p: proto::Peer) -> Self {
        Self {
            id: PeerId::from_bytes(&p.id),
            address: p.address,
        }
    }
}

pub(crate) fn to_peer_protos(peers: &[Peer]) -> Vec<proto::Peer> {
    peers.iter().map(Peer::to_proto).collect()
}

pub(crate) fn from_peer_protos(peers: Vec<proto::Peer>) -> Vec<Peer> {
    peers.into_iter().map(Peer::from_proto).collect()
}

/// The set of peers participating in one replication group.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Group {
    group_id: GroupId,
    peers: Vec<Peer>,
}

impl Group {
    pub fn new(group_id: GroupId, peers: Vec<Peer>) -> Self {
        Self { group_id, peers }
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn get_peer(&self, id: &PeerId) -> Option<&Peer> {
        self.peers.iter().find(|p| p.id() == id)
    }

    pub(crate) fn to_proto(&self) -> proto::Group {
        proto::Group {
            group_id: Some(self.group_id.to_proto()),
            peers: to_peer_protos(&self.peers),
        }
    }

    pub(crate) fn from_proto(p: proto::Group) -> Result<Self> {
        let group_id = p.group_id.ok_or(Error::MissingField("group_id"))?;
        Ok(Self {
            group_id: GroupId::from_proto(&group_id)?,
            peers: from_peer_protos(p.peers),
        })
    }
}
