use super::*;
use std::fmt;

const SHORT_HEX_LEN: usize = 10;

/// Opaque payload of a request or a reply.
/// The content is never interpreted by this crate.
#[derive(shrinkwraprs::Shrinkwrap, Clone, PartialEq, Eq, Hash, Default)]
pub struct Message(Bytes);

impl Message {
    pub fn new(content: impl Into<Bytes>) -> Self {
        Self(content.into())
    }

    pub fn content(&self) -> &Bytes {
        &self.0
    }

    pub fn into_content(self) -> Bytes {
        self.0
    }

    pub(crate) fn to_proto(&self) -> proto::ClientMessage {
        proto::ClientMessage {
            content: self.0.clone(),
        }
    }

    pub(crate) fn from_proto(p: proto::ClientMessage) -> Self {
        Self(p.content)
    }
}

impl From<Bytes> for Message {
    fn from(x: Bytes) -> Self {
        Self(x)
    }
}

impl From<Vec<u8>> for Message {
    fn from(x: Vec<u8>) -> Self {
        Self(x.into())
    }
}

impl From<&'static [u8]> for Message {
    fn from(x: &'static [u8]) -> Self {
        Self(Bytes::from_static(x))
    }
}

impl From<&'static str> for Message {
    fn from(x: &'static str) -> Self {
        Self(Bytes::from_static(x.as_bytes()))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&short_hex(&self.0))
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Message({})", short_hex(&self.0))
    }
}

/// Hex of the first few bytes, with the total size when truncated.
pub(crate) fn short_hex(x: &[u8]) -> String {
    let mut out: String = x
        .iter()
        .take(SHORT_HEX_LEN)
        .map(|b| format!("{b:02x}"))
        .collect();
    if x.len() > SHORT_HEX_LEN {
        out.push_str(&format!("...(size={})", x.len()));
    }
    out
}
