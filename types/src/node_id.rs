//! Node identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable integer identifier for a ledger participant.
///
/// Node ids are assigned at registration and never change. The genesis
/// sender is not a node and has no id — use `Option<NodeId>` where the
/// genesis sender may appear.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Canonical big-endian byte representation, used in hashing and signing.
    pub fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}
