//! Per-peer knowledge tracking.
//!
//! For one observed peer, records the highest block number of every node's
//! chain that peer is known to already hold. An absent entry means "nothing
//! beyond genesis" — genesis is implicitly known to everyone. Entries only
//! ever rise: knowledge is never forgotten, and proofs are pruned against the
//! maximum seen.

use plait_types::NodeId;
use std::collections::HashMap;
use std::sync::RwLock;

pub struct MetaKnowledge {
    known: RwLock<HashMap<NodeId, u64>>,
}

impl MetaKnowledge {
    pub fn new() -> Self {
        Self {
            known: RwLock::new(HashMap::new()),
        }
    }

    /// Highest block number of `node`'s chain the peer is known to hold,
    /// `None` when only genesis can be assumed.
    pub fn known_height(&self, node: NodeId) -> Option<u64> {
        self.known.read().unwrap().get(&node).copied()
    }

    /// Whether the peer is known to hold block `number` of `node`'s chain.
    pub fn is_known(&self, node: NodeId, number: u64) -> bool {
        self.known_height(node).is_some_and(|known| number <= known)
    }

    /// Record that blocks up to `height` of `node`'s chain were delivered to
    /// the peer. Never lowers an existing entry.
    pub fn record_sent(&self, node: NodeId, height: u64) {
        let mut known = self.known.write().unwrap();
        let entry = known.entry(node).or_insert(height);
        if *entry < height {
            *entry = height;
        }
    }

    /// Snapshot of the full map, for diagnostics.
    pub fn snapshot(&self) -> HashMap<NodeId, u64> {
        self.known.read().unwrap().clone()
    }
}

impl Default for MetaKnowledge {
    fn default() -> Self {
        Self::new()
    }
}
