//! Ledger participants.
//!
//! A `Node` is an identity/key record together with the local replica of
//! that participant's chain and the meta-knowledge tracked about it.
//! Back-references between nodes are id lookups through the registry
//! (`LocalStore`), never owning pointers.

use crate::block::Block;
use crate::chain::Chain;
use crate::meta_knowledge::MetaKnowledge;
use plait_crypto::sign_message;
use plait_types::{KeyPair, NodeId, PublicKey, Signature};
use std::sync::Arc;

/// A ledger participant as seen from the local process.
pub struct Node {
    id: NodeId,
    public_key: PublicKey,
    chain: Chain,
    /// What this peer is known to hold of every node's chain.
    meta_knowledge: MetaKnowledge,
}

impl Node {
    pub fn new(id: NodeId, public_key: PublicKey, genesis: Arc<Block>, owned_locally: bool) -> Self {
        Self {
            id,
            public_key,
            chain: Chain::new(id, genesis, owned_locally),
            meta_knowledge: MetaKnowledge::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn meta_knowledge(&self) -> &MetaKnowledge {
        &self.meta_knowledge
    }
}

/// The node for which the local process holds the private key.
pub struct OwnNode {
    id: NodeId,
    key_pair: KeyPair,
}

impl OwnNode {
    pub fn new(id: NodeId, key_pair: KeyPair) -> Self {
        Self { id, key_pair }
    }

    /// Generate a fresh signing identity.
    pub fn generate(id: NodeId) -> Self {
        Self::new(id, plait_crypto::generate_keypair())
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn public_key(&self) -> PublicKey {
        self.key_pair.public.clone()
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        sign_message(message, &self.key_pair.private)
    }
}
