//! Block abstracts — the only artifact ever published to the main chain.
//!
//! An abstract binds (owner, block number, block hash) under the owner's
//! signature. It leaks no transaction content.

use plait_crypto::verify_signature;
use plait_types::{BlockHash, NodeId, PublicKey, Signature};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAbstract {
    owner: NodeId,
    block_number: u64,
    block_hash: BlockHash,
    signature: Signature,
}

impl BlockAbstract {
    pub fn new(owner: NodeId, block_number: u64, block_hash: BlockHash, signature: Signature) -> Self {
        Self {
            owner,
            block_number,
            block_hash,
            signature,
        }
    }

    /// Canonical byte layout signed by the owner: owner id, block number,
    /// block hash.
    pub fn bytes_for_signature(owner: NodeId, block_number: u64, block_hash: &BlockHash) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(4 + 8 + 32);
        buffer.extend_from_slice(&owner.to_be_bytes());
        buffer.extend_from_slice(&block_number.to_be_bytes());
        buffer.extend_from_slice(block_hash.as_bytes());
        buffer
    }

    pub fn owner(&self) -> NodeId {
        self.owner
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn block_hash(&self) -> BlockHash {
        self.block_hash
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Verify the owner's signature over this abstract.
    pub fn verify(&self, owner_key: &PublicKey) -> bool {
        let bytes = Self::bytes_for_signature(self.owner, self.block_number, &self.block_hash);
        verify_signature(&bytes, &self.signature, owner_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plait_crypto::{keypair_from_seed, sign_message};

    #[test]
    fn signature_bytes_are_canonical() {
        let hash = BlockHash::new([7u8; 32]);
        let a = BlockAbstract::bytes_for_signature(NodeId(1), 4, &hash);
        let b = BlockAbstract::bytes_for_signature(NodeId(1), 4, &hash);
        assert_eq!(a, b);
        assert_eq!(a.len(), 44);
    }

    #[test]
    fn verify_accepts_owner_signature() {
        let kp = keypair_from_seed(&[3u8; 32]);
        let hash = BlockHash::new([9u8; 32]);
        let bytes = BlockAbstract::bytes_for_signature(NodeId(2), 5, &hash);
        let signature = sign_message(&bytes, &kp.private);
        let abs = BlockAbstract::new(NodeId(2), 5, hash, signature);
        assert!(abs.verify(&kp.public));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let kp = keypair_from_seed(&[3u8; 32]);
        let other = keypair_from_seed(&[4u8; 32]);
        let hash = BlockHash::new([9u8; 32]);
        let bytes = BlockAbstract::bytes_for_signature(NodeId(2), 5, &hash);
        let signature = sign_message(&bytes, &kp.private);
        let abs = BlockAbstract::new(NodeId(2), 5, hash, signature);
        assert!(!abs.verify(&other.public));
    }

    #[test]
    fn verify_rejects_tampered_fields() {
        let kp = keypair_from_seed(&[3u8; 32]);
        let hash = BlockHash::new([9u8; 32]);
        let bytes = BlockAbstract::bytes_for_signature(NodeId(2), 5, &hash);
        let signature = sign_message(&bytes, &kp.private);
        let abs = BlockAbstract::new(NodeId(2), 6, hash, signature);
        assert!(!abs.verify(&kp.public));
    }
}
