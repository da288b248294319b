//! The main chain — a shared, append-only, globally ordered log of block
//! abstracts contributed by all nodes.
//!
//! The main chain stores no blocks or transactions. It answers exactly one
//! question: is there a committed abstract for this (owner, number, hash)
//! triple. Cross-owner interleaving on the log is arbitrary; a correctly
//! locked chain commits its own abstracts in ascending order, so an
//! out-of-order submission is logged as a warning rather than rejected.

use crate::block::Block;
use crate::block_abstract::BlockAbstract;
use plait_types::{BlockHash, NodeId};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

pub struct MainChain {
    inner: RwLock<MainChainInner>,
}

struct MainChainInner {
    abstracts: Vec<BlockAbstract>,
    /// Lookup index for `is_present`.
    present: HashSet<(NodeId, u64, BlockHash)>,
    /// Highest block number seen per owner.
    frontier: HashMap<NodeId, u64>,
}

impl MainChain {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MainChainInner {
                abstracts: Vec::new(),
                present: HashSet::new(),
                frontier: HashMap::new(),
            }),
        }
    }

    /// Append an abstract to the log. Safe under concurrent calls from many
    /// owners' chains. An exact duplicate is dropped.
    pub fn commit_abstract(&self, block_abstract: BlockAbstract) {
        let mut inner = self.inner.write().unwrap();
        let owner = block_abstract.owner();
        let number = block_abstract.block_number();
        let key = (owner, number, block_abstract.block_hash());
        if inner.present.contains(&key) {
            tracing::warn!(owner = %owner, number, "duplicate abstract dropped");
            return;
        }
        match inner.frontier.get(&owner) {
            Some(&last) if number <= last => {
                tracing::warn!(
                    owner = %owner,
                    number,
                    last,
                    "abstract arrived out of order for its owner"
                );
            }
            _ => {
                inner.frontier.insert(owner, number);
            }
        }
        inner.present.insert(key);
        inner.abstracts.push(block_abstract);
    }

    /// Whether a committed abstract matches this exact block — same owner,
    /// same number, same hash. Says nothing about higher or lower blocks of
    /// the same owner.
    pub fn is_present(&self, block: &Block) -> bool {
        let Some(owner) = block.owner() else {
            // The genesis block has no abstract; presence is handled by
            // `Block::is_on_main_chain`.
            return false;
        };
        let inner = self.inner.read().unwrap();
        inner.present.contains(&(owner, block.number(), block.hash()))
    }

    pub fn abstract_count(&self) -> usize {
        self.inner.read().unwrap().abstracts.len()
    }

    /// Snapshot of the log in commit order.
    pub fn abstracts(&self) -> Vec<BlockAbstract> {
        self.inner.read().unwrap().abstracts.clone()
    }
}

impl Default for MainChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;
    use plait_types::Signature;

    fn sample_abstract(owner: u32, number: u64, hash_byte: u8) -> BlockAbstract {
        BlockAbstract::new(
            NodeId(owner),
            number,
            BlockHash::new([hash_byte; 32]),
            Signature([1u8; 64]),
        )
    }

    #[test]
    fn committed_abstract_is_present_by_exact_triple() {
        let main_chain = MainChain::new();
        let genesis = Block::genesis(vec![Transaction::genesis(NodeId(0), 1000)]);
        let block = Block::next(genesis, NodeId(0), false);
        let abs = BlockAbstract::new(
            NodeId(0),
            block.number(),
            block.hash(),
            Signature([1u8; 64]),
        );
        main_chain.commit_abstract(abs);

        assert!(main_chain.is_present(&block));
    }

    #[test]
    fn different_hash_is_not_present() {
        let main_chain = MainChain::new();
        let genesis = Block::genesis(vec![Transaction::genesis(NodeId(0), 1000)]);
        let block = Block::next(genesis, NodeId(0), false);
        main_chain.commit_abstract(sample_abstract(0, 1, 0xFF));

        assert!(!main_chain.is_present(&block));
    }

    #[test]
    fn duplicate_abstract_dropped() {
        let main_chain = MainChain::new();
        main_chain.commit_abstract(sample_abstract(0, 1, 0xAA));
        main_chain.commit_abstract(sample_abstract(0, 1, 0xAA));
        assert_eq!(main_chain.abstract_count(), 1);
    }

    #[test]
    fn cross_owner_interleaving_is_arbitrary() {
        let main_chain = MainChain::new();
        main_chain.commit_abstract(sample_abstract(1, 1, 0x01));
        main_chain.commit_abstract(sample_abstract(0, 1, 0x02));
        main_chain.commit_abstract(sample_abstract(1, 2, 0x03));
        main_chain.commit_abstract(sample_abstract(2, 1, 0x04));
        assert_eq!(main_chain.abstract_count(), 4);
    }

    #[test]
    fn late_lower_abstract_is_still_recorded() {
        let main_chain = MainChain::new();
        main_chain.commit_abstract(sample_abstract(0, 2, 0x02));
        main_chain.commit_abstract(sample_abstract(0, 1, 0x01));
        assert_eq!(main_chain.abstract_count(), 2);
    }
}
