//! Per-node chain management.
//!
//! A chain is the ordered sequence of one node's blocks, indexed by block
//! number starting at genesis, plus the cursor of the highest block whose
//! abstract is confirmed on the main chain. All read-modify-write sequences
//! on a chain run under its single mutex — appends, commits and decoded
//! appends on the same chain are mutually exclusive, while operations on
//! different chains proceed in parallel.

use crate::block::{Block, GENESIS_BLOCK_NUMBER};
use crate::error::LedgerError;
use crate::main_chain::MainChain;
use crate::node::OwnNode;
use crate::transaction::Transaction;
use plait_types::NodeId;
use std::sync::{Arc, Mutex};

pub struct Chain {
    owner: NodeId,
    /// Whether the local process holds this chain's signing key.
    owned_locally: bool,
    inner: Mutex<ChainInner>,
}

struct ChainInner {
    blocks: Vec<Arc<Block>>,
    /// Highest block number whose abstract is confirmed on the main chain.
    /// Genesis is implicitly committed.
    last_committed: u64,
}

impl Chain {
    pub(crate) fn new(owner: NodeId, genesis: Arc<Block>, owned_locally: bool) -> Self {
        Self {
            owner,
            owned_locally,
            inner: Mutex::new(ChainInner {
                blocks: vec![genesis],
                last_committed: GENESIS_BLOCK_NUMBER,
            }),
        }
    }

    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Append a new empty Open block extending the current last block.
    pub fn append_block(&self) -> Arc<Block> {
        let mut inner = self.inner.lock().unwrap();
        // A chain always contains at least its genesis block.
        let previous = inner.blocks[inner.blocks.len() - 1].clone();
        let block = Block::next(previous, self.owner, self.owned_locally);
        inner.blocks.push(block.clone());
        block
    }

    pub fn last_block(&self) -> Arc<Block> {
        let inner = self.inner.lock().unwrap();
        inner.blocks[inner.blocks.len() - 1].clone()
    }

    pub fn last_block_number(&self) -> u64 {
        let inner = self.inner.lock().unwrap();
        (inner.blocks.len() - 1) as u64
    }

    pub fn last_committed_number(&self) -> u64 {
        self.inner.lock().unwrap().last_committed
    }

    pub fn block(&self, number: u64) -> Option<Arc<Block>> {
        self.inner.lock().unwrap().blocks.get(number as usize).cloned()
    }

    /// Snapshot of all blocks, ascending by number.
    pub fn blocks(&self) -> Vec<Arc<Block>> {
        self.inner.lock().unwrap().blocks.clone()
    }

    /// Snapshot of the blocks numbered `start..=end`, ascending.
    pub fn blocks_in_range(&self, start: u64, end: u64) -> Vec<Arc<Block>> {
        if end < start {
            return Vec::new();
        }
        let inner = self.inner.lock().unwrap();
        inner
            .blocks
            .iter()
            .skip(start as usize)
            .take((end.saturating_sub(start) + 1) as usize)
            .cloned()
            .collect()
    }

    /// The genesis transaction seeding this chain's owner.
    pub fn genesis_transaction(&self) -> Option<Arc<Transaction>> {
        let genesis = self.inner.lock().unwrap().blocks[0].clone();
        genesis.genesis_transaction_for(self.owner)
    }

    /// Commit `block` to the main chain.
    ///
    /// Fails with `AlreadyFinalized` if the block was committed before and
    /// with `Unauthorized` if this chain is not locally owned. Otherwise,
    /// atomically with respect to other operations on this chain: every
    /// not-yet-committed block up to and including `block` gets its abstract
    /// calculated and appended to the main chain in ascending order, is
    /// marked Finalized, and the committed cursor advances to `block`.
    /// Committing the whole prefix keeps every block at or below the cursor
    /// abstracted and freezes the predecessors whose hashes the published
    /// hash depends on.
    pub fn commit(
        &self,
        block: &Arc<Block>,
        own: &OwnNode,
        main_chain: &MainChain,
    ) -> Result<(), LedgerError> {
        if self.owner != own.id() {
            return Err(LedgerError::Unauthorized(format!(
                "cannot commit blocks of node {}",
                self.owner
            )));
        }
        let mut inner = self.inner.lock().unwrap();
        if block.is_finalized() {
            return Err(LedgerError::AlreadyFinalized {
                number: block.number(),
            });
        }
        let target = block.number();
        match inner.blocks.get(target as usize) {
            Some(held) if Arc::ptr_eq(held, block) => {}
            _ => {
                return Err(LedgerError::InvalidState(
                    "block does not belong to this chain".into(),
                ))
            }
        }
        for number in (inner.last_committed + 1)..=target {
            let b = inner.blocks[number as usize].clone();
            let block_abstract = b.calculate_abstract(own)?;
            main_chain.commit_abstract(block_abstract);
            b.mark_finalized();
        }
        inner.last_committed = target;
        tracing::debug!(owner = %self.owner, block = target, "committed chain prefix");
        Ok(())
    }

    /// Append a fully validated decoded block. The chain stays contiguous:
    /// the block must extend the current last block.
    pub(crate) fn append_decoded(&self, block: Arc<Block>) -> Result<(), LedgerError> {
        let mut inner = self.inner.lock().unwrap();
        let expected = inner.blocks.len() as u64;
        if block.number() != expected {
            return Err(LedgerError::InvalidState(format!(
                "decoded block {} does not extend chain of node {} at {}",
                block.number(),
                self.owner,
                expected - 1
            )));
        }
        if block.owner() != Some(self.owner) {
            return Err(LedgerError::InvalidState(
                "decoded block belongs to a different node".into(),
            ));
        }
        inner.blocks.push(block);
        Ok(())
    }
}
