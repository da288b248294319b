//! Blocks of a per-node chain.
//!
//! Blocks for one owner form a singly-linked list via `previous`. A block's
//! hash covers its number, the previous block's hash, the owner id and every
//! contained transaction's hash, in that fixed order, which makes any chain
//! prefix tamper-evident. A block is Open when created and transitions to
//! Finalized exactly once, when its chain commits it.

use crate::block_abstract::BlockAbstract;
use crate::error::LedgerError;
use crate::main_chain::MainChain;
use crate::node::OwnNode;
use crate::transaction::Transaction;
use plait_crypto::hash_block;
use plait_types::{BlockHash, NodeId};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

pub const GENESIS_BLOCK_NUMBER: u64 = 0;

pub struct Block {
    number: u64,
    /// Structural link to the predecessor; the chain owns all blocks
    /// transitively, so this never forms a cycle.
    previous: Option<Arc<Block>>,
    /// `None` only for the shared genesis block.
    owner: Option<NodeId>,
    transactions: Mutex<Vec<Arc<Transaction>>>,
    hash: OnceLock<BlockHash>,
    finalized: AtomicBool,
    /// True while this is a locally-owned block whose abstract has not been
    /// created yet — such a block is definitely absent from the main chain.
    has_no_abstract: AtomicBool,
    /// Caches a positive main-chain presence answer.
    on_main_chain: AtomicBool,
}

impl Block {
    /// The shared genesis block: number 0, no owner, no predecessor.
    ///
    /// Genesis is created Finalized — it is implicitly on the main chain and
    /// must never be mutated.
    pub(crate) fn genesis(transactions: Vec<Arc<Transaction>>) -> Arc<Self> {
        for tx in &transactions {
            tx.stamp_block_number(GENESIS_BLOCK_NUMBER);
        }
        Arc::new(Self {
            number: GENESIS_BLOCK_NUMBER,
            previous: None,
            owner: None,
            transactions: Mutex::new(transactions),
            hash: OnceLock::new(),
            finalized: AtomicBool::new(true),
            has_no_abstract: AtomicBool::new(false),
            on_main_chain: AtomicBool::new(true),
        })
    }

    /// An empty Open block extending `previous`.
    ///
    /// A block on the locally-owned chain is guaranteed to have no abstract
    /// until one is calculated for it.
    pub(crate) fn next(previous: Arc<Block>, owner: NodeId, owned_locally: bool) -> Arc<Self> {
        Arc::new(Self {
            number: previous.number + 1,
            previous: Some(previous),
            owner: Some(owner),
            transactions: Mutex::new(Vec::new()),
            hash: OnceLock::new(),
            finalized: AtomicBool::new(false),
            has_no_abstract: AtomicBool::new(owned_locally),
            on_main_chain: AtomicBool::new(false),
        })
    }

    /// Reassemble a block received from a peer. Decoded blocks are immutable,
    /// so they are created Finalized.
    pub(crate) fn from_parts(
        number: u64,
        previous: Option<Arc<Block>>,
        owner: Option<NodeId>,
        transactions: Vec<Arc<Transaction>>,
    ) -> Arc<Self> {
        for tx in &transactions {
            tx.stamp_block_number(number);
        }
        Arc::new(Self {
            number,
            previous,
            owner,
            transactions: Mutex::new(transactions),
            hash: OnceLock::new(),
            finalized: AtomicBool::new(true),
            has_no_abstract: AtomicBool::new(false),
            on_main_chain: AtomicBool::new(false),
        })
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub fn previous(&self) -> Option<&Arc<Block>> {
        self.previous.as_ref()
    }

    /// Snapshot of the contained transactions, in block order.
    pub fn transactions(&self) -> Vec<Arc<Transaction>> {
        self.transactions.lock().unwrap().clone()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::Acquire)
    }

    pub(crate) fn mark_finalized(&self) {
        self.finalized.store(true, Ordering::Release);
    }

    /// Append a transaction and stamp its block number.
    ///
    /// Fails with `InvalidState` once the block is Finalized.
    pub fn add_transaction(&self, transaction: Arc<Transaction>) -> Result<(), LedgerError> {
        if self.is_finalized() {
            return Err(LedgerError::InvalidState(
                "cannot add transactions to a committed block".into(),
            ));
        }
        transaction.stamp_block_number(self.number);
        self.transactions.lock().unwrap().push(transaction);
        Ok(())
    }

    /// The block hash, computed on first use and cached.
    ///
    /// Covers, in order: the block number, the previous block's hash (empty
    /// for genesis), the owner id (omitted for genesis) and every contained
    /// transaction's hash. Transaction order inside the block matters.
    pub fn hash(&self) -> BlockHash {
        *self.hash.get_or_init(|| {
            let mut buffer = Vec::new();
            buffer.extend_from_slice(&self.number.to_be_bytes());
            if let Some(previous) = &self.previous {
                buffer.extend_from_slice(previous.hash().as_bytes());
            }
            if let Some(owner) = self.owner {
                buffer.extend_from_slice(&owner.to_be_bytes());
            }
            for tx in self.transactions.lock().unwrap().iter() {
                buffer.extend_from_slice(tx.hash().as_bytes());
            }
            hash_block(&buffer)
        })
    }

    /// Produce this block's signed abstract.
    ///
    /// Fails with `Unauthorized` unless the block is owned by the local
    /// signing identity.
    pub fn calculate_abstract(&self, own: &OwnNode) -> Result<BlockAbstract, LedgerError> {
        let Some(owner) = self.owner else {
            return Err(LedgerError::Unauthorized(
                "the genesis block has no abstract".into(),
            ));
        };
        if owner != own.id() {
            return Err(LedgerError::Unauthorized(format!(
                "cannot calculate the abstract of a block owned by node {owner}"
            )));
        }
        let hash = self.hash();
        let bytes = BlockAbstract::bytes_for_signature(owner, self.number, &hash);
        let signature = own.sign(&bytes);
        self.has_no_abstract.store(false, Ordering::Release);
        Ok(BlockAbstract::new(owner, self.number, hash, signature))
    }

    /// Whether an abstract of this block is present on the main chain.
    ///
    /// Genesis is always present. Positive answers are cached so the main
    /// chain is queried at most once per block on the happy path; a
    /// locally-owned block without an abstract is known absent without any
    /// query.
    pub fn is_on_main_chain(&self, main_chain: &MainChain) -> bool {
        if self.number == GENESIS_BLOCK_NUMBER {
            return true;
        }
        if self.has_no_abstract.load(Ordering::Acquire) {
            return false;
        }
        if self.on_main_chain.load(Ordering::Acquire) {
            return true;
        }
        if main_chain.is_present(self) {
            self.on_main_chain.store(true, Ordering::Release);
            return true;
        }
        false
    }

    /// The genesis transaction seeding `node`, if this block carries one.
    pub fn genesis_transaction_for(&self, node: NodeId) -> Option<Arc<Transaction>> {
        self.transactions
            .lock()
            .unwrap()
            .iter()
            .find(|tx| tx.is_genesis() && tx.receiver() == node)
            .cloned()
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.owner {
            Some(owner) => write!(f, "Block<{}, {}>", self.number, owner),
            None => write!(f, "Block<{}, genesis>", self.number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plait_crypto::keypair_from_seed;

    fn own_node(id: u32) -> OwnNode {
        OwnNode::new(NodeId(id), keypair_from_seed(&[id as u8 + 1; 32]))
    }

    fn genesis_with(txs: Vec<Arc<Transaction>>) -> Arc<Block> {
        Block::genesis(txs)
    }

    #[test]
    fn hash_is_deterministic() {
        let genesis = genesis_with(vec![Transaction::genesis(NodeId(0), 1000)]);
        let block = Block::next(genesis, NodeId(0), true);
        assert_eq!(block.hash(), block.hash());
    }

    #[test]
    fn hash_changes_with_transactions() {
        let genesis = genesis_with(vec![Transaction::genesis(NodeId(0), 1000)]);
        let a = Block::next(genesis.clone(), NodeId(0), true);
        let b = Block::next(genesis, NodeId(0), true);
        b.add_transaction(Transaction::new(NodeId(0), NodeId(1), 10, 0, Vec::new()))
            .unwrap();
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn hash_changes_with_previous() {
        let g1 = genesis_with(vec![Transaction::genesis(NodeId(0), 1000)]);
        let g2 = genesis_with(vec![Transaction::genesis(NodeId(0), 2000)]);
        let a = Block::next(g1, NodeId(0), true);
        let b = Block::next(g2, NodeId(0), true);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn add_transaction_stamps_block_number() {
        let genesis = genesis_with(vec![Transaction::genesis(NodeId(0), 1000)]);
        let block = Block::next(genesis, NodeId(0), true);
        let tx = Transaction::new(NodeId(0), NodeId(1), 10, 0, Vec::new());
        block.add_transaction(tx.clone()).unwrap();
        assert_eq!(tx.block_number(), Some(1));
    }

    #[test]
    fn add_transaction_to_finalized_block_fails() {
        let genesis = genesis_with(vec![Transaction::genesis(NodeId(0), 1000)]);
        let block = Block::next(genesis, NodeId(0), true);
        block.mark_finalized();
        let result = block.add_transaction(Transaction::genesis(NodeId(1), 1));
        assert!(matches!(result, Err(LedgerError::InvalidState(_))));
    }

    #[test]
    fn genesis_block_rejects_transactions() {
        let genesis = genesis_with(vec![Transaction::genesis(NodeId(0), 1000)]);
        let result = genesis.add_transaction(Transaction::genesis(NodeId(1), 1));
        assert!(matches!(result, Err(LedgerError::InvalidState(_))));
    }

    #[test]
    fn abstract_requires_ownership() {
        let genesis = genesis_with(vec![Transaction::genesis(NodeId(0), 1000)]);
        let block = Block::next(genesis, NodeId(0), true);
        let stranger = own_node(5);
        assert!(matches!(
            block.calculate_abstract(&stranger),
            Err(LedgerError::Unauthorized(_))
        ));
    }

    #[test]
    fn abstract_signed_by_owner_verifies() {
        let own = own_node(0);
        let genesis = genesis_with(vec![Transaction::genesis(NodeId(0), 1000)]);
        let block = Block::next(genesis, NodeId(0), true);
        let abs = block.calculate_abstract(&own).unwrap();
        assert!(abs.verify(&own.public_key()));
        assert_eq!(abs.block_number(), 1);
        assert_eq!(abs.block_hash(), block.hash());
    }

    #[test]
    fn genesis_has_no_abstract() {
        let own = own_node(0);
        let genesis = genesis_with(vec![Transaction::genesis(NodeId(0), 1000)]);
        assert!(matches!(
            genesis.calculate_abstract(&own),
            Err(LedgerError::Unauthorized(_))
        ));
    }

    #[test]
    fn genesis_is_always_on_main_chain() {
        let genesis = genesis_with(vec![Transaction::genesis(NodeId(0), 1000)]);
        let main_chain = MainChain::new();
        assert!(genesis.is_on_main_chain(&main_chain));
    }

    #[test]
    fn own_uncommitted_block_is_not_on_main_chain() {
        let genesis = genesis_with(vec![Transaction::genesis(NodeId(0), 1000)]);
        let block = Block::next(genesis, NodeId(0), true);
        let main_chain = MainChain::new();
        assert!(!block.is_on_main_chain(&main_chain));
    }
}
