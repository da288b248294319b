//! Proof construction — the minimal chain history that substantiates one
//! transaction to one receiver.
//!
//! The builder walks the source-transaction DAG rooted at the target,
//! prunes per node using what the receiver is already known to hold, and
//! materializes the remaining block ranges from the local chain replicas.
//! A proof is transient: built, encoded, sent, discarded.

use crate::block::Block;
use crate::error::LedgerError;
use crate::store::LocalStore;
use crate::transaction::Transaction;
use plait_messages::{BlockMessage, ProofMessage, TransactionMessage};
use plait_types::{NodeId, TxHash};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

pub struct Proof {
    transaction: Arc<Transaction>,
    /// Per node, the ordered block range the receiver is missing.
    chain_updates: BTreeMap<NodeId, Vec<Arc<Block>>>,
}

impl Proof {
    /// Build the proof of `transaction` for its receiver.
    ///
    /// For every node reachable through the source DAG, the required range is
    /// the union of the ranges demanded by each of that node's transactions —
    /// ranges for one node are always a prefix ending at the highest required
    /// block number, so the union keeps the maximum upper bound seen and
    /// never re-lowers it. A transaction whose block the receiver already
    /// holds ends its branch of the walk: the proof that delivered that block
    /// was itself complete.
    pub fn create(store: &LocalStore, transaction: &Arc<Transaction>) -> Result<Self, LedgerError> {
        let receiver = store.node(transaction.receiver())?;
        let meta = receiver.meta_knowledge();

        let mut visited: HashSet<TxHash> = HashSet::new();
        let mut known: HashMap<NodeId, Option<u64>> = HashMap::new();
        let mut required: HashMap<NodeId, u64> = HashMap::new();
        let mut worklist: Vec<Arc<Transaction>> = vec![transaction.clone()];

        while let Some(tx) = worklist.pop() {
            if !visited.insert(tx.hash()) {
                continue;
            }
            let Some(owner) = tx.sender() else {
                // Genesis transactions sit in the shared genesis block,
                // implicitly known to every peer.
                continue;
            };
            let block_number = tx.block_number().ok_or_else(|| {
                LedgerError::InvalidState(format!("{tx:?} is not part of a block"))
            })?;
            let known_height = *known
                .entry(owner)
                .or_insert_with(|| meta.known_height(owner));
            if known_height.is_some_and(|k| block_number <= k) {
                continue;
            }
            let entry = required.entry(owner).or_insert(block_number);
            if *entry < block_number {
                *entry = block_number;
            }
            worklist.extend(tx.sources().iter().cloned());
        }

        let mut chain_updates = BTreeMap::new();
        for (owner, highest) in required {
            let start = known[&owner].map_or(0, |k| k + 1);
            let node = store.node(owner)?;
            chain_updates.insert(owner, node.chain().blocks_in_range(start, highest));
        }

        Ok(Self {
            transaction: transaction.clone(),
            chain_updates,
        })
    }

    pub fn transaction(&self) -> &Arc<Transaction> {
        &self.transaction
    }

    pub fn chain_updates(&self) -> &BTreeMap<NodeId, Vec<Arc<Block>>> {
        &self.chain_updates
    }

    /// Encode this proof as a wire bundle.
    pub fn to_message(&self) -> Result<ProofMessage, LedgerError> {
        let block_number = self.transaction.block_number().ok_or_else(|| {
            LedgerError::InvalidState("proof target is not part of a block".into())
        })?;
        Ok(ProofMessage {
            transaction: transaction_to_message(&self.transaction, block_number),
            chain_updates: self
                .chain_updates
                .iter()
                .map(|(node, blocks)| {
                    (*node, blocks.iter().map(|b| block_to_message(b)).collect())
                })
                .collect(),
        })
    }

    /// Record that this proof reached the receiver.
    ///
    /// Only called after delivery is confirmed: an abandoned send leaves the
    /// receiver's recorded knowledge untouched and costs at worst a superset
    /// proof next time.
    pub fn record_sent(&self, store: &LocalStore) -> Result<(), LedgerError> {
        let receiver = store.node(self.transaction.receiver())?;
        for (node, blocks) in &self.chain_updates {
            if let Some(last) = blocks.last() {
                receiver.meta_knowledge().record_sent(*node, last.number());
            }
        }
        Ok(())
    }
}

fn transaction_to_message(tx: &Transaction, block_number: u64) -> TransactionMessage {
    TransactionMessage {
        sender: tx.sender(),
        receiver: tx.receiver(),
        amount: tx.amount(),
        remainder: tx.remainder(),
        sources: tx.source_hashes(),
        block_number,
        hash: tx.hash(),
    }
}

pub(crate) fn block_to_message(block: &Block) -> BlockMessage {
    BlockMessage {
        number: block.number(),
        owner: block.owner(),
        previous_number: block.previous().map(|p| p.number()),
        transactions: block
            .transactions()
            .iter()
            .map(|tx| transaction_to_message(tx, block.number()))
            .collect(),
        hash: block.hash(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis::create_genesis;
    use crate::main_chain::MainChain;
    use crate::node::OwnNode;
    use plait_crypto::keypair_from_seed;

    fn two_node_store() -> LocalStore {
        let own = OwnNode::new(NodeId(0), keypair_from_seed(&[1u8; 32]));
        let peer = keypair_from_seed(&[2u8; 32]);
        LocalStore::new(
            own,
            create_genesis(2, 1000),
            vec![(NodeId(1), peer.public)],
            Arc::new(MainChain::new()),
        )
    }

    #[test]
    fn genesis_target_yields_empty_proof() {
        let store = two_node_store();
        let genesis_tx = store.own_chain().genesis_transaction().unwrap();
        let proof = Proof::create(&store, &genesis_tx).unwrap();
        assert!(proof.chain_updates().is_empty());
    }

    #[test]
    fn proof_ships_whole_prefix_to_fresh_receiver() {
        let store = two_node_store();
        let genesis_tx = store.own_chain().genesis_transaction().unwrap();
        let tx = Transaction::new(NodeId(0), NodeId(1), 100, 900, vec![genesis_tx]);
        let block = store.own_chain().append_block();
        block.add_transaction(tx.clone()).unwrap();

        let proof = Proof::create(&store, &tx).unwrap();

        let updates = &proof.chain_updates()[&NodeId(0)];
        let numbers: Vec<u64> = updates.iter().map(|b| b.number()).collect();
        assert_eq!(numbers, vec![0, 1]);
    }

    #[test]
    fn record_sent_raises_receiver_knowledge() {
        let store = two_node_store();
        let genesis_tx = store.own_chain().genesis_transaction().unwrap();
        let tx = Transaction::new(NodeId(0), NodeId(1), 100, 900, vec![genesis_tx]);
        let block = store.own_chain().append_block();
        block.add_transaction(tx.clone()).unwrap();

        let proof = Proof::create(&store, &tx).unwrap();
        let receiver = store.node(NodeId(1)).unwrap();
        assert_eq!(receiver.meta_knowledge().known_height(NodeId(0)), None);

        proof.record_sent(&store).unwrap();
        assert_eq!(receiver.meta_knowledge().known_height(NodeId(0)), Some(1));
    }

    #[test]
    fn proof_never_ships_known_blocks() {
        let store = two_node_store();
        let genesis_tx = store.own_chain().genesis_transaction().unwrap();
        let tx1 = Transaction::new(NodeId(0), NodeId(1), 100, 900, vec![genesis_tx]);
        let b1 = store.own_chain().append_block();
        b1.add_transaction(tx1.clone()).unwrap();
        let tx2 = Transaction::new(NodeId(0), NodeId(1), 200, 700, vec![tx1]);
        let b2 = store.own_chain().append_block();
        b2.add_transaction(tx2.clone()).unwrap();

        let receiver = store.node(NodeId(1)).unwrap();
        receiver.meta_knowledge().record_sent(NodeId(0), 1);

        let proof = Proof::create(&store, &tx2).unwrap();
        let updates = &proof.chain_updates()[&NodeId(0)];
        let numbers: Vec<u64> = updates.iter().map(|b| b.number()).collect();
        assert_eq!(numbers, vec![2]);
    }

    #[test]
    fn unstamped_target_is_rejected() {
        let store = two_node_store();
        let genesis_tx = store.own_chain().genesis_transaction().unwrap();
        let tx = Transaction::new(NodeId(0), NodeId(1), 100, 900, vec![genesis_tx]);

        let result = Proof::create(&store, &tx);
        assert!(matches!(result, Err(LedgerError::InvalidState(_))));
    }
}
