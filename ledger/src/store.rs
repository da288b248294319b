//! The local store — the handle threaded through every core operation.
//!
//! Holds the local signing identity, the node registry (fixed at startup),
//! the shared main chain handle and an index of every transaction known by
//! hash. Nothing here is an ambient singleton: callers pass the store
//! explicitly.

use crate::block::Block;
use crate::chain::Chain;
use crate::error::LedgerError;
use crate::main_chain::MainChain;
use crate::node::{Node, OwnNode};
use crate::transaction::Transaction;
use plait_types::{NodeId, PublicKey, TxHash};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub struct LocalStore {
    own: OwnNode,
    nodes: HashMap<NodeId, Arc<Node>>,
    main_chain: Arc<MainChain>,
    /// Every transaction held locally, keyed by hash. Used to resolve the
    /// source references of incoming chain updates.
    transactions: RwLock<HashMap<TxHash, Arc<Transaction>>>,
}

impl LocalStore {
    /// Build a store for `own`, registering the given peers. Every chain
    /// replica starts at the shared genesis block, and the genesis
    /// transactions are indexed immediately.
    pub fn new(
        own: OwnNode,
        genesis: Arc<Block>,
        peers: Vec<(NodeId, PublicKey)>,
        main_chain: Arc<MainChain>,
    ) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            own.id(),
            Arc::new(Node::new(own.id(), own.public_key(), genesis.clone(), true)),
        );
        for (id, public_key) in peers {
            nodes.insert(
                id,
                Arc::new(Node::new(id, public_key, genesis.clone(), false)),
            );
        }

        let mut transactions = HashMap::new();
        for tx in genesis.transactions() {
            transactions.insert(tx.hash(), tx);
        }

        Self {
            own,
            nodes,
            main_chain,
            transactions: RwLock::new(transactions),
        }
    }

    pub fn own_node(&self) -> &OwnNode {
        &self.own
    }

    /// The locally-owned chain. The own node is registered at construction.
    pub fn own_chain(&self) -> &Chain {
        self.nodes[&self.own.id()].chain()
    }

    pub fn node(&self, id: NodeId) -> Result<Arc<Node>, LedgerError> {
        self.nodes
            .get(&id)
            .cloned()
            .ok_or(LedgerError::UnknownNode(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Arc<Node>> {
        self.nodes.values()
    }

    pub fn main_chain(&self) -> &MainChain {
        &self.main_chain
    }

    /// Commit a block of the locally-owned chain to the main chain.
    pub fn commit(&self, block: &Arc<Block>) -> Result<(), LedgerError> {
        self.own_chain().commit(block, &self.own, &self.main_chain)
    }

    pub fn index_transaction(&self, transaction: &Arc<Transaction>) {
        self.transactions
            .write()
            .unwrap()
            .insert(transaction.hash(), transaction.clone());
    }

    pub fn transaction(&self, hash: &TxHash) -> Option<Arc<Transaction>> {
        self.transactions.read().unwrap().get(hash).cloned()
    }
}
