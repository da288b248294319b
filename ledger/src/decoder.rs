//! Chain-update decoding and validation — the receiving side of a proof.
//!
//! Incoming per-node block lists are reconstructed with memoized topological
//! resolution keyed by (owner, block number): a predecessor already held
//! locally is linked to the local copy, a predecessor inside the same bundle
//! is decoded on first use, anything else is an insufficient proof. Every
//! reconstructed block and transaction is re-hashed and compared against the
//! transmitted hash before any local chain state is touched.

use crate::block::{Block, GENESIS_BLOCK_NUMBER};
use crate::error::LedgerError;
use crate::store::LocalStore;
use crate::transaction::Transaction;
use plait_messages::{BlockMessage, MessageError, ProofMessage, TransactionMessage};
use plait_types::{NodeId, TxHash};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Reconstruct a received chain-update bundle against the local store.
///
/// On success the new blocks are appended to the local chain replicas, the
/// new transactions are indexed, the sender's recorded knowledge is raised to
/// the highest block number shipped per node, and the target transaction is
/// returned. On any failure the local store is left untouched.
pub fn decode_proof(
    store: &LocalStore,
    message: &ProofMessage,
) -> Result<Arc<Transaction>, LedgerError> {
    let mut ctx = DecodeContext::new(store, message);

    // Phase 1: reconstruct and verify everything without touching chain state.
    for (node, blocks) in &message.chain_updates {
        for block_message in blocks {
            ctx.decode_block(*node, block_message.number)?;
        }
    }
    let target = ctx.decode_target(&message.transaction)?;

    // Phase 2: apply. Everything decoded above is already verified.
    for (node_id, blocks) in &message.chain_updates {
        let node = store.node(*node_id)?;
        let local_last = node.chain().last_block_number();
        let mut fresh: Vec<Arc<Block>> = blocks
            .iter()
            .filter(|bm| bm.number > local_last)
            .map(|bm| ctx.decoded_blocks[&(*node_id, bm.number)].clone())
            .collect();
        fresh.sort_by_key(|b| b.number());
        for block in fresh {
            for tx in block.transactions() {
                store.index_transaction(&tx);
            }
            node.chain().append_decoded(block)?;
        }
    }
    store.index_transaction(&target);

    // The sender demonstrably holds everything it shipped.
    if let Some(sender_id) = message.transaction.sender {
        let sender = store.node(sender_id)?;
        for (node, blocks) in &message.chain_updates {
            if let Some(highest) = blocks.iter().map(|b| b.number).max() {
                sender.meta_knowledge().record_sent(*node, highest);
            }
        }
    }

    tracing::debug!(
        nodes = message.chain_updates.len(),
        target = %target.hash(),
        "decoded chain update"
    );
    Ok(target)
}

struct DecodeContext<'a> {
    store: &'a LocalStore,
    /// Blocks of the bundle, keyed by (owner, number).
    batch: HashMap<(NodeId, u64), &'a BlockMessage>,
    /// Which bundle block carries each transaction.
    tx_location: HashMap<TxHash, (NodeId, u64)>,
    decoded_blocks: HashMap<(NodeId, u64), Arc<Block>>,
    decoded_txs: HashMap<TxHash, Arc<Transaction>>,
    /// Blocks currently being decoded; re-entry means a cyclic reference.
    visiting: HashSet<(NodeId, u64)>,
}

impl<'a> DecodeContext<'a> {
    fn new(store: &'a LocalStore, message: &'a ProofMessage) -> Self {
        let mut batch = HashMap::new();
        let mut tx_location = HashMap::new();
        for (node, blocks) in &message.chain_updates {
            for block_message in blocks {
                batch.insert((*node, block_message.number), block_message);
                for tx_message in &block_message.transactions {
                    tx_location.insert(tx_message.hash, (*node, block_message.number));
                }
            }
        }
        Self {
            store,
            batch,
            tx_location,
            decoded_blocks: HashMap::new(),
            decoded_txs: HashMap::new(),
            visiting: HashSet::new(),
        }
    }

    fn decode_block(&mut self, owner: NodeId, number: u64) -> Result<Arc<Block>, LedgerError> {
        let key = (owner, number);
        if let Some(done) = self.decoded_blocks.get(&key) {
            return Ok(done.clone());
        }
        let message: &'a BlockMessage = *self.batch.get(&key).ok_or_else(|| {
            LedgerError::MissingAncestor(format!(
                "block {number} of node {owner} is not part of the update"
            ))
        })?;
        let genesis_shaped = number == GENESIS_BLOCK_NUMBER && message.owner.is_none();
        if message.owner != Some(owner) && !genesis_shaped {
            return Err(MessageError::Malformed(format!(
                "block {number} of node {owner} carries the wrong owner"
            ))
            .into());
        }

        let node = self.store.node(owner)?;
        let local_last = node.chain().last_block_number();
        if number <= local_last {
            // Already held — link the local copy, but hold the transmitted
            // hash against it.
            let local = node.chain().block(number).ok_or_else(|| {
                LedgerError::InvalidState(format!(
                    "local chain of node {owner} is missing block {number}"
                ))
            })?;
            if local.hash() != message.hash {
                return Err(LedgerError::HashMismatch(format!(
                    "block {number} of node {owner} differs from the local copy"
                )));
            }
            self.decoded_blocks.insert(key, local.clone());
            return Ok(local);
        }

        if !self.visiting.insert(key) {
            return Err(LedgerError::HashMismatch(format!(
                "cyclic reference at block {number} of node {owner}"
            )));
        }

        let previous_number = message.previous_number.ok_or_else(|| {
            MessageError::Malformed(format!(
                "non-genesis block {number} lacks a predecessor number"
            ))
        })?;
        if previous_number + 1 != number {
            return Err(MessageError::Malformed(format!(
                "block {number} declares non-adjacent predecessor {previous_number}"
            ))
            .into());
        }
        let previous = if previous_number <= local_last {
            node.chain().block(previous_number).ok_or_else(|| {
                LedgerError::InvalidState(format!(
                    "local chain of node {owner} is missing block {previous_number}"
                ))
            })?
        } else if self.batch.contains_key(&(owner, previous_number)) {
            self.decode_block(owner, previous_number)?
        } else {
            return Err(LedgerError::MissingAncestor(format!(
                "predecessor {previous_number} of block {number} of node {owner} \
                 is neither held locally nor part of the update"
            )));
        };

        let mut transactions = Vec::with_capacity(message.transactions.len());
        for tx_message in &message.transactions {
            if tx_message.block_number != number {
                return Err(MessageError::Malformed(format!(
                    "transaction stamped for block {} inside block {number}",
                    tx_message.block_number
                ))
                .into());
            }
            transactions.push(self.decode_transaction(tx_message)?);
        }

        let block = Block::from_parts(number, Some(previous), message.owner, transactions);
        if block.hash() != message.hash {
            return Err(LedgerError::HashMismatch(format!(
                "block {number} of node {owner} does not hash to its transmitted hash"
            )));
        }

        self.visiting.remove(&key);
        self.decoded_blocks.insert(key, block.clone());
        Ok(block)
    }

    fn decode_transaction(
        &mut self,
        message: &'a TransactionMessage,
    ) -> Result<Arc<Transaction>, LedgerError> {
        if let Some(done) = self.decoded_txs.get(&message.hash) {
            return Ok(done.clone());
        }
        let mut sources = Vec::with_capacity(message.sources.len());
        for source_hash in &message.sources {
            sources.push(self.resolve_source(source_hash)?);
        }
        let transaction = match message.sender {
            Some(sender) => Transaction::new(
                sender,
                message.receiver,
                message.amount,
                message.remainder,
                sources,
            ),
            None => {
                if !sources.is_empty() {
                    return Err(MessageError::Malformed(
                        "genesis transaction carries sources".into(),
                    )
                    .into());
                }
                Transaction::genesis(message.receiver, message.amount)
            }
        };
        transaction.stamp_block_number(message.block_number);
        if transaction.hash() != message.hash {
            return Err(LedgerError::HashMismatch(format!(
                "transaction {} does not hash to its transmitted hash",
                message.hash
            )));
        }
        self.decoded_txs.insert(message.hash, transaction.clone());
        Ok(transaction)
    }

    fn resolve_source(&mut self, hash: &TxHash) -> Result<Arc<Transaction>, LedgerError> {
        if let Some(tx) = self.decoded_txs.get(hash) {
            return Ok(tx.clone());
        }
        if let Some(tx) = self.store.transaction(hash) {
            return Ok(tx);
        }
        if let Some(&(owner, number)) = self.tx_location.get(hash) {
            self.decode_block(owner, number)?;
            if let Some(tx) = self.decoded_txs.get(hash) {
                return Ok(tx.clone());
            }
        }
        Err(LedgerError::MissingAncestor(format!(
            "source transaction {hash} is neither held locally nor part of the update"
        )))
    }

    fn decode_target(
        &mut self,
        message: &'a TransactionMessage,
    ) -> Result<Arc<Transaction>, LedgerError> {
        if let Some(done) = self.decoded_txs.get(&message.hash) {
            return Ok(done.clone());
        }
        if let Some(tx) = self.store.transaction(&message.hash) {
            return Ok(tx);
        }
        self.decode_transaction(message)
    }
}
