//! Genesis creation — the shared first block of every chain.

use crate::block::Block;
use crate::transaction::Transaction;
use plait_types::NodeId;
use std::sync::Arc;

/// Create the shared genesis block seeding `node_count` nodes with
/// `initial_amount` each.
///
/// The genesis block has number 0, no owner and no predecessor, and carries
/// one genesis transaction per node, in node-id order. Every node's chain
/// replica starts at this block, so its hash is deterministic across the
/// whole network.
pub fn create_genesis(node_count: u32, initial_amount: u64) -> Arc<Block> {
    let transactions = (0..node_count)
        .map(|id| Transaction::genesis(NodeId(id), initial_amount))
        .collect();
    Block::genesis(transactions)
}
