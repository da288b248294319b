//! Transaction creation — selecting sources out of the unspent pool.

use crate::error::LedgerError;
use crate::node::OwnNode;
use crate::transaction::Transaction;
use plait_types::NodeId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Builds outgoing transactions for the local node, tracking which held
/// transactions still carry unspent value.
///
/// A transaction received by the local node is spendable for its amount; a
/// transaction sent by the local node is spendable for its remainder. Sources
/// are selected smallest-first, so dust is consumed before larger holdings.
pub struct TransactionCreator {
    pool: Mutex<Vec<Arc<Transaction>>>,
}

impl TransactionCreator {
    pub fn new() -> Self {
        Self {
            pool: Mutex::new(Vec::new()),
        }
    }

    /// Add a spendable transaction (a received payment or a genesis holding).
    pub fn deposit(&self, transaction: Arc<Transaction>) {
        self.pool.lock().unwrap().push(transaction);
    }

    /// Total value currently spendable by `own`.
    pub fn available(&self, own: &OwnNode) -> u64 {
        self.pool
            .lock()
            .unwrap()
            .iter()
            .map(|tx| spendable_amount(tx, own.id()))
            .sum()
    }

    /// Create a transaction paying `amount` to `receiver`.
    ///
    /// Selects sources smallest-first until the amount is covered; the
    /// leftover becomes the new transaction's remainder, which stays
    /// spendable by the local node. Fails with `InsufficientFunds` when the
    /// pool cannot cover the amount.
    pub fn create(
        &self,
        own: &OwnNode,
        receiver: NodeId,
        amount: u64,
    ) -> Result<Arc<Transaction>, LedgerError> {
        let mut pool = self.pool.lock().unwrap();

        let mut candidates: Vec<(u64, usize)> = pool
            .iter()
            .enumerate()
            .filter_map(|(index, tx)| {
                let value = spendable_amount(tx, own.id());
                (value > 0).then_some((value, index))
            })
            .collect();
        candidates.sort();

        let mut gathered = 0u64;
        let mut selected: Vec<usize> = Vec::new();
        for (value, index) in &candidates {
            if gathered >= amount {
                break;
            }
            gathered += value;
            selected.push(*index);
        }
        if gathered < amount {
            let available: u64 = candidates.iter().map(|(value, _)| value).sum();
            return Err(LedgerError::InsufficientFunds {
                needed: amount,
                available,
            });
        }

        let sources: Vec<Arc<Transaction>> =
            selected.iter().map(|index| pool[*index].clone()).collect();
        let transaction =
            Transaction::new(own.id(), receiver, amount, gathered - amount, sources);

        let spent: HashSet<usize> = selected.into_iter().collect();
        let mut index = 0;
        pool.retain(|_| {
            let keep = !spent.contains(&index);
            index += 1;
            keep
        });
        if transaction.remainder() > 0 {
            pool.push(transaction.clone());
        }
        Ok(transaction)
    }
}

impl Default for TransactionCreator {
    fn default() -> Self {
        Self::new()
    }
}

fn spendable_amount(transaction: &Transaction, own: NodeId) -> u64 {
    if transaction.receiver() == own {
        transaction.amount()
    } else if transaction.sender() == Some(own) {
        transaction.remainder()
    } else {
        0
    }
}
