//! Blake2b hashing for blocks and transactions.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use plait_types::{BlockHash, TxHash};

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
///
/// Order-sensitive: the parts are fed to the hasher in the given order.
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash canonical block bytes to produce a `BlockHash`.
pub fn hash_block(block_bytes: &[u8]) -> BlockHash {
    BlockHash::new(blake2b_256(block_bytes))
}

/// Hash canonical transaction bytes to produce a `TxHash`.
pub fn hash_transaction(tx_bytes: &[u8]) -> TxHash {
    TxHash::new(blake2b_256(tx_bytes))
}
