//! Cryptographic primitives for the plait ledger.
//!
//! - **Ed25519** for signing and verifying block abstracts
//! - **Blake2b** for content hashing (block hashes, transaction hashes)

pub mod hash;
pub mod keys;
pub mod sign;

pub use hash::{blake2b_256, blake2b_256_multi, hash_block, hash_transaction};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature};
