//! Ed25519 key generation.

use ed25519_dalek::SigningKey;
use plait_types::{KeyPair, PrivateKey, PublicKey};

/// Generate a new Ed25519 key pair from a secure random source.
pub fn generate_keypair() -> KeyPair {
    let seed: [u8; 32] = rand::random();
    keypair_from_seed(&seed)
}

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    let signing_key = SigningKey::from_bytes(&private.0);
    let verifying_key = signing_key.verifying_key();
    PublicKey(verifying_key.to_bytes())
}

/// Reconstruct a full key pair from a private key.
pub fn keypair_from_private(private: PrivateKey) -> KeyPair {
    let public = public_from_private(&private);
    KeyPair { public, private }
}

/// Derive a key pair from a 32-byte seed (deterministic).
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let signing_key = SigningKey::from_bytes(seed);
    let verifying_key = signing_key.verifying_key();
    KeyPair {
        public: PublicKey(verifying_key.to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_valid_keypair() {
        let kp = generate_keypair();
        assert_ne!(kp.public.0, [0u8; 32]);
        assert_ne!(kp.private.0, [0u8; 32]);
    }

    #[test]
    fn public_from_private_is_deterministic() {
        let kp = generate_keypair();
        let pub2 = public_from_private(&kp.private);
        assert_eq!(kp.public.0, pub2.0);
    }

    #[test]
    fn keypair_from_private_roundtrip() {
        let kp1 = generate_keypair();
        let kp2 = keypair_from_private(PrivateKey(kp1.private.0));
        assert_eq!(kp1.public.0, kp2.public.0);
    }

    #[test]
    fn keypair_from_seed_deterministic() {
        let seed = [42u8; 32];
        let kp1 = keypair_from_seed(&seed);
        let kp2 = keypair_from_seed(&seed);
        assert_eq!(kp1.public.0, kp2.public.0);
        assert_eq!(kp1.private.0, kp2.private.0);
    }

    #[test]
    fn different_seeds_produce_different_keys() {
        let kp1 = keypair_from_seed(&[1u8; 32]);
        let kp2 = keypair_from_seed(&[2u8; 32]);
        assert_ne!(kp1.public.0, kp2.public.0);
    }
}
