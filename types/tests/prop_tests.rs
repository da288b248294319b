use proptest::prelude::*;

use plait_types::{BlockHash, NodeId, TxHash};

proptest! {
    /// BlockHash roundtrip: new -> as_bytes -> new produces identical hash.
    #[test]
    fn block_hash_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        prop_assert_eq!(hash.as_bytes(), &bytes);
    }

    /// TxHash roundtrip: new -> as_bytes -> new produces identical hash.
    #[test]
    fn tx_hash_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = TxHash::new(bytes);
        prop_assert_eq!(hash.as_bytes(), &bytes);
    }

    /// BlockHash::is_zero is true only for all-zero bytes.
    #[test]
    fn block_hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// TxHash::is_zero is true only for all-zero bytes.
    #[test]
    fn tx_hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let hash = TxHash::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// BlockHash bincode serialization roundtrip.
    #[test]
    fn block_hash_bincode_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        let encoded = bincode::serialize(&hash).unwrap();
        let decoded: BlockHash = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded.as_bytes(), hash.as_bytes());
    }

    /// TxHash bincode serialization roundtrip.
    #[test]
    fn tx_hash_bincode_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = TxHash::new(bytes);
        let encoded = bincode::serialize(&hash).unwrap();
        let decoded: TxHash = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded.as_bytes(), hash.as_bytes());
    }

    /// NodeId bincode serialization roundtrip.
    #[test]
    fn node_id_bincode_roundtrip(id in 0u32..u32::MAX) {
        let node = NodeId(id);
        let encoded = bincode::serialize(&node).unwrap();
        let decoded: NodeId = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, node);
    }

    /// NodeId ordering matches the underlying integer ordering.
    #[test]
    fn node_id_ordering(a in 0u32..u32::MAX, b in 0u32..u32::MAX) {
        prop_assert_eq!(NodeId(a) <= NodeId(b), a <= b);
        prop_assert_eq!(NodeId(a) == NodeId(b), a == b);
    }

    /// NodeId big-endian bytes roundtrip through u32.
    #[test]
    fn node_id_be_bytes(id in 0u32..u32::MAX) {
        let node = NodeId(id);
        prop_assert_eq!(u32::from_be_bytes(node.to_be_bytes()), id);
    }
}
