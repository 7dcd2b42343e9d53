use bitvec::prelude::*;
use huffman_tree::{BitReader, Tree, ALPHABET_SIZE};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn table(weights: &BTreeMap<u8, u64>) -> [u64; ALPHABET_SIZE] {
    let mut freq = [0u64; ALPHABET_SIZE];
    for (&s, &w) in weights {
        freq[s as usize] = w;
    }
    freq
}

proptest! {
    #[test]
    fn test_symbol_roundtrip(
        weights in prop::collection::btree_map(any::<u8>(), 1..10_000u64, 1..64),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..200),
    ) {
        let tree = Tree::build(&table(&weights));
        let symbols: Vec<u8> = weights.keys().copied().collect();
        let message: Vec<u8> = picks.iter().map(|i| *i.get(&symbols)).collect();

        let mut bits = BitVec::<u8, Msb0>::new();
        for &s in &message {
            tree.encode(s, &mut bits).unwrap();
        }

        let mut r = BitReader::new(&bits);
        let decoded: Vec<u8> = message
            .iter()
            .map(|_| tree.decode(&mut r).unwrap())
            .collect();

        prop_assert_eq!(decoded, message);
        prop_assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_shape_roundtrip(
        weights in prop::collection::btree_map(any::<u8>(), 1..10_000u64, 1..200),
    ) {
        let tree = Tree::build(&table(&weights));

        let mut bits = BitVec::<u8, Msb0>::new();
        tree.serialize_shape(&mut bits).unwrap();
        // every internal node costs 1 bit, every leaf 9
        prop_assert_eq!(bits.len(), 10 * weights.len() - 1);

        let mut r = BitReader::new(&bits);
        let rebuilt = Tree::deserialize_shape(&mut r).unwrap();

        prop_assert!(rebuilt.same_shape(&tree));
        prop_assert_eq!(r.remaining(), 0);
        for &s in weights.keys() {
            prop_assert_eq!(rebuilt.code_for(s).unwrap(), tree.code_for(s).unwrap());
        }
    }

    #[test]
    fn test_leaves_match_nonzero_entries(
        freq in prop::collection::vec(
            prop_oneof![3 => Just(0u64), 1 => 1..500u64],
            ALPHABET_SIZE,
        ),
    ) {
        let freq: [u64; ALPHABET_SIZE] = freq.try_into().unwrap();
        let tree = Tree::build(&freq);
        let present = freq.iter().filter(|&&f| f > 0).count();

        prop_assert_eq!(tree.symbol_count(), present);
        prop_assert_eq!(tree.is_empty(), present == 0);
        if present > 0 {
            prop_assert_eq!(tree.len(), 2 * present - 1);
            let root = tree.node(tree.root().unwrap()).unwrap();
            prop_assert_eq!(root.weight(), freq.iter().sum::<u64>());
        }
        for (s, &f) in freq.iter().enumerate() {
            prop_assert_eq!(tree.leaf(s as u8).is_some(), f > 0);
        }
    }

    #[test]
    fn test_order_preserving_relabel_keeps_codes(
        weights in prop::collection::btree_map(0..128u8, 1..50u64, 2..64),
    ) {
        // s -> 2s + 1 keeps the (weight, symbol) order, including every tie
        let relabeled: BTreeMap<u8, u64> = weights.iter().map(|(&s, &w)| (2 * s + 1, w)).collect();

        let a = Tree::build(&table(&weights));
        let b = Tree::build(&table(&relabeled));

        for &s in weights.keys() {
            prop_assert_eq!(a.code_for(s).unwrap(), b.code_for(2 * s + 1).unwrap());
        }
    }

    #[test]
    fn test_heavier_symbols_never_get_longer_codes(
        weights in prop::collection::btree_map(any::<u8>(), 1..1_000u64, 2..64),
    ) {
        let tree = Tree::build(&table(&weights));

        for (&x, &wx) in &weights {
            for (&y, &wy) in &weights {
                if wx > wy {
                    let (cx, cy) = (tree.code_for(x).unwrap(), tree.code_for(y).unwrap());
                    prop_assert!(cx.len() <= cy.len());
                }
            }
        }
    }
}
