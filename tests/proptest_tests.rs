//! Property-based tests for register reindexing and selection.

mod common;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use common::assert_states_close;
use yao_register::measure::probs;
use yao_register::{join, ArrayReg, Register};

/// `(nqubits, locs, nbatch, seed)` with `locs` a distinct subset of `0..nqubits` in random order.
fn focus_case() -> impl Strategy<Value = (usize, Vec<usize>, usize, u64)> {
    (1usize..6)
        .prop_flat_map(|n| {
            (
                Just(n),
                Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
                0..=n,
                1usize..4,
                any::<u64>(),
            )
        })
        .prop_map(|(n, perm, k, nbatch, seed)| (n, perm[..k].to_vec(), nbatch, seed))
}

fn random_register(nqubits: usize, nbatch: usize, seed: u64) -> ArrayReg {
    let mut rng = StdRng::seed_from_u64(seed);
    let single = ArrayReg::rand_state(nqubits, &mut rng);
    if nbatch == 1 {
        single
    } else {
        single.repeat(nbatch).unwrap()
    }
}

proptest! {
    /// Property: active + remaining = total, and storage matches the split
    #[test]
    fn focus_accounting((n, locs, nbatch, seed) in focus_case()) {
        let mut reg = random_register(n, nbatch, seed);
        reg.focus(&locs).unwrap();
        prop_assert_eq!(reg.active_qubits(), locs.len());
        prop_assert_eq!(reg.active_qubits() + reg.remaining_qubits(), reg.total_qubits());
        prop_assert_eq!(reg.active_locs(), locs.as_slice());
        let (a, r, b) = reg.raw_state().dim();
        prop_assert_eq!((a, r, b), (1 << locs.len(), 1 << (n - locs.len()), nbatch));
    }

    /// Property: relax then refocus on everything restores the exact storage
    #[test]
    fn focus_relax_roundtrip((n, locs, nbatch, seed) in focus_case()) {
        let original = random_register(n, nbatch, seed);
        let mut reg = original.clone();
        reg.focus(&locs).unwrap();
        reg.relax(None, n).unwrap();
        let all: Vec<usize> = (0..n).collect();
        reg.focus(&all).unwrap();
        prop_assert_eq!(reg, original);
    }

    /// Property: focusing never changes the global amplitudes
    #[test]
    fn focus_preserves_statevec((n, locs, nbatch, seed) in focus_case()) {
        let original = random_register(n, nbatch, seed);
        let mut reg = original.clone();
        reg.focus(&locs).unwrap();
        assert_states_close(&reg.statevec(), &original.statevec());
        prop_assert!(reg.is_normalized());
    }

    /// Property: marginal probabilities sum to one per batch member
    #[test]
    fn probs_are_distributions((n, locs, nbatch, seed) in focus_case()) {
        let mut reg = random_register(n, nbatch, seed);
        reg.focus(&locs).unwrap();
        for column in probs(&reg).columns() {
            prop_assert!((column.sum() - 1.0).abs() < 1e-10);
        }
    }

    /// Property: select on a copy equals select in place
    #[test]
    fn select_copy_matches_in_place((n, locs, nbatch, seed) in focus_case(), pick in any::<usize>()) {
        let mut reg = random_register(n, nbatch, seed);
        reg.focus(&locs).unwrap();
        let bits = pick % (1 << locs.len());
        let copy = reg.select(&[bits]).unwrap();
        reg.select_mut(&[bits]).unwrap();
        prop_assert_eq!(copy.total_qubits(), n - locs.len());
        prop_assert_eq!(copy, reg);
    }

    /// Property: join adds qubit counts and keeps normalization
    #[test]
    fn join_accounting(na in 1usize..4, nb in 1usize..4, seed in any::<u64>()) {
        let a = random_register(na, 1, seed);
        let b = random_register(nb, 1, seed.wrapping_add(1));
        let ab = join(&[&a, &b]).unwrap();
        prop_assert_eq!(ab.total_qubits(), na + nb);
        prop_assert!(ab.is_normalized());
    }
}
