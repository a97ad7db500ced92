mod common;

use approx::assert_abs_diff_eq;
use ndarray::Array2;
use num_complex::Complex64;
use rand::SeedableRng;

use common::{c, ramp_register};
use yao_register::{ArrayReg, Register, RegisterError};

#[test]
fn test_zero_state_accounting() {
    let reg = ArrayReg::zero_state(4);
    assert_eq!(reg.total_qubits(), 4);
    assert_eq!(reg.active_qubits(), 4);
    assert_eq!(reg.remaining_qubits(), 0);
    assert_eq!(reg.batch_size(), 1);
    assert_eq!(reg.raw_state().dim(), (16, 1, 1));
    assert_eq!(reg.raw_state()[[0, 0, 0]], c(1.0, 0.0));
}

#[test]
fn test_zero_state_batched() {
    let reg = ArrayReg::zero_state_batched(2, 5).unwrap();
    assert_eq!(reg.batch_size(), 5);
    assert_eq!(reg.raw_state().dim(), (4, 1, 5));
    for b in 0..5 {
        assert_eq!(reg.raw_state()[[0, 0, b]], c(1.0, 0.0));
    }
}

#[test]
fn test_zero_batch_is_rejected() {
    assert_eq!(
        ArrayReg::zero_state_batched(2, 0).unwrap_err(),
        RegisterError::InvalidBatchSize(0)
    );
}

#[test]
fn test_product_state_little_endian() {
    // qubit 0 = 1, qubit 2 = 1
    let reg = ArrayReg::product_state(0b101, 3).unwrap();
    let v = reg.statevec();
    assert_eq!(v[[5, 0]], c(1.0, 0.0));
    assert_eq!(v.iter().filter(|a| a.norm() > 0.0).count(), 1);
}

#[test]
fn test_product_state_out_of_range() {
    assert_eq!(
        ArrayReg::product_state(4, 2).unwrap_err(),
        RegisterError::InvalidBasisState { bits: 4, nactive: 2 }
    );
}

#[test]
fn test_uniform_and_ghz_are_normalized() {
    assert!(ArrayReg::uniform_state(5).is_normalized());
    assert!(ArrayReg::ghz_state(4).is_normalized());
    let ghz = ArrayReg::ghz_state(3).statevec();
    assert_abs_diff_eq!(ghz[[0, 0]].re, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
    assert_abs_diff_eq!(ghz[[7, 0]].re, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
}

#[test]
fn test_rand_state_is_normalized() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let reg = ArrayReg::rand_state(6, &mut rng);
    assert_abs_diff_eq!(reg.norm()[0], 1.0, epsilon = 1e-12);
}

#[test]
fn test_from_statevec_shape_checks() {
    let err = ArrayReg::from_statevec(3, Array2::zeros((4, 1))).unwrap_err();
    assert_eq!(err, RegisterError::QubitCountMismatch { expected: 3, actual: 2 });
    let err = ArrayReg::from_statevec(2, Array2::<Complex64>::zeros((4, 0))).unwrap_err();
    assert_eq!(err, RegisterError::InvalidBatchSize(0));
}

#[test]
fn test_statevec_roundtrip() {
    let reg = ramp_register(3, 2);
    let again = ArrayReg::from_statevec(3, reg.statevec()).unwrap();
    assert_eq!(reg, again);
}

#[test]
fn test_view_batch_is_single_batch_slice() {
    let reg = ramp_register(2, 3);
    for i in 0..3 {
        let view = reg.view_batch(i).unwrap();
        assert_eq!(view.batch_size(), 1);
        assert_eq!(view.total_qubits(), 2);
        assert_eq!(view.active_qubits(), 2);
        for a in 0..4 {
            assert_eq!(view.raw_state()[[a, 0, 0]], reg.raw_state()[[a, 0, i]]);
        }
    }
}

#[test]
fn test_view_batch_follows_focus() {
    let mut reg = ramp_register(3, 2);
    reg.focus(&[2, 0]).unwrap();
    let view = reg.view_batch(1).unwrap();
    assert_eq!(view.active_locs(), &[2, 0]);
    assert_eq!(view.remaining_qubits(), 1);
    let owned = view.to_owned();
    assert_eq!(owned.statevec().column(0), reg.statevec().column(1));
}

#[test]
fn test_view_batch_index_out_of_range() {
    let reg = ArrayReg::zero_state_batched(1, 2).unwrap();
    assert_eq!(
        reg.view_batch(2).unwrap_err(),
        RegisterError::BatchIndexOutOfRange { index: 2, nbatch: 2 }
    );
}

#[test]
fn test_normalize_per_batch() {
    let mut reg = ramp_register(2, 3);
    assert!(!reg.is_normalized());
    reg.normalize();
    for n in reg.norm() {
        assert_abs_diff_eq!(n, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_fidelity() {
    let zero = ArrayReg::zero_state(2);
    let uniform = ArrayReg::uniform_state(2);
    assert_abs_diff_eq!(zero.fidelity(&zero).unwrap()[0], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(zero.fidelity(&uniform).unwrap()[0], 0.5, epsilon = 1e-12);
}

#[test]
fn test_fidelity_ignores_layout() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(3);
    let reg = ArrayReg::rand_state(4, &mut rng);
    let mut focused = reg.clone();
    focused.focus(&[3, 1]).unwrap();
    assert_abs_diff_eq!(reg.fidelity(&focused).unwrap()[0], 1.0, epsilon = 1e-12);
}

#[test]
fn test_fidelity_size_mismatch() {
    let err = ArrayReg::zero_state(2).fidelity(&ArrayReg::zero_state(3)).unwrap_err();
    assert_eq!(err, RegisterError::QubitCountMismatch { expected: 2, actual: 3 });
}

#[test]
fn test_raw_state_mut_writes_active_axis() {
    let mut reg = ArrayReg::zero_state(2);
    reg.focus(&[1]).unwrap();
    // move |q1=0> to |q1=1> for every remaining index
    let mut state = reg.raw_state_mut();
    for r in 0..2 {
        let amp = state[[0, r, 0]];
        state[[1, r, 0]] = amp;
        state[[0, r, 0]] = c(0.0, 0.0);
    }
    assert_eq!(reg.statevec()[[0b10, 0]], c(1.0, 0.0));
}
