//! Shared test utilities for yao-register integration tests.
#![allow(dead_code)]

use ndarray::Array2;
use num_complex::Complex64;

use yao_register::block::{chain, control, put};
use yao_register::gate::Gate;
use yao_register::{apply, ArrayReg};

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-10
}

pub fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// Register whose amplitude for basis state `i` in batch `b` is `(i + 1 + 100 b) - i·i`.
///
/// Not normalized; every amplitude is distinct, which makes reindexing
/// mistakes visible.
pub fn ramp_register(nqubits: usize, nbatch: usize) -> ArrayReg {
    let data = Array2::from_shape_fn((1 << nqubits, nbatch), |(i, b)| {
        c(i as f64 + 1.0 + 100.0 * b as f64, -(i as f64))
    });
    ArrayReg::from_statevec(nqubits, data).unwrap()
}

/// Bell state (|00> + |11>)/√2 built by H + CNOT.
pub fn bell_register() -> ArrayReg {
    let mut reg = ArrayReg::zero_state(2);
    let circuit = chain(
        2,
        vec![put(2, vec![0], Gate::H), control(2, vec![0], vec![1], Gate::X)],
    );
    apply(&mut reg, &circuit).unwrap();
    reg
}

/// Single-qubit |+>.
pub fn plus_register() -> ArrayReg {
    let s = std::f64::consts::FRAC_1_SQRT_2;
    ArrayReg::from_amplitudes(1, ndarray::array![c(s, 0.0), c(s, 0.0)]).unwrap()
}

pub fn assert_states_close(a: &Array2<Complex64>, b: &Array2<Complex64>) {
    assert_eq!(a.dim(), b.dim(), "shape mismatch");
    for ((idx, x), y) in a.indexed_iter().zip(b.iter()) {
        assert!((x - y).norm() < 1e-10, "mismatch at {:?}: {} vs {}", idx, x, y);
    }
}
