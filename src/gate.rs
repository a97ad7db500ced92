use ndarray::{array, Array2};
use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};
use std::fmt;

use crate::index::log2_exact;

/// Single- and two-qubit gates, plus arbitrary unitaries as `Custom`.
///
/// Multi-qubit matrices are little-endian over the gate's target list: the
/// first target is the least-significant bit of the row/column index.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    X,
    Y,
    Z,
    H,
    S,
    T,
    SWAP,
    /// Phase gate: diag(1, e^(iθ)). Equivalent to Yao.jl's `shift(θ)`.
    Phase(f64),
    Rx(f64),
    Ry(f64),
    Rz(f64),
    Custom {
        matrix: Array2<Complex64>,
        label: String,
    },
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gate::X => "X",
            Gate::Y => "Y",
            Gate::Z => "Z",
            Gate::H => "H",
            Gate::S => "S",
            Gate::T => "T",
            Gate::SWAP => "SWAP",
            Gate::Phase(_) => "Phase",
            Gate::Rx(_) => "Rx",
            Gate::Ry(_) => "Ry",
            Gate::Rz(_) => "Rz",
            Gate::Custom { label, .. } => label.as_str(),
        };
        match self.parameter() {
            Some(theta) => write!(f, "{}({:.4})", name, theta),
            None => f.write_str(name),
        }
    }
}

impl Gate {
    /// Rotation angle of a parametrized gate.
    pub fn parameter(&self) -> Option<f64> {
        match self {
            Gate::Phase(theta) | Gate::Rx(theta) | Gate::Ry(theta) | Gate::Rz(theta) => Some(*theta),
            _ => None,
        }
    }

    /// Number of qubits the gate acts on.
    ///
    /// A custom matrix whose size is not a power of two reports 0 qubits and
    /// is rejected when the gate is applied.
    pub fn num_qubits(&self) -> usize {
        match self {
            Gate::SWAP => 2,
            Gate::Custom { matrix, .. } if matrix.is_square() => {
                log2_exact(matrix.nrows()).unwrap_or(0)
            }
            Gate::Custom { .. } => 0,
            _ => 1,
        }
    }

    /// Whether the matrix is diagonal in the computational basis.
    pub fn is_diagonal(&self) -> bool {
        match self {
            Gate::Z | Gate::S | Gate::T | Gate::Phase(_) | Gate::Rz(_) => true,
            Gate::Custom { matrix, .. } => matrix
                .indexed_iter()
                .all(|((i, j), v)| i == j || v.norm_sqr() == 0.0),
            _ => false,
        }
    }

    /// Matrix of the gate in the little-endian basis of its targets.
    pub fn matrix(&self) -> Array2<Complex64> {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);

        match self {
            Gate::X => array![[zero, one], [one, zero]],
            Gate::Y => array![[zero, -i], [i, zero]],
            Gate::Z => array![[one, zero], [zero, -one]],
            Gate::H => {
                let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
                array![[s, s], [s, -s]]
            }
            Gate::S => array![[one, zero], [zero, i]],
            Gate::T => array![[one, zero], [zero, Complex64::from_polar(1.0, FRAC_PI_4)]],
            Gate::SWAP => array![
                [one, zero, zero, zero],
                [zero, zero, one, zero],
                [zero, one, zero, zero],
                [zero, zero, zero, one],
            ],
            Gate::Phase(theta) => array![[one, zero], [zero, Complex64::from_polar(1.0, *theta)]],
            Gate::Rx(theta) => {
                let cos = Complex64::new((theta / 2.0).cos(), 0.0);
                let neg_i_sin = Complex64::new(0.0, -(theta / 2.0).sin());
                array![[cos, neg_i_sin], [neg_i_sin, cos]]
            }
            Gate::Ry(theta) => {
                let cos = Complex64::new((theta / 2.0).cos(), 0.0);
                let sin = Complex64::new((theta / 2.0).sin(), 0.0);
                array![[cos, -sin], [sin, cos]]
            }
            Gate::Rz(theta) => array![
                [Complex64::from_polar(1.0, -theta / 2.0), zero],
                [zero, Complex64::from_polar(1.0, theta / 2.0)],
            ],
            Gate::Custom { matrix, .. } => matrix.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_unitary(m: &Array2<Complex64>) -> bool {
        let product = m.t().mapv(|c| c.conj()).dot(m);
        product
            .indexed_iter()
            .all(|((i, j), v)| {
                let expected = if i == j { 1.0 } else { 0.0 };
                (*v - Complex64::new(expected, 0.0)).norm() < 1e-12
            })
    }

    #[test]
    fn test_named_gates_are_unitary() {
        for gate in [
            Gate::X,
            Gate::Y,
            Gate::Z,
            Gate::H,
            Gate::S,
            Gate::T,
            Gate::SWAP,
            Gate::Phase(0.3),
            Gate::Rx(0.7),
            Gate::Ry(1.1),
            Gate::Rz(-0.4),
        ] {
            assert!(is_unitary(&gate.matrix()), "{} is not unitary", gate);
        }
    }

    #[test]
    fn test_num_qubits() {
        assert_eq!(Gate::H.num_qubits(), 1);
        assert_eq!(Gate::SWAP.num_qubits(), 2);
        let custom = Gate::Custom {
            matrix: Array2::eye(8),
            label: "U".to_string(),
        };
        assert_eq!(custom.num_qubits(), 3);
        let bad = Gate::Custom {
            matrix: Array2::eye(3),
            label: "V".to_string(),
        };
        assert_eq!(bad.num_qubits(), 0);
    }

    #[test]
    fn test_is_diagonal() {
        assert!(Gate::Rz(0.2).is_diagonal());
        assert!(!Gate::H.is_diagonal());
        let diag = Gate::Custom {
            matrix: Array2::eye(2),
            label: "I".to_string(),
        };
        assert!(diag.is_diagonal());
    }
}
