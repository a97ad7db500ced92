//! Applying operators to the active qubits of a register.

use ndarray::{Array2, Axis};
use num_complex::Complex64;
use tracing::trace;

use crate::block::{Block, PositionedGate};
use crate::error::{RegisterError, Result};
use crate::index::{bits_to_index, log2_exact};
use crate::register::{ArrayReg, Register};

/// Multiply the active axis of every remaining/batch column by `matrix`.
///
/// `matrix` must be `2^active x 2^active`, indexed by the active basis
/// (bit `k` = qubit `active_locs()[k]`).
pub fn apply_matrix(reg: &mut ArrayReg, matrix: &Array2<Complex64>) -> Result<()> {
    let nactive = reg.active_qubits();
    let dim = 1usize << nactive;
    if matrix.dim() != (dim, dim) {
        return Err(RegisterError::QubitCountMismatch {
            expected: nactive,
            actual: log2_exact(matrix.nrows()).unwrap_or(matrix.nrows()),
        });
    }
    for mut slot in reg.raw_state_mut().axis_iter_mut(Axis(2)) {
        let updated = matrix.dot(&slot);
        slot.assign(&updated);
    }
    Ok(())
}

/// Build the matrix of a controlled gate over `targets ++ controls`.
///
/// Targets occupy the low `ntargets` bits of the index. Rows whose control
/// bits differ from `configs` act as identity.
fn controlled_matrix(gate_matrix: &Array2<Complex64>, ntargets: usize, configs: &[bool]) -> Array2<Complex64> {
    if configs.is_empty() {
        return gate_matrix.clone();
    }
    let trigger = bits_to_index(&configs.iter().map(|&c| usize::from(c)).collect::<Vec<_>>());
    let tdim = 1usize << ntargets;
    let dim = tdim << configs.len();
    let mut mat = Array2::zeros((dim, dim));
    for row in 0..dim {
        let ctrl = row >> ntargets;
        if ctrl == trigger {
            let base = ctrl << ntargets;
            for col in 0..tdim {
                mat[[row, base | col]] = gate_matrix[[row & (tdim - 1), col]];
            }
        } else {
            mat[[row, row]] = Complex64::new(1.0, 0.0);
        }
    }
    mat
}

fn apply_positioned(reg: &mut ArrayReg, pg: &PositionedGate) -> Result<()> {
    let locs = pg.all_locs();
    reg.focus(&locs)?;
    let matrix = controlled_matrix(&pg.gate.matrix(), pg.target_locs.len(), &pg.control_configs);
    trace!(gate = %pg.gate, locs = ?locs, "apply");
    apply_matrix(reg, &matrix)
}

/// Apply a block tree to `reg`.
///
/// Each primitive is applied by focusing on its targets and controls. The
/// register's active set is restored afterwards.
///
/// # Example
/// ```
/// use yao_register::{apply, ArrayReg, Register, block::{chain, control, put}, gate::Gate};
///
/// let mut reg = ArrayReg::zero_state(2);
/// let bell = chain(2, vec![put(2, vec![0], Gate::H), control(2, vec![0], vec![1], Gate::X)]);
/// apply(&mut reg, &bell).unwrap();
/// let amps = reg.statevec();
/// assert!((amps[[0b00, 0]].re - 0.5_f64.sqrt()).abs() < 1e-12);
/// assert!((amps[[0b11, 0]].re - 0.5_f64.sqrt()).abs() < 1e-12);
/// ```
pub fn apply(reg: &mut ArrayReg, block: &Block) -> Result<()> {
    if block.nqubits() != reg.total_qubits() {
        return Err(RegisterError::QubitCountMismatch {
            expected: reg.total_qubits(),
            actual: block.nqubits(),
        });
    }
    block.validate()?;
    let saved = reg.active_locs().to_vec();
    for pg in block.primitives() {
        apply_positioned(reg, pg)?;
    }
    reg.focus(&saved)?;
    Ok(())
}
