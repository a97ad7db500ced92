//! Building larger registers out of smaller ones.

use ndarray::{s, Array3};
use num_complex::Complex64;
use tracing::debug;

use crate::error::{RegisterError, Result};
use crate::register::{ArrayReg, Register};

/// Tensor product of registers.
///
/// Qubit spaces are concatenated: the qubits of `regs[0]` keep their labels,
/// the qubits of `regs[1]` are shifted up by `regs[0].total_qubits()`, and so
/// on. The active sets are concatenated in the same way, so the result's
/// active index is the first operand's active index in the low bits. All
/// operands must share one batch size.
///
/// # Example
/// ```
/// use yao_register::{join, ArrayReg, Register};
/// let a = ArrayReg::zero_state(1);
/// let b = ArrayReg::product_state(1, 1).unwrap();
/// let ab = join(&[&a, &b]).unwrap();
/// assert_eq!(ab.total_qubits(), 2);
/// assert_eq!(ab.statevec()[[0b10, 0]].re, 1.0);
/// ```
pub fn join(regs: &[&ArrayReg]) -> Result<ArrayReg> {
    let (first, rest) = regs.split_first().ok_or(RegisterError::EmptyJoin)?;
    let nbatch = first.batch_size();
    if let Some(other) = rest.iter().find(|r| r.batch_size() != nbatch) {
        return Err(RegisterError::BatchSizeMismatch {
            expected: nbatch,
            actual: other.batch_size(),
        });
    }
    let joined = rest
        .iter()
        .fold((*first).clone(), |acc, reg| join_pair(&acc, reg));
    debug!(
        operands = regs.len(),
        nqubits = joined.total_qubits(),
        nbatch,
        "join"
    );
    Ok(joined)
}

/// Kronecker product of two registers with equal batch size.
fn join_pair(low: &ArrayReg, high: &ArrayReg) -> ArrayReg {
    let nlow = low.total_qubits();
    let (al, ah) = (low.nactive, high.nactive);
    let rl = low.remaining_qubits();
    let rh = high.remaining_qubits();

    let mut order = low.order[..al].to_vec();
    order.extend(high.order[..ah].iter().map(|&q| q + nlow));
    order.extend_from_slice(&low.order[al..]);
    order.extend(high.order[ah..].iter().map(|&q| q + nlow));

    let amask = (1usize << al) - 1;
    let rmask = (1usize << rl) - 1;
    let state = Array3::from_shape_fn(
        (1 << (al + ah), 1 << (rl + rh), low.batch_size()),
        |(a, r, b)| low.state[[a & amask, r & rmask, b]] * high.state[[a >> al, r >> rl, b]],
    );

    ArrayReg {
        state,
        nactive: al + ah,
        order,
    }
}

impl ArrayReg {
    /// Stack `n` copies of a single-batch register into one batch.
    pub fn repeat(&self, n: usize) -> Result<ArrayReg> {
        if self.batch_size() != 1 {
            return Err(RegisterError::BatchSizeMismatch {
                expected: 1,
                actual: self.batch_size(),
            });
        }
        if n == 0 {
            return Err(RegisterError::InvalidBatchSize(n));
        }
        let (a, r, _) = self.state.dim();
        let state = Array3::from_shape_fn((a, r, n), |(i, j, _)| self.state[[i, j, 0]]);
        debug!(nbatch = n, "repeat");
        Ok(ArrayReg {
            state,
            nactive: self.nactive,
            order: self.order.clone(),
        })
    }

    /// Append `n` qubits in |0> after the existing ones.
    ///
    /// The new qubits get labels `total_qubits()..total_qubits() + n` and
    /// join the remaining set.
    pub fn addbit(&mut self, n: usize) -> &mut Self {
        let (a, r, b) = self.state.dim();
        let mut state = Array3::<Complex64>::zeros((a, r << n, b));
        state.slice_mut(s![.., ..r, ..]).assign(&self.state);
        let nqubits = self.total_qubits();
        self.order.extend(nqubits..nqubits + n);
        self.state = state;
        debug!(added = n, nqubits = nqubits + n, "addbit");
        self
    }
}
