//! Read-only views of a single batch member.

use ndarray::{s, ArrayView3};
use num_complex::Complex64;

use crate::error::{RegisterError, Result};
use crate::register::{ArrayReg, Register};

/// Non-owning view of one batch slot of an [`ArrayReg`].
///
/// The view borrows the parent immutably, so the parent cannot be focused,
/// selected or otherwise mutated while the view is alive. Its amplitudes
/// cannot be written through the view; use [`BatchView::to_owned`] for an
/// independent copy.
#[derive(Debug, Clone)]
pub struct BatchView<'a> {
    state: ArrayView3<'a, Complex64>,
    order: &'a [usize],
    nactive: usize,
    index: usize,
}

impl<'a> BatchView<'a> {
    pub(crate) fn new(reg: &'a ArrayReg, index: usize) -> Result<Self> {
        let nbatch = reg.batch_size();
        if index >= nbatch {
            return Err(RegisterError::BatchIndexOutOfRange { index, nbatch });
        }
        Ok(BatchView {
            state: reg.state.slice(s![.., .., index..index + 1]),
            order: &reg.order,
            nactive: reg.nactive,
            index,
        })
    }

    /// Which batch slot of the parent this view covers.
    pub fn batch_index(&self) -> usize {
        self.index
    }

    /// Copy the viewed slot into a standalone single-batch register.
    pub fn to_owned(&self) -> ArrayReg {
        ArrayReg {
            state: self.state.to_owned(),
            nactive: self.nactive,
            order: self.order.to_vec(),
        }
    }
}

impl Register for BatchView<'_> {
    fn total_qubits(&self) -> usize {
        self.order.len()
    }

    fn active_qubits(&self) -> usize {
        self.nactive
    }

    fn batch_size(&self) -> usize {
        1
    }

    fn raw_state(&self) -> ArrayView3<'_, Complex64> {
        self.state.view()
    }

    fn active_locs(&self) -> &[usize] {
        &self.order[..self.nactive]
    }
}
