//! Batched quantum registers.
//!
//! An [`ArrayReg`] holds `batch_size` independent state vectors over the same
//! qubits. A subset of the qubits is *active*: those are the qubits an
//! operator sees. The amplitudes are stored as a tensor of shape
//! `(2^active, 2^remaining, batch)`, so the active qubits always live on the
//! leading axis.
//!
//! # Layout
//!
//! `order[k]` is the global qubit stored at storage bit `k`, where the storage
//! index of element `[a, r, b]` is `a | r << active`. The active part of
//! `order` is the caller's focus order (`order[0]` is the least-significant
//! bit of the active index). The remaining part is kept sorted, so a fully
//! relaxed register, or one focused on `0..n` in order, is in canonical
//! little-endian layout.

use ndarray::{Array1, Array2, Array3, ArrayView3, ArrayViewMut3, Axis};
use num_complex::Complex64;
use rand::Rng;
use tracing::debug;

use crate::error::{RegisterError, Result};
use crate::index::{check_locs, inverse_permutation, is_permutation, log2_exact, scatter_bits};
use crate::measure::PROB_TOLERANCE;
use crate::view::BatchView;

/// Read-only register interface shared by owning registers and batch views.
///
/// These queries are everything an operator needs to validate that it fits a
/// register and to locate the amplitudes it acts on.
pub trait Register {
    /// Number of qubits the register spans.
    fn total_qubits(&self) -> usize;

    /// Number of qubits exposed on the leading (active) axis.
    fn active_qubits(&self) -> usize;

    /// Number of qubits on the trailing (remaining) axis.
    fn remaining_qubits(&self) -> usize {
        self.total_qubits() - self.active_qubits()
    }

    /// Number of state copies tracked together.
    fn batch_size(&self) -> usize;

    /// Amplitudes with shape `(2^active, 2^remaining, batch)`.
    fn raw_state(&self) -> ArrayView3<'_, Complex64>;

    /// Global qubit indices of the active axis, least-significant bit first.
    fn active_locs(&self) -> &[usize];
}

/// Dense, owning batched register.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayReg {
    pub(crate) state: Array3<Complex64>,
    pub(crate) nactive: usize,
    pub(crate) order: Vec<usize>,
}

/// Complete an active list with the remaining qubits in ascending order.
pub(crate) fn with_remaining(active: &[usize], nqubits: usize) -> Vec<usize> {
    let mut is_active = vec![false; nqubits];
    for &q in active {
        is_active[q] = true;
    }
    let mut order = active.to_vec();
    order.extend((0..nqubits).filter(|&q| !is_active[q]));
    order
}

impl ArrayReg {
    /// Build a fully active register from canonical amplitudes `(2^n, batch)`.
    fn from_canonical(nqubits: usize, data: &Array2<Complex64>) -> Self {
        let dim = 1usize << nqubits;
        let nbatch = data.ncols();
        let state = Array3::from_shape_fn((dim, 1, nbatch), |(i, _, b)| data[[i, b]]);
        ArrayReg {
            state,
            nactive: nqubits,
            order: (0..nqubits).collect(),
        }
    }

    /// Creates |0...0> on `nqubits` qubits with a single batch member.
    pub fn zero_state(nqubits: usize) -> Self {
        let mut data = Array2::zeros((1 << nqubits, 1));
        data[[0, 0]] = Complex64::new(1.0, 0.0);
        Self::from_canonical(nqubits, &data)
    }

    /// Creates `nbatch` copies of |0...0>.
    pub fn zero_state_batched(nqubits: usize, nbatch: usize) -> Result<Self> {
        if nbatch == 0 {
            return Err(RegisterError::InvalidBatchSize(nbatch));
        }
        let mut data = Array2::zeros((1 << nqubits, nbatch));
        data.row_mut(0).fill(Complex64::new(1.0, 0.0));
        Ok(Self::from_canonical(nqubits, &data))
    }

    /// Creates the computational basis state `|bits>`; qubit `q` is bit `q` of `bits`.
    ///
    /// # Example
    /// ```
    /// use yao_register::{ArrayReg, Register};
    /// let reg = ArrayReg::product_state(0b10, 2).unwrap();
    /// assert_eq!(reg.statevec()[[2, 0]].re, 1.0);
    /// ```
    pub fn product_state(bits: usize, nqubits: usize) -> Result<Self> {
        if bits >= 1 << nqubits {
            return Err(RegisterError::InvalidBasisState {
                bits,
                nactive: nqubits,
            });
        }
        let mut data = Array2::zeros((1 << nqubits, 1));
        data[[bits, 0]] = Complex64::new(1.0, 0.0);
        Ok(Self::from_canonical(nqubits, &data))
    }

    /// Equal superposition over all basis states.
    pub fn uniform_state(nqubits: usize) -> Self {
        let dim = 1usize << nqubits;
        let amp = Complex64::new(1.0 / (dim as f64).sqrt(), 0.0);
        Self::from_canonical(nqubits, &Array2::from_elem((dim, 1), amp))
    }

    /// GHZ state (|0...0> + |1...1>)/√2.
    pub fn ghz_state(nqubits: usize) -> Self {
        if nqubits == 0 {
            return Self::zero_state(0);
        }
        let dim = 1usize << nqubits;
        let amp = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        let mut data = Array2::zeros((dim, 1));
        data[[0, 0]] = amp;
        data[[dim - 1, 0]] = amp;
        Self::from_canonical(nqubits, &data)
    }

    /// Random normalized state drawn from `rng`.
    pub fn rand_state<R: Rng + ?Sized>(nqubits: usize, rng: &mut R) -> Self {
        let dim = 1usize << nqubits;
        let data = Array2::from_shape_fn((dim, 1), |_| {
            Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
        });
        let mut reg = Self::from_canonical(nqubits, &data);
        reg.normalize();
        reg
    }

    /// Wrap canonical amplitudes of shape `(2^nqubits, batch)`.
    ///
    /// Row `i` holds the amplitude of basis state `i` (little-endian). The data
    /// is taken as-is, without normalization.
    pub fn from_statevec(nqubits: usize, data: Array2<Complex64>) -> Result<Self> {
        if data.nrows() != 1 << nqubits {
            return Err(RegisterError::QubitCountMismatch {
                expected: nqubits,
                actual: log2_exact(data.nrows()).unwrap_or(data.nrows()),
            });
        }
        if data.ncols() == 0 {
            return Err(RegisterError::InvalidBatchSize(0));
        }
        Ok(Self::from_canonical(nqubits, &data))
    }

    /// Single-batch variant of [`ArrayReg::from_statevec`].
    pub fn from_amplitudes(nqubits: usize, amplitudes: Array1<Complex64>) -> Result<Self> {
        let data = Array2::from_shape_fn((amplitudes.len(), 1), |(i, _)| amplitudes[i]);
        Self::from_statevec(nqubits, data)
    }

    /// Mutable amplitudes, shape `(2^active, 2^remaining, batch)`.
    ///
    /// The shape cannot change through this view; operators transform
    /// amplitudes along the active axis in place.
    pub fn raw_state_mut(&mut self) -> ArrayViewMut3<'_, Complex64> {
        self.state.view_mut()
    }

    /// Storage bit of every qubit: `positions()[q]` is where qubit `q` lives.
    fn positions(&self) -> Vec<usize> {
        inverse_permutation(&self.order)
    }

    /// Physically move the amplitudes into a new layout.
    ///
    /// `order` must be a permutation of the qubits whose tail (after
    /// `nactive`) is ascending. Only copies amplitudes, so the result is exact.
    fn relayout(&mut self, order: Vec<usize>, nactive: usize) {
        debug_assert!(is_permutation(&order));
        debug_assert!(order[nactive..].windows(2).all(|w| w[0] < w[1]));
        if order == self.order && nactive == self.nactive {
            return;
        }
        let nqubits = order.len();
        let old_pos = self.positions();
        let source: Vec<usize> = order.iter().map(|&q| old_pos[q]).collect();
        let old_nactive = self.nactive;
        let old_mask = (1usize << old_nactive) - 1;
        let table: Vec<(usize, usize)> = (0..1usize << nqubits)
            .map(|s| {
                let old = scatter_bits(s, &source);
                (old & old_mask, old >> old_nactive)
            })
            .collect();

        let nbatch = self.batch_size();
        let old = &self.state;
        let state = Array3::from_shape_fn(
            (1 << nactive, 1 << (nqubits - nactive), nbatch),
            |(a, r, b)| {
                let (oa, or) = table[a | (r << nactive)];
                old[[oa, or, b]]
            },
        );
        self.state = state;
        self.order = order;
        self.nactive = nactive;
    }

    /// Make `locs` the active qubits, in that bit order.
    ///
    /// `locs` are global qubit indices, independent of any earlier focus.
    /// `locs[0]` becomes the least-significant bit of the active index. Fails
    /// without touching the register on duplicate or out-of-range locations.
    ///
    /// # Example
    /// ```
    /// use yao_register::{ArrayReg, Register};
    /// let mut reg = ArrayReg::zero_state(4);
    /// reg.focus(&[2, 0]).unwrap();
    /// assert_eq!(reg.active_qubits(), 2);
    /// assert_eq!(reg.active_locs(), &[2, 0]);
    /// ```
    pub fn focus(&mut self, locs: &[usize]) -> Result<&mut Self> {
        let nqubits = self.total_qubits();
        check_locs(locs, nqubits)?;
        self.relayout(with_remaining(locs, nqubits), locs.len());
        debug!(nqubits, active = ?locs, "focus");
        Ok(self)
    }

    /// Return `locs` (every active qubit when `None`) to the remaining set.
    ///
    /// `nbit` is the qubit count the caller expects the register to span; a
    /// mismatch is reported before anything changes. Qubits that stay active
    /// keep their relative bit order.
    pub fn relax(&mut self, locs: Option<&[usize]>, nbit: usize) -> Result<&mut Self> {
        let nqubits = self.total_qubits();
        if nbit != nqubits {
            return Err(RegisterError::QubitCountMismatch {
                expected: nbit,
                actual: nqubits,
            });
        }
        let active = &self.order[..self.nactive];
        let keep: Vec<usize> = match locs {
            None => Vec::new(),
            Some(locs) => {
                check_locs(locs, nqubits)?;
                if let Some(&loc) = locs.iter().find(|&&loc| !active.contains(&loc)) {
                    return Err(RegisterError::not_active(loc));
                }
                active
                    .iter()
                    .copied()
                    .filter(|q| !locs.contains(q))
                    .collect()
            }
        };
        let nactive = keep.len();
        self.relayout(with_remaining(&keep, nqubits), nactive);
        debug!(nqubits, active = ?keep, "relax");
        Ok(self)
    }

    /// Relabel qubits: new qubit `i` is old qubit `perm[i]`.
    ///
    /// The active set follows its qubits to their new labels.
    pub fn reorder(&mut self, perm: &[usize]) -> Result<&mut Self> {
        if perm.len() != self.total_qubits() || !is_permutation(perm) {
            return Err(RegisterError::InvalidPermutation(perm.to_vec()));
        }
        self.relabel(perm);
        debug!(perm = ?perm, "reorder");
        Ok(self)
    }

    /// Reverse the qubit labels.
    pub fn invorder(&mut self) -> &mut Self {
        let perm: Vec<usize> = (0..self.total_qubits()).rev().collect();
        self.relabel(&perm);
        debug!(nqubits = perm.len(), "invorder");
        self
    }

    /// Apply a checked relabeling `perm` and restore a sorted remaining tail.
    fn relabel(&mut self, perm: &[usize]) {
        let relabel = inverse_permutation(perm);
        self.order = self.order.iter().map(|&q| relabel[q]).collect();
        let nactive = self.nactive;
        let order = with_remaining(&self.order[..nactive], self.order.len());
        self.relayout(order, nactive);
    }

    /// Read-only view of batch slot `index` (0-based).
    pub fn view_batch(&self, index: usize) -> Result<BatchView<'_>> {
        BatchView::new(self, index)
    }

    /// Canonical amplitudes `(2^n, batch)`: row `i` is basis state `i`.
    pub fn statevec(&self) -> Array2<Complex64> {
        let pos = self.positions();
        let nactive = self.nactive;
        let mask = (1usize << nactive) - 1;
        Array2::from_shape_fn((1 << self.total_qubits(), self.batch_size()), |(i, b)| {
            let s = scatter_bits(i, &pos);
            self.state[[s & mask, s >> nactive, b]]
        })
    }

    /// L2 norm of every batch member.
    pub fn norm(&self) -> Vec<f64> {
        self.state
            .axis_iter(Axis(2))
            .map(|slot| slot.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt())
            .collect()
    }

    /// Rescale every batch member to unit norm. Zero members are left alone.
    pub fn normalize(&mut self) -> &mut Self {
        let norms = self.norm();
        for (mut slot, norm) in self.state.axis_iter_mut(Axis(2)).zip(norms) {
            if norm > 0.0 {
                slot.mapv_inplace(|c| c / norm);
            }
        }
        self
    }

    /// Whether every batch member has unit norm.
    pub fn is_normalized(&self) -> bool {
        self.norm()
            .iter()
            .all(|n| (n * n - 1.0).abs() <= PROB_TOLERANCE)
    }

    /// `|<self|other>|` per batch member.
    pub fn fidelity(&self, other: &ArrayReg) -> Result<Vec<f64>> {
        if self.total_qubits() != other.total_qubits() {
            return Err(RegisterError::QubitCountMismatch {
                expected: self.total_qubits(),
                actual: other.total_qubits(),
            });
        }
        if self.batch_size() != other.batch_size() {
            return Err(RegisterError::BatchSizeMismatch {
                expected: self.batch_size(),
                actual: other.batch_size(),
            });
        }
        let (a, b) = (self.statevec(), other.statevec());
        Ok(a.axis_iter(Axis(1))
            .zip(b.axis_iter(Axis(1)))
            .map(|(x, y)| {
                x.iter()
                    .zip(y.iter())
                    .map(|(u, v)| u.conj() * v)
                    .sum::<Complex64>()
                    .norm()
            })
            .collect())
    }
}

impl Register for ArrayReg {
    fn total_qubits(&self) -> usize {
        self.order.len()
    }

    fn active_qubits(&self) -> usize {
        self.nactive
    }

    fn batch_size(&self) -> usize {
        self.state.dim().2
    }

    fn raw_state(&self) -> ArrayView3<'_, Complex64> {
        self.state.view()
    }

    fn active_locs(&self) -> &[usize] {
        &self.order[..self.nactive]
    }
}
