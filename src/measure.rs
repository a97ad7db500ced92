//! Measurement and selection on the active qubits.
//!
//! # Overview
//!
//! - [`probs`] - Marginal distribution over the active basis states
//! - [`measure`] - Sample outcomes without touching the register
//! - [`measure_collapse`] - Sample once and project onto the outcome
//! - [`measure_reset`] - Collapse, then move the result to a fixed basis state
//! - [`measure_remove`] - Collapse and drop the measured qubits
//! - [`ArrayReg::select_mut`], [`ArrayReg::select`], [`ArrayReg::select_into`] -
//!   Post-selection on a given basis state
//!
//! Outcomes are active-basis indices: bit `k` of an outcome is the value of
//! qubit `active_locs()[k]`.

use ndarray::{Array2, Array3, Axis};
use num_complex::Complex64;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::{debug, trace};

use crate::error::{RegisterError, Result};
use crate::register::{ArrayReg, Register};

/// Allowed deviation of a measurement distribution's total from 1.
pub const PROB_TOLERANCE: f64 = 1e-6;

/// Marginal probabilities of the active basis states, shape `(2^active, batch)`.
///
/// The remaining qubits are traced out. No normalization check is done here.
///
/// # Example
/// ```
/// use yao_register::{ArrayReg, measure::probs};
/// let mut reg = ArrayReg::ghz_state(3);
/// reg.focus(&[1]).unwrap();
/// let p = probs(&reg);
/// assert!((p[[0, 0]] - 0.5).abs() < 1e-12);
/// assert!((p[[1, 0]] - 0.5).abs() < 1e-12);
/// ```
pub fn probs<R: Register + ?Sized>(reg: &R) -> Array2<f64> {
    reg.raw_state().map(|c| c.norm_sqr()).sum_axis(Axis(1))
}

/// [`probs`], rejecting distributions that are not finite or do not sum to 1.
fn checked_probs<R: Register + ?Sized>(reg: &R) -> Result<Array2<f64>> {
    let p = probs(reg);
    for (batch, column) in p.axis_iter(Axis(1)).enumerate() {
        let total = column.sum();
        let finite = column.iter().all(|x| x.is_finite() && *x >= 0.0);
        if !finite || (total - 1.0).abs() > PROB_TOLERANCE {
            return Err(RegisterError::MalformedProbability { batch, total });
        }
    }
    Ok(p)
}

/// Sample `nshots` outcomes per batch member, shape `(nshots, batch)`.
///
/// The register is not modified.
///
/// # Example
/// ```
/// use yao_register::{ArrayReg, measure::measure};
/// use rand::SeedableRng;
///
/// let reg = ArrayReg::product_state(0b101, 3).unwrap();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(42);
/// let samples = measure(&reg, 10, &mut rng).unwrap();
/// assert!(samples.iter().all(|&s| s == 0b101));
/// ```
pub fn measure<R, G>(reg: &R, nshots: usize, rng: &mut G) -> Result<Array2<usize>>
where
    R: Register + ?Sized,
    G: Rng + ?Sized,
{
    let p = checked_probs(reg)?;
    let mut samples = Array2::zeros((nshots, reg.batch_size()));
    for (batch, column) in p.axis_iter(Axis(1)).enumerate() {
        let dist = WeightedIndex::new(column.iter().copied()).map_err(|_| {
            RegisterError::MalformedProbability {
                batch,
                total: column.sum(),
            }
        })?;
        for shot in 0..nshots {
            samples[[shot, batch]] = dist.sample(rng);
        }
    }
    trace!(nshots, nbatch = reg.batch_size(), "measure");
    Ok(samples)
}

/// Sample one outcome per batch member and project the active qubits onto it.
///
/// Every batch member is renormalized after the projection.
pub fn measure_collapse<G: Rng + ?Sized>(reg: &mut ArrayReg, rng: &mut G) -> Result<Vec<usize>> {
    let outcomes = measure(&*reg, 1, rng)?.row(0).to_vec();
    for (batch, mut slot) in reg.state.axis_iter_mut(Axis(2)).enumerate() {
        let keep = outcomes[batch];
        let norm = slot
            .row(keep)
            .iter()
            .map(|c| c.norm_sqr())
            .sum::<f64>()
            .sqrt();
        for (a, mut row) in slot.axis_iter_mut(Axis(0)).enumerate() {
            if a == keep {
                row.mapv_inplace(|c| c / norm);
            } else {
                row.fill(Complex64::new(0.0, 0.0));
            }
        }
    }
    debug!(outcomes = ?outcomes, "measure_collapse");
    Ok(outcomes)
}

/// Collapse as [`measure_collapse`], then move every batch member to active
/// basis state `value`. Returns the measured outcomes.
pub fn measure_reset<G: Rng + ?Sized>(
    reg: &mut ArrayReg,
    value: usize,
    rng: &mut G,
) -> Result<Vec<usize>> {
    let nactive = reg.active_qubits();
    if value >= 1 << nactive {
        return Err(RegisterError::InvalidBasisState {
            bits: value,
            nactive,
        });
    }
    let outcomes = measure_collapse(reg, rng)?;
    for (batch, mut slot) in reg.state.axis_iter_mut(Axis(2)).enumerate() {
        let from = outcomes[batch];
        if from != value {
            let moved = slot.row(from).to_owned();
            slot.row_mut(value).assign(&moved);
            slot.row_mut(from).fill(Complex64::new(0.0, 0.0));
        }
    }
    Ok(outcomes)
}

/// Measure the active qubits and remove them from the register.
///
/// Afterwards the register spans only its former remaining qubits (relabeled
/// `0..`), none of them active, each batch member renormalized.
pub fn measure_remove<G: Rng + ?Sized>(reg: &mut ArrayReg, rng: &mut G) -> Result<Vec<usize>> {
    let outcomes = measure(&*reg, 1, rng)?.row(0).to_vec();
    reg.select_mut(&outcomes)?.normalize();
    Ok(outcomes)
}

impl ArrayReg {
    /// Amplitudes left after fixing the active index to `bits`, shape `(1, 2^remaining, batch)`.
    fn selected_state(&self, bits: &[usize]) -> Result<Array3<Complex64>> {
        let nbatch = self.batch_size();
        if bits.len() != 1 && bits.len() != nbatch {
            return Err(RegisterError::BatchSizeMismatch {
                expected: nbatch,
                actual: bits.len(),
            });
        }
        let nactive = self.active_qubits();
        if let Some(&bad) = bits.iter().find(|&&b| b >= 1 << nactive) {
            return Err(RegisterError::InvalidBasisState { bits: bad, nactive });
        }
        let rdim = self.state.dim().1;
        Ok(Array3::from_shape_fn((1, rdim, nbatch), |(_, r, b)| {
            let k = if bits.len() == 1 { bits[0] } else { bits[b] };
            self.state[[k, r, b]]
        }))
    }

    /// Project onto active basis state `bits` and drop the active qubits.
    ///
    /// `bits` holds one basis state per batch member, or a single one shared
    /// by all. The remaining qubits keep their relative order and are
    /// relabeled `0..remaining_qubits()`; none of them is active afterwards.
    /// Amplitudes are not renormalized.
    ///
    /// # Example
    /// ```
    /// use yao_register::{ArrayReg, Register};
    /// let mut reg = ArrayReg::ghz_state(3);
    /// reg.focus(&[0]).unwrap();
    /// reg.select_mut(&[1]).unwrap();
    /// assert_eq!(reg.total_qubits(), 2);
    /// assert_eq!(reg.active_qubits(), 0);
    /// ```
    pub fn select_mut(&mut self, bits: &[usize]) -> Result<&mut Self> {
        let state = self.selected_state(bits)?;
        let nremain = self.remaining_qubits();
        self.state = state;
        self.nactive = 0;
        self.order = (0..nremain).collect();
        debug!(bits = ?bits, nqubits = nremain, "select");
        Ok(self)
    }

    /// Copy of `self` with [`ArrayReg::select_mut`] applied; `self` is untouched.
    pub fn select(&self, bits: &[usize]) -> Result<ArrayReg> {
        let mut selected = self.clone();
        selected.select_mut(bits)?;
        Ok(selected)
    }

    /// Write the selection of `self` into a preallocated `dest`.
    ///
    /// `dest` must already have the result's batch size and qubit count.
    pub fn select_into(&self, dest: &mut ArrayReg, bits: &[usize]) -> Result<()> {
        if dest.batch_size() != self.batch_size() {
            return Err(RegisterError::BatchSizeMismatch {
                expected: self.batch_size(),
                actual: dest.batch_size(),
            });
        }
        if dest.total_qubits() != self.remaining_qubits() {
            return Err(RegisterError::QubitCountMismatch {
                expected: self.remaining_qubits(),
                actual: dest.total_qubits(),
            });
        }
        dest.state = self.selected_state(bits)?;
        dest.nactive = 0;
        dest.order = (0..self.remaining_qubits()).collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    #[test]
    fn test_probs_trace_out_remaining() {
        let mut reg = ArrayReg::uniform_state(3);
        reg.focus(&[2]).unwrap();
        let p = probs(&reg);
        assert_eq!(p.dim(), (2, 1));
        assert_abs_diff_eq!(p[[0, 0]], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p[[1, 0]], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_unnormalized_state_is_rejected() {
        let reg = ArrayReg::from_statevec(1, Array2::from_elem((2, 1), Complex64::new(1.0, 0.0)))
            .unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let err = measure(&reg, 1, &mut rng).unwrap_err();
        assert!(matches!(err, RegisterError::MalformedProbability { batch: 0, .. }));
    }

    #[test]
    fn test_selected_state_broadcasts_single_bits() {
        let reg = ArrayReg::zero_state_batched(2, 3).unwrap();
        let state = reg.selected_state(&[0]).unwrap();
        assert_eq!(state.dim(), (1, 1, 3));
    }

    #[test]
    fn test_measure_reset_rejects_large_value() {
        let mut reg = ArrayReg::zero_state(1);
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        assert_eq!(
            measure_reset(&mut reg, 2, &mut rng).unwrap_err(),
            RegisterError::InvalidBasisState { bits: 2, nactive: 1 }
        );
    }
}
