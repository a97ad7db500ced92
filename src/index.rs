//! Little-endian bit indexing utilities.
//!
//! Qubit `q` contributes `2^q` to a basis index. Every register operation
//! reads and writes basis indices with this convention.

use crate::error::{RegisterError, Result};

/// Read bit `k` of `index`.
///
/// # Example
/// ```
/// use yao_register::index::bit;
/// assert_eq!(bit(0b110, 0), 0);
/// assert_eq!(bit(0b110, 2), 1);
/// ```
#[inline]
pub fn bit(index: usize, k: usize) -> usize {
    (index >> k) & 1
}

/// Decompose a basis index into `n` bits, least-significant first.
///
/// # Example
/// ```
/// use yao_register::index::index_to_bits;
/// assert_eq!(index_to_bits(0b011, 3), vec![1, 1, 0]);
/// ```
pub fn index_to_bits(index: usize, n: usize) -> Vec<usize> {
    (0..n).map(|k| bit(index, k)).collect()
}

/// Compose bits (least-significant first) into a basis index.
///
/// # Example
/// ```
/// use yao_register::index::bits_to_index;
/// assert_eq!(bits_to_index(&[1, 1, 0]), 0b011);
/// ```
pub fn bits_to_index(bits: &[usize]) -> usize {
    bits.iter()
        .enumerate()
        .fold(0, |acc, (k, &b)| acc | ((b & 1) << k))
}

/// Move bit `k` of `index` to bit position `positions[k]`.
///
/// This is the index map behind every qubit reordering: with `positions`
/// a permutation of `0..positions.len()`, it is a bijection on
/// `0..2^positions.len()`.
///
/// # Example
/// ```
/// use yao_register::index::scatter_bits;
/// // bit 0 -> position 2, bit 1 -> 0, bit 2 -> 1
/// assert_eq!(scatter_bits(0b001, &[2, 0, 1]), 0b100);
/// assert_eq!(scatter_bits(0b110, &[2, 0, 1]), 0b011);
/// ```
pub fn scatter_bits(index: usize, positions: &[usize]) -> usize {
    positions
        .iter()
        .enumerate()
        .fold(0, |acc, (k, &pos)| acc | (bit(index, k) << pos))
}

/// Base-2 logarithm of `dim` if it is a power of two.
///
/// # Example
/// ```
/// use yao_register::index::log2_exact;
/// assert_eq!(log2_exact(8), Some(3));
/// assert_eq!(log2_exact(6), None);
/// ```
pub fn log2_exact(dim: usize) -> Option<usize> {
    if dim.is_power_of_two() {
        Some(dim.trailing_zeros() as usize)
    } else {
        None
    }
}

/// Check that `locs` are distinct and all below `nqubits`.
pub fn check_locs(locs: &[usize], nqubits: usize) -> Result<()> {
    let mut seen = vec![false; nqubits];
    for &loc in locs {
        if loc >= nqubits {
            return Err(RegisterError::out_of_range(loc, nqubits));
        }
        if seen[loc] {
            return Err(RegisterError::duplicate(loc));
        }
        seen[loc] = true;
    }
    Ok(())
}

/// Whether `perm` is a permutation of `0..perm.len()`.
pub fn is_permutation(perm: &[usize]) -> bool {
    check_locs(perm, perm.len()).is_ok()
}

/// Inverse of a permutation: `inverse[perm[i]] == i`.
pub fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![0; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        inv[p] = i;
    }
    inv
}
