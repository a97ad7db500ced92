//! Error types for register operations.
//!
//! Register errors and renderer errors are kept apart: a bad `.tex` file name
//! is a presentation problem and never shows up as a [`RegisterError`].

use thiserror::Error;

/// Result type alias for register operations.
pub type Result<T> = std::result::Result<T, RegisterError>;

/// Errors raised by register queries and transformations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegisterError {
    /// A qubit location is out of range, duplicated, or not in the expected set.
    #[error("invalid qubit index {loc}: {reason}")]
    InvalidQubitIndex { loc: usize, reason: String },

    /// A qubit count did not match what the caller or operand expected.
    #[error("qubit count mismatch: expected {expected}, got {actual}")]
    QubitCountMismatch { expected: usize, actual: usize },

    /// Registers (or bit lists) disagree on the batch size.
    #[error("batch size mismatch: expected {expected}, got {actual}")]
    BatchSizeMismatch { expected: usize, actual: usize },

    /// A basis state does not fit in the active subspace.
    #[error("basis state {bits} is outside [0, 2^{nactive})")]
    InvalidBasisState { bits: usize, nactive: usize },

    /// The measurement distribution of a batch member does not normalize.
    #[error("malformed probability distribution in batch {batch}: total = {total}")]
    MalformedProbability { batch: usize, total: f64 },

    /// A batch slot index is out of range.
    #[error("batch index {index} is out of range (batch size = {nbatch})")]
    BatchIndexOutOfRange { index: usize, nbatch: usize },

    /// A register must hold at least one batch member.
    #[error("invalid batch size {0}: must be at least 1")]
    InvalidBatchSize(usize),

    /// `join` was called without any operands.
    #[error("cannot join an empty list of registers")]
    EmptyJoin,

    /// A qubit relabeling is not a permutation of `0..n`.
    #[error("{0:?} is not a permutation of the register's qubits")]
    InvalidPermutation(Vec<usize>),
}

impl RegisterError {
    /// Location `loc` is not below the register's qubit count.
    pub fn out_of_range(loc: usize, nqubits: usize) -> Self {
        Self::InvalidQubitIndex {
            loc,
            reason: format!("out of range for {} qubits", nqubits),
        }
    }

    /// Location `loc` appears more than once.
    pub fn duplicate(loc: usize) -> Self {
        Self::InvalidQubitIndex {
            loc,
            reason: "duplicate location".to_string(),
        }
    }

    /// Location `loc` is not currently active.
    pub fn not_active(loc: usize) -> Self {
        Self::InvalidQubitIndex {
            loc,
            reason: "qubit is not active".to_string(),
        }
    }
}

/// Errors raised by the qcircuit renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Output path does not carry the `.tex` extension.
    #[error("output path {0:?} must end with .tex")]
    BadExtension(std::path::PathBuf),

    /// The block tree spans a different number of wires than requested.
    #[error("block spans {block} qubits but the diagram has {wires} wires")]
    QubitCountMismatch { block: usize, wires: usize },

    /// A gate touches a wire that does not exist.
    #[error("wire {loc} is out of range for {wires} wires")]
    WireOutOfRange { loc: usize, wires: usize },

    /// The block tree itself is malformed.
    #[error("invalid block: {0}")]
    InvalidBlock(#[from] RegisterError),

    /// Writing the document failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
