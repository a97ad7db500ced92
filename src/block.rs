//! Circuit block trees.
//!
//! A [`Block`] is either a chain of sub-blocks or a primitive gate placed on
//! target (and optionally control) qubits. Blocks carry no amplitude data;
//! they are applied to registers by [`crate::apply`] and drawn by
//! [`crate::latex`].

use std::fmt;

use crate::error::{RegisterError, Result};
use crate::gate::Gate;
use crate::index::check_locs;

/// A gate placed at specific locations.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedGate {
    pub gate: Gate,
    pub target_locs: Vec<usize>,
    pub control_locs: Vec<usize>,
    /// Control value that triggers the gate, per control (`true` = |1>).
    pub control_configs: Vec<bool>,
}

impl PositionedGate {
    /// Creates a new PositionedGate.
    pub fn new(
        gate: Gate,
        target_locs: Vec<usize>,
        control_locs: Vec<usize>,
        control_configs: Vec<bool>,
    ) -> Self {
        PositionedGate {
            gate,
            target_locs,
            control_locs,
            control_configs,
        }
    }

    /// Target locations followed by control locations.
    ///
    /// Focusing on this list puts the targets on the low bits of the active
    /// index, which is the layout [`crate::apply`] builds its matrices for.
    pub fn all_locs(&self) -> Vec<usize> {
        let mut locs = self.target_locs.clone();
        locs.extend(&self.control_locs);
        locs
    }

    /// Check the placement against a register of `nqubits` qubits.
    pub fn validate(&self, nqubits: usize) -> Result<()> {
        if self.control_configs.len() != self.control_locs.len() {
            return Err(RegisterError::QubitCountMismatch {
                expected: self.control_locs.len(),
                actual: self.control_configs.len(),
            });
        }
        if self.gate.num_qubits() != self.target_locs.len() {
            return Err(RegisterError::QubitCountMismatch {
                expected: self.gate.num_qubits(),
                actual: self.target_locs.len(),
            });
        }
        check_locs(&self.all_locs(), nqubits)
    }
}

/// Node of a circuit block tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Sub-blocks applied in sequence.
    Chain { nqubits: usize, blocks: Vec<Block> },
    /// A single (possibly controlled) gate.
    Primitive { nqubits: usize, gate: PositionedGate },
}

impl Block {
    /// Number of qubits the block is defined on.
    pub fn nqubits(&self) -> usize {
        match self {
            Block::Chain { nqubits, .. } | Block::Primitive { nqubits, .. } => *nqubits,
        }
    }

    /// Primitive gates in application order.
    pub fn primitives(&self) -> Vec<&PositionedGate> {
        let mut out = Vec::new();
        self.collect_primitives(&mut out);
        out
    }

    fn collect_primitives<'a>(&'a self, out: &mut Vec<&'a PositionedGate>) {
        match self {
            Block::Chain { blocks, .. } => {
                for block in blocks {
                    block.collect_primitives(out);
                }
            }
            Block::Primitive { gate, .. } => out.push(gate),
        }
    }

    /// Check qubit counts and gate placements throughout the tree.
    pub fn validate(&self) -> Result<()> {
        match self {
            Block::Chain { nqubits, blocks } => {
                for block in blocks {
                    if block.nqubits() != *nqubits {
                        return Err(RegisterError::QubitCountMismatch {
                            expected: *nqubits,
                            actual: block.nqubits(),
                        });
                    }
                    block.validate()?;
                }
                Ok(())
            }
            Block::Primitive { nqubits, gate } => gate.validate(*nqubits),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nqubits: {}", self.nqubits())?;
        for pg in self.primitives() {
            if pg.control_locs.is_empty() {
                writeln!(f, "  {} @ q[{}]", pg.gate, format_locs(&pg.target_locs))?;
            } else {
                writeln!(
                    f,
                    "  C(q[{}]) {} @ q[{}]",
                    format_locs(&pg.control_locs),
                    pg.gate,
                    format_locs(&pg.target_locs)
                )?;
            }
        }
        Ok(())
    }
}

fn format_locs(locs: &[usize]) -> String {
    locs.iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Sequence of blocks on `nqubits` qubits.
pub fn chain(nqubits: usize, blocks: Vec<Block>) -> Block {
    Block::Chain { nqubits, blocks }
}

/// Place a gate on target locations (no controls).
///
/// Equivalent to Yao.jl's `put(n, locs => gate)`.
///
/// # Example
/// ```
/// use yao_register::block::{put, Block};
/// use yao_register::gate::Gate;
/// let block = put(2, vec![0], Gate::H);
/// if let Block::Primitive { gate, .. } = block {
///     assert_eq!(gate.target_locs, vec![0]);
///     assert!(gate.control_locs.is_empty());
/// }
/// ```
pub fn put(nqubits: usize, target_locs: Vec<usize>, gate: Gate) -> Block {
    Block::Primitive {
        nqubits,
        gate: PositionedGate::new(gate, target_locs, vec![], vec![]),
    }
}

/// Place a controlled gate with active-high control (all controls trigger on |1⟩).
///
/// Equivalent to Yao.jl's `control(n, ctrl_locs, target_locs => gate)`.
pub fn control(nqubits: usize, ctrl_locs: Vec<usize>, target_locs: Vec<usize>, gate: Gate) -> Block {
    let configs = vec![true; ctrl_locs.len()];
    control_with(nqubits, ctrl_locs, configs, target_locs, gate)
}

/// Place a controlled gate with an explicit trigger value per control.
pub fn control_with(
    nqubits: usize,
    ctrl_locs: Vec<usize>,
    configs: Vec<bool>,
    target_locs: Vec<usize>,
    gate: Gate,
) -> Block {
    Block::Primitive {
        nqubits,
        gate: PositionedGate::new(gate, target_locs, ctrl_locs, configs),
    }
}
