//! Example: prepare a Bell pair, measure one half, and drop it.
//!
//! Run with: cargo run --example bell_register

use rand::rngs::StdRng;
use rand::SeedableRng;
use yao_register::block::{chain, control, put};
use yao_register::measure::{measure, measure_remove};
use yao_register::{apply, join, ArrayReg, Gate, Register};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(2024);

    let bell = chain(2, vec![put(2, vec![0], Gate::H), control(2, vec![0], vec![1], Gate::X)]);
    println!("{}", bell);

    let mut reg = ArrayReg::zero_state_batched(2, 3)?;
    apply(&mut reg, &bell)?;

    // outcomes are 0b00 or 0b11 in every batch member
    let samples = measure(&reg, 8, &mut rng)?;
    println!("samples (shot x batch):\n{}", samples);

    reg.focus(&[0])?;
    let outcomes = measure_remove(&mut reg, &mut rng)?;
    println!("measured qubit 0: {:?}", outcomes);
    println!(
        "left with {} qubit(s), {} active",
        reg.total_qubits(),
        reg.active_qubits()
    );

    // attach a fresh ancilla and look at both qubits again
    let ancilla = ArrayReg::zero_state_batched(1, 3)?;
    let mut grown = join(&[&reg, &ancilla])?;
    grown.focus(&[0, 1])?;
    println!("after join: {:?}", measure(&grown, 1, &mut rng)?.row(0).to_vec());

    Ok(())
}
