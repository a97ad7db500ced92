//! Example: render a circuit as a qcircuit LaTeX document.
//!
//! Run with: cargo run --example circuit_tex

use std::f64::consts::PI;

use yao_register::block::{chain, control, control_with, put};
use yao_register::latex::{render, write_tex, LatexStyle, WireColor};
use yao_register::Gate;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let n = 3;
    let circuit = chain(
        n,
        vec![
            put(n, vec![0], Gate::H),
            control(n, vec![0], vec![1], Gate::X),
            control_with(n, vec![1], vec![false], vec![2], Gate::Rz(PI / 4.0)),
            put(n, vec![0, 2], Gate::SWAP),
        ],
    );

    for line in render(&circuit, n, &LatexStyle::default())? {
        println!("{}", line);
    }

    let style = LatexStyle::standalone().with_color(WireColor::Blue);
    let output_path = "circuit.tex";
    write_tex(output_path, &circuit, n, &style)?;
    println!("LaTeX written to {}", output_path);

    Ok(())
}
