//! qcircuit rendering of block trees.
//!
//! The renderer reads a block tree and a wire count, never amplitudes. Output
//! is produced line by line through [`LatexLines`]:
//!
//! ```text
//! \Qcircuit @C=1em @R=0.7em {
//! \gate{H} & \ctrl{1} & \qw \\
//! \qw & \targ & \qw
//! }
//! ```
//!
//! All styling comes from an explicit [`LatexStyle`] value.
//!
//! # Required LaTeX packages
//!
//! ```latex
//! \usepackage[braket, qm]{qcircuit}
//! \usepackage{xcolor}
//! ```

use std::fs;
use std::iter::FusedIterator;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::block::{Block, PositionedGate};
use crate::error::RenderError;
use crate::gate::Gate;
use crate::register::Register;

/// Wire-through marker.
pub const WIRE: &str = r"\qw";

/// Color applied to the diagram in standalone documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireColor {
    #[default]
    Black,
    Gray,
    Blue,
    Red,
}

impl WireColor {
    fn name(self) -> &'static str {
        match self {
            WireColor::Black => "black",
            WireColor::Gray => "gray",
            WireColor::Blue => "blue",
            WireColor::Red => "red",
        }
    }
}

/// Font size switch applied to the diagram in standalone documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Tiny,
    Scriptsize,
    Footnotesize,
    Small,
    #[default]
    Normalsize,
    Large,
}

impl FontSize {
    fn command(self) -> &'static str {
        match self {
            FontSize::Tiny => r"\tiny",
            FontSize::Scriptsize => r"\scriptsize",
            FontSize::Footnotesize => r"\footnotesize",
            FontSize::Small => r"\small",
            FontSize::Normalsize => r"\normalsize",
            FontSize::Large => r"\large",
        }
    }
}

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatexStyle {
    /// Column separation in em
    pub col_sep: f64,
    /// Row separation in em
    pub row_sep: f64,
    pub wire_color: WireColor,
    pub font: FontSize,
    /// Wrap the diagram in a compilable `standalone` document
    pub standalone: bool,
    /// Digits after the decimal point for gate parameters
    pub precision: usize,
}

impl Default for LatexStyle {
    fn default() -> Self {
        Self {
            col_sep: 1.0,
            row_sep: 0.7,
            wire_color: WireColor::default(),
            font: FontSize::default(),
            standalone: false,
            precision: 2,
        }
    }
}

impl LatexStyle {
    /// Default style wrapped in a standalone document.
    pub fn standalone() -> Self {
        Self {
            standalone: true,
            ..Default::default()
        }
    }

    pub fn with_spacing(mut self, col_sep: f64, row_sep: f64) -> Self {
        self.col_sep = col_sep;
        self.row_sep = row_sep;
        self
    }

    pub fn with_color(mut self, color: WireColor) -> Self {
        self.wire_color = color;
        self
    }

    pub fn with_font(mut self, font: FontSize) -> Self {
        self.font = font;
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Parse a style from JSON; missing fields take their defaults.
    ///
    /// # Example
    /// ```
    /// use yao_register::latex::{LatexStyle, WireColor};
    /// let style = LatexStyle::from_json(r#"{"wire_color": "blue", "standalone": true}"#).unwrap();
    /// assert_eq!(style.wire_color, WireColor::Blue);
    /// assert_eq!(style.col_sep, 1.0);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Grid of cells, one row per wire, filled column by column.
#[derive(Debug, Clone)]
pub struct Canvas {
    cells: Vec<Vec<String>>,
    /// First free column on each wire.
    frontier: Vec<usize>,
}

impl Canvas {
    pub fn new(nwires: usize) -> Self {
        Canvas {
            cells: vec![Vec::new(); nwires],
            frontier: vec![0; nwires],
        }
    }

    pub fn nwires(&self) -> usize {
        self.cells.len()
    }

    pub fn ncolumns(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Place glyphs in the first column free on every wire from `lo` to `hi`.
    ///
    /// The whole span is reserved so vertical connectors never cross a glyph.
    /// Every glyph wire must lie inside the span.
    pub fn place(&mut self, lo: usize, hi: usize, glyphs: Vec<(usize, String)>) -> Result<(), RenderError> {
        let nwires = self.nwires();
        if hi >= nwires {
            return Err(RenderError::WireOutOfRange { loc: hi, wires: nwires });
        }
        if lo > hi {
            return Err(RenderError::WireOutOfRange { loc: lo, wires: nwires });
        }
        if let Some(&(wire, _)) = glyphs.iter().find(|(wire, _)| !(lo..=hi).contains(wire)) {
            return Err(RenderError::WireOutOfRange { loc: wire, wires: nwires });
        }
        let column = self.frontier[lo..=hi].iter().copied().max().unwrap_or(0);
        while self.ncolumns() <= column {
            for row in &mut self.cells {
                row.push(WIRE.to_string());
            }
        }
        for (wire, glyph) in glyphs {
            self.cells[wire][column] = glyph;
        }
        for slot in &mut self.frontier[lo..=hi] {
            *slot = column + 1;
        }
        Ok(())
    }

    fn into_cells(self) -> Vec<Vec<String>> {
        self.cells
    }
}

/// Drawable-block capability.
pub trait Draw {
    fn draw(&self, canvas: &mut Canvas, style: &LatexStyle) -> Result<(), RenderError>;
}

impl Draw for Block {
    fn draw(&self, canvas: &mut Canvas, style: &LatexStyle) -> Result<(), RenderError> {
        match self {
            Block::Chain { blocks, .. } => blocks.iter().try_for_each(|b| b.draw(canvas, style)),
            Block::Primitive { gate, .. } => gate.draw(canvas, style),
        }
    }
}

impl Draw for PositionedGate {
    fn draw(&self, canvas: &mut Canvas, style: &LatexStyle) -> Result<(), RenderError> {
        let locs: Vec<usize> = self.target_locs.iter().chain(&self.control_locs).copied().collect();
        let (Some(&lo), Some(&hi)) = (locs.iter().min(), locs.iter().max()) else {
            return Ok(());
        };
        if hi >= canvas.nwires() {
            return Err(RenderError::WireOutOfRange {
                loc: hi,
                wires: canvas.nwires(),
            });
        }
        let anchor = self.target_locs.first().copied().unwrap_or(lo);
        let mut glyphs = target_glyphs(self, anchor, style.precision);
        for (&ctrl, &config) in self.control_locs.iter().zip(&self.control_configs) {
            let offset = anchor as isize - ctrl as isize;
            let cmd = if config { "ctrl" } else { "ctrlo" };
            glyphs.push((ctrl, format!(r"\{}{{{}}}", cmd, offset)));
        }
        canvas.place(lo, hi, glyphs)
    }
}

/// Text shown inside a gate box.
fn gate_label(gate: &Gate, precision: usize) -> String {
    match gate {
        Gate::Phase(theta) => format!("P({:.*})", precision, theta),
        Gate::Rx(theta) => format!("R_x({:.*})", precision, theta),
        Gate::Ry(theta) => format!("R_y({:.*})", precision, theta),
        Gate::Rz(theta) => format!("R_z({:.*})", precision, theta),
        other => other.to_string(),
    }
}

fn target_glyphs(pg: &PositionedGate, anchor: usize, precision: usize) -> Vec<(usize, String)> {
    let targets = &pg.target_locs;
    match (&pg.gate, targets.as_slice()) {
        (Gate::X, [t]) if !pg.control_locs.is_empty() => vec![(*t, r"\targ".to_string())],
        (Gate::SWAP, [a, b]) => vec![
            (*a, r"\qswap".to_string()),
            (*b, format!(r"\qswap \qwx[{}]", anchor as isize - *b as isize)),
        ],
        (gate, _) => {
            let label = gate_label(gate, precision);
            let lo = targets.iter().copied().min().unwrap_or(anchor);
            let hi = targets.iter().copied().max().unwrap_or(anchor);
            if targets.len() > 1 && hi - lo + 1 == targets.len() {
                let mut glyphs = vec![(lo, format!(r"\multigate{{{}}}{{{}}}", hi - lo, label))];
                glyphs.extend((lo + 1..=hi).map(|t| (t, format!(r"\ghost{{{}}}", label))));
                glyphs
            } else {
                // fallback: an independent box on every target
                targets
                    .iter()
                    .map(|&t| (t, format!(r"\gate{{{}}}", label)))
                    .collect()
            }
        }
    }
}

/// Lazily formatted lines of a rendered diagram.
///
/// Yields the standalone preamble (if enabled), the header, one line per
/// wire, the footer, and the standalone postamble. The iterator is consumed
/// as it goes; render again for a second pass.
#[derive(Debug)]
pub struct LatexLines {
    cells: Vec<Vec<String>>,
    style: LatexStyle,
    cursor: usize,
}

const PREAMBLE: [&str; 4] = [
    r"\documentclass[border=2pt]{standalone}",
    r"\usepackage[braket, qm]{qcircuit}",
    r"\usepackage{xcolor}",
    r"\begin{document}",
];
const POSTAMBLE: &str = r"\end{document}";

impl LatexLines {
    fn new(cells: Vec<Vec<String>>, style: LatexStyle) -> Self {
        LatexLines {
            cells,
            style,
            cursor: 0,
        }
    }

    fn preamble_len(&self) -> usize {
        if self.style.standalone {
            PREAMBLE.len() + 1
        } else {
            0
        }
    }

    fn total_len(&self) -> usize {
        let body = self.cells.len() + 2;
        if self.style.standalone {
            self.preamble_len() + body + 1
        } else {
            body
        }
    }

    fn header(&self) -> String {
        format!(
            r"\Qcircuit @C={}em @R={}em {{",
            self.style.col_sep, self.style.row_sep
        )
    }

    fn wire(&self, index: usize) -> String {
        let mut line = self.cells[index]
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(WIRE))
            .collect::<Vec<_>>()
            .join(" & ");
        if index + 1 < self.cells.len() {
            line.push_str(r" \\");
        }
        line
    }

    fn line(&self, index: usize) -> String {
        let pre = self.preamble_len();
        let nwires = self.cells.len();
        if index < pre {
            match PREAMBLE.get(index) {
                Some(line) => line.to_string(),
                None => format!(
                    r"\color{{{}}}{}",
                    self.style.wire_color.name(),
                    self.style.font.command()
                ),
            }
        } else if index == pre {
            self.header()
        } else if index <= pre + nwires {
            self.wire(index - pre - 1)
        } else if index == pre + nwires + 1 {
            "}".to_string()
        } else {
            POSTAMBLE.to_string()
        }
    }
}

impl Iterator for LatexLines {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.cursor >= self.total_len() {
            return None;
        }
        let line = self.line(self.cursor);
        self.cursor += 1;
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total_len().saturating_sub(self.cursor);
        (left, Some(left))
    }
}

impl ExactSizeIterator for LatexLines {}

impl FusedIterator for LatexLines {}

/// Render `block` on `nqubits` wires.
///
/// The block tree is validated first; a malformed tree is reported as
/// [`RenderError::InvalidBlock`] and nothing is drawn.
pub fn render(block: &Block, nqubits: usize, style: &LatexStyle) -> Result<LatexLines, RenderError> {
    if block.nqubits() != nqubits {
        return Err(RenderError::QubitCountMismatch {
            block: block.nqubits(),
            wires: nqubits,
        });
    }
    block.validate()?;
    let mut canvas = Canvas::new(nqubits);
    block.draw(&mut canvas, style)?;
    debug!(nqubits, columns = canvas.ncolumns(), "render");
    Ok(LatexLines::new(canvas.into_cells(), style.clone()))
}

/// Render `block` with one wire per qubit of `reg`.
///
/// Only `reg.total_qubits()` is read.
pub fn render_for<R: Register + ?Sized>(
    block: &Block,
    reg: &R,
    style: &LatexStyle,
) -> Result<LatexLines, RenderError> {
    render(block, reg.total_qubits(), style)
}

/// Render to a single newline-terminated string.
pub fn to_tex_string(block: &Block, nqubits: usize, style: &LatexStyle) -> Result<String, RenderError> {
    let mut out = String::new();
    for line in render(block, nqubits, style)? {
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Write the rendered document to `path`, which must end in `.tex`.
///
/// # Example
/// ```ignore
/// use yao_register::latex::{write_tex, LatexStyle};
///
/// write_tex("bell.tex", &bell, 2, &LatexStyle::standalone())?;
/// ```
pub fn write_tex(
    path: impl AsRef<Path>,
    block: &Block,
    nqubits: usize,
    style: &LatexStyle,
) -> Result<(), RenderError> {
    let path = path.as_ref();
    if path.extension().and_then(|e| e.to_str()) != Some("tex") {
        return Err(RenderError::BadExtension(path.to_path_buf()));
    }
    let source = to_tex_string(block, nqubits, style)?;
    fs::write(path, source)?;
    debug!(path = %path.display(), "wrote circuit");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{chain, control, put};

    #[test]
    fn test_place_packs_disjoint_gates() {
        let mut canvas = Canvas::new(3);
        canvas.place(0, 0, vec![(0, "A".into())]).unwrap();
        canvas.place(2, 2, vec![(2, "B".into())]).unwrap();
        assert_eq!(canvas.ncolumns(), 1);
        canvas.place(0, 2, vec![(1, "C".into())]).unwrap();
        assert_eq!(canvas.ncolumns(), 2);
        assert_eq!(canvas.cells[1], vec![WIRE.to_string(), "C".to_string()]);
    }

    #[test]
    fn test_place_rejects_bad_spans() {
        let mut canvas = Canvas::new(3);
        assert!(matches!(
            canvas.place(2, 0, vec![]),
            Err(RenderError::WireOutOfRange { loc: 2, wires: 3 })
        ));
        assert!(matches!(
            canvas.place(0, 1, vec![(3, "A".into())]),
            Err(RenderError::WireOutOfRange { loc: 3, wires: 3 })
        ));
        assert!(matches!(
            canvas.place(0, 1, vec![(2, "A".into())]),
            Err(RenderError::WireOutOfRange { loc: 2, wires: 3 })
        ));
        assert_eq!(canvas.ncolumns(), 0);
    }

    #[test]
    fn test_control_offsets_point_at_target() {
        let block = control(3, vec![2], vec![0], Gate::X);
        let lines: Vec<String> = render(&block, 3, &LatexStyle::default()).unwrap().collect();
        assert_eq!(lines[1], r"\targ & \qw \\");
        assert_eq!(lines[3], r"\ctrl{-2} & \qw");
    }

    #[test]
    fn test_parameter_precision() {
        let block = put(1, vec![0], Gate::Rx(0.5));
        let style = LatexStyle::default().with_precision(3);
        let lines: Vec<String> = render(&block, 1, &style).unwrap().collect();
        assert_eq!(lines[1], r"\gate{R_x(0.500)} & \qw");
    }

    #[test]
    fn test_size_hint_counts_down() {
        let block = chain(2, vec![]);
        let mut lines = render(&block, 2, &LatexStyle::standalone()).unwrap();
        assert_eq!(lines.len(), 5 + 4 + 1);
        lines.next();
        assert_eq!(lines.len(), 9);
    }
}
