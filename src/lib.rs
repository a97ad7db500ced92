pub mod error;
pub mod index;
pub mod register;
pub mod view;
pub mod compose;
pub mod measure;
pub mod gate;
pub mod block;
pub mod apply;
pub mod latex;

pub use error::{RegisterError, RenderError, Result};
pub use register::{ArrayReg, Register};
pub use view::BatchView;
pub use compose::join;
pub use measure::{measure, measure_collapse, measure_remove, measure_reset, probs};
pub use gate::Gate;
pub use block::{Block, PositionedGate, chain, control, put};
pub use apply::{apply, apply_matrix};
