//! Numeric building blocks: the liquid time-constant cell, the linear
//! readout and the Adam optimizer.

mod adam;
mod dense;
mod ltc_cell;

pub use adam::AdamOptimizer;
pub use dense::DenseLayer;
pub use ltc_cell::{sigmoid, LtcCell, DEFAULT_ODE_UNFOLDS};
