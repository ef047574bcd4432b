//! Weighted A* over grid maps, with pooled per-map bookkeeping.
//!
//! A search is built over a [`GridPathGraph`] (terrain costs, blocking, lane bias), checks a
//! [`CellLayer`](cellpath_grid::CellLayer) out of a [`LayerPool`] for its lifetime, and is then
//! stepped with [`PathSearch::expand`] until a target cell closes or the open list runs dry.

mod blocking;
mod cell_info;
mod graph;
mod layer_pool;
mod options;
mod search;

pub use self::blocking::*;
pub use self::cell_info::*;
pub use self::graph::*;
pub use self::layer_pool::*;
pub use self::options::*;
pub use self::search::*;
