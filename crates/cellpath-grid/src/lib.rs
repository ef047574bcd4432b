//! Grid maps, coordinates and terrain costs for `cellpath`.

mod geom;
mod layer;
mod terrain;

pub mod eight_connected;

use cellpath_core::traits::PathGraph;
use cellpath_core::Cost;

pub use self::eight_connected::{DiagonalEstimator, Direction};
pub use self::geom::*;
pub use self::layer::*;
pub use self::terrain::*;

/// A [`PathGraph`] over the cells of a map.
///
/// Searches use the shape to size their bookkeeping layer, and never seed or expand cells outside
/// of it.
pub trait GridGraph: PathGraph<State = CPos> {
    fn shape(&self) -> MapShape;

    fn contains(&self, cell: CPos) -> bool {
        self.shape().contains(cell)
    }

    /// Cheapest cost of entering any cell orthogonally, or `None` if no cell can be entered.
    ///
    /// Used to build the default distance estimate.
    fn min_cell_cost(&self) -> Option<Cost>;
}

impl<G: GridGraph + ?Sized> GridGraph for &G {
    fn shape(&self) -> MapShape {
        (**self).shape()
    }

    fn contains(&self, cell: CPos) -> bool {
        (**self).contains(cell)
    }

    fn min_cell_cost(&self) -> Option<Cost> {
        (**self).min_cell_cost()
    }
}
