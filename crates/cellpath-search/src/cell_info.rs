use cellpath_core::{Cost, INFINITE_COST};
use cellpath_grid::CPos;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellStatus {
    #[default]
    Unvisited,
    Open,
    Closed,
}

/// Search bookkeeping for one cell.
///
/// A cell only moves forward through [`CellStatus`] during a search. Once it is
/// [`Closed`](CellStatus::Closed) its record never changes again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellInfo {
    pub status: CellStatus,
    /// Cheapest known cost from a start cell.
    pub cost_so_far: Cost,
    /// `cost_so_far` plus the weighted estimate of the remaining cost.
    pub estimated_total_cost: Cost,
    /// Cell this one was reached from. Start cells point at themselves.
    pub previous: CPos,
}

impl CellInfo {
    pub const fn new(
        status: CellStatus,
        cost_so_far: Cost,
        estimated_total_cost: Cost,
        previous: CPos,
    ) -> Self {
        CellInfo {
            status,
            cost_so_far,
            estimated_total_cost,
            previous,
        }
    }

    /// The record every cell holds before a search touches it.
    pub const fn unvisited(cell: CPos) -> Self {
        CellInfo::new(CellStatus::Unvisited, INFINITE_COST, INFINITE_COST, cell)
    }

    pub fn is_closed(&self) -> bool {
        self.status == CellStatus::Closed
    }
}
