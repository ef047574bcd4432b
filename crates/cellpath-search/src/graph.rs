use cellpath_core::traits::{GraphConnection, PathGraph};
use cellpath_core::{add_cost, multiply_by_sqrt_two, Cost};
use cellpath_grid::eight_connected::forward_neighbors;
use cellpath_grid::{CPos, CVec, Direction, GridGraph, MapShape, TerrainCost};
use enumset::EnumSet;

use crate::{Blocking, GraphOptions, LANE_BIAS_COST};

/// Extra cost of a cell, or `None` to keep the mover out of it.
pub type CustomCost<'a> = Box<dyn Fn(CPos) -> Option<Cost> + Send + Sync + 'a>;

/// The 8-connected graph one mover sees over a map.
///
/// Entering a cell costs its terrain cost for the mover, scaled by [`multiply_by_sqrt_two`] for
/// diagonal steps, plus any custom cost and lane bias. Cells outside the map, cells the mover
/// cannot enter, and cells the blocking provider rules out produce no edge.
pub struct GridPathGraph<'a, T, B> {
    terrain: T,
    blocking: B,
    custom_cost: Option<CustomCost<'a>>,
    options: GraphOptions,
}

impl<'a, T: TerrainCost, B: Blocking> GridPathGraph<'a, T, B> {
    pub fn new(terrain: T, blocking: B, options: GraphOptions) -> Self {
        GridPathGraph {
            terrain,
            blocking,
            custom_cost: None,
            options,
        }
    }

    pub fn with_custom_cost(
        mut self,
        custom_cost: impl Fn(CPos) -> Option<Cost> + Send + Sync + 'a,
    ) -> Self {
        self.custom_cost = Some(Box::new(custom_cost));
        self
    }

    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    pub fn terrain(&self) -> &T {
        &self.terrain
    }

    /// Cost of stepping into `to` in `direction`, ignoring blocking.
    ///
    /// `None` if the mover cannot enter `to` or the cost overflows.
    pub fn edge_cost(&self, to: CPos, direction: Direction) -> Option<Cost> {
        let mut cost = self.terrain.cell_cost(to)?;
        if direction.is_diagonal() {
            cost = multiply_by_sqrt_two(cost)?;
        }
        if let Some(custom_cost) = &self.custom_cost {
            cost = add_cost(cost, custom_cost(to)?)?;
        }
        if self.options.lane_bias_enabled() {
            cost = add_cost(cost, self.lane_bias(to, direction.vector()))?;
        }
        Some(cost)
    }

    // Alternating cells prefer opposite directions of travel along each axis, so groups moving in
    // opposite directions settle into separate lanes. Reverse searches walk every edge backwards
    // and use the opposite parity.
    fn lane_bias(&self, to: CPos, dir: CVec) -> Cost {
        let r = self.options.reverse as i32;
        let ux = to.x.wrapping_add(r) & 1;
        let uy = to.y.wrapping_add(r) & 1;
        let mut bias = 0;
        if (ux == 0 && dir.y < 0) || (ux == 1 && dir.y > 0) {
            bias += LANE_BIAS_COST;
        }
        if (uy == 0 && dir.x < 0) || (uy == 1 && dir.x > 0) {
            bias += LANE_BIAS_COST;
        }
        bias
    }
}

impl<T: TerrainCost, B: Blocking> PathGraph for GridPathGraph<'_, T, B> {
    type State = CPos;

    fn connections(&self, cell: CPos, previous: CPos, edges: &mut Vec<GraphConnection<CPos>>) {
        let candidates = match self.options.prune_by_arrival {
            true => forward_neighbors(cell, previous),
            false => EnumSet::all(),
        };
        for dir in candidates {
            let to = cell + dir.vector();
            if !self.terrain.contains(to)
                || !self
                    .blocking
                    .can_enter(to, self.options.mover, self.options.blocking)
            {
                continue;
            }
            if let Some(cost) = self.edge_cost(to, dir) {
                edges.push(GraphConnection {
                    destination: to,
                    cost,
                });
            }
        }
    }
}

impl<T: TerrainCost, B: Blocking> GridGraph for GridPathGraph<'_, T, B> {
    fn shape(&self) -> MapShape {
        self.terrain.shape()
    }

    fn contains(&self, cell: CPos) -> bool {
        self.terrain.contains(cell)
    }

    fn min_cell_cost(&self) -> Option<Cost> {
        self.terrain.min_cost()
    }
}
