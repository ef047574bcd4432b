//! Weighted A* pathfinding over grid maps.
//!
//! Searches are built with [`PathSearch`](search::PathSearch) and driven either one closed cell at
//! a time, in bounded [`step`]s, or to completion with [`find_path`].

use cellpath_core::traits::PathGraph;
use cellpath_grid::{CPos, DiagonalEstimator, GridGraph, TerrainCost};
use cellpath_search::{Path, PathSearch};
use log::trace;

pub use cellpath_core::*;
pub use cellpath_grid as grid;
pub use cellpath_search as search;

/// Outcome of a bounded run of a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStep {
    /// A target cell was closed. The path to it is final.
    Found(CPos),
    /// Every reachable cell was closed without finding a target.
    Exhausted,
    /// The budget ran out. Call [`step`] again to resume.
    Pending,
}

/// Expands at most `budget` cells, stopping early when a target closes.
pub fn step<G: GridGraph>(search: &mut PathSearch<'_, G>, budget: usize) -> SearchStep {
    for _ in 0..budget {
        match search.expand() {
            Some(cell) if search.is_target(cell) => return SearchStep::Found(cell),
            Some(_) => {}
            None => return SearchStep::Exhausted,
        }
    }
    match search.expandable() {
        true => SearchStep::Pending,
        false => SearchStep::Exhausted,
    }
}

/// Runs `search` until a target closes and returns the path to it, start first.
///
/// The search's layer goes back to its pool before this returns.
pub fn find_path<G: GridGraph>(mut search: PathSearch<'_, G>) -> Option<Path> {
    let path = match step(&mut search, usize::MAX) {
        SearchStep::Found(cell) => search.path_to(cell),
        SearchStep::Exhausted | SearchStep::Pending => None,
    };
    search.dispose();
    path
}

/// Alternates a search from the start and a search from the target over a reversed graph, and
/// joins them at the first cell both have closed.
///
/// `reverse` should be seeded at the target of `forward`. The joined path is not guaranteed to be
/// optimal, only valid. Every step taken from the reverse side is checked against the forward
/// graph, so a target the mover cannot enter gives `None`.
pub fn find_bidi_path<F: GridGraph, R: GridGraph>(
    mut forward: PathSearch<'_, F>,
    mut reverse: PathSearch<'_, R>,
) -> Option<Path> {
    let meeting = loop {
        let mut progressed = false;

        if let Some(cell) = forward.expand() {
            progressed = true;
            if forward.is_target(cell) {
                break Some((cell, false));
            }
            if is_closed(&reverse, cell) {
                break Some((cell, true));
            }
        }

        if let Some(cell) = reverse.expand() {
            progressed = true;
            if is_closed(&forward, cell) {
                break Some((cell, true));
            }
        }

        if !progressed {
            break None;
        }
    };

    let path = meeting.and_then(|(cell, joined)| {
        let mut path = forward.path_to(cell)?;
        if joined {
            trace!("joining bidirectional search at {cell}");
            let joint = path.len() - 1;
            let back = reverse.path_to(cell)?;
            path.extend(back.into_iter().rev().skip(1));
            if !follows_graph(forward.graph(), &path[joint..]) {
                trace!("joined path from {cell} is not walkable forwards");
                return None;
            }
        }
        Some(path)
    });
    forward.dispose();
    reverse.dispose();
    path
}

fn follows_graph<G: GridGraph>(graph: &G, cells: &[CPos]) -> bool {
    let mut edges = vec![];
    cells.windows(2).all(|pair| {
        edges.clear();
        graph.connections(pair[0], pair[0], &mut edges);
        edges.iter().any(|edge| edge.destination == pair[1])
    })
}

fn is_closed<G: GridGraph>(search: &PathSearch<'_, G>, cell: CPos) -> bool {
    search.cell_info(cell).is_some_and(|info| info.is_closed())
}

/// Lower bound on the cost of moving between two cells, from the cheapest terrain the mover can
/// enter. `None` if it can enter nothing.
pub fn estimate_cost(terrain: &impl TerrainCost, from: CPos, to: CPos) -> Option<Cost> {
    let estimator = DiagonalEstimator::new(terrain.min_cost()?);
    Some(estimator.estimate(from, to))
}
