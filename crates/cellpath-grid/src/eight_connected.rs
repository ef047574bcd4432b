//! Types and utilities for working with 8-connected grid maps.

use cellpath_core::{multiply_by_sqrt_two, Cost, MAX_FINITE_COST};
use enumset::{EnumSet, EnumSetType};

use crate::{CPos, CVec};

#[derive(EnumSetType, Debug, Hash)]
pub enum Direction {
    North,
    West,
    South,
    East,
    NorthWest,
    SouthWest,
    SouthEast,
    NorthEast,
}

impl Direction {
    pub const fn vector(self) -> CVec {
        match self {
            Direction::North => CVec::new(0, -1),
            Direction::West => CVec::new(-1, 0),
            Direction::South => CVec::new(0, 1),
            Direction::East => CVec::new(1, 0),
            Direction::NorthWest => CVec::new(-1, -1),
            Direction::SouthWest => CVec::new(-1, 1),
            Direction::SouthEast => CVec::new(1, 1),
            Direction::NorthEast => CVec::new(1, -1),
        }
    }

    /// Direction of a single step, or `None` if `vector` does not move exactly one cell.
    pub fn from_vector(vector: CVec) -> Option<Direction> {
        use Direction::*;
        Some(match (vector.x, vector.y) {
            (0, -1) => North,
            (-1, 0) => West,
            (0, 1) => South,
            (1, 0) => East,
            (-1, -1) => NorthWest,
            (-1, 1) => SouthWest,
            (1, 1) => SouthEast,
            (1, -1) => NorthEast,
            _ => return None,
        })
    }

    pub fn backwards(self) -> Direction {
        use Direction::*;
        match self {
            North => South,
            West => East,
            South => North,
            East => West,
            NorthWest => SouthEast,
            SouthWest => NorthEast,
            SouthEast => NorthWest,
            NorthEast => SouthWest,
        }
    }

    pub fn is_diagonal(self) -> bool {
        self.vector().is_diagonal()
    }
}

/// Neighbors worth visiting after arriving at a cell by moving in `arrival`.
///
/// Excludes the neighbors that are also adjacent to the cell we came from, since on a map with
/// uniform costs those are reached at least as cheaply without passing through this cell. For an
/// orthogonal arrival this leaves the three cells ahead. For a diagonal arrival it also keeps the
/// two cells to the side, which cannot be excluded without knowing whether the cell between them
/// and the previous cell is passable. Start cells (`None`) keep every neighbor.
pub fn arrival_neighbors(arrival: Option<Direction>) -> EnumSet<Direction> {
    use Direction::*;
    match arrival {
        None => EnumSet::all(),
        Some(North) => NorthWest | North | NorthEast,
        Some(South) => SouthWest | South | SouthEast,
        Some(West) => NorthWest | West | SouthWest,
        Some(East) => NorthEast | East | SouthEast,
        Some(NorthWest) => NorthWest | North | NorthEast | West | SouthWest,
        Some(NorthEast) => NorthWest | North | NorthEast | East | SouthEast,
        Some(SouthWest) => NorthWest | West | SouthWest | South | SouthEast,
        Some(SouthEast) => NorthEast | East | SouthEast | SouthWest | South,
    }
}

/// [`arrival_neighbors`] for a cell reached from `previous`.
pub fn forward_neighbors(cell: CPos, previous: CPos) -> EnumSet<Direction> {
    arrival_neighbors(Direction::from_vector(cell - previous))
}

/// Diagonal-distance estimate of the cost between two cells.
///
/// Assumes every cell costs `cell_cost` to enter orthogonally and diagonal steps are scaled with
/// [`multiply_by_sqrt_two`]. Built from the cheapest terrain a mover can enter, this never
/// overestimates the cost of a real path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiagonalEstimator {
    cell_cost: Cost,
    diagonal_cost: Cost,
}

impl DiagonalEstimator {
    pub fn new(cell_cost: Cost) -> Self {
        DiagonalEstimator {
            cell_cost,
            diagonal_cost: multiply_by_sqrt_two(cell_cost).unwrap_or(MAX_FINITE_COST),
        }
    }

    pub fn cell_cost(&self) -> Cost {
        self.cell_cost
    }

    pub fn diagonal_cost(&self) -> Cost {
        self.diagonal_cost
    }

    pub fn estimate(&self, from: CPos, to: CPos) -> Cost {
        let dx = (from.x as i64 - to.x as i64).unsigned_abs();
        let dy = (from.y as i64 - to.y as i64).unsigned_abs();
        let diagonals = dx.min(dy);
        let orthos = dx.max(dy) - diagonals;
        // Same as cell_cost * (dx + dy) + (diagonal_cost - 2 * cell_cost) * diagonals, without
        // the negative intermediate.
        let estimate = orthos
            .saturating_mul(self.cell_cost as u64)
            .saturating_add(diagonals.saturating_mul(self.diagonal_cost as u64));
        estimate.min(MAX_FINITE_COST as u64) as Cost
    }

    /// Estimate of the remaining cost from any cell to `target`.
    pub fn to(self, target: CPos) -> impl Fn(CPos) -> Cost + Copy {
        move |cell| self.estimate(cell, target)
    }
}

#[test]
fn directions_are_consistent() {
    for dir in EnumSet::<Direction>::all() {
        assert_eq!(Direction::from_vector(dir.vector()), Some(dir));
        assert_eq!(dir.backwards().backwards(), dir);
        let back = dir.backwards().vector();
        assert_eq!((back.x, back.y), (-dir.vector().x, -dir.vector().y));
    }
    assert_eq!(Direction::from_vector(CVec::ZERO), None);
    assert_eq!(Direction::from_vector(CVec::new(2, 0)), None);
}

#[test]
fn pruned_neighbors_are_adjacent_to_previous() {
    let cell = CPos::new(0, 0);
    for arrival in EnumSet::<Direction>::all() {
        let previous = cell - arrival.vector();
        let kept = forward_neighbors(cell, previous);
        assert!(kept.contains(arrival));
        for dir in kept.complement() {
            let neighbor = cell + dir.vector();
            let offset = neighbor - previous;
            assert!(
                offset.x.abs() <= 1 && offset.y.abs() <= 1,
                "{dir:?} pruned after arriving {arrival:?} is not adjacent to the previous cell"
            );
        }
    }
    assert_eq!(forward_neighbors(cell, cell), EnumSet::all());
}

#[test]
fn diagonal_estimate_matches_straight_line_costs() {
    let estimator = DiagonalEstimator::new(100);
    assert_eq!(estimator.diagonal_cost(), 141);
    assert_eq!(estimator.estimate(CPos::new(0, 0), CPos::new(4, 4)), 564);
    assert_eq!(estimator.estimate(CPos::new(0, 0), CPos::new(5, 0)), 500);
    assert_eq!(estimator.estimate(CPos::new(2, 7), CPos::new(-1, 3)), 100 + 3 * 141);
    assert_eq!(estimator.estimate(CPos::new(3, 3), CPos::new(3, 3)), 0);

    let to_origin = estimator.to(CPos::new(0, 0));
    assert_eq!(to_origin(CPos::new(0, -2)), 200);
}

#[test]
fn diagonal_estimate_is_consistent_across_single_steps() {
    let estimator = DiagonalEstimator::new(37);
    let target = CPos::new(3, -2);
    for y in -6..6 {
        for x in -6..6 {
            let cell = CPos::new(x, y);
            for dir in EnumSet::<Direction>::all() {
                let step = match dir.is_diagonal() {
                    true => estimator.diagonal_cost(),
                    false => estimator.cell_cost(),
                };
                let next = cell + dir.vector();
                assert!(estimator.estimate(cell, target) <= step + estimator.estimate(next, target));
            }
        }
    }
}
