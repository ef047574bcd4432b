#![allow(dead_code)]

use cellpath::grid::{CPos, CellLayer, GridType, MapShape, TerrainMap, TerrainSpeeds};
use cellpath::traits::{GraphConnection, PathGraph};
use cellpath::{add_cost, Cost, INFINITE_COST};
use rand::Rng;
use rand_pcg::Pcg64;

pub fn rng(stream: u128) -> Pcg64 {
    Pcg64::new(0xcafef00dd15ea5e5, 0xa02bdbf7bb3c0a7ac28fa16a64abf96 ^ stream)
}

/// Terrain costs used by the randomized tests.
///
/// The cheapest terrain and its diagonal cost are both multiples of four, so every weight used by
/// the tests scales the estimate without rounding.
pub fn speeds() -> TerrainSpeeds {
    TerrainSpeeds::new()
        .with(0, 12)
        .with(1, 20)
        .with(2, 31)
        .with(3, 50)
}

/// A map with roughly one wall in five cells and the rest random terrain types 0 to 3.
pub fn random_map(rng: &mut Pcg64, width: i32, height: i32, grid: GridType) -> TerrainMap {
    let shape = MapShape::new(width, height, grid);
    let mut map = TerrainMap::new(shape, None);
    for cell in shape.cells() {
        if rng.gen_bool(0.8) {
            map.set(cell, Some(rng.gen_range(0..4)));
        }
    }
    map
}

pub fn random_passable_cell(rng: &mut Pcg64, map: &TerrainMap) -> CPos {
    let cells: Vec<_> = map
        .shape()
        .cells()
        .filter(|&cell| map.terrain(cell).is_some())
        .collect();
    cells[rng.gen_range(0..cells.len())]
}

/// Cheapest cost from `start` to every cell, by exhaustive relaxation.
pub fn dijkstra<G>(graph: &G, shape: MapShape, start: CPos) -> CellLayer<Cost>
where
    G: PathGraph<State = CPos>,
{
    let mut costs = CellLayer::filled(shape, INFINITE_COST);
    let mut done = CellLayer::filled(shape, false);
    costs[start] = 0;
    let mut edges: Vec<GraphConnection<CPos>> = vec![];

    loop {
        let next = shape
            .cells()
            .filter(|&cell| !done[cell] && costs[cell] != INFINITE_COST)
            .min_by_key(|&cell| costs[cell]);
        let Some(cell) = next else {
            break;
        };
        done[cell] = true;

        edges.clear();
        graph.connections(cell, cell, &mut edges);
        for edge in &edges {
            if let Some(cost) = add_cost(costs[cell], edge.cost) {
                if cost < costs[edge.destination] {
                    costs[edge.destination] = cost;
                }
            }
        }
    }

    costs
}

/// Sums the edge costs along `path`, panicking if consecutive cells are not connected.
pub fn path_cost<G: PathGraph<State = CPos>>(graph: &G, path: &[CPos]) -> Cost {
    let mut edges = vec![];
    let mut total = 0;
    for pair in path.windows(2) {
        edges.clear();
        graph.connections(pair[0], pair[0], &mut edges);
        let edge = edges
            .iter()
            .find(|edge| edge.destination == pair[1])
            .unwrap_or_else(|| panic!("no edge from {} to {}", pair[0], pair[1]));
        total += edge.cost;
    }
    total
}
