use cellpath_core::traits::GraphConnection;
use cellpath_core::{
    add_cost, scale_by_percentage, Cost, Key, PriorityQueue, Reverse, MAX_FINITE_COST,
};
use cellpath_grid::{CPos, CellLayer, DiagonalEstimator, GridGraph};
use log::trace;

use crate::{CellInfo, CellStatus, LayerPool, PooledLayer, SearchOptions};

/// Cells from a start cell to a target, both included.
pub type Path = Vec<CPos>;

type Heuristic<'a> = Box<dyn Fn(CPos) -> Cost + 'a>;
type TargetPredicate<'a> = Box<dyn Fn(CPos) -> bool + 'a>;

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    cell: CPos,
    estimated_total: Cost,
    cost_so_far: Cost,
}

fn by_estimated_total(entry: &OpenEntry) -> Cost {
    entry.estimated_total
}

fn by_cost_so_far(entry: &OpenEntry) -> Cost {
    entry.cost_so_far
}

type EntryKey = Key<fn(&OpenEntry) -> Cost>;

// Cheapest estimate first. Among equal estimates, the entry that got further from the start is
// closer to the goal and goes first.
type OpenOrder = (EntryKey, Reverse<EntryKey>);

fn open_order() -> OpenOrder {
    (
        Key(by_estimated_total as fn(&OpenEntry) -> Cost),
        Reverse(Key(by_cost_so_far as fn(&OpenEntry) -> Cost)),
    )
}

/// A weighted A* search over a [`GridGraph`], advanced one closed cell at a time.
///
/// Cells are closed at most once. With a heuristic that never overestimates and a weight of 100
/// the cost of the path to every closed cell is optimal. Larger weights inflate the heuristic and
/// bound the path cost by that percentage of the optimum.
///
/// The search holds a layer checked out of a [`LayerPool`] until it is
/// [disposed](PathSearch::dispose) or dropped.
pub struct PathSearch<'a, G> {
    graph: G,
    heuristic: Heuristic<'a>,
    weight: u32,
    is_target: TargetPredicate<'a>,
    open: PriorityQueue<OpenEntry, OpenOrder>,
    layer: PooledLayer<'a>,
    edges: Vec<GraphConnection<CPos>>,
    max_cost: Cost,
    closed_order: Option<Vec<CPos>>,
}

enum Target<'a> {
    Nothing,
    Cell(CPos),
    Predicate(TargetPredicate<'a>),
}

/// Configures a [`PathSearch`]. Created by [`PathSearch::builder`].
pub struct PathSearchBuilder<'a, G> {
    graph: G,
    pool: &'a LayerPool,
    starts: Vec<CPos>,
    target: Target<'a>,
    heuristic: Option<Heuristic<'a>>,
    options: SearchOptions,
}

impl<'a, G: GridGraph> PathSearchBuilder<'a, G> {
    pub fn from(mut self, start: CPos) -> Self {
        self.starts.push(start);
        self
    }

    /// Adds several start cells. The search finds the path from whichever is cheapest.
    pub fn from_cells(mut self, starts: impl IntoIterator<Item = CPos>) -> Self {
        self.starts.extend(starts);
        self
    }

    /// Searches for `target`, guided by the diagonal-distance estimate unless a heuristic is set.
    pub fn to_cell(mut self, target: CPos) -> Self {
        self.target = Target::Cell(target);
        self
    }

    /// Searches for the cheapest cell matching `predicate`. Without a heuristic this is a plain
    /// uniform-cost search.
    pub fn to_predicate(mut self, predicate: impl Fn(CPos) -> bool + 'a) -> Self {
        self.target = Target::Predicate(Box::new(predicate));
        self
    }

    pub fn heuristic(mut self, heuristic: impl Fn(CPos) -> Cost + 'a) -> Self {
        self.heuristic = Some(Box::new(heuristic));
        self
    }

    pub fn weight(mut self, heuristic_weight_percentage: u32) -> Self {
        self.options.heuristic_weight_percentage = heuristic_weight_percentage;
        self
    }

    pub fn trace_closures(mut self, trace: bool) -> Self {
        self.options.trace_closures = trace;
        self
    }

    pub fn options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Checks out a layer and seeds every start cell inside the map.
    pub fn build(self) -> PathSearch<'a, G> {
        let PathSearchBuilder {
            graph,
            pool,
            starts,
            target,
            heuristic,
            options,
        } = self;

        let (heuristic, is_target): (Heuristic<'a>, TargetPredicate<'a>) = match target {
            Target::Nothing => (
                heuristic.unwrap_or_else(zero_heuristic),
                Box::new(|_: CPos| false),
            ),
            Target::Cell(target) => (
                heuristic.unwrap_or_else(|| {
                    graph
                        .min_cell_cost()
                        .map_or_else(zero_heuristic, |cost| -> Heuristic<'a> {
                            Box::new(DiagonalEstimator::new(cost).to(target))
                        })
                }),
                Box::new(move |cell: CPos| cell == target),
            ),
            Target::Predicate(predicate) => (heuristic.unwrap_or_else(zero_heuristic), predicate),
        };

        let layer = pool.checkout(graph.shape());
        let mut search = PathSearch {
            graph,
            heuristic,
            weight: options.heuristic_weight_percentage,
            is_target,
            open: PriorityQueue::with_capacity(open_order(), starts.len().max(16)),
            layer,
            edges: Vec::with_capacity(8),
            max_cost: 0,
            closed_order: options.trace_closures.then(Vec::new),
        };
        for start in starts {
            search.seed(start);
        }
        search
    }
}

impl<'a, G: GridGraph> PathSearch<'a, G> {
    pub fn builder(graph: G, pool: &'a LayerPool) -> PathSearchBuilder<'a, G> {
        PathSearchBuilder {
            graph,
            pool,
            starts: vec![],
            target: Target::Nothing,
            heuristic: None,
            options: SearchOptions::default(),
        }
    }

    /// Search from `from` to `target` with the default weight and heuristic.
    pub fn to_target_cell(graph: G, pool: &'a LayerPool, from: CPos, target: CPos) -> Self {
        PathSearch::builder(graph, pool)
            .from(from)
            .to_cell(target)
            .build()
    }

    /// Search from `from` to the nearest cell matching `predicate`.
    pub fn to_target_cell_by_predicate(
        graph: G,
        pool: &'a LayerPool,
        from: CPos,
        predicate: impl Fn(CPos) -> bool + 'a,
    ) -> Self {
        PathSearch::builder(graph, pool)
            .from(from)
            .to_predicate(predicate)
            .build()
    }

    fn seed(&mut self, start: CPos) {
        let Some(layer) = self.layer.layer_mut() else {
            return;
        };
        let Some(info) = layer.get_mut(start) else {
            trace!("skipping start cell {start} outside the map");
            return;
        };
        if info.status != CellStatus::Unvisited {
            return;
        }
        let estimate = scale_by_percentage((self.heuristic)(start), self.weight);
        *info = CellInfo::new(CellStatus::Open, 0, estimate, start);
        self.open.push(OpenEntry {
            cell: start,
            estimated_total: estimate,
            cost_so_far: 0,
        });
    }

    /// Closes the most promising open cell and opens or improves its neighbors.
    ///
    /// Returns the closed cell, or `None` once the open list is exhausted or the search has been
    /// disposed.
    pub fn expand(&mut self) -> Option<CPos> {
        let layer = self.layer.layer_mut()?;
        let current = loop {
            let Some(entry) = self.open.pop() else {
                trace!("open list exhausted, max cost {}", self.max_cost);
                return None;
            };
            // Entries for cells that were improved after being pushed stay in the queue and are
            // skipped here.
            if !layer[entry.cell].is_closed() {
                break entry.cell;
            }
        };

        let info = &mut layer[current];
        info.status = CellStatus::Closed;
        let (cost_so_far, previous) = (info.cost_so_far, info.previous);
        if let Some(order) = &mut self.closed_order {
            order.push(current);
        }

        self.edges.clear();
        self.graph.connections(current, previous, &mut self.edges);
        for edge in &self.edges {
            let Some(candidate) = add_cost(cost_so_far, edge.cost) else {
                continue;
            };
            let Some(neighbor) = layer.get_mut(edge.destination) else {
                continue;
            };
            let remaining = match neighbor.status {
                CellStatus::Closed => continue,
                CellStatus::Open if neighbor.cost_so_far <= candidate => continue,
                CellStatus::Open => neighbor.estimated_total_cost - neighbor.cost_so_far,
                CellStatus::Unvisited => {
                    scale_by_percentage((self.heuristic)(edge.destination), self.weight)
                }
            };
            let estimated_total = add_cost(candidate, remaining).unwrap_or(MAX_FINITE_COST);
            *neighbor = CellInfo::new(CellStatus::Open, candidate, estimated_total, current);
            self.open.push(OpenEntry {
                cell: edge.destination,
                estimated_total,
                cost_so_far: candidate,
            });
            self.max_cost = self.max_cost.max(candidate);
        }

        Some(current)
    }

    /// Whether [`expand`](Self::expand) may still close a cell.
    pub fn expandable(&self) -> bool {
        !self.layer.is_released() && !self.open.is_empty()
    }

    pub fn is_target(&self, cell: CPos) -> bool {
        (self.is_target)(cell)
    }

    /// The search's record for `cell`, or `None` outside the map or after disposal.
    pub fn cell_info(&self, cell: CPos) -> Option<CellInfo> {
        self.layer.layer()?.get(cell).copied()
    }

    /// Path from a start cell to `cell` along the recorded predecessors, start first.
    ///
    /// Paths to closed cells are final. Paths to open cells may still improve.
    pub fn path_to(&self, cell: CPos) -> Option<Path> {
        let layer = self.layer.layer()?;
        if layer.get(cell)?.status == CellStatus::Unvisited {
            return None;
        }
        Some(walk_back(layer, cell))
    }

    /// Cost of the best known path to `cell`.
    pub fn cost_to(&self, cell: CPos) -> Option<Cost> {
        self.cell_info(cell)
            .filter(|info| info.status != CellStatus::Unvisited)
            .map(|info| info.cost_so_far)
    }

    /// Largest cost recorded for any cell so far.
    pub fn max_cost(&self) -> Cost {
        self.max_cost
    }

    /// Cells in the order they were closed, if tracing was enabled.
    pub fn closed_order(&self) -> Option<&[CPos]> {
        self.closed_order.as_deref()
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Returns the layer to its pool. Later calls do nothing.
    pub fn dispose(&mut self) {
        self.layer.release();
        self.open.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.layer.is_released()
    }
}

fn zero_heuristic<'a>() -> Heuristic<'a> {
    Box::new(|_| 0)
}

fn walk_back(layer: &CellLayer<CellInfo>, mut cell: CPos) -> Path {
    let mut path = vec![cell];
    loop {
        let previous = layer[cell].previous;
        if previous == cell {
            break;
        }
        path.push(previous);
        cell = previous;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use cellpath_grid::{GridType, Locomotion, MapShape, TerrainMap, TerrainSpeeds};

    use super::*;
    use crate::{AgentId, BlockingMode, GraphOptions, GridPathGraph, NoBlocking, OccupancyMap};

    fn run<G: GridGraph>(search: &mut PathSearch<'_, G>) -> Option<Path> {
        while let Some(cell) = search.expand() {
            if search.is_target(cell) {
                return search.path_to(cell);
            }
        }
        None
    }

    fn unbiased() -> GraphOptions {
        GraphOptions::default().lane_bias(false)
    }

    #[test]
    fn open_grid_diagonal() {
        let map = TerrainMap::new(MapShape::rectangular(5, 5), Some(0));
        let speeds = TerrainSpeeds::uniform(100);
        let graph = GridPathGraph::new(Locomotion::new(&map, &speeds), NoBlocking, unbiased());
        let pool = LayerPool::new();

        let target = CPos::new(4, 4);
        let mut search = PathSearch::builder(graph, &pool)
            .from(CPos::new(0, 0))
            .to_cell(target)
            .weight(100)
            .build();
        let path = run(&mut search).unwrap();

        let expected: Vec<_> = (0..5).map(|i| CPos::new(i, i)).collect();
        assert_eq!(path, expected);
        assert_eq!(search.cost_to(target), Some(564));
        assert_eq!(search.max_cost(), 564);
    }

    #[test]
    fn start_cells_outside_the_map_are_ignored() {
        let map = TerrainMap::parse("....\n.##.\n....", GridType::Rectangular).unwrap();
        let speeds = TerrainSpeeds::uniform(10);
        let loco = Locomotion::new(&map, &speeds);
        let pool = LayerPool::new();
        let target = CPos::new(3, 2);

        let graph = || GridPathGraph::new(loco, NoBlocking, unbiased());

        let search = |starts: &[CPos]| {
            PathSearch::builder(graph(), &pool)
                .from_cells(starts.iter().copied())
                .to_cell(target)
                .trace_closures(true)
                .build()
        };
        let mut valid = search(&[CPos::new(0, 0), CPos::new(0, 2)]);
        let mut mixed = search(&[
            CPos::new(-3, 7),
            CPos::new(0, 0),
            CPos::new(4, 3),
            CPos::new(0, 2),
        ]);
        let mut repeated = search(&[
            CPos::new(0, 0),
            CPos::new(0, 0),
            CPos::new(0, 2),
            CPos::new(0, 2),
        ]);

        let path = run(&mut valid);
        assert_eq!(path.as_ref().and_then(|path| path.first()), Some(&CPos::new(0, 2)));
        assert_eq!(run(&mut mixed), path);
        assert_eq!(run(&mut repeated), path);
        assert_eq!(valid.closed_order(), mixed.closed_order());
        assert_eq!(valid.closed_order(), repeated.closed_order());
        assert_eq!(valid.cost_to(target), Some(30));
    }

    #[test]
    fn several_start_cells_race() {
        let map = TerrainMap::new(MapShape::rectangular(9, 1), Some(0));
        let speeds = TerrainSpeeds::uniform(10);
        let graph = GridPathGraph::new(Locomotion::new(&map, &speeds), NoBlocking, unbiased());
        let pool = LayerPool::new();

        let mut search = PathSearch::builder(graph, &pool)
            .from_cells([CPos::new(0, 0), CPos::new(8, 0)])
            .to_cell(CPos::new(6, 0))
            .weight(100)
            .build();
        let path = run(&mut search).unwrap();
        assert_eq!(path, [CPos::new(8, 0), CPos::new(7, 0), CPos::new(6, 0)]);
    }

    #[test]
    fn unreachable_target_exhausts() {
        let map = TerrainMap::parse("..#..\n..#..\n..#..", GridType::Rectangular).unwrap();
        let speeds = TerrainSpeeds::uniform(100);
        let graph = GridPathGraph::new(Locomotion::new(&map, &speeds), NoBlocking, unbiased());
        let pool = LayerPool::new();

        let target = CPos::new(4, 1);
        let mut search = PathSearch::to_target_cell(graph, &pool, CPos::new(0, 1), target);
        assert!(search.expandable());
        assert_eq!(run(&mut search), None);
        assert!(!search.expandable());
        assert_eq!(search.path_to(target), None);
        assert_eq!(search.cost_to(target), None);
        // Everything left of the wall was closed.
        for y in 0..3 {
            for x in 0..2 {
                assert!(search.cell_info(CPos::new(x, y)).unwrap().is_closed());
            }
        }
    }

    #[test]
    fn target_walled_in_by_occupants_exhausts() {
        let map = TerrainMap::new(MapShape::rectangular(5, 5), Some(0));
        let speeds = TerrainSpeeds::uniform(10);
        let mut occupancy = OccupancyMap::new(map.shape());
        for cell in [CPos::new(3, 3), CPos::new(3, 4), CPos::new(4, 3)] {
            occupancy.occupy(cell, AgentId(7));
        }
        let options = GraphOptions::new(AgentId(1)).lane_bias(false);
        let graph = GridPathGraph::new(Locomotion::new(&map, &speeds), &occupancy, options);
        let pool = LayerPool::new();

        let target = CPos::new(4, 4);
        let mut search = PathSearch::to_target_cell(graph, &pool, CPos::new(0, 0), target);
        assert_eq!(run(&mut search), None);
        assert!(!search.expandable());
        assert_eq!(search.cost_to(target), None);
        assert!(!search.cell_info(CPos::new(3, 3)).unwrap().is_closed());
        assert!(search.cell_info(CPos::new(2, 2)).unwrap().is_closed());
    }

    #[test]
    fn dispose_is_idempotent() {
        let map = TerrainMap::new(MapShape::rectangular(4, 4), Some(0));
        let speeds = TerrainSpeeds::uniform(100);
        let graph = GridPathGraph::new(Locomotion::new(&map, &speeds), NoBlocking, unbiased());
        let pool = LayerPool::new();

        let mut search = PathSearch::to_target_cell(graph, &pool, CPos::new(0, 0), CPos::new(3, 3));
        assert_eq!(search.expand(), Some(CPos::new(0, 0)));
        search.dispose();
        assert!(search.is_disposed());
        assert_eq!(pool.stats().idle, 1);
        search.dispose();
        assert_eq!(pool.stats().idle, 1);

        assert!(!search.expandable());
        assert_eq!(search.expand(), None);
        assert_eq!(search.cell_info(CPos::new(0, 0)), None);
        drop(search);
        assert_eq!(pool.stats().idle, 1);
        assert_eq!(pool.stats().allocated, 1);
    }

    #[test]
    fn dropping_a_search_returns_its_layer() {
        let map = TerrainMap::new(MapShape::rectangular(4, 4), Some(0));
        let speeds = TerrainSpeeds::uniform(100);
        let loco = Locomotion::new(&map, &speeds);
        let pool = LayerPool::new();

        for _ in 0..3 {
            let graph = GridPathGraph::new(loco, NoBlocking, GraphOptions::default());
            let mut search =
                PathSearch::to_target_cell(graph, &pool, CPos::new(0, 0), CPos::new(3, 0));
            assert!(run(&mut search).is_some());
        }
        assert_eq!(pool.stats().allocated, 1);
    }

    #[test]
    fn closed_cells_are_never_reopened() {
        let map = TerrainMap::parse(
            "\
.....9....
.##..9.##.
.#1..9..#.
.#1.....#.
.##99.###.
..........",
            GridType::Rectangular,
        )
        .unwrap();
        let speeds = TerrainSpeeds::uniform(10).with(1, 40).with(9, 90);
        let graph = GridPathGraph::new(Locomotion::new(&map, &speeds), NoBlocking, unbiased());
        let pool = LayerPool::new();

        let mut search = PathSearch::builder(graph, &pool)
            .from(CPos::new(0, 0))
            .to_cell(CPos::new(9, 5))
            .weight(300)
            .build();

        let mut closed: Vec<(CPos, CellInfo)> = vec![];
        while let Some(cell) = search.expand() {
            for &(cell, info) in &closed {
                assert_eq!(search.cell_info(cell), Some(info), "{cell} changed after closing");
            }
            let info = search.cell_info(cell).unwrap();
            assert!(info.is_closed());
            assert!(closed.iter().all(|&(c, _)| c != cell), "{cell} closed twice");
            closed.push((cell, info));
        }
        let passable = map.shape().cells().filter(|&c| map.terrain(c).is_some());
        assert_eq!(closed.len(), passable.count());
    }

    #[test]
    fn predicate_search_finds_the_nearest_match() {
        let map = TerrainMap::parse("1.......1\n.........", GridType::Rectangular).unwrap();
        let speeds = TerrainSpeeds::uniform(10).with(1, 10);
        let graph = GridPathGraph::new(Locomotion::new(&map, &speeds), NoBlocking, unbiased());
        let pool = LayerPool::new();

        let mut search =
            PathSearch::to_target_cell_by_predicate(graph, &pool, CPos::new(6, 1), |cell| {
                map.terrain(cell) == Some(1)
            });
        let path = run(&mut search).unwrap();
        assert_eq!(path.last(), Some(&CPos::new(8, 0)));
        assert_eq!(search.cost_to(CPos::new(8, 0)), Some(10 + 14));
    }

    #[test]
    fn blocking_modes_change_the_route() {
        let map = TerrainMap::parse("#####\n.....\n#####", GridType::Rectangular).unwrap();
        let speeds = TerrainSpeeds::uniform(10);
        let loco = Locomotion::new(&map, &speeds);
        let mover = AgentId(1);
        let mut occupancy = OccupancyMap::new(map.shape());
        occupancy.occupy(CPos::new(2, 1), AgentId(7));
        let pool = LayerPool::new();

        let from = CPos::new(0, 1);
        let to = CPos::new(4, 1);
        let path_with = |options: GraphOptions| {
            let graph = GridPathGraph::new(loco, &occupancy, options.lane_bias(false));
            let mut search = PathSearch::to_target_cell(graph, &pool, from, to);
            run(&mut search)
        };

        assert_eq!(path_with(GraphOptions::new(mover)), None);
        assert_eq!(
            path_with(GraphOptions::new(mover).blocking(BlockingMode::IgnoreTransient))
                .map(|p| p.len()),
            Some(5)
        );
        assert!(path_with(GraphOptions::new(mover).ignoring(AgentId(7))).is_some());
        assert_eq!(path_with(GraphOptions::new(mover).ignoring(AgentId(8))), None);
        assert!(path_with(GraphOptions::new(AgentId(7))).is_some());
    }

    #[test]
    fn custom_cost_steers_around_cells() {
        let map = TerrainMap::new(MapShape::rectangular(5, 3), Some(0));
        let speeds = TerrainSpeeds::uniform(10);
        let graph = GridPathGraph::new(Locomotion::new(&map, &speeds), NoBlocking, unbiased())
            .with_custom_cost(|cell| match cell.y {
                1 if cell.x == 2 => None,
                0 => Some(100),
                _ => Some(0),
            });
        let pool = LayerPool::new();

        let mut search = PathSearch::builder(graph, &pool)
            .from(CPos::new(0, 1))
            .to_cell(CPos::new(4, 1))
            .weight(100)
            .build();
        let path = run(&mut search).unwrap();
        assert!(!path.contains(&CPos::new(2, 1)));
        assert!(path.iter().all(|cell| cell.y != 0));
        assert!(path.contains(&CPos::new(2, 2)));
    }

    #[test]
    fn weights_below_100_still_find_paths() {
        let map = TerrainMap::new(MapShape::rectangular(6, 6), Some(0));
        let speeds = TerrainSpeeds::uniform(10);
        let graph = GridPathGraph::new(Locomotion::new(&map, &speeds), NoBlocking, unbiased());
        let pool = LayerPool::new();

        let mut search = PathSearch::builder(graph, &pool)
            .from(CPos::new(0, 0))
            .to_cell(CPos::new(5, 2))
            .weight(50)
            .build();
        assert!(run(&mut search).is_some());
        assert_eq!(search.weight(), 50);
        assert_eq!(search.cost_to(CPos::new(5, 2)), Some(3 * 10 + 2 * 14));
    }
}
