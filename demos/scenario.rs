use std::path::PathBuf;

use cellpath::grid::{CPos, GridType, Locomotion, MPos, TerrainMap, TerrainSpeeds};
use cellpath::search::{GraphOptions, GridPathGraph, LayerPool, NoBlocking, PathSearch};
use cellpath::{step, SearchStep};
use clap::Parser;
use rayon::prelude::*;

#[derive(Parser)]
struct Options {
    /// Text map: `#` is impassable, `.` and `0` to `9` are terrain types.
    map: PathBuf,
    /// Start cell, as `x,y`.
    #[arg(long, value_parser = parse_cell)]
    from: CPos,
    /// Target cell, as `x,y`.
    #[arg(long, value_parser = parse_cell)]
    to: CPos,
    /// Heuristic weight percentage.
    #[arg(long, default_value_t = 125)]
    weight: u32,
    /// Read the map as the storage rows of an isometric map.
    #[arg(long)]
    isometric: bool,
    #[arg(long)]
    no_lane_bias: bool,
    /// Run the same search this many times in parallel, sharing one layer pool.
    #[arg(long, default_value_t = 1)]
    repeat: usize,
}

fn parse_cell(s: &str) -> Result<CPos, String> {
    let (x, y) = s.split_once(',').ok_or("expected x,y")?;
    let x = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok(CPos::new(x, y))
}

fn main() {
    let opt = Options::parse();

    let t1 = std::time::Instant::now();

    let grid = match opt.isometric {
        true => GridType::Isometric,
        false => GridType::Rectangular,
    };
    let text = std::fs::read_to_string(&opt.map).unwrap();
    let map = TerrainMap::parse(&text, grid).unwrap();

    // Terrain type N costs 100 + 50 * N.
    let mut speeds = TerrainSpeeds::new();
    for terrain in 0..10 {
        speeds.set(terrain, Some(100 + 50 * terrain as u32));
    }
    let loco = Locomotion::new(&map, &speeds);
    let options = GraphOptions::default().lane_bias(!opt.no_lane_bias);
    let pool = LayerPool::new();

    let t2 = std::time::Instant::now();

    let results: Vec<_> = (0..opt.repeat)
        .into_par_iter()
        .map(|_| {
            let graph = GridPathGraph::new(loco, NoBlocking, options);
            let mut search = PathSearch::builder(graph, &pool)
                .from(opt.from)
                .to_cell(opt.to)
                .weight(opt.weight)
                .build();
            let found = match step(&mut search, usize::MAX) {
                SearchStep::Found(cell) => search.path_to(cell).zip(search.cost_to(cell)),
                SearchStep::Exhausted | SearchStep::Pending => None,
            };
            search.dispose();
            found
        })
        .collect();

    let t3 = std::time::Instant::now();

    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    let Some((path, cost)) = results.into_iter().next().flatten() else {
        println!("failed to find path");
        return;
    };

    let shape = map.shape();
    for v in 0..shape.height() {
        for u in 0..shape.width() {
            let cell = MPos::new(u, v).to_cpos(grid);
            let c = match map.terrain(cell) {
                _ if path.contains(&cell) => '*',
                None => '#',
                Some(0) => '.',
                Some(t) => (b'0' + t) as char,
            };
            print!("{c}");
        }
        println!();
    }
    println!("{cost} {path:?}");

    let stats = pool.stats();
    eprintln!(
        "Load: {:<10.2?} Search: {:.2?} Layers: {}",
        t2 - t1,
        t3 - t2,
        stats.allocated
    );
}
