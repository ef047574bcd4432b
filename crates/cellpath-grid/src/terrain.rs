use std::io::{Error, Result};

use cellpath_core::Cost;

use crate::{CPos, CellLayer, GridType, MPos, MapShape};

/// Index into a [`TerrainSpeeds`] table.
pub type TerrainType = u8;

/// Extent of a map.
pub trait CellMap {
    fn shape(&self) -> MapShape;

    fn contains(&self, cell: CPos) -> bool {
        self.shape().contains(cell)
    }
}

/// Cost of entering cells, as seen by one kind of mover.
pub trait TerrainCost: CellMap {
    /// Cost of entering `cell` with an orthogonal step, or `None` if the mover cannot enter it.
    fn cell_cost(&self, cell: CPos) -> Option<Cost>;

    /// Cheapest cost over every terrain the mover can enter, or `None` if it can enter nothing.
    fn min_cost(&self) -> Option<Cost>;
}

/// Terrain type of every cell of a map. Cells without terrain cannot be entered by anyone.
#[derive(Clone)]
pub struct TerrainMap {
    terrain: CellLayer<Option<TerrainType>>,
}

/// Movement cost of each terrain type for one kind of mover.
///
/// Terrain types with no cost cannot be entered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainSpeeds {
    costs: Vec<Option<Cost>>,
}

/// A mover's view of a map: terrain types looked up in its speed table.
#[derive(Clone, Copy)]
pub struct Locomotion<'a> {
    map: &'a TerrainMap,
    speeds: &'a TerrainSpeeds,
}

impl TerrainMap {
    pub fn new(shape: MapShape, terrain: Option<TerrainType>) -> Self {
        TerrainMap {
            terrain: CellLayer::filled(shape, terrain),
        }
    }

    /// Parses a map from text, one storage row per line.
    ///
    /// `#` is impassable, `.` is terrain type 0 and the digits `0` to `9` are the terrain type of
    /// that number. Every line must have the same length. Blank lines at the start and end are
    /// ignored.
    pub fn parse(text: &str, grid: GridType) -> Result<Self> {
        let rows: Vec<&str> = text
            .trim_matches(|c: char| c == '\n' || c == '\r')
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();

        let width = rows.first().map_or(0, |row| row.chars().count());
        let width = i32::try_from(width).map_err(Error::other)?;
        let height = i32::try_from(rows.len()).map_err(Error::other)?;
        let mut map = TerrainMap::new(MapShape::new(width, height, grid), None);

        for (v, row) in rows.iter().enumerate() {
            if row.chars().count() != width as usize {
                return Err(Error::other(format!(
                    "row {v} has {} columns, expected {width}",
                    row.chars().count()
                )));
            }
            for (u, c) in row.chars().enumerate() {
                let terrain = match c {
                    '#' => None,
                    '.' => Some(0),
                    '0'..='9' => Some(c as u8 - b'0'),
                    _ => {
                        return Err(Error::other(format!(
                            "unexpected character {c:?} at row {v}, column {u}"
                        )))
                    }
                };
                map.set(MPos::new(u as i32, v as i32).to_cpos(grid), terrain);
            }
        }

        Ok(map)
    }

    pub fn shape(&self) -> MapShape {
        self.terrain.shape()
    }

    pub fn terrain(&self, cell: CPos) -> Option<TerrainType> {
        self.terrain.get(cell).copied().flatten()
    }

    #[track_caller]
    pub fn set(&mut self, cell: CPos, terrain: Option<TerrainType>) {
        self.terrain[cell] = terrain;
    }
}

impl CellMap for TerrainMap {
    fn shape(&self) -> MapShape {
        self.terrain.shape()
    }
}

impl TerrainSpeeds {
    pub fn new() -> Self {
        TerrainSpeeds::default()
    }

    /// Speed table where terrain type 0 costs `cost` and nothing else can be entered.
    pub fn uniform(cost: Cost) -> Self {
        TerrainSpeeds::new().with(0, cost)
    }

    pub fn with(mut self, terrain: TerrainType, cost: Cost) -> Self {
        self.set(terrain, Some(cost));
        self
    }

    pub fn set(&mut self, terrain: TerrainType, cost: Option<Cost>) {
        let index = terrain as usize;
        if index >= self.costs.len() {
            self.costs.resize(index + 1, None);
        }
        self.costs[index] = cost;
    }

    pub fn cost(&self, terrain: TerrainType) -> Option<Cost> {
        self.costs.get(terrain as usize).copied().flatten()
    }

    pub fn min_cost(&self) -> Option<Cost> {
        self.costs.iter().flatten().copied().min()
    }
}

impl<'a> Locomotion<'a> {
    pub fn new(map: &'a TerrainMap, speeds: &'a TerrainSpeeds) -> Self {
        Locomotion { map, speeds }
    }

    pub fn map(&self) -> &'a TerrainMap {
        self.map
    }

    pub fn speeds(&self) -> &'a TerrainSpeeds {
        self.speeds
    }
}

impl CellMap for Locomotion<'_> {
    fn shape(&self) -> MapShape {
        self.map.shape()
    }
}

impl TerrainCost for Locomotion<'_> {
    fn cell_cost(&self, cell: CPos) -> Option<Cost> {
        self.speeds.cost(self.map.terrain(cell)?)
    }

    fn min_cost(&self) -> Option<Cost> {
        self.speeds.min_cost()
    }
}
