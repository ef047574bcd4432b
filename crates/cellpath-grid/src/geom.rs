use std::fmt;
use std::ops::{Add, Sub};

/// Cell position in map space.
///
/// North is towards negative `y`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CPos {
    pub x: i32,
    pub y: i32,
}

/// Offset between two [`CPos`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CVec {
    pub x: i32,
    pub y: i32,
}

/// Storage position of a cell: column `u` and row `v` of the dense arrays backing a map.
///
/// For rectangular maps this is the same as the [`CPos`]. Isometric maps store each screen row of
/// the diamond as one row of the array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MPos {
    pub u: i32,
    pub v: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GridType {
    #[default]
    Rectangular,
    Isometric,
}

/// Size and addressing scheme of a map.
///
/// Layers sized for the same shape are interchangeable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapShape {
    width: i32,
    height: i32,
    grid: GridType,
}

impl CPos {
    pub const fn new(x: i32, y: i32) -> Self {
        CPos { x, y }
    }

    #[inline(always)]
    pub fn to_mpos(self, grid: GridType) -> MPos {
        match grid {
            GridType::Rectangular => MPos {
                u: self.x,
                v: self.y,
            },
            GridType::Isometric => MPos {
                u: (self.x - self.y).div_euclid(2),
                v: self.x + self.y,
            },
        }
    }
}

impl CVec {
    pub const ZERO: CVec = CVec { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        CVec { x, y }
    }

    pub fn is_diagonal(self) -> bool {
        self.x != 0 && self.y != 0
    }
}

impl MPos {
    pub const fn new(u: i32, v: i32) -> Self {
        MPos { u, v }
    }

    #[inline(always)]
    pub fn to_cpos(self, grid: GridType) -> CPos {
        match grid {
            GridType::Rectangular => CPos {
                x: self.u,
                y: self.v,
            },
            GridType::Isometric => {
                let offset = self.v.rem_euclid(2);
                let y = (self.v - offset) / 2 - self.u;
                CPos { x: self.v - y, y }
            }
        }
    }
}

impl MapShape {
    #[track_caller]
    pub fn new(width: i32, height: i32, grid: GridType) -> Self {
        assert!(width >= 0, "width must be non-negative");
        assert!(height >= 0, "height must be non-negative");
        (width as usize)
            .checked_mul(height as usize)
            .expect("number of cells exceeds usize::MAX");
        MapShape {
            width,
            height,
            grid,
        }
    }

    #[track_caller]
    pub fn rectangular(width: i32, height: i32) -> Self {
        Self::new(width, height, GridType::Rectangular)
    }

    #[track_caller]
    pub fn isometric(width: i32, height: i32) -> Self {
        Self::new(width, height, GridType::Isometric)
    }

    #[inline(always)]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline(always)]
    pub fn grid(&self) -> GridType {
        self.grid
    }

    /// Number of cells.
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline(always)]
    pub fn contains(&self, cell: CPos) -> bool {
        self.contains_mpos(cell.to_mpos(self.grid))
    }

    #[inline(always)]
    pub fn contains_mpos(&self, pos: MPos) -> bool {
        pos.u >= 0 && pos.v >= 0 && pos.u < self.width && pos.v < self.height
    }

    /// Index of `cell` in a dense row-major array of this shape.
    #[inline(always)]
    pub fn index(&self, cell: CPos) -> Option<usize> {
        let pos = cell.to_mpos(self.grid);
        self.contains_mpos(pos)
            .then(|| pos.v as usize * self.width as usize + pos.u as usize)
    }

    /// All cells of the map, in storage order.
    pub fn cells(&self) -> impl Iterator<Item = CPos> {
        let MapShape {
            width,
            height,
            grid,
        } = *self;
        (0..height).flat_map(move |v| (0..width).map(move |u| MPos { u, v }.to_cpos(grid)))
    }
}

impl Add<CVec> for CPos {
    type Output = CPos;

    fn add(self, rhs: CVec) -> CPos {
        CPos {
            x: self.x.wrapping_add(rhs.x),
            y: self.y.wrapping_add(rhs.y),
        }
    }
}

impl Sub<CVec> for CPos {
    type Output = CPos;

    fn sub(self, rhs: CVec) -> CPos {
        CPos {
            x: self.x.wrapping_sub(rhs.x),
            y: self.y.wrapping_sub(rhs.y),
        }
    }
}

impl Sub for CPos {
    type Output = CVec;

    fn sub(self, rhs: CPos) -> CVec {
        CVec {
            x: self.x.wrapping_sub(rhs.x),
            y: self.y.wrapping_sub(rhs.y),
        }
    }
}

impl From<(i32, i32)> for CPos {
    fn from((x, y): (i32, i32)) -> Self {
        CPos { x, y }
    }
}

impl fmt::Display for CPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}
