use crate::{CPos, MapShape};

/// Dense per-cell storage for a map, indexed by [`CPos`].
pub struct CellLayer<T> {
    shape: MapShape,
    cells: Box<[T]>,
}

impl<T> CellLayer<T> {
    pub fn new(shape: MapShape, f: impl FnMut(CPos) -> T) -> Self {
        CellLayer {
            shape,
            cells: shape.cells().map(f).collect(),
        }
    }

    pub fn filled(shape: MapShape, value: T) -> Self
    where
        T: Clone,
    {
        CellLayer {
            shape,
            cells: vec![value; shape.area()].into_boxed_slice(),
        }
    }

    #[inline(always)]
    pub fn shape(&self) -> MapShape {
        self.shape
    }

    #[inline(always)]
    pub fn contains(&self, cell: CPos) -> bool {
        self.shape.contains(cell)
    }

    pub fn storage(&self) -> &[T] {
        &self.cells
    }

    pub fn storage_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    #[inline(always)]
    pub fn get(&self, cell: CPos) -> Option<&T> {
        self.shape.index(cell).map(|index| &self.cells[index])
    }

    #[inline(always)]
    pub fn get_mut(&mut self, cell: CPos) -> Option<&mut T> {
        self.shape.index(cell).map(|index| &mut self.cells[index])
    }

    /// Overwrites every cell with the contents of `other`.
    #[track_caller]
    pub fn copy_from(&mut self, other: &CellLayer<T>)
    where
        T: Copy,
    {
        assert!(self.shape == other.shape, "mismatched layer shapes");
        self.cells.copy_from_slice(&other.cells);
    }

    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.cells.fill(value);
    }

    #[track_caller]
    #[inline(always)]
    fn cell_index(&self, cell: CPos) -> usize {
        match self.shape.index(cell) {
            Some(index) => index,
            None => panic!("cell {cell:?} out of bounds"),
        }
    }
}

impl<T> std::ops::Index<CPos> for CellLayer<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, cell: CPos) -> &T {
        &self.cells[self.cell_index(cell)]
    }
}

impl<T> std::ops::IndexMut<CPos> for CellLayer<T> {
    #[track_caller]
    fn index_mut(&mut self, cell: CPos) -> &mut T {
        let index = self.cell_index(cell);
        &mut self.cells[index]
    }
}

impl<T: Clone> Clone for CellLayer<T> {
    fn clone(&self) -> Self {
        CellLayer {
            shape: self.shape,
            cells: self.cells.clone(),
        }
    }
}
