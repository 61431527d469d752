use bevy::math::IVec2;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("Grid dimensions must be positive, got {width}x{height}")]
    InvalidDimension { width: i32, height: i32 },

    #[error("Grid of {width}x{height} cells is too large")]
    TooLarge { width: i32, height: i32 },

    #[error("Expected {expected} initial values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Coordinate {0} is outside the grid")]
    OutOfBounds(IVec2),
}

/// Fixed-size row-major storage addressed by `(x, y)` coordinates.
///
/// Lookups outside the grid return `None` instead of failing, so neighbour
/// scans can probe past the border without a separate range check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: i32,
    height: i32,
    cells: Vec<T>,
}

impl<T: Default + Clone> Grid<T> {
    pub fn new(width: i32, height: i32) -> Result<Self, GridError> {
        let len = Self::cell_count(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![T::default(); len],
        })
    }
}

impl<T> Grid<T> {
    /// Builds a grid populated in row-major order from `values`.
    pub fn from_values(width: i32, height: i32, values: Vec<T>) -> Result<Self, GridError> {
        let expected = Self::cell_count(width, height)?;
        if values.len() != expected {
            return Err(GridError::LengthMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells: values,
        })
    }

    fn cell_count(width: i32, height: i32) -> Result<usize, GridError> {
        if width <= 0 || height <= 0 {
            return Err(GridError::InvalidDimension { width, height });
        }
        width
            .checked_mul(height)
            .and_then(|count| usize::try_from(count).ok())
            .ok_or(GridError::TooLarge { width, height })
    }

    pub const fn width(&self) -> i32 {
        self.width
    }

    pub const fn height(&self) -> i32 {
        self.height
    }

    pub const fn contains(&self, coords: IVec2) -> bool {
        coords.x >= 0 && coords.y >= 0 && coords.x < self.width && coords.y < self.height
    }

    pub const fn index(&self, coords: IVec2) -> Option<usize> {
        if self.contains(coords) {
            Some((coords.x + coords.y * self.width) as usize)
        } else {
            None
        }
    }

    pub const fn coords(&self, index: usize) -> IVec2 {
        let index = index as i32;
        IVec2::new(index % self.width, index / self.width)
    }

    pub fn get(&self, coords: IVec2) -> Option<&T> {
        self.index(coords).and_then(|index| self.cells.get(index))
    }

    pub fn get_mut(&mut self, coords: IVec2) -> Option<&mut T> {
        self.index(coords).and_then(|index| self.cells.get_mut(index))
    }

    /// Stores `value` at `coords` and hands back the previous occupant.
    pub fn set(&mut self, coords: IVec2, value: T) -> Result<T, GridError> {
        let cell = self.get_mut(coords).ok_or(GridError::OutOfBounds(coords))?;
        Ok(core::mem::replace(cell, value))
    }

    /// Exchanges the values stored at `a` and `b`. Both must be inside the grid.
    pub fn swap(&mut self, a: IVec2, b: IVec2) -> Result<(), GridError> {
        let first = self.index(a).ok_or(GridError::OutOfBounds(a))?;
        let second = self.index(b).ok_or(GridError::OutOfBounds(b))?;
        self.cells.swap(first, second);
        Ok(())
    }

    pub fn values(&self) -> &[T] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &T)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, value)| (self.coords(index), value))
    }

    /// Coordinates of the first cell holding `value`.
    pub fn position(&self, value: &T) -> Option<IVec2>
    where
        T: PartialEq,
    {
        self.cells
            .iter()
            .position(|cell| cell == value)
            .map(|index| self.coords(index))
    }
}
