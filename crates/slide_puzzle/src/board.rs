use core::fmt::{self, Display, Formatter};

use bevy::prelude::*;
use bevy::utils::HashSet;
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::config::{ConfigError, LevelConfig};
use crate::grid::{Grid, GridError};
use crate::tile::{Direction, Tile, TileId, TileVisual};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoardError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Tile {0} does not exist on this board")]
    UnknownTile(TileId),

    #[error("Board invariant broken: {0}")]
    Inconsistent(String),

    #[error("No in-range neighbour left around {0} to scramble into")]
    NoScrambleMove(IVec2),
}

/// Maps grid cells to world positions, with the board centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    size: i32,
    cell_size: f32,
}

impl BoardLayout {
    /// Fits `size` cells per side into a square of side `extent`.
    pub fn fit(size: i32, extent: f32) -> Self {
        Self {
            size,
            cell_size: (extent / size as f32).floor(),
        }
    }

    pub const fn size(&self) -> i32 {
        self.size
    }

    /// Distance a tile travels for one move.
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn anchored_position(&self, coords: IVec2) -> Vec2 {
        let half = (self.size - 1) as f32 * 0.5;
        Vec2::new(
            (coords.x as f32 - half) * self.cell_size,
            (half - coords.y as f32) * self.cell_size,
        )
    }

    pub fn cell_rect(&self, center: Vec2) -> Rect {
        Rect::from_center_size(center, Vec2::splat(self.cell_size))
    }
}

/// Bounds of every anchored position a tile may legally rest at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    min: Vec2,
    max: Vec2,
}

impl Extent {
    fn from_positions(positions: impl IntoIterator<Item = Vec2>) -> Self {
        positions.into_iter().fold(
            Self {
                min: Vec2::splat(f32::MAX),
                max: Vec2::splat(f32::MIN),
            },
            |extent, position| Self {
                min: extent.min.min(position),
                max: extent.max.max(position),
            },
        )
    }

    pub const fn min(&self) -> Vec2 {
        self.min
    }

    pub const fn max(&self) -> Vec2 {
        self.max
    }

    pub fn clamp(&self, position: Vec2) -> Vec2 {
        position.max(self.min).min(self.max)
    }
}

/// The tiles of one puzzle attempt and the grid that places them.
///
/// Tiles are stored by id; the grid holds the id occupying each cell. The empty
/// slot is a tile like any other, so every cell is always occupied.
#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid<TileId>,
    tiles: Vec<Tile>,
    empty: TileId,
    layout: BoardLayout,
    extent: Extent,
}

impl Board {
    /// Builds a solved board for `level`, fitted into a square of side `board_extent`.
    pub fn new(level: &LevelConfig, board_extent: f32) -> Result<Self, BoardError> {
        level.validate_for_extent(board_extent)?;
        let size = level.size;
        let layout = BoardLayout::fit(size, board_extent);
        let count = (size * size) as usize;
        let empty = TileId::new(count - 1);

        let tiles: Vec<Tile> = (0..count)
            .map(|index| {
                let id = TileId::new(index);
                let coords = IVec2::new(index as i32 % size, index as i32 / size);
                let visual = TileVisual::new(layout.anchored_position(coords));
                Tile::new(id, coords, id == empty, level.label_for(index), visual)
            })
            .collect();

        let grid = Grid::from_values(size, size, tiles.iter().map(Tile::id).collect())?;
        let extent = Extent::from_positions(
            tiles
                .iter()
                .filter(|tile| !tile.is_empty())
                .map(|tile| tile.visual().anchored_position()),
        );

        Ok(Self {
            grid,
            tiles,
            empty,
            layout,
            extent,
        })
    }

    pub const fn size(&self) -> i32 {
        self.layout.size()
    }

    pub const fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub const fn extent(&self) -> &Extent {
        &self.extent
    }

    pub const fn empty_id(&self) -> TileId {
        self.empty
    }

    pub fn empty_tile(&self) -> Result<&Tile, BoardError> {
        self.tile(self.empty)
            .ok_or(BoardError::UnknownTile(self.empty))
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.index())
    }

    pub fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(id.index())
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    pub fn contains(&self, coords: IVec2) -> bool {
        self.grid.contains(coords)
    }

    pub fn id_at(&self, coords: IVec2) -> Option<TileId> {
        self.grid.get(coords).copied()
    }

    pub fn tile_at(&self, coords: IVec2) -> Option<&Tile> {
        self.id_at(coords).and_then(|id| self.tile(id))
    }

    /// First neighbour of `coords`, scanning up, right, down, left, that holds the empty tile.
    pub fn find_empty_direction(&self, coords: IVec2) -> Option<Direction> {
        Direction::iter().find(|direction| {
            self.tile_at(coords + direction.offset())
                .is_some_and(Tile::is_empty)
        })
    }

    /// Swaps `moving` with the empty tile lying one step away in `direction`.
    pub(crate) fn swap_with_empty(
        &mut self,
        moving: TileId,
        direction: Direction,
    ) -> Result<(), BoardError> {
        let from = self
            .tile(moving)
            .ok_or(BoardError::UnknownTile(moving))?
            .coords();
        let offset = direction.offset();
        let to = from + offset;
        let Some(target) = self.id_at(to) else {
            return Err(BoardError::Inconsistent(format!(
                "tile {moving} at {from} has no neighbour {direction}"
            )));
        };
        if target != self.empty {
            return Err(BoardError::Inconsistent(format!(
                "tile {moving} cannot swap with non-empty tile {target}"
            )));
        }

        self.grid.swap(from, to)?;
        if let Some(tile) = self.tiles.get_mut(moving.index()) {
            tile.shift(offset);
        }
        if let Some(tile) = self.tiles.get_mut(self.empty.index()) {
            tile.shift(-offset);
        }
        Ok(())
    }

    /// True when every cell holds the tile whose target slot it is.
    pub fn is_solved(&self) -> bool {
        self.grid
            .values()
            .iter()
            .enumerate()
            .all(|(index, id)| self.tile(*id).is_some_and(|tile| tile.target_index() == index))
    }

    /// Checks that grid cells and tile coordinates describe the same permutation.
    pub fn verify(&self) -> Result<(), BoardError> {
        let mut seen = HashSet::default();
        for (coords, id) in self.grid.iter() {
            let tile = self.tile(*id).ok_or(BoardError::UnknownTile(*id))?;
            if tile.coords() != coords {
                return Err(BoardError::Inconsistent(format!(
                    "tile {id} stored at {coords} believes it is at {}",
                    tile.coords()
                )));
            }
            if !seen.insert(*id) {
                return Err(BoardError::Inconsistent(format!(
                    "tile {id} occupies more than one cell"
                )));
            }
        }
        let empties = self.tiles.iter().filter(|tile| tile.is_empty()).count();
        if empties != 1 {
            return Err(BoardError::Inconsistent(format!(
                "expected one empty tile, found {empties}"
            )));
        }
        Ok(())
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for y in 0..self.size() {
            for x in 0..self.size() {
                match self.tile_at(IVec2::new(x, y)) {
                    Some(tile) if tile.is_empty() => write!(f, "   ")?,
                    Some(tile) => write!(f, "{:>02} ", tile.label())?,
                    None => {}
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
