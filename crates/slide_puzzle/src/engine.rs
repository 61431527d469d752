use bevy::log::debug;
use bevy::prelude::*;
use bevy::utils::HashSet;

use crate::board::{Board, BoardError};
use crate::tile::{Direction, Tile, TileId};

/// A tile about to trade places with the empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveDescriptor {
    pub moving: TileId,
    pub empty: TileId,
    pub direction: Direction,
}

/// Outcome of a committed swap: where the tile is drawn now and where it must end up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommittedMove {
    pub descriptor: MoveDescriptor,
    pub from: Vec2,
    pub to: Vec2,
}

impl CommittedMove {
    /// Visual displacement relative to the tile's baseline.
    pub fn displacement(&self, baseline: Vec2) -> Vec2 {
        self.to - baseline
    }
}

/// Puzzle state machine: validates, commits and settles moves on a [`Board`].
#[derive(Debug, Clone)]
pub struct MoveEngine {
    board: Board,
    in_flight: HashSet<TileId>,
}

impl MoveEngine {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            in_flight: HashSet::default(),
        }
    }

    pub const fn board(&self) -> &Board {
        &self.board
    }

    pub const fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn find_empty_direction(&self, coords: IVec2) -> Option<Direction> {
        self.board.find_empty_direction(coords)
    }

    pub fn is_in_flight(&self, id: TileId) -> bool {
        self.in_flight.contains(&id)
    }

    pub fn has_moves_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// True when `id` borders the empty slot and neither of them is still moving.
    pub fn can_move(&self, id: TileId) -> bool {
        let Some(tile) = self.board.tile(id) else {
            return false;
        };
        !tile.is_empty()
            && self.find_empty_direction(tile.coords()).is_some()
            && !self.is_in_flight(id)
            && !self.is_in_flight(self.board.empty_id())
    }

    /// Describes the move `id` would make, using `empty` as the destination when given.
    pub fn describe(&self, id: TileId, empty: Option<TileId>) -> Option<MoveDescriptor> {
        let tile = self.board.tile(id).filter(|tile| !tile.is_empty())?;
        let direction = match empty {
            Some(empty_id) => {
                let empty_tile = self.board.tile(empty_id).filter(|tile| tile.is_empty())?;
                Direction::from_offset(empty_tile.coords() - tile.coords())?
            }
            None => self.find_empty_direction(tile.coords())?,
        };
        Some(MoveDescriptor {
            moving: id,
            empty: self.board.empty_id(),
            direction,
        })
    }

    /// Swaps `id` with the empty slot and computes where its visual must travel.
    ///
    /// A tile with no empty neighbour, or one still settling, is left alone and
    /// its hit-testing is restored; that is `Ok(None)`, not an error.
    pub fn commit_move(
        &mut self,
        id: TileId,
        empty: Option<TileId>,
    ) -> Result<Option<CommittedMove>, BoardError> {
        let descriptor = self
            .describe(id, empty)
            .filter(|descriptor| {
                !self.is_in_flight(descriptor.moving) && !self.is_in_flight(descriptor.empty)
            });
        let Some(descriptor) = descriptor else {
            debug!("Tile {id} has nowhere to move");
            if let Some(tile) = self.board.tile_mut(id) {
                tile.visual_mut()
                    .interactivity_mut()
                    .set_raycast(true, false);
            }
            return Ok(None);
        };

        self.board.swap_with_empty(id, descriptor.direction)?;
        debug_assert!(
            self.board.verify().is_ok(),
            "permutation broken after moving {id}"
        );

        let cell_size = self.board.layout().cell_size();
        let extent = *self.board.extent();
        let tile = self.board.tile_mut(id).ok_or(BoardError::UnknownTile(id))?;
        let visual = tile.visual_mut();
        let to = extent.clamp(visual.initial_position() + descriptor.direction.world() * cell_size);
        let from = visual.anchored_position();
        visual.interactivity_mut().set_raycast(false, false);

        self.in_flight.insert(descriptor.moving);
        self.in_flight.insert(descriptor.empty);
        debug!(
            "Committed {} {} to {}",
            descriptor.moving,
            descriptor.direction,
            tile.coords()
        );

        Ok(Some(CommittedMove {
            descriptor,
            from,
            to,
        }))
    }

    /// Settles a move once its animation is over: records the new baseline and
    /// hands hit-testing back to the tile.
    pub fn finish_move(&mut self, id: TileId) {
        self.in_flight.remove(&id);
        self.in_flight.remove(&self.board.empty_id());
        if let Some(tile) = self.board.tile_mut(id) {
            let visual = tile.visual_mut();
            visual.set_initial_position();
            visual.interactivity_mut().set_raycast(true, false);
        }
    }

    /// Solved check that also freezes every tile, so a late drag cannot undo a finished board.
    pub fn is_solved(&mut self) -> bool {
        let solved = self.board.is_solved();
        if solved {
            self.set_tiles_draggable(false);
        }
        solved
    }

    pub fn set_tiles_draggable(&mut self, can_drag: bool) {
        for tile in self.board.tiles_mut().filter(|tile| !tile.is_empty()) {
            let interactivity = tile.visual_mut().interactivity_mut();
            interactivity.set_can_drag(can_drag);
            interactivity.set_raycast(can_drag, false);
        }
    }

    /// Turns hit-testing off for good on every tile.
    pub fn deactivate_all(&mut self) {
        for tile in self.board.tiles_mut() {
            tile.visual_mut()
                .interactivity_mut()
                .set_raycast(false, true);
        }
    }

    /// Re-records every tile's current position as the baseline for the next gesture.
    pub fn rebaseline(&mut self) {
        for tile in self.board.tiles_mut() {
            tile.visual_mut().set_initial_position();
        }
    }

    pub fn clear_in_flight(&mut self) {
        self.in_flight.clear();
    }

    /// Topmost non-empty, hit-testable tile whose cell contains `point`.
    pub fn tile_at_point(&self, point: Vec2) -> Option<TileId> {
        let layout = self.board.layout();
        self.board
            .tiles()
            .iter()
            .filter(|tile| !tile.is_empty() && tile.visual().interactivity().raycast())
            .find(|tile| {
                layout
                    .cell_rect(tile.visual().anchored_position())
                    .contains(point)
            })
            .map(Tile::id)
    }
}
