use bevy::prelude::*;

use crate::tile::TileId;

/// Who asked for a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum MoveSource {
    Player,
    Scramble,
}

/// Notifications published by the board for scoring, audio and the result screen.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleEvent {
    /// A committed move finished animating.
    TileMoved { tile: TileId, source: MoveSource },
    /// The player's first move of the level. Sent once, when that move commits.
    FirstMove,
    /// Scrambling is over; sent before the settle delay.
    ScrambleComplete { moves: usize },
    PuzzleSolved,
}
