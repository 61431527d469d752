use bevy::prelude::*;
use strum::{Display, EnumIter};
use thiserror::Error;

/// Smallest board the puzzle accepts.
pub const MIN_BOARD_SIZE: i32 = 3;
/// Largest board the puzzle accepts.
pub const MAX_BOARD_SIZE: i32 = 16;
/// Smallest cell, in world units, that can still be hit and dragged.
pub const MIN_CELL_SIZE: f32 = 8.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Board size must be at least {min}, got {size}", min = MIN_BOARD_SIZE)]
    BoardTooSmall { size: i32 },

    #[error("Board size must be at most {max}, got {size}", max = MAX_BOARD_SIZE)]
    BoardTooLarge { size: i32 },

    #[error(
        "{size} tiles per side leave cells under {min} units in a {board_extent} wide board",
        min = MIN_CELL_SIZE
    )]
    CellTooSmall { size: i32, board_extent: f32 },

    #[error("{name} must be positive")]
    NonPositive { name: &'static str },

    #[error("Snap threshold must be within (0, 1], got {0}")]
    InvalidThreshold(f32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum GameType {
    #[default]
    Numbered,
    Image,
}

/// How tile labels are counted across the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum LabelOrder {
    #[default]
    RowMajor,
    ColumnMajor,
}

/// One level as handed over by the level collaborator.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct LevelConfig {
    /// Tiles per side
    pub size: i32,
    /// Number of scramble moves performed before the player takes over
    pub scramble_count: usize,
    pub game_type: GameType,
    pub label_order: LabelOrder,
    /// Label of the first tile (0 or 1 in practice)
    pub first_label: usize,
    /// Fixed scramble seed, random when `None`
    pub seed: Option<u64>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            size: 4,
            scramble_count: 30,
            game_type: GameType::Numbered,
            label_order: LabelOrder::RowMajor,
            first_label: 1,
            seed: None,
        }
    }
}

impl LevelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size < MIN_BOARD_SIZE {
            return Err(ConfigError::BoardTooSmall { size: self.size });
        }
        if self.size > MAX_BOARD_SIZE {
            return Err(ConfigError::BoardTooLarge { size: self.size });
        }
        Ok(())
    }

    /// Also checks every cell stays large enough to grab once fitted into `board_extent`.
    pub fn validate_for_extent(&self, board_extent: f32) -> Result<(), ConfigError> {
        self.validate()?;
        if (board_extent / self.size as f32).floor() < MIN_CELL_SIZE {
            return Err(ConfigError::CellTooSmall {
                size: self.size,
                board_extent,
            });
        }
        Ok(())
    }

    /// Label shown on the tile whose solved slot is `target_index`.
    pub const fn label_for(&self, target_index: usize) -> usize {
        let size = self.size as usize;
        let index = match self.label_order {
            LabelOrder::RowMajor => target_index,
            LabelOrder::ColumnMajor => {
                let column = target_index % size;
                let row = target_index / size;
                row + size * column
            }
        };
        index + self.first_label
    }
}

/// Timings and dimensions shared by every level.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PuzzleConfig {
    // Layout
    /// Side length of the square area the board is fitted into (world units)
    pub board_extent: f32,
    /// Space left between neighbouring tiles (world units)
    pub tile_gap: f32,

    // Timing constants
    /// Duration of one axis of a tile slide (seconds)
    pub move_duration: f32,
    /// Extra wait after each scramble slide before the next one (seconds)
    pub scramble_step_margin: f32,
    /// Wait after the last scramble slide before input is released (seconds)
    pub scramble_settle_delay: f32,
    /// Wait after input is released before the scramble is considered over (seconds)
    pub input_unlock_delay: f32,
    /// Duration of the overlay fade shown on load and on completion (seconds)
    pub fade_duration: f32,
    /// How long the result banner stays up before the level restarts (seconds)
    pub result_display: f32,

    // Interaction settings
    /// Displacement under which a gesture still counts as a tap (world units)
    pub drag_epsilon: f32,
    /// Fraction of a cell a drag must cover to commit the move
    pub snap_threshold: f32,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            board_extent: 320.0,
            tile_gap: 2.0,

            move_duration: 0.08,
            scramble_step_margin: 0.04,
            scramble_settle_delay: 1.2,
            input_unlock_delay: 0.4,
            fade_duration: 1.2,
            result_display: 2.0,

            drag_epsilon: 1.0,
            snap_threshold: 0.5,
        }
    }
}

impl PuzzleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positives = [
            ("move_duration", self.move_duration),
            ("fade_duration", self.fade_duration),
            ("board_extent", self.board_extent),
        ];
        for (name, value) in positives {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { name });
            }
        }
        if self.snap_threshold <= 0.0 || self.snap_threshold > 1.0 {
            return Err(ConfigError::InvalidThreshold(self.snap_threshold));
        }
        Ok(())
    }

    /// Time between two scramble slides.
    pub fn scramble_step_interval(&self) -> f32 {
        self.move_duration + self.scramble_step_margin
    }
}
