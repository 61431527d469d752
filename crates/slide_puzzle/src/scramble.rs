use bevy::log::{debug, info};
use strum::{Display, IntoEnumIterator};

use crate::board::{Board, BoardError};
use crate::config::PuzzleConfig;
use crate::tile::Direction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
pub enum ScramblePhase {
    #[default]
    Idle,
    Scrambling,
    Settling,
}

/// What the owner of a [`Scrambler`] must do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrambleEvent {
    /// Pick a direction with [`Scrambler::choose_direction`], commit it and call
    /// [`Scrambler::record_step`].
    StepDue,
    Completed { moves: usize },
    /// Settle delay is over: tiles may be dragged again.
    InputReleased,
    /// Back to idle.
    Finished,
}

/// Paced random walk of the empty slot.
///
/// Every step moves the empty slot into one of its in-range neighbours, never
/// straight back to where it just came from. Waits are expressed as remaining
/// seconds and run down by [`Scrambler::tick`].
#[derive(Debug, Clone)]
pub struct Scrambler {
    phase: ScramblePhase,
    rng: fastrand::Rng,
    remaining: usize,
    performed: usize,
    last_direction: Option<Direction>,
    wait: f32,
    input_released: bool,
    step_interval: f32,
    settle_delay: f32,
    unlock_delay: f32,
}

impl Scrambler {
    pub fn new(config: &PuzzleConfig, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Self {
            phase: ScramblePhase::Idle,
            rng,
            remaining: 0,
            performed: 0,
            last_direction: None,
            wait: 0.,
            input_released: false,
            step_interval: config.scramble_step_interval(),
            settle_delay: config.scramble_settle_delay,
            unlock_delay: config.input_unlock_delay,
        }
    }

    pub const fn phase(&self) -> ScramblePhase {
        self.phase
    }

    /// True until the unlock grace after the last step has run out.
    pub fn is_busy(&self) -> bool {
        self.phase != ScramblePhase::Idle
    }

    pub const fn performed(&self) -> usize {
        self.performed
    }

    /// Direction the empty slot took on the previous step.
    pub const fn last_direction(&self) -> Option<Direction> {
        self.last_direction
    }

    pub fn start(&mut self, count: usize) {
        info!("Scrambling {count} moves");
        self.phase = ScramblePhase::Scrambling;
        self.remaining = count;
        self.performed = 0;
        self.last_direction = None;
        self.wait = 0.;
        self.input_released = false;
    }

    /// Runs the current wait down by `dt`. `ready` is false while a previous
    /// move is still settling, which holds the next step back.
    pub fn tick(&mut self, dt: f32, ready: bool) -> Option<ScrambleEvent> {
        self.wait -= dt;
        if self.wait > 0. {
            return None;
        }
        match self.phase {
            ScramblePhase::Idle => None,
            ScramblePhase::Scrambling if self.remaining > 0 => ready.then_some(ScrambleEvent::StepDue),
            ScramblePhase::Scrambling => {
                debug!("Scramble phase {} -> {}", self.phase, ScramblePhase::Settling);
                self.phase = ScramblePhase::Settling;
                self.wait = self.settle_delay;
                Some(ScrambleEvent::Completed {
                    moves: self.performed,
                })
            }
            ScramblePhase::Settling if !self.input_released => {
                self.input_released = true;
                self.wait = self.unlock_delay;
                Some(ScrambleEvent::InputReleased)
            }
            ScramblePhase::Settling => {
                debug!("Scramble phase {} -> {}", self.phase, ScramblePhase::Idle);
                self.phase = ScramblePhase::Idle;
                self.wait = 0.;
                Some(ScrambleEvent::Finished)
            }
        }
    }

    /// Draws a direction for the empty slot, excluding the reverse of the last one.
    pub fn choose_direction(&mut self, board: &Board) -> Result<Direction, BoardError> {
        let empty = board.empty_tile()?.coords();
        let excluded = self.last_direction.map(Direction::reverse);
        let mut candidates: Vec<Direction> = Direction::iter()
            .filter(|direction| Some(*direction) != excluded)
            .collect();
        while !candidates.is_empty() {
            let direction = candidates.swap_remove(self.rng.usize(..candidates.len()));
            if board.contains(empty + direction.offset()) {
                return Ok(direction);
            }
        }
        Err(BoardError::NoScrambleMove(empty))
    }

    pub fn record_step(&mut self, direction: Direction) {
        self.last_direction = Some(direction);
        self.remaining = self.remaining.saturating_sub(1);
        self.performed += 1;
        self.wait = self.step_interval;
    }

    /// Abandons the scramble. Steps already committed stay on the board.
    pub fn cancel(&mut self) {
        if self.is_busy() {
            debug!("Scramble cancelled after {} moves", self.performed);
        }
        self.phase = ScramblePhase::Idle;
        self.remaining = 0;
        self.wait = 0.;
    }
}
