use core::fmt::{self, Display, Formatter};
use core::time::Duration;

use bevy::log::info;
use bevy::prelude::*;
use bevy::time::Stopwatch;

use crate::events::{MoveSource, PuzzleEvent};

/// Outcome of one finished attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PuzzleResult {
    pub slide_amount: usize,
    /// Seconds between the first slide and the solve, pauses excluded
    pub time_taken: f32,
    /// 1 for an instant solve, falling towards 0 the longer it took
    pub score: f32,
}

impl PuzzleResult {
    pub fn new(slide_amount: usize, time_taken: f32) -> Self {
        let score = (-0.1 / 1000_f32).mul_add(time_taken, 1.).clamp(0., 1.);
        Self {
            slide_amount,
            time_taken,
            score,
        }
    }
}

impl Display for PuzzleResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Time taken (s): {:.1}\tAmount of slid tiles: {}",
            self.time_taken, self.slide_amount
        )
    }
}

/// Slide count and play time of the current attempt.
#[derive(Resource, Debug, Default)]
pub struct PuzzleSession {
    slide_amount: usize,
    has_slid: bool,
    paused: bool,
    stopwatch: Stopwatch,
    result: Option<PuzzleResult>,
}

impl PuzzleSession {
    /// Resets everything. The clock only starts with the first slide.
    pub fn start(&mut self) {
        self.slide_amount = 0;
        self.has_slid = false;
        self.paused = false;
        self.result = None;
        self.stopwatch.reset();
        self.stopwatch.pause();
    }

    pub const fn slide_amount(&self) -> usize {
        self.slide_amount
    }

    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.stopwatch.elapsed_secs()
    }

    pub const fn result(&self) -> Option<&PuzzleResult> {
        self.result.as_ref()
    }

    pub fn tick(&mut self, delta: Duration) {
        self.stopwatch.tick(delta);
    }

    /// Feeds a board notification in. Returns the result once the puzzle is solved.
    pub fn track(&mut self, event: &PuzzleEvent) -> Option<PuzzleResult> {
        match event {
            PuzzleEvent::FirstMove => {
                self.has_slid = true;
                if !self.paused {
                    self.stopwatch.unpause();
                }
                None
            }
            PuzzleEvent::TileMoved {
                source: MoveSource::Player,
                ..
            } => {
                self.slide_amount += 1;
                None
            }
            PuzzleEvent::PuzzleSolved => Some(self.force_finish()),
            PuzzleEvent::TileMoved { .. } | PuzzleEvent::ScrambleComplete { .. } => None,
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
        self.stopwatch.pause();
    }

    /// The clock only runs again if the player had already started.
    pub fn resume(&mut self) {
        self.paused = false;
        if self.has_slid {
            self.stopwatch.unpause();
        }
    }

    /// Stops the clock and records the result, solved or not.
    pub fn force_finish(&mut self) -> PuzzleResult {
        self.stopwatch.pause();
        let result = PuzzleResult::new(self.slide_amount, self.stopwatch.elapsed_secs());
        info!("{result}");
        self.result = Some(result);
        result
    }
}
