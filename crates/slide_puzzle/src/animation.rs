use bevy::prelude::*;

use crate::events::MoveSource;
use crate::tile::TileId;

/// Linear interpolation of one scalar over a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
}

impl Tween {
    pub const fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.duration <= 0. || self.elapsed >= self.duration
    }

    /// Current value. Lands exactly on `to` once the elapsed fraction reaches 1.
    pub fn value(&self) -> f32 {
        if self.is_finished() {
            return self.to;
        }
        let fraction = self.elapsed / self.duration;
        (self.to - self.from).mul_add(fraction, self.from)
    }

    /// Moves the tween forward and returns whatever part of `dt` it did not need.
    pub fn advance(&mut self, dt: f32) -> f32 {
        if self.is_finished() {
            return dt;
        }
        self.elapsed += dt;
        (self.elapsed - self.duration).max(0.)
    }
}

fn differs(a: f32, b: f32) -> bool {
    (a - b).abs() > f32::EPSILON
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Motion {
    /// X first, then Y. An axis already at its target is skipped.
    Slide {
        x: Option<Tween>,
        y: Option<Tween>,
        position: Vec2,
        target: Vec2,
    },
    Fade(Tween),
}

impl Motion {
    fn slide(from: Vec2, to: Vec2, duration: f32) -> Self {
        Self::Slide {
            x: differs(from.x, to.x).then(|| Tween::new(from.x, to.x, duration)),
            y: differs(from.y, to.y).then(|| Tween::new(from.y, to.y, duration)),
            position: from,
            target: to,
        }
    }

    fn advance(&mut self, dt: f32) -> (AnimationValue, bool) {
        match self {
            Self::Slide {
                x,
                y,
                position,
                target,
            } => {
                let mut left = dt;
                if let Some(tween) = x.as_mut() {
                    left = tween.advance(left);
                    position.x = tween.value();
                    if tween.is_finished() {
                        *x = None;
                    }
                }
                if x.is_none() {
                    if let Some(tween) = y.as_mut() {
                        tween.advance(left);
                        position.y = tween.value();
                        if tween.is_finished() {
                            *y = None;
                        }
                    }
                }
                let finished = x.is_none() && y.is_none();
                if finished {
                    *position = *target;
                }
                (AnimationValue::Position(*position), finished)
            }
            Self::Fade(tween) => {
                tween.advance(dt);
                (AnimationValue::Alpha(tween.value()), tween.is_finished())
            }
        }
    }
}

/// What an animation drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationTarget {
    Tile(TileId),
    /// Full-board picture shown over image boards.
    Overlay,
}

/// Why an animation was started, handed back when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationPurpose {
    Commit(MoveSource),
    SnapBack,
    Reveal,
    Completion,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationValue {
    Position(Vec2),
    Alpha(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    pub target: AnimationTarget,
    pub value: AnimationValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedAnimation {
    pub target: AnimationTarget,
    pub purpose: AnimationPurpose,
}

/// Everything one tick produced, in start order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AnimationStep {
    pub frames: Vec<AnimationFrame>,
    pub finished: Vec<FinishedAnimation>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Animation {
    target: AnimationTarget,
    purpose: AnimationPurpose,
    motion: Motion,
}

/// Drives every running animation from the frame clock.
#[derive(Debug, Default, Clone)]
pub struct Sequencer {
    animations: Vec<Animation>,
}

impl Sequencer {
    /// Slides a tile from `from` to `to`. A running animation on the same target is replaced.
    pub fn animate_slide(
        &mut self,
        tile: TileId,
        from: Vec2,
        to: Vec2,
        duration: f32,
        purpose: AnimationPurpose,
    ) {
        self.push(Animation {
            target: AnimationTarget::Tile(tile),
            purpose,
            motion: Motion::slide(from, to, duration),
        });
    }

    pub fn animate_fade(
        &mut self,
        target: AnimationTarget,
        from: f32,
        to: f32,
        duration: f32,
        purpose: AnimationPurpose,
    ) {
        self.push(Animation {
            target,
            purpose,
            motion: Motion::Fade(Tween::new(from, to, duration)),
        });
    }

    fn push(&mut self, animation: Animation) {
        self.animations
            .retain(|running| running.target != animation.target);
        self.animations.push(animation);
    }

    pub fn tick(&mut self, dt: f32) -> AnimationStep {
        let mut step = AnimationStep::default();
        self.animations.retain_mut(|animation| {
            let (value, finished) = animation.motion.advance(dt);
            step.frames.push(AnimationFrame {
                target: animation.target,
                value,
            });
            if finished {
                step.finished.push(FinishedAnimation {
                    target: animation.target,
                    purpose: animation.purpose,
                });
            }
            !finished
        });
        step
    }

    /// Drops every animation without reporting completion. Returns how many were running.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.animations.len();
        self.animations.clear();
        cancelled
    }

    pub fn is_animating(&self, target: AnimationTarget) -> bool {
        self.animations
            .iter()
            .any(|animation| animation.target == target)
    }

    pub fn is_busy(&self) -> bool {
        !self.animations.is_empty()
    }
}
