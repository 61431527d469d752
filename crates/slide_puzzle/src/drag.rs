use bevy::log::debug;
use bevy::prelude::*;

use crate::tile::{Direction, TileId};

/// Clamps `value` between `a` and `b` whichever is larger.
pub fn smart_clamp(value: f32, a: f32, b: f32) -> f32 {
    value.max(a.min(b)).min(a.max(b))
}

/// One continuous gesture on one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    tile: TileId,
    /// Only direction the tile may travel in, `None` when it has no empty neighbour.
    axis: Option<Direction>,
    baseline: Vec2,
    grab: Vec2,
    position: Vec2,
    has_moved: bool,
}

impl DragSession {
    pub const fn tile(&self) -> TileId {
        self.tile
    }

    pub const fn axis(&self) -> Option<Direction> {
        self.axis
    }

    pub const fn baseline(&self) -> Vec2 {
        self.baseline
    }

    pub const fn position(&self) -> Vec2 {
        self.position
    }

    pub const fn has_moved(&self) -> bool {
        self.has_moved
    }
}

/// How a gesture ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragRelease {
    /// Released without moving: behaves like a click.
    Tap { tile: TileId },
    /// Dragged far enough to count as a move.
    Commit { tile: TileId, direction: Direction },
    /// Not far enough; the tile travels back to its baseline.
    SnapBack { tile: TileId, from: Vec2, to: Vec2 },
    /// The tile had nowhere to go.
    Ignored { tile: TileId },
}

/// Owns the single drag session allowed at a time.
#[derive(Debug, Clone)]
pub struct DragMediator {
    session: Option<DragSession>,
    cell_size: f32,
    epsilon: f32,
    threshold: f32,
}

impl DragMediator {
    pub const fn new(cell_size: f32, epsilon: f32, threshold: f32) -> Self {
        Self {
            session: None,
            cell_size,
            epsilon,
            threshold,
        }
    }

    pub const fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub const fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Starts a session on `tile`. Refused while another session is live or
    /// while `busy` (a scramble is running).
    pub fn engage(
        &mut self,
        tile: TileId,
        axis: Option<Direction>,
        baseline: Vec2,
        grab: Vec2,
        busy: bool,
    ) -> bool {
        if busy {
            debug!("Drag on {tile} refused while scrambling");
            return false;
        }
        if let Some(session) = &self.session {
            debug!("Drag on {tile} refused, {} is already engaged", session.tile);
            return false;
        }
        self.session = Some(DragSession {
            tile,
            axis,
            baseline,
            grab,
            position: baseline,
            has_moved: false,
        });
        true
    }

    /// Follows the pointer along the allowed axis, at most one cell away from the baseline.
    pub fn drag_to(&mut self, pointer: Vec2) -> Option<(TileId, Vec2)> {
        let cell_size = self.cell_size;
        let epsilon = self.epsilon;
        let session = self.session.as_mut()?;
        let axis = session.axis?.world();

        let travel = (pointer - session.grab).dot(axis);
        let wanted = session.baseline + axis * travel;
        let end = session.baseline + axis * cell_size;
        session.position = Vec2::new(
            smart_clamp(wanted.x, session.baseline.x, end.x),
            smart_clamp(wanted.y, session.baseline.y, end.y),
        );
        if session.position.distance(session.baseline) > epsilon {
            session.has_moved = true;
        }
        Some((session.tile, session.position))
    }

    /// Ends the session. A release exactly half a cell away commits.
    pub fn release(&mut self) -> Option<DragRelease> {
        let session = self.session.take()?;
        let tile = session.tile;
        let Some(direction) = session.axis else {
            return Some(DragRelease::Ignored { tile });
        };
        if !session.has_moved {
            return Some(DragRelease::Tap { tile });
        }
        if session.position.distance(session.baseline) < self.cell_size * self.threshold {
            return Some(DragRelease::SnapBack {
                tile,
                from: session.position,
                to: session.baseline,
            });
        }
        Some(DragRelease::Commit { tile, direction })
    }

    /// Drops the live session, returning the tile and the baseline it must jump back to.
    pub fn cancel(&mut self) -> Option<(TileId, Vec2)> {
        self.session
            .take()
            .map(|session| (session.tile, session.baseline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_close;

    const CELL: f32 = 100.;

    fn mediator() -> DragMediator {
        DragMediator::new(CELL, 1., 0.5)
    }

    fn engaged(axis: Option<Direction>) -> DragMediator {
        let mut mediator = mediator();
        assert!(
            mediator.engage(TileId::new(0), axis, Vec2::ZERO, Vec2::new(10., 10.), false),
            "free mediator accepts a session"
        );
        mediator
    }

    #[test]
    fn smart_clamp_ignores_bound_order() {
        assert_close(smart_clamp(5., 0., 10.), 5., "inside");
        assert_close(smart_clamp(-5., 10., 0.), 0., "below, reversed bounds");
        assert_close(smart_clamp(50., 0., -100.), 0., "above, negative span");
    }

    #[test]
    fn follows_only_the_allowed_axis() {
        let mut mediator = engaged(Some(Direction::Up));
        let (_, position) = mediator
            .drag_to(Vec2::new(90., 40.))
            .expect("session is live");
        assert_eq!(position, Vec2::new(0., 30.), "x ignored, offset from the grab point");

        let (_, position) = mediator
            .drag_to(Vec2::new(10., 500.))
            .expect("session is live");
        assert_eq!(position, Vec2::new(0., CELL), "at most one cell");

        let (_, position) = mediator
            .drag_to(Vec2::new(10., -500.))
            .expect("session is live");
        assert_eq!(position, Vec2::ZERO, "never behind the baseline");
    }

    #[test]
    fn threshold_decides_between_commit_and_snap_back() {
        let mut mediator = engaged(Some(Direction::Right));
        mediator.drag_to(Vec2::new(59., 10.));
        assert_eq!(
            mediator.release(),
            Some(DragRelease::SnapBack {
                tile: TileId::new(0),
                from: Vec2::new(49., 0.),
                to: Vec2::ZERO,
            }),
            "short of half a cell"
        );

        let mut mediator = engaged(Some(Direction::Right));
        mediator.drag_to(Vec2::new(60., 10.));
        assert_eq!(
            mediator.release(),
            Some(DragRelease::Commit {
                tile: TileId::new(0),
                direction: Direction::Right,
            }),
            "exactly half a cell commits"
        );
    }

    #[test]
    fn release_without_motion_is_a_tap() {
        let mut mediator = engaged(Some(Direction::Left));
        mediator.drag_to(Vec2::new(10.5, 10.));
        assert_eq!(
            mediator.release(),
            Some(DragRelease::Tap {
                tile: TileId::new(0)
            }),
            "within epsilon"
        );
        assert!(!mediator.is_dragging(), "session over");
    }

    #[test]
    fn stuck_tile_never_moves() {
        let mut mediator = engaged(None);
        assert_eq!(mediator.drag_to(Vec2::new(80., 10.)), None, "no axis");
        assert_eq!(
            mediator.release(),
            Some(DragRelease::Ignored {
                tile: TileId::new(0)
            }),
            "no side effects"
        );
    }

    #[test]
    fn one_session_at_a_time() {
        let mut mediator = engaged(Some(Direction::Down));
        assert!(
            !mediator.engage(TileId::new(1), None, Vec2::ZERO, Vec2::ZERO, false),
            "second tile refused"
        );
        assert_eq!(
            mediator.cancel(),
            Some((TileId::new(0), Vec2::ZERO)),
            "first session is the one cancelled"
        );
        assert!(
            !mediator.engage(TileId::new(1), None, Vec2::ZERO, Vec2::ZERO, true),
            "refused while scrambling"
        );
        assert!(!mediator.is_dragging(), "no state change");
    }
}
