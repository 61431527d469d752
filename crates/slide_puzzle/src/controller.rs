use bevy::log::{debug, info};
use bevy::prelude::*;
use strum::Display;

use crate::animation::{
    AnimationPurpose, AnimationTarget, AnimationValue, FinishedAnimation, Sequencer,
};
use crate::board::{Board, BoardError};
use crate::config::{GameType, LevelConfig, PuzzleConfig};
use crate::drag::{DragMediator, DragRelease};
use crate::engine::{CommittedMove, MoveEngine};
use crate::events::{MoveSource, PuzzleEvent};
use crate::scramble::{ScrambleEvent, ScramblePhase, Scrambler};
use crate::tile::TileId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BoardPhase {
    /// Image boards show the full picture and fade it out before scrambling.
    Revealing,
    Scrambling,
    Playing,
    Completed,
}

/// Owns one board and everything that moves it.
///
/// Driven by [`SlideTileController::update`] once per frame; pointer input goes
/// through `pointer_*` and notifications are collected with
/// [`SlideTileController::drain_events`].
#[derive(Component, Debug, Clone)]
pub struct SlideTileController {
    engine: MoveEngine,
    sequencer: Sequencer,
    scrambler: Scrambler,
    drag: DragMediator,
    config: PuzzleConfig,
    level: LevelConfig,
    phase: BoardPhase,
    events: Vec<PuzzleEvent>,
    first_move_sent: bool,
    overlay_alpha: f32,
}

impl SlideTileController {
    pub fn new(level: LevelConfig, config: PuzzleConfig) -> Result<Self, BoardError> {
        config.validate()?;
        let board = Board::new(&level, config.board_extent)?;
        let drag = DragMediator::new(
            board.layout().cell_size(),
            config.drag_epsilon,
            config.snap_threshold,
        );
        let scrambler = Scrambler::new(&config, level.seed);
        info!(
            "Starting {}x{} {} board with {} scramble moves",
            level.size, level.size, level.game_type, level.scramble_count
        );

        let mut controller = Self {
            engine: MoveEngine::new(board),
            sequencer: Sequencer::default(),
            scrambler,
            drag,
            config,
            level,
            phase: BoardPhase::Revealing,
            events: Vec::new(),
            first_move_sent: false,
            overlay_alpha: 0.,
        };
        match controller.level.game_type {
            GameType::Image => {
                controller.overlay_alpha = 1.;
                controller.sequencer.animate_fade(
                    AnimationTarget::Overlay,
                    1.,
                    0.,
                    controller.config.fade_duration,
                    AnimationPurpose::Reveal,
                );
            }
            GameType::Numbered => controller.scramble(controller.level.scramble_count)?,
        }
        Ok(controller)
    }

    pub const fn board(&self) -> &Board {
        self.engine.board()
    }

    pub const fn phase(&self) -> BoardPhase {
        self.phase
    }

    pub const fn scramble_phase(&self) -> ScramblePhase {
        self.scrambler.phase()
    }

    pub const fn level(&self) -> &LevelConfig {
        &self.level
    }

    pub const fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    /// Opacity of the full-picture overlay, 0 when hidden.
    pub const fn overlay_alpha(&self) -> f32 {
        self.overlay_alpha
    }

    pub const fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn is_animating(&self) -> bool {
        self.sequencer.is_busy()
    }

    pub fn attach_visual(&mut self, id: TileId, handle: Entity) -> Result<(), BoardError> {
        self.engine
            .board_mut()
            .tile_mut(id)
            .ok_or(BoardError::UnknownTile(id))?
            .visual_mut()
            .attach(handle);
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<PuzzleEvent> {
        core::mem::take(&mut self.events)
    }

    pub fn is_solved(&mut self) -> bool {
        self.engine.is_solved()
    }

    /// Locking the tiles also ends a live drag, returning the tile to its baseline.
    pub fn set_tiles_draggable(&mut self, can_drag: bool) {
        if !can_drag {
            self.cancel_drag();
        }
        self.engine.set_tiles_draggable(can_drag);
    }

    fn cancel_drag(&mut self) {
        if let Some((id, baseline)) = self.drag.cancel() {
            debug!("Drag on {id} cancelled");
            if let Some(tile) = self.engine.board_mut().tile_mut(id) {
                tile.visual_mut().set_anchored_position(baseline);
            }
        }
    }

    /// Advances animations and the scramble by `dt` seconds.
    pub fn update(&mut self, dt: f32) -> Result<(), BoardError> {
        let step = self.sequencer.tick(dt);
        for frame in step.frames {
            match (frame.target, frame.value) {
                (AnimationTarget::Tile(id), AnimationValue::Position(position)) => {
                    if let Some(tile) = self.engine.board_mut().tile_mut(id) {
                        tile.visual_mut().set_anchored_position(position);
                    }
                }
                (AnimationTarget::Overlay, AnimationValue::Alpha(alpha)) => {
                    self.overlay_alpha = alpha;
                }
                (target, value) => debug!("Ignoring {value:?} for {target:?}"),
            }
        }
        for finished in step.finished {
            self.on_animation_finished(finished)?;
        }

        if self.scrambler.is_busy() {
            self.advance_scramble(dt)?;
        }
        Ok(())
    }

    fn on_animation_finished(&mut self, finished: FinishedAnimation) -> Result<(), BoardError> {
        match (finished.target, finished.purpose) {
            (AnimationTarget::Tile(id), AnimationPurpose::Commit(source)) => {
                self.engine.finish_move(id);
                self.events.push(PuzzleEvent::TileMoved { tile: id, source });
                if source == MoveSource::Player && self.engine.is_solved() {
                    self.complete();
                }
            }
            (AnimationTarget::Tile(id), AnimationPurpose::SnapBack) => {
                if let Some(tile) = self.engine.board_mut().tile_mut(id) {
                    tile.visual_mut().interactivity_mut().set_raycast(true, false);
                }
            }
            (AnimationTarget::Overlay, AnimationPurpose::Reveal) => {
                self.scramble(self.level.scramble_count)?;
            }
            (target, purpose) => debug!("{purpose:?} finished on {target:?}"),
        }
        Ok(())
    }

    fn complete(&mut self) {
        info!("Puzzle solved");
        self.phase = BoardPhase::Completed;
        self.cancel_drag();
        self.engine.deactivate_all();
        self.events.push(PuzzleEvent::PuzzleSolved);
        if self.level.game_type == GameType::Image {
            self.sequencer.animate_fade(
                AnimationTarget::Overlay,
                self.overlay_alpha,
                1.,
                self.config.fade_duration,
                AnimationPurpose::Completion,
            );
        }
    }

    /// Shuffles the board with `count` paced moves. Cancels any live drag and
    /// locks input until the scramble has settled.
    pub fn scramble(&mut self, count: usize) -> Result<(), BoardError> {
        self.set_tiles_draggable(false);
        self.phase = BoardPhase::Scrambling;
        self.scrambler.start(count);
        self.advance_scramble(0.)
    }

    fn advance_scramble(&mut self, dt: f32) -> Result<(), BoardError> {
        let mut dt = dt;
        while let Some(event) = self
            .scrambler
            .tick(dt, !self.engine.has_moves_in_flight())
        {
            dt = 0.;
            match event {
                ScrambleEvent::StepDue => self.scramble_step()?,
                ScrambleEvent::Completed { moves } => {
                    info!("Scramble complete after {moves} moves");
                    self.events.push(PuzzleEvent::ScrambleComplete { moves });
                }
                ScrambleEvent::InputReleased => {
                    if self.phase == BoardPhase::Scrambling {
                        self.phase = BoardPhase::Playing;
                    }
                    self.engine.set_tiles_draggable(true);
                    self.engine.rebaseline();
                    info!("Input released");
                }
                ScrambleEvent::Finished => debug!("Scrambler idle"),
            }
        }
        Ok(())
    }

    fn scramble_step(&mut self) -> Result<(), BoardError> {
        let direction = self.scrambler.choose_direction(self.engine.board())?;
        let empty = self.engine.board().empty_tile()?;
        let (empty_id, neighbour) = (empty.id(), empty.coords() + direction.offset());
        let moving = self.engine.board().id_at(neighbour).ok_or_else(|| {
            BoardError::Inconsistent(format!("no tile at {neighbour} to scramble"))
        })?;
        let committed = self.engine.commit_move(moving, Some(empty_id))?.ok_or_else(|| {
            BoardError::Inconsistent(format!("scramble neighbour {moving} refused to move"))
        })?;
        self.start_slide(committed, AnimationPurpose::Commit(MoveSource::Scramble));
        self.scrambler.record_step(direction);
        Ok(())
    }

    fn start_slide(&mut self, committed: CommittedMove, purpose: AnimationPurpose) {
        self.sequencer.animate_slide(
            committed.descriptor.moving,
            committed.from,
            committed.to,
            self.config.move_duration,
            purpose,
        );
    }

    fn accepts_player_input(&self, id: TileId) -> bool {
        self.phase == BoardPhase::Playing
            && self
                .board()
                .tile(id)
                .is_some_and(|tile| tile.visual().interactivity().accepts_input())
    }

    /// Commits `id` as if it had been clicked. Returns whether a move started.
    pub fn tap(&mut self, id: TileId) -> Result<bool, BoardError> {
        if self.scrambler.is_busy() || self.drag.is_dragging() || !self.accepts_player_input(id) {
            debug!("Tap on {id} ignored");
            return Ok(false);
        }
        self.player_commit(id)
    }

    fn player_commit(&mut self, id: TileId) -> Result<bool, BoardError> {
        let Some(committed) = self.engine.commit_move(id, None)? else {
            return Ok(false);
        };
        if !self.first_move_sent {
            self.first_move_sent = true;
            self.events.push(PuzzleEvent::FirstMove);
        }
        self.start_slide(committed, AnimationPurpose::Commit(MoveSource::Player));
        Ok(true)
    }

    /// Engages the tile under `point`. Returns whether a drag session started.
    pub fn pointer_pressed(&mut self, point: Vec2) -> bool {
        let Some(id) = self.engine.tile_at_point(point) else {
            return false;
        };
        if !self.accepts_player_input(id) {
            return false;
        }
        let axis = if self.engine.can_move(id) {
            self.board()
                .tile(id)
                .and_then(|tile| self.engine.find_empty_direction(tile.coords()))
        } else {
            None
        };
        let Some(tile) = self.engine.board_mut().tile_mut(id) else {
            return false;
        };
        let visual = tile.visual_mut();
        let baseline = visual.anchored_position();
        if !self
            .drag
            .engage(id, axis, baseline, point, self.scrambler.is_busy())
        {
            return false;
        }
        visual.set_initial_position();
        true
    }

    /// Moves the engaged tile. A second finger down ends the gesture.
    pub fn pointer_moved(&mut self, point: Vec2, touches: usize) -> Result<(), BoardError> {
        if touches > 1 && self.drag.is_dragging() {
            return self.pointer_released();
        }
        if let Some((id, position)) = self.drag.drag_to(point) {
            if let Some(tile) = self.engine.board_mut().tile_mut(id) {
                tile.visual_mut().set_anchored_position(position);
            }
        }
        Ok(())
    }

    pub fn pointer_released(&mut self) -> Result<(), BoardError> {
        match self.drag.release() {
            None => {}
            Some(DragRelease::Ignored { tile }) => debug!("Tile {tile} has no empty neighbour"),
            Some(DragRelease::Tap { tile }) => self.commit_release(tile)?,
            Some(DragRelease::Commit { tile, direction }) => {
                debug!("Drag commits {tile} {direction}");
                self.commit_release(tile)?;
            }
            Some(DragRelease::SnapBack { tile, .. }) => self.snap_back(tile),
        }
        Ok(())
    }

    /// Commits a released tile, or sends it back to its baseline when the board
    /// no longer allows the move.
    fn commit_release(&mut self, id: TileId) -> Result<(), BoardError> {
        if self.accepts_player_input(id) && self.player_commit(id)? {
            return Ok(());
        }
        debug!("Release of {id} refused");
        self.snap_back(id);
        Ok(())
    }

    fn snap_back(&mut self, id: TileId) {
        let Some(tile) = self.engine.board_mut().tile_mut(id) else {
            return;
        };
        let visual = tile.visual_mut();
        let (from, to) = (visual.anchored_position(), visual.initial_position());
        if from.distance(to) <= f32::EPSILON {
            return;
        }
        visual.interactivity_mut().set_raycast(false, false);
        self.sequencer.animate_slide(
            id,
            from,
            to,
            self.config.move_duration,
            AnimationPurpose::SnapBack,
        );
    }

    /// Tears the board down: cancels animations, the scramble and any drag, and
    /// hands back the visual handles for despawning. Committed swaps stay as they are.
    pub fn clear(&mut self) -> Vec<Entity> {
        let cancelled = self.sequencer.cancel_all();
        self.scrambler.cancel();
        self.drag.cancel();
        self.engine.clear_in_flight();
        self.engine.deactivate_all();
        self.events.clear();
        info!("Board cleared, {cancelled} animations cancelled");
        self.board()
            .tiles()
            .iter()
            .filter_map(|tile| tile.visual().handle())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use bevy::utils::HashSet;

    use super::*;
    use crate::testing::assert_close;
    use crate::tile::Tile;

    const FRAME: f32 = 1. / 60.;

    fn controller(scramble_count: usize, game_type: GameType) -> SlideTileController {
        sized(3, scramble_count, game_type)
    }

    fn sized(size: i32, scramble_count: usize, game_type: GameType) -> SlideTileController {
        let level = LevelConfig {
            size,
            scramble_count,
            game_type,
            seed: Some(42),
            ..default()
        };
        let config = PuzzleConfig {
            board_extent: 300.,
            ..default()
        };
        SlideTileController::new(level, config).expect("valid level")
    }

    fn run(controller: &mut SlideTileController, seconds: f32) {
        let frames = (seconds / FRAME).ceil() as usize;
        for _ in 0..frames {
            controller.update(FRAME).expect("board stays consistent");
        }
    }

    /// Solved board with input released.
    fn playing() -> SlideTileController {
        let mut controller = controller(0, GameType::Numbered);
        run(&mut controller, 2.);
        assert_eq!(controller.phase(), BoardPhase::Playing, "scramble settled");
        assert!(!controller.scrambler.is_busy(), "scrambler idle");
        controller.drain_events();
        controller
    }

    fn id_at(controller: &SlideTileController, x: i32, y: i32) -> TileId {
        controller
            .board()
            .id_at(IVec2::new(x, y))
            .expect("coordinate inside the board")
    }

    fn position_of(controller: &SlideTileController, id: TileId) -> Option<Vec2> {
        controller
            .board()
            .tile(id)
            .map(|tile| tile.visual().anchored_position())
    }

    fn raycast(controller: &SlideTileController, id: TileId) -> bool {
        controller
            .board()
            .tile(id)
            .is_some_and(|tile| tile.visual().interactivity().raycast())
    }

    fn tile_moves(events: &[PuzzleEvent]) -> Vec<(TileId, MoveSource)> {
        events
            .iter()
            .filter_map(|event| match event {
                PuzzleEvent::TileMoved { tile, source } => Some((*tile, *source)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn zero_scramble_stays_solved_and_reports_no_moves() {
        let mut controller = controller(0, GameType::Numbered);
        assert!(controller.is_solved(), "pristine layout");
        assert_eq!(
            controller.drain_events(),
            vec![PuzzleEvent::ScrambleComplete { moves: 0 }],
            "completes right away with zero commits"
        );
    }

    #[test]
    fn tap_next_to_empty_moves_once() {
        let mut controller = playing();
        let moving = id_at(&controller, 1, 2);
        let empty = controller.board().empty_id();

        assert!(controller.tap(moving).expect("no fault"), "move started");
        assert_eq!(
            controller.board().tile(moving).map(Tile::coords),
            Some(IVec2::new(2, 2)),
            "swapped before animating"
        );
        assert_eq!(
            controller.board().tile(empty).map(Tile::coords),
            Some(IVec2::new(1, 2)),
            "empty took the old cell"
        );
        assert!(
            tile_moves(&controller.drain_events()).is_empty(),
            "notified only once the animation is over"
        );

        run(&mut controller, 0.5);
        assert_eq!(
            tile_moves(&controller.drain_events()),
            vec![(moving, MoveSource::Player)],
            "exactly one notification"
        );
        assert_eq!(
            position_of(&controller, moving),
            Some(Vec2::new(100., -100.)),
            "visual caught up with the grid"
        );
    }

    #[test]
    fn first_move_is_sent_once() {
        let mut controller = playing();
        let moving = id_at(&controller, 1, 2);
        controller.tap(moving).expect("no fault");
        run(&mut controller, 0.5);
        controller.tap(id_at(&controller, 1, 1)).expect("no fault");
        run(&mut controller, 0.5);
        let firsts = controller
            .drain_events()
            .into_iter()
            .filter(|event| *event == PuzzleEvent::FirstMove)
            .count();
        assert_eq!(firsts, 1, "once per level");
    }

    #[test]
    fn dragging_a_stuck_tile_does_nothing() {
        let mut controller = playing();
        let stuck = id_at(&controller, 0, 0);
        assert!(controller.pointer_pressed(Vec2::new(-100., 100.)), "engaged");
        controller
            .pointer_moved(Vec2::new(-40., 100.), 1)
            .expect("no fault");
        assert_eq!(
            position_of(&controller, stuck),
            Some(Vec2::new(-100., 100.)),
            "no visual offset"
        );
        controller.pointer_released().expect("no fault");
        run(&mut controller, 0.5);
        assert!(controller.is_solved(), "grid untouched");
        assert!(controller.drain_events().is_empty(), "no notifications");
    }

    #[test]
    fn short_drag_snaps_back_and_long_drag_commits() {
        let mut controller = playing();
        let moving = id_at(&controller, 1, 2);

        assert!(controller.pointer_pressed(Vec2::new(0., -100.)), "engaged");
        controller
            .pointer_moved(Vec2::new(40., -100.), 1)
            .expect("no fault");
        assert_eq!(
            position_of(&controller, moving),
            Some(Vec2::new(40., -100.)),
            "tile follows the pointer"
        );
        controller.pointer_released().expect("no fault");
        run(&mut controller, 0.5);
        assert_eq!(
            position_of(&controller, moving),
            Some(Vec2::new(0., -100.)),
            "back on its baseline"
        );
        assert!(controller.is_solved(), "snap-back changes nothing");
        assert!(controller.drain_events().is_empty(), "no move reported");

        assert!(controller.pointer_pressed(Vec2::new(0., -100.)), "engaged again");
        controller
            .pointer_moved(Vec2::new(60., -90.), 1)
            .expect("no fault");
        controller.pointer_released().expect("no fault");
        run(&mut controller, 0.5);
        assert_eq!(
            controller.board().tile(moving).map(Tile::coords),
            Some(IVec2::new(2, 2)),
            "committed"
        );
        assert_eq!(
            position_of(&controller, moving),
            Some(Vec2::new(100., -100.)),
            "landed on the next cell"
        );
        assert_eq!(
            tile_moves(&controller.drain_events()),
            vec![(moving, MoveSource::Player)],
            "one move"
        );
    }

    #[test]
    fn second_finger_releases_the_drag() {
        let mut controller = playing();
        assert!(controller.pointer_pressed(Vec2::new(0., -100.)), "engaged");
        controller
            .pointer_moved(Vec2::new(70., -100.), 2)
            .expect("no fault");
        assert!(!controller.is_dragging(), "gesture ended");
    }

    #[test]
    fn only_one_drag_at_a_time() {
        let mut controller = playing();
        assert!(controller.pointer_pressed(Vec2::new(0., -100.)), "first tile");
        assert!(
            !controller.pointer_pressed(Vec2::new(100., 0.)),
            "second tile refused"
        );
    }

    #[test]
    fn tap_is_refused_while_another_tile_is_dragged() {
        let mut controller = playing();
        let dragged = id_at(&controller, 1, 2);
        assert!(controller.pointer_pressed(Vec2::new(0., -100.)), "engaged");
        controller
            .pointer_moved(Vec2::new(70., -100.), 1)
            .expect("no fault");

        let other = id_at(&controller, 2, 1);
        assert!(!controller.tap(other).expect("no fault"), "tap refused");
        assert!(controller.board().is_solved(), "empty slot still free");

        controller.pointer_released().expect("no fault");
        run(&mut controller, 0.5);
        assert_eq!(
            controller.board().tile(dragged).map(Tile::coords),
            Some(IVec2::new(2, 2)),
            "the drag took the slot"
        );
        assert_eq!(
            position_of(&controller, dragged),
            Some(Vec2::new(100., -100.)),
            "drawn where the grid says"
        );
        assert_eq!(
            tile_moves(&controller.drain_events()),
            vec![(dragged, MoveSource::Player)],
            "only the drag moved"
        );
    }

    #[test]
    fn pausing_mid_drag_returns_the_tile() {
        let mut controller = playing();
        let dragged = id_at(&controller, 1, 2);
        assert!(controller.pointer_pressed(Vec2::new(0., -100.)), "engaged");
        controller
            .pointer_moved(Vec2::new(70., -100.), 1)
            .expect("no fault");

        controller.set_tiles_draggable(false);
        assert!(!controller.is_dragging(), "gesture ended");
        assert_eq!(
            position_of(&controller, dragged),
            Some(Vec2::new(0., -100.)),
            "back on its baseline"
        );

        controller.pointer_released().expect("no fault");
        run(&mut controller, 0.5);
        assert!(controller.board().is_solved(), "no move while paused");
        assert!(controller.drain_events().is_empty(), "nothing reported");

        controller.set_tiles_draggable(true);
        assert!(
            controller.pointer_pressed(Vec2::new(0., -100.)),
            "draggable again after resuming"
        );
    }

    #[test]
    fn refused_release_snaps_back() {
        let mut controller = playing();
        let dragged = id_at(&controller, 1, 2);
        assert!(controller.pointer_pressed(Vec2::new(0., -100.)), "engaged");
        controller
            .pointer_moved(Vec2::new(70., -100.), 1)
            .expect("no fault");
        // Lock the tiles behind the mediator's back.
        controller.engine.set_tiles_draggable(false);

        controller.pointer_released().expect("no fault");
        assert!(controller.board().is_solved(), "grid untouched");
        assert!(controller.is_animating(), "travelling back");

        run(&mut controller, 0.5);
        assert_eq!(
            position_of(&controller, dragged),
            Some(Vec2::new(0., -100.)),
            "visual matches its cell again"
        );
        assert!(controller.drain_events().is_empty(), "no move reported");
    }

    #[test]
    fn sliding_tiles_cannot_be_grabbed() {
        let mut controller = playing();
        let moving = id_at(&controller, 1, 2);
        assert!(controller.tap(moving).expect("no fault"), "move started");
        assert!(!raycast(&controller, moving), "hit testing off while sliding");
        assert!(
            !controller.pointer_pressed(Vec2::new(0., -100.)),
            "grab on a sliding tile refused"
        );

        run(&mut controller, 0.5);
        assert!(raycast(&controller, moving), "restored once settled");
        assert!(
            controller.pointer_pressed(Vec2::new(100., -100.)),
            "grab allowed again"
        );
    }

    #[test]
    fn snapping_tiles_cannot_be_grabbed() {
        let mut controller = playing();
        let dragged = id_at(&controller, 1, 2);
        assert!(controller.pointer_pressed(Vec2::new(0., -100.)), "engaged");
        controller
            .pointer_moved(Vec2::new(40., -100.), 1)
            .expect("no fault");
        controller.pointer_released().expect("no fault");
        controller.update(FRAME).expect("no fault");

        assert!(!raycast(&controller, dragged), "hit testing off while snapping");
        let midway = position_of(&controller, dragged).expect("tile exists");
        assert!(!controller.pointer_pressed(midway), "grab mid snap-back refused");

        run(&mut controller, 0.5);
        assert!(raycast(&controller, dragged), "restored once back");
        assert!(
            controller.pointer_pressed(Vec2::new(0., -100.)),
            "grab allowed again"
        );
    }

    #[test]
    fn drags_are_refused_while_scrambling() {
        let mut controller = controller(5, GameType::Numbered);
        assert_eq!(controller.phase(), BoardPhase::Scrambling, "scrambling");
        for tile in controller.board().tiles().to_vec() {
            let point = tile.visual().anchored_position();
            assert!(!controller.pointer_pressed(point), "{} refused", tile.id());
        }
        assert!(!controller.is_dragging(), "no session");
    }

    #[test]
    fn scramble_commits_exactly_k_moves_without_reversals() {
        for size in 3..=5 {
            let mut controller = sized(size, 30, GameType::Numbered);
            run(&mut controller, 8.);
            let events = controller.drain_events();
            let moves = tile_moves(&events);

            assert_eq!(moves.len(), 30, "{size}x{size}: one commit per step");
            assert!(
                moves.iter().all(|(_, source)| *source == MoveSource::Scramble),
                "{size}x{size}: no player moves"
            );
            assert!(
                moves
                    .windows(2)
                    .all(|pair| pair.first().map(|m| m.0) != pair.get(1).map(|m| m.0)),
                "{size}x{size}: the same tile never moves straight back"
            );
            assert!(
                events.contains(&PuzzleEvent::ScrambleComplete { moves: 30 }),
                "{size}x{size}: completion reports the count"
            );
            assert_eq!(
                controller.phase(),
                BoardPhase::Playing,
                "{size}x{size}: input released"
            );
            assert!(
                controller.board().verify().is_ok(),
                "{size}x{size}: still a permutation"
            );

            let cells: HashSet<IVec2> =
                controller.board().tiles().iter().map(Tile::coords).collect();
            assert_eq!(
                cells.len(),
                (size * size) as usize,
                "{size}x{size}: every cell occupied once"
            );
            for tile in controller.board().tiles() {
                assert_eq!(
                    tile.visual().anchored_position(),
                    controller.board().layout().anchored_position(tile.coords()),
                    "{size}x{size}: {} drawn where the grid says",
                    tile.id()
                );
            }
        }
    }

    #[test]
    fn rescramble_cancels_the_active_drag() {
        let mut controller = playing();
        let moving = id_at(&controller, 1, 2);
        assert!(controller.pointer_pressed(Vec2::new(0., -100.)), "engaged");
        controller
            .pointer_moved(Vec2::new(30., -100.), 1)
            .expect("no fault");
        controller.scramble(3).expect("no fault");
        assert!(!controller.is_dragging(), "drag cancelled");
        assert_eq!(
            position_of(&controller, moving),
            Some(Vec2::new(0., -100.)),
            "dragged tile jumped back to its baseline"
        );
        assert_eq!(controller.phase(), BoardPhase::Scrambling, "input locked");
    }

    #[test]
    fn solving_freezes_the_board() {
        let mut controller = playing();
        let moving = id_at(&controller, 1, 2);
        controller.tap(moving).expect("no fault");
        run(&mut controller, 0.5);
        controller.tap(moving).expect("no fault");
        run(&mut controller, 0.5);

        let events = controller.drain_events();
        assert_eq!(events.last(), Some(&PuzzleEvent::PuzzleSolved), "solved");
        assert_eq!(controller.phase(), BoardPhase::Completed, "completed");
        assert!(
            controller
                .board()
                .tiles()
                .iter()
                .all(|tile| tile.visual().interactivity().is_turned_off_forever()),
            "latched off"
        );
        assert!(!controller.tap(moving).expect("no fault"), "no more moves");
    }

    #[test]
    fn image_board_reveals_then_scrambles() {
        let mut controller = controller(0, GameType::Image);
        assert_eq!(controller.phase(), BoardPhase::Revealing, "picture first");
        assert_close(controller.overlay_alpha(), 1., "fully visible");

        run(&mut controller, 1.3);
        assert_close(controller.overlay_alpha(), 0., "faded out");
        assert_eq!(
            controller.drain_events(),
            vec![PuzzleEvent::ScrambleComplete { moves: 0 }],
            "scramble follows the reveal"
        );
    }

    #[test]
    fn clear_cancels_everything_in_flight() {
        let mut controller = controller(10, GameType::Numbered);
        let ids: Vec<TileId> = controller.board().tiles().iter().map(Tile::id).collect();
        for (index, id) in ids.iter().enumerate() {
            controller
                .attach_visual(*id, Entity::from_raw(index as u32))
                .expect("known tile");
        }
        run(&mut controller, 0.05);
        assert!(controller.is_animating(), "mid move");

        let handles = controller.clear();
        assert_eq!(handles.len(), 9, "every visual handed back");
        assert!(!controller.is_animating(), "animations dropped");
        assert_eq!(controller.scramble_phase(), ScramblePhase::Idle, "scramble dropped");

        run(&mut controller, 2.);
        assert!(controller.drain_events().is_empty(), "no late notifications");
        assert!(controller.board().verify().is_ok(), "committed swaps kept");
    }
}
