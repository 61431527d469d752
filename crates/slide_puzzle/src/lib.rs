use std::time::Duration;

use bevy::prelude::*;
use bits_helpers::input::{
    just_pressed_world_position, just_released_world_position, pressed_world_position,
    touch_count,
};
use bits_helpers::restart::{cleanup_marked_entities, handle_restart, CleanupMarker, Restartable};

pub mod animation;
pub mod board;
pub mod config;
pub mod controller;
pub mod drag;
pub mod engine;
pub mod events;
pub mod grid;
pub mod scramble;
pub mod session;
pub mod tile;

#[cfg(test)]
mod testing;

use config::{GameType, LevelConfig, PuzzleConfig};
use controller::{BoardPhase, SlideTileController};
use events::PuzzleEvent;
use session::PuzzleSession;
use tile::TileId;

const FRAME_BORDER: f32 = 16.;
const PAUSE_KEY: KeyCode = KeyCode::KeyP;

#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameState {
    #[default]
    Init,
    Game,
    Result,
    Reset,
}

#[derive(Component)]
struct MainCamera;

#[derive(Component)]
struct TileSprite {
    id: TileId,
}

/// Full picture laid over image boards.
#[derive(Component)]
struct Overlay;

#[derive(Component)]
struct ResultTimer {
    timer: Timer,
}

impl Restartable for PuzzleSession {
    type State = GameState;

    fn reset(&mut self) {
        self.start();
    }

    fn restart_state() -> GameState {
        GameState::Reset
    }
}

pub fn run() {
    bits_helpers::get_default_app(env!("CARGO_PKG_NAME"))
        .init_state::<GameState>()
        .init_resource::<LevelConfig>()
        .init_resource::<PuzzleConfig>()
        .init_resource::<PuzzleSession>()
        .add_event::<PuzzleEvent>()
        .add_systems(OnEnter(GameState::Game), start_level)
        .add_systems(OnEnter(GameState::Result), result_init)
        .add_systems(
            OnEnter(GameState::Reset),
            (clear_board, cleanup_marked_entities, reset_done).chain(),
        )
        .add_systems(
            Update,
            (
                init_puzzle.run_if(in_state(GameState::Init)),
                (pointer_input, toggle_pause, handle_restart::<PuzzleSession>)
                    .run_if(in_state(GameState::Game)),
                (tick_board, sync_visuals)
                    .chain()
                    .run_if(in_state(GameState::Game).or(in_state(GameState::Result))),
                track_session
                    .after(tick_board)
                    .run_if(in_state(GameState::Game)),
                result_puzzle.run_if(in_state(GameState::Result)),
            ),
        )
        .run();
}

fn init_puzzle(
    mut commands: Commands,
    config: Res<PuzzleConfig>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    // Camera
    commands.spawn(Camera2d).insert(MainCamera);
    // Frame
    let extent = config.board_extent;
    commands
        .spawn((
            Sprite::from_color(Color::WHITE, Vec2::splat(extent + FRAME_BORDER)),
            Transform::from_xyz(0., 0., -10.),
        ))
        .with_children(|parent| {
            parent.spawn((
                Sprite::from_color(Color::BLACK, Vec2::splat(extent)),
                Transform::from_xyz(0., 0., 5.),
            ));
        });
    next_state.set(GameState::Game);
}

fn start_level(
    mut commands: Commands,
    level: Res<LevelConfig>,
    config: Res<PuzzleConfig>,
    mut session: ResMut<PuzzleSession>,
) {
    let mut controller = match SlideTileController::new(level.clone(), config.clone()) {
        Ok(controller) => controller,
        Err(error) => {
            error!("Level failed to load: {error}");
            return;
        }
    };

    spawn_tiles(&mut commands, &mut controller, &config);
    if level.game_type == GameType::Image {
        commands.spawn((
            Sprite::from_color(
                Color::WHITE.with_alpha(controller.overlay_alpha()),
                Vec2::splat(config.board_extent),
            ),
            Transform::from_xyz(0., 0., 20.),
            Overlay,
            CleanupMarker,
        ));
    }
    commands.spawn((controller, CleanupMarker));
    session.start();
}

fn spawn_tiles(
    commands: &mut Commands,
    controller: &mut SlideTileController,
    config: &PuzzleConfig,
) {
    let board = controller.board();
    let cell_size = board.layout().cell_size();
    let tile_size = Vec2::splat((cell_size - config.tile_gap).max(1.));
    let count = board.tiles().len() as f32;
    let game_type = controller.level().game_type;

    let spawned: Vec<(TileId, Entity)> = board
        .tiles()
        .iter()
        .filter(|tile| !tile.is_empty())
        .map(|tile| {
            let color = match game_type {
                GameType::Numbered => Color::WHITE,
                GameType::Image => Color::hsl(360. * tile.target_index() as f32 / count, 0.6, 0.6),
            };
            let position = tile.visual().anchored_position();
            let mut entity = commands.spawn((
                Sprite::from_color(color, tile_size),
                Transform::from_xyz(position.x, position.y, 0.),
                TileSprite { id: tile.id() },
            ));
            if game_type == GameType::Numbered {
                entity.with_child((
                    Text2d::new(tile.label().to_string()),
                    TextFont {
                        font_size: cell_size * 0.6,
                        ..default()
                    },
                    TextColor(Color::BLACK),
                    Transform::from_xyz(0., 0., 10.),
                ));
            }
            (tile.id(), entity.id())
        })
        .collect();

    for (id, entity) in spawned {
        if let Err(error) = controller.attach_visual(id, entity) {
            error!("{error}");
        }
    }
}

fn pointer_input(
    window: Query<&Window>,
    camera: Query<(&Camera, &GlobalTransform)>,
    mouse_button_input: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    mut controllers: Query<&mut SlideTileController>,
) {
    let Ok(mut controller) = controllers.get_single_mut() else {
        return;
    };

    if let Some(world_position) =
        just_pressed_world_position(&mouse_button_input, &touch_input, &window, &camera)
    {
        controller.pointer_pressed(world_position);
    }

    if controller.is_dragging() {
        if let Some(world_position) =
            pressed_world_position(&mouse_button_input, &touch_input, &window, &camera)
        {
            if let Err(error) =
                controller.pointer_moved(world_position, touch_count(&touch_input))
            {
                error!("{error}");
            }
        }
    }

    if just_released_world_position(&mouse_button_input, &touch_input, &window, &camera).is_some()
    {
        if let Err(error) = controller.pointer_released() {
            error!("{error}");
        }
    }
}

fn tick_board(
    time: Res<Time>,
    mut controllers: Query<&mut SlideTileController>,
    mut events: EventWriter<PuzzleEvent>,
) {
    let Ok(mut controller) = controllers.get_single_mut() else {
        return;
    };
    if let Err(error) = controller.update(time.delta_secs()) {
        error!("{error}");
    }
    events.send_batch(controller.drain_events());
}

fn sync_visuals(
    controllers: Query<&SlideTileController>,
    mut tiles: Query<(&TileSprite, &mut Transform)>,
    mut overlays: Query<&mut Sprite, With<Overlay>>,
) {
    let Ok(controller) = controllers.get_single() else {
        return;
    };
    for (sprite, mut transform) in &mut tiles {
        if let Some(tile) = controller.board().tile(sprite.id) {
            let position = tile.visual().anchored_position();
            transform.translation.x = position.x;
            transform.translation.y = position.y;
        }
    }
    for mut overlay in &mut overlays {
        overlay.color.set_alpha(controller.overlay_alpha());
    }
}

fn track_session(
    time: Res<Time>,
    mut session: ResMut<PuzzleSession>,
    mut events: EventReader<PuzzleEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    session.tick(time.delta());
    for event in events.read() {
        debug!("{event:?}");
        if let Some(result) = session.track(event) {
            info!("Score {:.3}", result.score);
            next_state.set(GameState::Result);
        }
    }
}

fn toggle_pause(
    keys: Res<ButtonInput<KeyCode>>,
    mut session: ResMut<PuzzleSession>,
    mut controllers: Query<&mut SlideTileController>,
) {
    if !keys.just_pressed(PAUSE_KEY) {
        return;
    }
    let Ok(mut controller) = controllers.get_single_mut() else {
        return;
    };
    if controller.phase() != BoardPhase::Playing {
        return;
    }
    if session.is_paused() {
        session.resume();
        controller.set_tiles_draggable(true);
        info!("Resumed");
    } else {
        session.pause();
        controller.set_tiles_draggable(false);
        info!("Paused");
    }
}

fn result_init(mut commands: Commands, config: Res<PuzzleConfig>) {
    commands.spawn((
        Text2d::new("Good job!"),
        TextFont {
            font_size: 48.,
            ..default()
        },
        TextColor(Color::WHITE),
        TextLayout::new_with_justify(JustifyText::Center),
        Transform::from_xyz(0., config.board_extent * 0.5 + 80., 30.),
        ResultTimer {
            timer: Timer::new(
                Duration::from_secs_f32(config.result_display),
                TimerMode::Once,
            ),
        },
        CleanupMarker,
    ));
}

fn result_puzzle(
    time: Res<Time>,
    mut timers: Query<&mut ResultTimer>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Ok(mut timer) = timers.get_single_mut() else {
        return;
    };
    timer.timer.tick(time.delta());
    if timer.timer.finished() {
        next_state.set(GameState::Reset);
    }
}

fn clear_board(mut commands: Commands, mut controllers: Query<&mut SlideTileController>) {
    for mut controller in &mut controllers {
        for entity in controller.clear() {
            commands.entity(entity).despawn_recursive();
        }
    }
}

fn reset_done(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::Game);
}
