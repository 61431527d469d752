use bevy::prelude::*;
use bevy::state::state::FreelyMutableState;

/// Entities spawned for one round, despawned together on restart.
#[derive(Component)]
pub struct CleanupMarker;

pub trait Restartable: Resource {
    fn reset(&mut self);
    fn restart_state() -> Self::State;
    type State: States + FreelyMutableState;
}

pub const RESTART_KEY: KeyCode = KeyCode::KeyR;

pub fn handle_restart<T: Restartable>(
    keys: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<T::State>>,
    mut restartable: ResMut<T>,
) {
    if keys.just_pressed(RESTART_KEY) {
        restartable.reset();
        next_state.set(T::restart_state());
    }
}

pub fn cleanup_marked_entities(mut commands: Commands, query: Query<Entity, With<CleanupMarker>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
