use bevy::prelude::*;

use crate::components::{
    CharacterMotion, FlightCharacter, FlightLocomotionState, LocomotionSnapshot, MontagePlayback,
};
use crate::resources::FlightSettings;
use crate::systems::CharacterContext;

/// Gives every flight character its controllers, snapshot and montage
/// playback, plus a movement body when it was spawned without one.
pub fn ensure_flight_state_system(
    mut commands: Commands,
    settings: Res<FlightSettings>,
    query: Query<(Entity, Has<CharacterMotion>), (With<FlightCharacter>, Without<FlightLocomotionState>)>,
) {
    for (entity, has_motion) in query.iter() {
        let mut entity_commands = commands.entity(entity);
        entity_commands.insert((
            FlightLocomotionState::new(&settings),
            LocomotionSnapshot::default(),
            MontagePlayback::default(),
        ));
        if !has_motion {
            entity_commands.insert(CharacterMotion::new(&settings.character));
        }
        debug!("Added flight locomotion to entity {:?}", entity);
    }
}

/// Runs the one-time controller initialization once the body exists.
pub fn flight_initialize_system(
    settings: Res<FlightSettings>,
    mut query: Query<(
        Entity,
        &mut FlightCharacter,
        &mut CharacterMotion,
        &mut Transform,
        &mut FlightLocomotionState,
    )>,
) {
    for (entity, mut character, mut motion, mut transform, mut locomotion) in query.iter_mut() {
        if locomotion.core.is_initialized() {
            continue;
        }

        let mut host = CharacterContext::new(
            entity,
            &mut character,
            &mut motion,
            &mut transform,
            Quat::IDENTITY,
            settings.character.walkable_floor_y,
        );
        locomotion.core.initialize(&mut host);
    }
}
