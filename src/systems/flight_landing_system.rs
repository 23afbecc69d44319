use bevy::{
    ecs::message::{MessageReader, MessageWriter},
    prelude::*,
};

use crate::components::{CharacterMotion, FlightCharacter, FlightLocomotionState};
use crate::events::{
    CharacterLanded, FlightEffect, FlightEffectEvent, FlightLandingNotify, FlightSignalEvent,
    MontageRequest,
};
use crate::resources::FlightSettings;
use crate::systems::CharacterContext;

/// Lets the flight core judge every touchdown, raising the hard landing
/// effect when the fall was too deep.
pub fn flight_landing_system(
    settings: Res<FlightSettings>,
    mut landed_reader: MessageReader<CharacterLanded>,
    mut query: Query<(
        &mut FlightCharacter,
        &mut CharacterMotion,
        &mut Transform,
        &mut FlightLocomotionState,
    )>,
    mut effect_writer: MessageWriter<FlightEffectEvent>,
    mut signal_writer: MessageWriter<FlightSignalEvent>,
    mut montage_writer: MessageWriter<MontageRequest>,
) {
    for landed in landed_reader.read() {
        let Ok((mut character, mut motion, mut transform, mut locomotion)) =
            query.get_mut(landed.entity)
        else {
            continue;
        };

        let mut host = CharacterContext::new(
            landed.entity,
            &mut character,
            &mut motion,
            &mut transform,
            Quat::IDENTITY,
            settings.character.walkable_floor_y,
        );
        let hard_landing = locomotion.core.handle_character_landing(&mut host, &landed.hit);
        host.flush(&mut signal_writer, &mut montage_writer);

        if hard_landing {
            effect_writer.write(FlightEffectEvent {
                entity: landed.entity,
                effect: FlightEffect::HardLanding {
                    location: landed.hit.location,
                },
            });
        }
    }
}

/// The hard landing animation hands input back to the player.
pub fn flight_landing_notify_system(
    mut notify_reader: MessageReader<FlightLandingNotify>,
    mut query: Query<&mut FlightCharacter>,
) {
    for notify in notify_reader.read() {
        if let Ok(mut character) = query.get_mut(notify.entity) {
            character.input_enabled = true;
            debug!("Input restored on {:?} after hard landing", notify.entity);
        }
    }
}
