use bevy::{
    ecs::message::{MessageReader, MessageWriter},
    prelude::*,
};

use crate::components::{Destructible, FlightCharacter, FlightLocomotionState};
use crate::events::{CharacterHit, FlightEffect, FlightEffectEvent};

/// A dash into a destructible body sends out a shockwave from the character.
pub fn flight_impact_system(
    mut hit_reader: MessageReader<CharacterHit>,
    mut query: Query<(&FlightCharacter, &Transform, &mut FlightLocomotionState)>,
    destructible_query: Query<(), With<Destructible>>,
    mut effect_writer: MessageWriter<FlightEffectEvent>,
) {
    for hit in hit_reader.read() {
        let Ok((character, transform, mut locomotion)) = query.get_mut(hit.entity) else {
            continue;
        };

        if let Some(shockwave) = locomotion.impact.on_character_hit(
            character.is_dashing,
            destructible_query.contains(hit.other),
            transform.translation,
        ) {
            debug!("{:?} shattered {:?}", hit.entity, hit.other);
            effect_writer.write(FlightEffectEvent {
                entity: hit.entity,
                effect: FlightEffect::Shockwave(shockwave),
            });
        }
    }
}
