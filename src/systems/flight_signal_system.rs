use bevy::{
    ecs::message::{MessageReader, MessageWriter},
    prelude::*,
};

use crate::components::{CharacterMotion, FlightCharacter, FlightLocomotionState};
use crate::events::{FlightEffect, FlightEffectEvent, FlightSignalEvent};
use crate::locomotion::FlightSignal;
use crate::resources::FlightSettings;
use crate::systems::CharacterContext;

/// Effect cue raised for a flight signal.
pub fn signal_effect(signal: FlightSignal) -> FlightEffect {
    match signal {
        FlightSignal::DivebombInitiated => FlightEffect::DiveTrail,
        FlightSignal::DivebombLanded { location } => FlightEffect::DiveLand { location },
        FlightSignal::TakeoffReleased { charged } => FlightEffect::TakeoffCharge {
            enabled: false,
            activated: charged,
        },
    }
}

/// Character reactions to the flight signals: effect cues, and flight after
/// a fully charged take-off.
pub fn flight_signal_system(
    settings: Res<FlightSettings>,
    mut signal_reader: MessageReader<FlightSignalEvent>,
    mut query: Query<(
        &mut FlightCharacter,
        &mut CharacterMotion,
        &mut Transform,
        &mut FlightLocomotionState,
    )>,
    mut effect_writer: MessageWriter<FlightEffectEvent>,
) {
    for event in signal_reader.read() {
        debug!("{:?} signalled {:?}", event.entity, event.signal);

        if event.signal == (FlightSignal::TakeoffReleased { charged: true }) {
            if let Ok((mut character, mut motion, mut transform, mut locomotion)) =
                query.get_mut(event.entity)
            {
                // Entering flight neither signals nor plays montages.
                let mut host = CharacterContext::new(
                    event.entity,
                    &mut character,
                    &mut motion,
                    &mut transform,
                    Quat::IDENTITY,
                    settings.character.walkable_floor_y,
                );
                locomotion.core.fly(&mut host);
            }
        }

        effect_writer.write(FlightEffectEvent {
            entity: event.entity,
            effect: signal_effect(event.signal),
        });
    }
}
