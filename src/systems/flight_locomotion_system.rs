use bevy::{ecs::message::MessageWriter, prelude::*};

use crate::components::{
    CharacterMotion, FlightCamera, FlightCharacter, FlightLocomotionState, LocomotionSnapshot,
};
use crate::events::{FlightSignalEvent, MontageRequest};
use crate::locomotion::CharacterBody;
use crate::resources::FlightSettings;
use crate::systems::{camera_rotation, CharacterContext, GroundQuery};

/// Per-frame tick of the flight core, the take-off sequence and the impact
/// gate, followed by the animation snapshot.
pub fn flight_locomotion_system(
    time: Res<Time>,
    settings: Res<FlightSettings>,
    ground: GroundQuery,
    camera_query: Query<&Transform, (With<FlightCamera>, Without<FlightCharacter>)>,
    mut query: Query<(
        Entity,
        &mut FlightCharacter,
        &mut CharacterMotion,
        &mut Transform,
        &mut FlightLocomotionState,
        &mut LocomotionSnapshot,
    )>,
    mut signal_writer: MessageWriter<FlightSignalEvent>,
    mut montage_writer: MessageWriter<MontageRequest>,
) {
    let delta = time.delta_secs();
    let camera_rotation = camera_rotation(&camera_query);

    for (entity, mut character, mut motion, mut transform, locomotion, mut snapshot) in
        query.iter_mut()
    {
        let locomotion = locomotion.into_inner();
        let probe = |origin: Vec3, max_distance: f32| ground.probe_down(entity, origin, max_distance);
        let mut host = CharacterContext::new(
            entity,
            &mut character,
            &mut motion,
            &mut transform,
            camera_rotation,
            settings.character.walkable_floor_y,
        )
        .with_ground(&probe);

        locomotion.core.tick(&mut host, delta);
        locomotion.takeoff.tick(&mut host, delta);
        locomotion.impact.tick(delta);

        *snapshot = LocomotionSnapshot {
            flags: locomotion.core.flags(&host, &locomotion.takeoff),
            lean_rates: locomotion.core.lean_rates(),
            divebomb: locomotion.core.divebomb_phase(),
            takeoff: locomotion.takeoff.phase(),
            speed: host.velocity().length(),
        };

        host.flush(&mut signal_writer, &mut montage_writer);
    }
}
