use bevy::{
    ecs::message::{MessageReader, MessageWriter},
    prelude::*,
};

use crate::components::{
    CharacterMotion, FlightCamera, FlightCharacter, FlightLocomotionState, MoveAxes,
};
use crate::events::{
    FlightCommand, FlightCommandKind, FlightEffect, FlightEffectEvent, FlightSignalEvent,
    MontageRequest,
};
use crate::locomotion::{CharacterBody, DodgeSide, FlightLocomotionInterface, MovementMode};
use crate::resources::{CharacterSettings, FlightSettings};
use crate::systems::{camera_rotation, CharacterContext};

/// Routes player commands to the flight controllers of their entity.
pub fn flight_command_system(
    settings: Res<FlightSettings>,
    mut command_reader: MessageReader<FlightCommand>,
    camera_query: Query<&Transform, (With<FlightCamera>, Without<FlightCharacter>)>,
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
    let camera_rotation = camera_rotation(&camera_query);

    for command in command_reader.read() {
        let Ok((mut character, mut motion, mut transform, locomotion)) =
            query.get_mut(command.entity)
        else {
            continue;
        };
        let locomotion = locomotion.into_inner();

        if !character.input_enabled && !matches!(command.kind, FlightCommandKind::Move(_)) {
            trace!("{:?} ignored, input disabled", command.kind);
            continue;
        }

        let mut host = CharacterContext::new(
            command.entity,
            &mut character,
            &mut motion,
            &mut transform,
            camera_rotation,
            settings.character.walkable_floor_y,
        );
        let mut effects = Vec::new();

        match command.kind {
            FlightCommandKind::Fly => {
                fly_pressed(&mut host, locomotion, &settings.character, &mut effects)
            }
            FlightCommandKind::Dash => {
                dash_pressed(&mut host, locomotion, &settings.character, &mut effects)
            }
            FlightCommandKind::TakeoffPress => {
                if host.movement_mode() == MovementMode::Walking
                    && !host.character().axes.has_planar()
                    && locomotion.takeoff.engage(&mut host)
                {
                    effects.push(FlightEffect::TakeoffCharge {
                        enabled: true,
                        activated: false,
                    });
                }
            }
            FlightCommandKind::TakeoffRelease => {
                locomotion.takeoff.release(&mut host);
            }
            FlightCommandKind::Walk => {
                host.character().max_speed_target = settings.character.walk_speed;
            }
            FlightCommandKind::StopWalking => {
                host.character().max_speed_target = settings.character.run_speed;
            }
            FlightCommandKind::Move(axes) => {
                host.character().axes = axes;
                lateral_dodge(&mut host, locomotion, &settings.character, &mut effects);
            }
        }

        host.flush(&mut signal_writer, &mut montage_writer);
        for effect in effects {
            effect_writer.write(FlightEffectEvent {
                entity: command.entity,
                effect,
            });
        }
    }
}

/// Jump on the ground, start flying while falling, stop flying in the air.
fn fly_pressed(
    host: &mut CharacterContext,
    locomotion: &mut FlightLocomotionState,
    settings: &CharacterSettings,
    effects: &mut Vec<FlightEffect>,
) {
    if !host.character().locomotion_enabled {
        trace!("fly ignored, locomotion disabled");
        return;
    }

    match host.movement_mode() {
        MovementMode::Flying => {
            if host.is_dashing() {
                stop_dash(host, locomotion, settings, effects);
            }
            locomotion.core.stop_flying(host);
        }
        MovementMode::Falling => {
            locomotion.core.stop_divebomb(host);
            locomotion.core.fly(host);
            effects.push(FlightEffect::Hover);
            if host.is_dashing() {
                locomotion.core.dash(host);
            }
        }
        MovementMode::Walking => {
            let jump_velocity = if host.is_dashing() {
                settings.dash_jump_velocity
            } else {
                host.character().jump_velocity
            };
            host.launch_vertical(jump_velocity);
        }
    }
}

/// Toggles dashing. Starting needs forward input in flight, or any planar
/// input on the ground.
fn dash_pressed(
    host: &mut CharacterContext,
    locomotion: &mut FlightLocomotionState,
    settings: &CharacterSettings,
    effects: &mut Vec<FlightEffect>,
) {
    if !host.character().locomotion_enabled {
        trace!("dash ignored, locomotion disabled");
        return;
    }

    if host.is_dashing() {
        stop_dash(host, locomotion, settings, effects);
        return;
    }

    let axes = host.character().effective_axes();
    match host.movement_mode() {
        MovementMode::Flying if axes.forward > 0.0 => {
            host.character().is_dashing = true;
            locomotion.core.dash(host);
        }
        MovementMode::Walking if axes.has_planar() => {
            host.character().is_dashing = true;
            host.character().max_speed_target = settings.ground_dash_speed;
            host.set_max_acceleration(settings.ground_dash_acceleration);
        }
        mode => {
            trace!("dash rejected while {:?}", mode);
            return;
        }
    }

    effects.push(FlightEffect::SonicBoom);
    effects.push(FlightEffect::DashTrail { enabled: true });
}

/// Ends a dash in any movement mode.
pub(crate) fn stop_dash(
    host: &mut CharacterContext,
    locomotion: &mut FlightLocomotionState,
    settings: &CharacterSettings,
    effects: &mut Vec<FlightEffect>,
) {
    host.character().is_dashing = false;
    if host.movement_mode() == MovementMode::Flying {
        locomotion.core.stop_dashing(host);
    } else {
        host.set_max_acceleration(settings.base_acceleration);
    }
    host.character().max_speed_target = settings.run_speed;
    effects.push(FlightEffect::DashTrail { enabled: false });
}


/// A hard sideways push on the stick while dash-flying dodges that way.
fn lateral_dodge(
    host: &mut CharacterContext,
    locomotion: &mut FlightLocomotionState,
    settings: &CharacterSettings,
    effects: &mut Vec<FlightEffect>,
) {
    let axes: MoveAxes = host.character().effective_axes();
    if host.movement_mode() != MovementMode::Flying
        || !host.is_dashing()
        || axes.right.abs() < settings.dodge_input_threshold
        || locomotion.core.is_dodging()
    {
        return;
    }

    let side = DodgeSide::from_axis(axes.right);
    let dodged = match side {
        DodgeSide::Right => locomotion.core.right_dodge(host),
        DodgeSide::Left => locomotion.core.left_dodge(host),
    };
    if dodged {
        effects.push(FlightEffect::Dodge {
            right: side == DodgeSide::Right,
        });
    }
}
