use std::f32::consts::{PI, TAU};

use bevy::{ecs::message::MessageWriter, prelude::*};

use crate::components::{
    CharacterMotion, FlightCamera, FlightCharacter, FlightLocomotionState, MoveAxes,
};
use crate::events::CharacterLanded;
use crate::locomotion::{interp_to, without_pitch, MovementMode};
use crate::resources::FlightSettings;
use crate::systems::{camera_rotation, GroundQuery};

/// Kinematic movement for flight characters.
///
/// Integrates input acceleration, pending forces and gravity, then resolves
/// ground contact:
/// - falling onto a walkable floor switches to walking and sends
///   [`CharacterLanded`]
/// - walking off a ledge switches to falling from the last height
/// - the apex of a jump becomes the new fall reference
/// - flight never sinks below the ground
pub fn character_motion_system(
    time: Res<Time>,
    settings: Res<FlightSettings>,
    ground: GroundQuery,
    camera_query: Query<&Transform, (With<FlightCamera>, Without<FlightCharacter>)>,
    mut query: Query<(
        Entity,
        &FlightCharacter,
        &mut CharacterMotion,
        &mut Transform,
        &mut FlightLocomotionState,
    )>,
    mut landed_writer: MessageWriter<CharacterLanded>,
) {
    let delta = time.delta_secs();
    if delta <= 0.0 {
        return;
    }
    let camera_rotation = camera_rotation(&camera_query);

    for (entity, character, mut motion, mut transform, mut locomotion) in query.iter_mut() {
        motion.max_walk_speed = interp_to(
            motion.max_walk_speed,
            character.max_speed_target,
            delta,
            settings.character.max_ground_speed_interp_speed,
        );

        let previous_velocity = motion.velocity;
        let velocity = integrate_velocity(&motion, character.effective_axes(), camera_rotation, delta);
        motion.velocity = velocity;
        motion.pending_force = Vec3::ZERO;

        let previous_location = transform.translation;
        transform.translation += velocity * delta;
        let drop = (previous_location.y - transform.translation.y).max(0.0);
        let half_height = motion.capsule_half_height;

        match motion.mode {
            MovementMode::Falling => {
                if previous_velocity.y > 0.0 && velocity.y <= 0.0 {
                    locomotion.core.set_landing_reference(transform.translation.y);
                }

                if velocity.y <= 0.0 {
                    if let Some(hit) = ground.probe_down(entity, previous_location, half_height + drop) {
                        transform.translation.y = hit.location.y + half_height;
                        motion.velocity.y = 0.0;
                        motion.mode = MovementMode::Walking;
                        landed_writer.write(CharacterLanded { entity, hit });
                    }
                }
            }
            MovementMode::Walking => {
                let reach = half_height + motion.capsule_radius;
                match ground.probe_down(entity, transform.translation, reach) {
                    Some(hit) => transform.translation.y = hit.location.y + half_height,
                    None => {
                        motion.mode = MovementMode::Falling;
                        locomotion.core.set_landing_reference(previous_location.y);
                        debug!("{:?} walked off a ledge at {:.0}", entity, previous_location.y);
                    }
                }
            }
            MovementMode::Flying => {
                if let Some(hit) = ground.probe_down(entity, previous_location, half_height + drop) {
                    let floor = hit.location.y + half_height;
                    if transform.translation.y < floor {
                        transform.translation.y = floor;
                        motion.velocity.y = motion.velocity.y.max(0.0);
                    }
                }
            }
        }

        let rotation = transform.rotation;
        motion.angular_velocity = match motion.previous_rotation {
            Some(previous) => angular_velocity(previous, rotation, delta),
            None => Vec3::ZERO,
        };
        motion.previous_rotation = Some(rotation);
    }
}

/// Velocity after one step of input acceleration, braking, pending forces
/// and gravity.
pub fn integrate_velocity(motion: &CharacterMotion, axes: MoveAxes, camera_rotation: Quat, delta: f32) -> Vec3 {
    let velocity = motion.velocity + motion.pending_force / motion.mass * delta;
    let planar_input = (without_pitch(camera_rotation) * Vec3::new(axes.right, 0.0, -axes.forward))
        .clamp_length_max(1.0);

    match motion.mode {
        MovementMode::Flying => {
            let input = (camera_rotation * Vec3::new(axes.right, 0.0, -axes.forward) + Vec3::Y * axes.up)
                .clamp_length_max(1.0);
            accelerate(
                velocity,
                input,
                motion.max_acceleration,
                motion.braking_deceleration_flying,
                delta,
            )
            .clamp_length_max(motion.max_fly_speed)
        }
        MovementMode::Walking => {
            let planar = Vec3::new(velocity.x, 0.0, velocity.z);
            accelerate(
                planar,
                planar_input,
                motion.max_acceleration,
                motion.max_acceleration,
                delta,
            )
            .clamp_length_max(motion.max_walk_speed)
        }
        MovementMode::Falling => {
            let planar = Vec3::new(velocity.x, 0.0, velocity.z);
            let limit = planar.length().max(motion.max_walk_speed);
            let planar = (planar + planar_input * motion.max_acceleration * motion.air_control * delta)
                .clamp_length_max(limit);
            Vec3::new(planar.x, velocity.y - motion.gravity * delta, planar.z)
        }
    }
}

/// Accelerates along `input`, or brakes toward rest without input.
fn accelerate(velocity: Vec3, input: Vec3, acceleration: f32, braking: f32, delta: f32) -> Vec3 {
    if input.length_squared() > 0.0 {
        return velocity + input * acceleration * delta;
    }

    let speed = (velocity.length() - braking * delta).max(0.0);
    velocity.normalize_or_zero() * speed
}

/// World angular velocity that turns `previous` into `current` over `delta`.
pub fn angular_velocity(previous: Quat, current: Quat, delta: f32) -> Vec3 {
    let (axis, angle) = (current * previous.inverse()).normalize().to_axis_angle();
    let angle = if angle > PI { angle - TAU } else { angle };
    axis * angle / delta
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.125;

    #[test]
    fn test_falling_accumulates_gravity() {
        let mut motion = CharacterMotion::default();
        motion.mode = MovementMode::Falling;
        let velocity = integrate_velocity(&motion, MoveAxes::default(), Quat::IDENTITY, DT);
        assert_eq!(velocity, Vec3::new(0.0, -122.5, 0.0));
    }

    #[test]
    fn test_walking_is_capped_and_planar() {
        let mut motion = CharacterMotion::default();
        motion.velocity = Vec3::new(0.0, 50.0, -590.0);
        let axes = MoveAxes {
            forward: 1.0,
            right: 0.0,
            up: 0.0,
        };
        let velocity = integrate_velocity(&motion, axes, Quat::IDENTITY, DT);
        assert_eq!(velocity.y, 0.0);
        assert!((velocity.length() - 600.0).abs() < 1.0e-3);
        assert!(velocity.z < 0.0);
    }

    #[test]
    fn test_flight_brakes_without_input() {
        let mut motion = CharacterMotion::default();
        motion.mode = MovementMode::Flying;
        motion.max_fly_speed = 850.0;
        motion.braking_deceleration_flying = 2800.0;
        motion.velocity = Vec3::new(500.0, 0.0, 0.0);

        let velocity = integrate_velocity(&motion, MoveAxes::default(), Quat::IDENTITY, DT);
        assert_eq!(velocity, Vec3::new(150.0, 0.0, 0.0));

        motion.velocity = velocity;
        let velocity = integrate_velocity(&motion, MoveAxes::default(), Quat::IDENTITY, DT);
        assert_eq!(velocity, Vec3::ZERO);
    }

    #[test]
    fn test_pending_force_is_divided_by_mass() {
        let mut motion = CharacterMotion::default();
        motion.mode = MovementMode::Flying;
        motion.max_fly_speed = 10_000.0;
        motion.braking_deceleration_flying = 0.0;
        motion.pending_force = Vec3::new(0.0, 8000.0, 0.0);

        let velocity = integrate_velocity(&motion, MoveAxes::default(), Quat::IDENTITY, DT);
        assert_eq!(velocity, Vec3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn test_angular_velocity_about_up() {
        let previous = Quat::IDENTITY;
        let current = Quat::from_rotation_y(0.5);
        let omega = angular_velocity(previous, current, 0.25);
        assert!(omega.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1.0e-4));

        let omega = angular_velocity(current, previous, 0.25);
        assert!(omega.abs_diff_eq(Vec3::new(0.0, -2.0, 0.0), 1.0e-4));
    }
}
