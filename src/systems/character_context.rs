use bevy::{ecs::message::MessageWriter, ecs::system::SystemParam, prelude::*};
use bevy_rapier3d::plugin::context::systemparams::ReadRapierContext;
use bevy_rapier3d::prelude::QueryFilter;

use crate::components::{CharacterMotion, FlightCamera, FlightCharacter};
use crate::events::{FlightSignalEvent, MontageAction, MontageRequest};
use crate::locomotion::{
    CharacterBody, FlightLocomotionInterface, FlightSignal, FlightSignalSink, GroundHit,
    GroundProbe, MontagePlayer, MovementMode, SpeedProfile,
};
use crate::resources::GroundPlane;

/// Downward ray casts against the rapier scene, or against the flat
/// [`GroundPlane`] when no rapier context exists.
#[derive(SystemParam)]
pub struct GroundQuery<'w, 's> {
    rapier_context: ReadRapierContext<'w, 's>,
    ground_plane: Option<Res<'w, GroundPlane>>,
}

impl GroundQuery<'_, '_> {
    pub fn probe_down(&self, exclude: Entity, origin: Vec3, max_distance: f32) -> Option<GroundHit> {
        if let Ok(rapier_context) = self.rapier_context.single() {
            return rapier_context
                .cast_ray_and_get_normal(
                    origin,
                    Vec3::NEG_Y,
                    max_distance,
                    true,
                    QueryFilter::new().exclude_collider(exclude),
                )
                .map(|(_, intersection)| GroundHit {
                    location: intersection.point,
                    normal: intersection.normal,
                });
        }

        self.ground_plane
            .as_deref()
            .and_then(|plane| plane.probe_down(origin, max_distance))
    }
}

/// Rotation of the follow camera, identity when there is none.
pub fn camera_rotation(
    camera_query: &Query<&Transform, (With<FlightCamera>, Without<FlightCharacter>)>,
) -> Quat {
    camera_query
        .single()
        .map(|transform| transform.rotation)
        .unwrap_or(Quat::IDENTITY)
}

/// Borrowed view of one flight character, handed to the flight controllers
/// as their host. Signals and montage requests are buffered until
/// [`CharacterContext::flush`].
pub struct CharacterContext<'a> {
    entity: Entity,
    character: &'a mut FlightCharacter,
    motion: &'a mut CharacterMotion,
    transform: &'a mut Transform,
    camera_rotation: Quat,
    walkable_floor_y: f32,
    ground: Option<&'a dyn Fn(Vec3, f32) -> Option<GroundHit>>,
    signals: Vec<FlightSignal>,
    montages: Vec<MontageAction>,
}

impl<'a> CharacterContext<'a> {
    pub fn new(
        entity: Entity,
        character: &'a mut FlightCharacter,
        motion: &'a mut CharacterMotion,
        transform: &'a mut Transform,
        camera_rotation: Quat,
        walkable_floor_y: f32,
    ) -> Self {
        Self {
            entity,
            character,
            motion,
            transform,
            camera_rotation,
            walkable_floor_y,
            ground: None,
            signals: Vec::new(),
            montages: Vec::new(),
        }
    }

    pub fn with_ground(mut self, ground: &'a dyn Fn(Vec3, f32) -> Option<GroundHit>) -> Self {
        self.ground = Some(ground);
        self
    }

    pub fn character(&mut self) -> &mut FlightCharacter {
        &mut *self.character
    }

    pub fn motion(&mut self) -> &mut CharacterMotion {
        &mut *self.motion
    }

    pub fn flush(
        self,
        signal_writer: &mut MessageWriter<FlightSignalEvent>,
        montage_writer: &mut MessageWriter<MontageRequest>,
    ) {
        for signal in self.signals {
            signal_writer.write(FlightSignalEvent {
                entity: self.entity,
                signal,
            });
        }
        for action in self.montages {
            montage_writer.write(MontageRequest {
                entity: self.entity,
                action,
            });
        }
    }
}

impl FlightLocomotionInterface for CharacterContext<'_> {
    fn camera_rotation(&self) -> Quat {
        self.camera_rotation
    }

    fn is_dashing(&self) -> bool {
        self.character.is_dashing
    }

    fn set_locomotion_enabled(&mut self, enabled: bool) {
        self.character.locomotion_enabled = enabled;
    }
}

impl CharacterBody for CharacterContext<'_> {
    fn location(&self) -> Vec3 {
        self.transform.translation
    }

    fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
    }

    fn velocity(&self) -> Vec3 {
        self.motion.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.motion.velocity = velocity;
    }

    fn angular_velocity(&self) -> Vec3 {
        self.motion.angular_velocity
    }

    fn movement_mode(&self) -> MovementMode {
        self.motion.mode
    }

    fn set_movement_mode(&mut self, mode: MovementMode) {
        if mode == MovementMode::Walking {
            self.motion.velocity.y = 0.0;
        }
        self.motion.mode = mode;
    }

    fn set_speed_limits(&mut self, limits: SpeedProfile) {
        self.motion.max_fly_speed = limits.max_speed;
        self.motion.max_acceleration = limits.max_acceleration;
    }

    fn set_max_acceleration(&mut self, max_acceleration: f32) {
        self.motion.max_acceleration = max_acceleration;
    }

    fn set_braking_deceleration_flying(&mut self, deceleration: f32) {
        self.motion.braking_deceleration_flying = deceleration;
    }

    fn add_force(&mut self, force: Vec3) {
        self.motion.pending_force += force;
    }

    fn launch_vertical(&mut self, vertical_velocity: f32) {
        self.motion.velocity.y = vertical_velocity;
        if self.motion.mode == MovementMode::Walking {
            self.motion.mode = MovementMode::Falling;
        }
    }

    fn capsule_radius(&self) -> f32 {
        self.motion.capsule_radius
    }

    fn capsule_half_height(&self) -> f32 {
        self.motion.capsule_half_height
    }

    fn set_capsule_half_height(&mut self, half_height: f32) {
        self.motion.capsule_half_height = half_height;
    }

    fn is_walkable(&self, hit: &GroundHit) -> bool {
        hit.normal.y >= self.walkable_floor_y
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.character.input_enabled = enabled;
    }
}

impl GroundProbe for CharacterContext<'_> {
    fn probe_down(&mut self, origin: Vec3, max_distance: f32) -> Option<GroundHit> {
        self.ground.and_then(|ground| ground(origin, max_distance))
    }
}

impl MontagePlayer for CharacterContext<'_> {
    fn play_montage(&mut self, montage: &str, section: Option<&str>, rate: f32) {
        self.montages.push(MontageAction::Play {
            montage: montage.to_string(),
            section: section.map(str::to_string),
            rate,
        });
    }

    fn stop_montage(&mut self, montage: Option<&str>, blend_out: Option<f32>) {
        self.montages.push(MontageAction::Stop {
            montage: montage.map(str::to_string),
            blend_out,
        });
    }
}

impl FlightSignalSink for CharacterContext<'_> {
    fn signal(&mut self, signal: FlightSignal) {
        self.signals.push(signal);
    }
}
