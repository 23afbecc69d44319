//! Recording host for controller tests.

use bevy::math::{Quat, Vec3};

use super::host::{
    CharacterBody, FlightLocomotionInterface, FlightSignal, FlightSignalSink, GroundHit,
    GroundProbe, MontagePlayer, MovementMode,
};
use super::profile::SpeedProfile;

#[derive(Debug, Clone, PartialEq)]
pub enum MontageCall {
    Play(String, Option<String>),
    Stop(Option<String>, Option<f32>),
}

/// Body on an endless flat floor at `ground_height`, or in open air when
/// that is `None`.
#[derive(Debug, Clone)]
pub struct MockHost {
    pub camera_rotation: Quat,
    pub dashing: bool,
    pub locomotion_enabled: Option<bool>,
    pub input_enabled: Option<bool>,
    pub location: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mode: MovementMode,
    pub speed_limits: Option<SpeedProfile>,
    pub max_acceleration: Option<f32>,
    pub braking_deceleration_flying: Option<f32>,
    pub forces: Vec<Vec3>,
    pub launches: Vec<f32>,
    pub capsule_radius: f32,
    pub capsule_half_height: f32,
    pub walkable: bool,
    pub ground_height: Option<f32>,
    pub probes: Vec<f32>,
    pub montages: Vec<MontageCall>,
    pub signals: Vec<FlightSignal>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self {
            camera_rotation: Quat::IDENTITY,
            dashing: false,
            locomotion_enabled: None,
            input_enabled: None,
            location: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mode: MovementMode::Walking,
            speed_limits: None,
            max_acceleration: None,
            braking_deceleration_flying: None,
            forces: Vec::new(),
            launches: Vec::new(),
            capsule_radius: 40.0,
            capsule_half_height: 89.0,
            walkable: true,
            ground_height: None,
            probes: Vec::new(),
            montages: Vec::new(),
            signals: Vec::new(),
        }
    }
}

impl FlightLocomotionInterface for MockHost {
    fn camera_rotation(&self) -> Quat {
        self.camera_rotation
    }

    fn is_dashing(&self) -> bool {
        self.dashing
    }

    fn set_locomotion_enabled(&mut self, enabled: bool) {
        self.locomotion_enabled = Some(enabled);
    }
}

impl CharacterBody for MockHost {
    fn location(&self) -> Vec3 {
        self.location
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    fn movement_mode(&self) -> MovementMode {
        self.mode
    }

    fn set_movement_mode(&mut self, mode: MovementMode) {
        self.mode = mode;
    }

    fn set_speed_limits(&mut self, limits: SpeedProfile) {
        self.speed_limits = Some(limits);
        self.max_acceleration = Some(limits.max_acceleration);
    }

    fn set_max_acceleration(&mut self, max_acceleration: f32) {
        self.max_acceleration = Some(max_acceleration);
    }

    fn set_braking_deceleration_flying(&mut self, deceleration: f32) {
        self.braking_deceleration_flying = Some(deceleration);
    }

    fn add_force(&mut self, force: Vec3) {
        self.forces.push(force);
    }

    fn launch_vertical(&mut self, vertical_velocity: f32) {
        self.launches.push(vertical_velocity);
        self.velocity.y = vertical_velocity;
    }

    fn capsule_radius(&self) -> f32 {
        self.capsule_radius
    }

    fn capsule_half_height(&self) -> f32 {
        self.capsule_half_height
    }

    fn set_capsule_half_height(&mut self, half_height: f32) {
        self.capsule_half_height = half_height;
    }

    fn is_walkable(&self, _hit: &GroundHit) -> bool {
        self.walkable
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = Some(enabled);
    }
}

impl GroundProbe for MockHost {
    fn probe_down(&mut self, origin: Vec3, max_distance: f32) -> Option<GroundHit> {
        self.probes.push(max_distance);
        let ground = self.ground_height?;
        let distance = origin.y - ground;
        if (0.0..=max_distance).contains(&distance) {
            Some(GroundHit {
                location: Vec3::new(origin.x, ground, origin.z),
                normal: Vec3::Y,
            })
        } else {
            None
        }
    }
}

impl MontagePlayer for MockHost {
    fn play_montage(&mut self, montage: &str, section: Option<&str>, _rate: f32) {
        self.montages.push(MontageCall::Play(
            montage.to_string(),
            section.map(str::to_string),
        ));
    }

    fn stop_montage(&mut self, montage: Option<&str>, blend_out: Option<f32>) {
        self.montages
            .push(MontageCall::Stop(montage.map(str::to_string), blend_out));
    }
}

impl FlightSignalSink for MockHost {
    fn signal(&mut self, signal: FlightSignal) {
        self.signals.push(signal);
    }
}
