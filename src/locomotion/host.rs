//! Capabilities the flight controllers need from the character that owns them.
//!
//! The controllers never hold on to their collaborators. Every operation takes
//! the host as an argument, so the owner stays the only caller and the
//! controllers stay free of engine handles.

use bevy::math::{Quat, Vec3};

use super::profile::SpeedProfile;

/// Movement mode of the character body.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MovementMode {
    #[default]
    Walking,
    Falling,
    Flying,
}

impl MovementMode {
    pub fn is_grounded(self) -> bool {
        self == MovementMode::Walking
    }
}

/// Result of a successful ground probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    pub location: Vec3,
    pub normal: Vec3,
}

/// Callbacks the controllers send back to their owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightSignal {
    /// Dive-bomb start section finished, the character is now diving
    DivebombInitiated,
    /// Dive-bomb ground contact detected, landing section started
    DivebombLanded { location: Vec3 },
    /// Take-off released, either fully charged or cancelled early
    TakeoffReleased { charged: bool },
}

/// The narrow interface the owning character implements for the flight core.
pub trait FlightLocomotionInterface {
    /// World rotation of the follow camera.
    fn camera_rotation(&self) -> Quat;

    fn is_dashing(&self) -> bool;

    fn set_locomotion_enabled(&mut self, enabled: bool);
}

/// Queries and commands on the character's movement body.
pub trait CharacterBody {
    fn location(&self) -> Vec3;

    fn rotation(&self) -> Quat;

    fn set_rotation(&mut self, rotation: Quat);

    fn velocity(&self) -> Vec3;

    fn set_velocity(&mut self, velocity: Vec3);

    /// World angular velocity in radians per second.
    fn angular_velocity(&self) -> Vec3;

    fn movement_mode(&self) -> MovementMode;

    fn set_movement_mode(&mut self, mode: MovementMode);

    fn set_speed_limits(&mut self, limits: SpeedProfile);

    fn set_max_acceleration(&mut self, max_acceleration: f32);

    fn set_braking_deceleration_flying(&mut self, deceleration: f32);

    /// Continuous force, accumulated until the next movement update.
    fn add_force(&mut self, force: Vec3);

    /// Instantaneous launch that replaces only the vertical velocity.
    fn launch_vertical(&mut self, vertical_velocity: f32);

    fn capsule_radius(&self) -> f32;

    fn capsule_half_height(&self) -> f32;

    fn set_capsule_half_height(&mut self, half_height: f32);

    fn is_walkable(&self, hit: &GroundHit) -> bool;

    /// Enables or disables the player's top-level input.
    fn set_input_enabled(&mut self, enabled: bool);
}

/// Downward ray cast from the character, ignoring the character itself.
pub trait GroundProbe {
    fn probe_down(&mut self, origin: Vec3, max_distance: f32) -> Option<GroundHit>;
}

/// Plays and stops animation montages by name.
pub trait MontagePlayer {
    fn play_montage(&mut self, montage: &str, section: Option<&str>, rate: f32);

    /// Stops `montage`, or every montage when `None`.
    fn stop_montage(&mut self, montage: Option<&str>, blend_out: Option<f32>);
}

pub trait FlightSignalSink {
    fn signal(&mut self, signal: FlightSignal);
}

/// Everything the flight controllers call into.
pub trait FlightHost:
    FlightLocomotionInterface + CharacterBody + GroundProbe + MontagePlayer + FlightSignalSink
{
}

impl<T> FlightHost for T where
    T: FlightLocomotionInterface + CharacterBody + GroundProbe + MontagePlayer + FlightSignalSink
{
}
