use bevy::prelude::*;

use crate::components::MoveAxes;
use crate::locomotion::{FlightSignal, GroundHit, Shockwave};

/// Discrete player intent routed to a flight character
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightCommandKind {
    /// Jump, start flying or stop flying depending on the movement mode
    Fly,
    /// Toggle dashing
    Dash,
    TakeoffPress,
    TakeoffRelease,
    Walk,
    StopWalking,
    /// Replace the input axes for the coming frames
    Move(MoveAxes),
}

#[derive(Message, Clone, Debug)]
pub struct FlightCommand {
    /// The entity the command is for
    pub entity: Entity,
    pub kind: FlightCommandKind,
}

impl FlightCommand {
    pub fn new(entity: Entity, kind: FlightCommandKind) -> Self {
        Self { entity, kind }
    }
}

/// Callback from the flight controllers of `entity`
#[derive(Message, Clone, Debug)]
pub struct FlightSignalEvent {
    pub entity: Entity,
    pub signal: FlightSignal,
}

/// Visual and audio cue requested by the flight kit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightEffect {
    Hover,
    SonicBoom,
    DashTrail { enabled: bool },
    Dodge { right: bool },
    DiveTrail,
    DiveLand { location: Vec3 },
    HardLanding { location: Vec3 },
    TakeoffCharge { enabled: bool, activated: bool },
    Shockwave(Shockwave),
}

#[derive(Message, Clone, Debug)]
pub struct FlightEffectEvent {
    pub entity: Entity,
    pub effect: FlightEffect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MontageAction {
    Play {
        montage: String,
        section: Option<String>,
        rate: f32,
    },
    /// Stop `montage`, or everything when `None`
    Stop {
        montage: Option<String>,
        blend_out: Option<f32>,
    },
}

#[derive(Message, Clone, Debug)]
pub struct MontageRequest {
    pub entity: Entity,
    pub action: MontageAction,
}

/// The character touched the ground after falling
#[derive(Message, Clone, Debug)]
pub struct CharacterLanded {
    pub entity: Entity,
    pub hit: GroundHit,
}

/// The character's body collided with `other`.
///
/// The crate does not watch collisions itself. Send this from the app's own
/// contact handling, e.g. a reader of rapier `CollisionEvent`s.
#[derive(Message, Clone, Debug)]
pub struct CharacterHit {
    pub entity: Entity,
    pub other: Entity,
}

/// Sent when the hard landing animation reaches its recovery point
#[derive(Message, Clone, Debug)]
pub struct FlightLandingNotify {
    pub entity: Entity,
}
