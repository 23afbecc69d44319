use serde::Deserialize;

/// Top speed and acceleration applied to the body together.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SpeedProfile {
    pub max_speed: f32,
    pub max_acceleration: f32,
}

impl SpeedProfile {
    pub const fn new(max_speed: f32, max_acceleration: f32) -> Self {
        Self {
            max_speed,
            max_acceleration,
        }
    }
}

/// Speed, acceleration and force constants for each flight mode.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MotionProfile {
    /// Regular flight
    pub base: SpeedProfile,
    /// Flight while dashing
    pub dash: SpeedProfile,
    pub braking_deceleration_flying: f32,
    /// Lateral force at the start of a dodge
    pub dodge_force: f32,
    /// Upward force at the start of a charged take-off release
    pub takeoff_force: f32,
    /// Downward speed held for the whole dive
    pub divebomb_velocity: f32,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self {
            base: SpeedProfile::new(850.0, 2500.0),
            dash: SpeedProfile::new(9000.0, 80000.0),
            braking_deceleration_flying: 2800.0,
            dodge_force: 32_000_000.0,
            takeoff_force: 3_500_000.0,
            divebomb_velocity: 65000.0,
        }
    }
}
