use bevy::math::Vec3;
use serde::Deserialize;

use super::rotation::interp_to;
use super::timer::Countdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DodgeSide {
    Left,
    Right,
}

impl DodgeSide {
    /// Side for a lateral input axis value, right being positive.
    pub fn from_axis(value: f32) -> Self {
        if value >= 0.0 {
            DodgeSide::Right
        } else {
            DodgeSide::Left
        }
    }

    /// Multiplier applied to the camera's right vector.
    pub fn sign(self) -> f32 {
        match self {
            DodgeSide::Left => -1.0,
            DodgeSide::Right => 1.0,
        }
    }
}

/// Dodge lifecycle. A side is only present while the lateral force applies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DodgeState {
    #[default]
    Armed,
    Active { side: Option<DodgeSide> },
    CooldownBuffer,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DodgeSettings {
    /// Seconds the dodge stays active
    pub duration: f32,
    /// Seconds after the dodge before another one is accepted
    pub rearm_buffer: f32,
    /// Decay rate of the lateral force
    pub interp_speed: f32,
}

impl Default for DodgeSettings {
    fn default() -> Self {
        Self {
            duration: 1.5,
            rearm_buffer: 0.1,
            interp_speed: 8.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DodgeController {
    settings: DodgeSettings,
    base_force: f32,
    current_force: f32,
    state: DodgeState,
    timer: Countdown,
}

impl DodgeController {
    pub fn new(settings: DodgeSettings, base_force: f32) -> Self {
        Self {
            settings,
            base_force,
            current_force: 0.0,
            state: DodgeState::Armed,
            timer: Countdown::default(),
        }
    }

    pub fn state(&self) -> DodgeState {
        self.state
    }

    /// True from a successful request until the re-arm buffer has elapsed.
    pub fn is_dodging(&self) -> bool {
        self.state != DodgeState::Armed
    }

    /// Side currently pushing the character, if any.
    pub fn side(&self) -> Option<DodgeSide> {
        match self.state {
            DodgeState::Active { side } => side,
            _ => None,
        }
    }

    pub fn current_force(&self) -> f32 {
        self.current_force
    }

    /// Starts a dodge toward `side`. Only accepted while dashing with the
    /// dodge armed.
    pub fn request(&mut self, side: DodgeSide, is_dashing: bool) -> bool {
        if !is_dashing || self.state != DodgeState::Armed {
            log::trace!("dodge {:?} rejected in {:?}", side, self.state);
            return false;
        }

        self.state = DodgeState::Active { side: Some(side) };
        self.current_force = self.base_force;
        self.timer.arm(self.settings.duration);
        true
    }

    /// Advances the dodge and re-arm countdowns.
    pub fn tick(&mut self, delta_seconds: f32) {
        if !self.timer.tick(delta_seconds) {
            return;
        }

        match self.state {
            DodgeState::Active { .. } => {
                self.state = DodgeState::CooldownBuffer;
                self.current_force = 0.0;
                self.timer.arm(self.settings.rearm_buffer);
            }
            DodgeState::CooldownBuffer => self.state = DodgeState::Armed,
            DodgeState::Armed => {}
        }
    }

    /// Stops the lateral push while leaving the countdowns running.
    pub fn cancel_lateral(&mut self) {
        if let DodgeState::Active { side } = &mut self.state {
            *side = None;
        }
    }

    /// Force to apply this tick along `camera_right`, then decays the
    /// magnitude for the next one.
    pub fn lateral_force(&mut self, camera_right: Vec3, delta_seconds: f32) -> Option<Vec3> {
        let side = self.side()?;
        let force = camera_right * side.sign() * self.current_force;
        self.current_force = interp_to(
            self.current_force,
            0.0,
            delta_seconds,
            self.settings.interp_speed,
        );
        Some(force)
    }
}
