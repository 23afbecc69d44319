use bevy::math::Vec3;
use serde::Deserialize;

use super::timer::Countdown;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ImpactSettings {
    pub radius: f32,
    pub falloff_magnitude: f32,
    pub vector_magnitude: f32,
    /// Seconds before another shockwave can be produced
    pub hit_buffer: f32,
}

impl Default for ImpactSettings {
    fn default() -> Self {
        Self {
            radius: 1800.0,
            falloff_magnitude: 500_000.0,
            vector_magnitude: 1000.0,
            hit_buffer: 0.8,
        }
    }
}

/// Radial strain and push applied to destructibles around `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shockwave {
    pub center: Vec3,
    pub radius: f32,
    pub falloff_magnitude: f32,
    pub vector_magnitude: f32,
}

/// Turns a dashing collision with a destructible into at most one shockwave
/// per hit buffer.
#[derive(Debug, Clone)]
pub struct ImpactGate {
    settings: ImpactSettings,
    armed: bool,
    buffer: Countdown,
}

impl Default for ImpactGate {
    fn default() -> Self {
        Self::new(ImpactSettings::default())
    }
}

impl ImpactGate {
    pub fn new(settings: ImpactSettings) -> Self {
        Self {
            settings,
            armed: true,
            buffer: Countdown::default(),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn on_character_hit(
        &mut self,
        is_dashing: bool,
        destructible: bool,
        center: Vec3,
    ) -> Option<Shockwave> {
        if !(self.armed && is_dashing && destructible) {
            return None;
        }

        self.armed = false;
        self.buffer.arm(self.settings.hit_buffer);

        Some(Shockwave {
            center,
            radius: self.settings.radius,
            falloff_magnitude: self.settings.falloff_magnitude,
            vector_magnitude: self.settings.vector_magnitude,
        })
    }

    pub fn tick(&mut self, delta_seconds: f32) {
        if self.buffer.tick(delta_seconds) {
            self.armed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_dashing_into_destructibles_explodes() {
        let mut gate = ImpactGate::default();
        assert!(gate.on_character_hit(false, true, Vec3::ZERO).is_none());
        assert!(gate.on_character_hit(true, false, Vec3::ZERO).is_none());
        assert!(gate.is_armed());

        let shockwave = gate.on_character_hit(true, true, Vec3::Y).unwrap();
        assert_eq!(shockwave.center, Vec3::Y);
        assert_eq!(shockwave.radius, 1800.0);
    }

    #[test]
    fn test_hit_buffer_blocks_repeats() {
        let mut gate = ImpactGate::default();
        assert!(gate.on_character_hit(true, true, Vec3::ZERO).is_some());
        assert!(gate.on_character_hit(true, true, Vec3::ZERO).is_none());

        gate.tick(0.5);
        assert!(!gate.is_armed());
        gate.tick(0.3);
        assert!(gate.is_armed());
        assert!(gate.on_character_hit(true, true, Vec3::ZERO).is_some());
    }
}
