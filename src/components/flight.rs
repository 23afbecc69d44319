use bevy::prelude::*;

use crate::locomotion::{
    AnimationLibrary, DiveBombPhase, FlightLocomotion, ImpactGate, LeanRates, LocomotionFlags,
    MovementMode, TakeoffController, TakeoffPhase, DEFAULT_SECTION,
};
use crate::resources::{CharacterSettings, FlightSettings};

/// Marker for the player controlled flight character
#[derive(Component, Default)]
pub struct PlayerCharacter;

/// Marker for the follow camera. Its rotation drives flight headings.
#[derive(Component, Default)]
pub struct FlightCamera;

/// Marker for bodies a dashing character shatters on contact
#[derive(Component, Default)]
pub struct Destructible;

const INPUT_DEAD_ZONE: f32 = 1.0e-4;

/// Input axes held by the player, each in [-1, 1]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MoveAxes {
    pub forward: f32,
    pub right: f32,
    pub up: f32,
}

impl MoveAxes {
    pub fn has_forward(&self) -> bool {
        self.forward.abs() > INPUT_DEAD_ZONE
    }

    pub fn has_planar(&self) -> bool {
        self.has_forward() || self.right.abs() > INPUT_DEAD_ZONE
    }
}

/// Character-side flight state: the flags the controllers query back
#[derive(Component, Debug, Clone)]
pub struct FlightCharacter {
    pub is_dashing: bool,
    /// Cleared by the controllers while a scripted sequence owns the body
    pub locomotion_enabled: bool,
    /// Top-level player input, cleared during hard landings
    pub input_enabled: bool,
    pub axes: MoveAxes,
    /// Walking top speed eases toward this value
    pub max_speed_target: f32,
    pub jump_velocity: f32,
}

impl FlightCharacter {
    pub fn new(settings: &CharacterSettings) -> Self {
        Self {
            is_dashing: false,
            locomotion_enabled: true,
            input_enabled: true,
            axes: MoveAxes::default(),
            max_speed_target: settings.run_speed,
            jump_velocity: settings.jump_velocity,
        }
    }

    /// Axes as seen by movement: zero while input or locomotion is off.
    pub fn effective_axes(&self) -> MoveAxes {
        if self.locomotion_enabled && self.input_enabled {
            self.axes
        } else {
            MoveAxes::default()
        }
    }
}

impl Default for FlightCharacter {
    fn default() -> Self {
        Self::new(&CharacterSettings::default())
    }
}

/// Flight controllers owned by a character
#[derive(Component, Debug, Clone)]
pub struct FlightLocomotionState {
    pub core: FlightLocomotion,
    pub takeoff: TakeoffController,
    pub impact: ImpactGate,
}

impl FlightLocomotionState {
    pub fn new(settings: &FlightSettings) -> Self {
        Self {
            core: FlightLocomotion::new(settings),
            takeoff: TakeoffController::new(
                settings.takeoff.clone(),
                settings.takeoff_timings(),
                settings.motion.takeoff_force,
            ),
            impact: ImpactGate::new(settings.impact.clone()),
        }
    }
}

/// Kinematic movement body integrated by the character motion system
#[derive(Component, Debug, Clone)]
pub struct CharacterMotion {
    pub mode: MovementMode,
    pub velocity: Vec3,
    /// World angular velocity in radians per second, measured last step
    pub angular_velocity: Vec3,
    pub max_walk_speed: f32,
    pub max_fly_speed: f32,
    pub max_acceleration: f32,
    pub braking_deceleration_flying: f32,
    /// Forces accumulated since the last step
    pub pending_force: Vec3,
    pub gravity: f32,
    pub mass: f32,
    pub air_control: f32,
    pub capsule_radius: f32,
    pub capsule_half_height: f32,
    pub previous_rotation: Option<Quat>,
}

impl CharacterMotion {
    pub fn new(settings: &CharacterSettings) -> Self {
        Self {
            mode: MovementMode::Walking,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            max_walk_speed: settings.run_speed,
            max_fly_speed: settings.run_speed,
            max_acceleration: settings.base_acceleration,
            braking_deceleration_flying: 0.0,
            pending_force: Vec3::ZERO,
            gravity: settings.gravity,
            mass: settings.mass,
            air_control: settings.air_control,
            capsule_radius: settings.capsule_radius,
            capsule_half_height: settings.capsule_half_height,
            previous_rotation: None,
        }
    }
}

impl Default for CharacterMotion {
    fn default() -> Self {
        Self::new(&CharacterSettings::default())
    }
}

/// Published every frame for animation blending
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct LocomotionSnapshot {
    pub flags: LocomotionFlags,
    pub lean_rates: LeanRates,
    pub divebomb: DiveBombPhase,
    pub takeoff: TakeoffPhase,
    pub speed: f32,
}

/// Montage the character is playing and the time left in its section
#[derive(Component, Debug, Default, Clone, PartialEq)]
pub struct MontagePlayback {
    pub montage: Option<String>,
    pub section: Option<String>,
    pub remaining: f32,
}

impl MontagePlayback {
    /// Starts `section` of `montage`, timed from the library's section
    /// lengths. Unknown montages play for no time at all.
    pub fn play(&mut self, library: &AnimationLibrary, montage: &str, section: Option<&str>, rate: f32) {
        let section_name = section.unwrap_or(DEFAULT_SECTION);
        let length = library
            .find(montage)
            .and_then(|spec| spec.section_length(section_name).ok())
            .unwrap_or(0.0);

        self.montage = Some(montage.to_string());
        self.section = Some(section_name.to_string());
        self.remaining = if rate > 0.0 { length / rate } else { length };
    }

    pub fn stop(&mut self, montage: Option<&str>) {
        if montage.is_none() || self.montage.as_deref() == montage {
            *self = MontagePlayback::default();
        }
    }

    /// Advances playback, returning the montage and section that just
    /// finished.
    pub fn tick(&mut self, delta_seconds: f32) -> Option<(String, String)> {
        self.montage.as_ref()?;

        self.remaining -= delta_seconds;
        if self.remaining > 0.0 {
            return None;
        }

        let finished = std::mem::take(self);
        finished.montage.zip(finished.section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_character_default() {
        let character = FlightCharacter::default();
        assert!(!character.is_dashing);
        assert!(character.locomotion_enabled);
        assert!(character.input_enabled);
        assert_eq!(character.max_speed_target, 600.0);
    }

    #[test]
    fn test_effective_axes_respect_locks() {
        let mut character = FlightCharacter::default();
        character.axes = MoveAxes {
            forward: 1.0,
            right: 0.0,
            up: 0.0,
        };
        assert!(character.effective_axes().has_forward());

        character.input_enabled = false;
        assert_eq!(character.effective_axes(), MoveAxes::default());
    }

    #[test]
    fn test_planar_input_ignores_up() {
        let axes = MoveAxes {
            forward: 0.0,
            right: 0.0,
            up: 1.0,
        };
        assert!(!axes.has_planar());
    }

    #[test]
    fn test_play_uses_section_length_and_rate() {
        let library = AnimationLibrary::default();
        let mut playback = MontagePlayback::default();

        playback.play(&library, "Divebomb", Some("Land"), 2.0);
        assert_eq!(playback.remaining, 1.2);
        assert_eq!(playback.section.as_deref(), Some("Land"));

        playback.play(&library, "HardLanding", None, 1.0);
        assert_eq!(playback.remaining, 1.8);
        assert_eq!(playback.section.as_deref(), Some(DEFAULT_SECTION));
    }

    #[test]
    fn test_tick_reports_the_finished_montage() {
        let library = AnimationLibrary::default();
        let mut playback = MontagePlayback::default();
        playback.play(&library, "HardLanding", None, 1.0);

        assert_eq!(playback.tick(1.0), None);
        assert_eq!(
            playback.tick(1.0),
            Some(("HardLanding".to_string(), DEFAULT_SECTION.to_string()))
        );
        assert_eq!(playback, MontagePlayback::default());
        assert_eq!(playback.tick(1.0), None);
    }

    #[test]
    fn test_stop_only_matching_montage() {
        let library = AnimationLibrary::default();
        let mut playback = MontagePlayback::default();
        playback.play(&library, "TakeOff", None, 1.0);

        playback.stop(Some("Divebomb"));
        assert_eq!(playback.montage.as_deref(), Some("TakeOff"));

        playback.stop(None);
        assert!(playback.montage.is_none());
    }
}
