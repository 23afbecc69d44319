use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::locomotion::{
    AnimationLibrary, DivebombSettings, DivebombTimings, DodgeSettings, GroundHit,
    ImpactSettings, LocomotionSettings, MontageError, MotionProfile, TakeoffSettings,
    TakeoffTimings, DEFAULT_SECTION,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read flight settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse flight settings: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Montage(#[from] MontageError),
}

/// Movement body and input parameters of the player character.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CharacterSettings {
    pub gravity: f32,
    pub mass: f32,
    pub capsule_radius: f32,
    pub capsule_half_height: f32,
    /// Top speed on the ground
    pub run_speed: f32,
    /// Top speed on the ground while the walk modifier is held
    pub walk_speed: f32,
    /// Rate at which the ground top speed follows its target
    pub max_ground_speed_interp_speed: f32,
    pub base_acceleration: f32,
    pub ground_dash_speed: f32,
    pub ground_dash_acceleration: f32,
    pub jump_velocity: f32,
    /// Jump velocity while dashing on the ground
    pub dash_jump_velocity: f32,
    /// Share of the acceleration available while falling
    pub air_control: f32,
    /// Smallest up component of a surface normal that can be stood on
    pub walkable_floor_y: f32,
    /// Lateral axis magnitude that triggers a dodge
    pub dodge_input_threshold: f32,
}

impl Default for CharacterSettings {
    fn default() -> Self {
        Self {
            gravity: 980.0,
            mass: 100.0,
            capsule_radius: 40.0,
            capsule_half_height: 89.0,
            run_speed: 600.0,
            walk_speed: 150.0,
            max_ground_speed_interp_speed: 4.0,
            base_acceleration: 2048.0,
            ground_dash_speed: 3000.0,
            ground_dash_acceleration: 50000.0,
            jump_velocity: 600.0,
            dash_jump_velocity: 1200.0,
            air_control: 0.2,
            walkable_floor_y: 0.71,
            dodge_input_threshold: 0.8,
        }
    }
}

/// Resource holding every flight tuning value
#[derive(Resource, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct FlightSettings {
    pub motion: MotionProfile,
    pub locomotion: LocomotionSettings,
    pub dodge: DodgeSettings,
    pub divebomb: DivebombSettings,
    pub takeoff: TakeoffSettings,
    pub impact: ImpactSettings,
    pub character: CharacterSettings,
    pub animations: AnimationLibrary,
}

impl FlightSettings {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Every montage problem that would disable part of the flight kit.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Err(error) =
            DivebombTimings::resolve(self.animations.divebomb.as_ref(), &self.divebomb)
        {
            errors.push(error.into());
        }

        if let Err(error) = TakeoffTimings::resolve(self.animations.takeoff.as_ref(), &self.takeoff)
        {
            errors.push(error.into());
        }

        match self.animations.hard_landing.as_ref() {
            Some(montage) => {
                if let Err(error) = montage.section_length(DEFAULT_SECTION) {
                    errors.push(error.into());
                }
            }
            None => errors.push(MontageError::Missing("hard landing").into()),
        }

        errors
    }

    /// Whether finishing `section` of `montage` hands input back: the hard
    /// landing montage and the dive-bomb landing section do.
    pub fn has_landing_notify(&self, montage: &str, section: &str) -> bool {
        if self.animations.is_hard_landing(montage) {
            return true;
        }

        self.animations
            .divebomb
            .as_ref()
            .is_some_and(|divebomb| divebomb.name == montage && self.divebomb.land_section == section)
    }

    pub fn takeoff_timings(&self) -> Option<TakeoffTimings> {
        match TakeoffTimings::resolve(self.animations.takeoff.as_ref(), &self.takeoff) {
            Ok(timings) => Some(timings),
            Err(error) => {
                log::error!("takeoff disabled: {}", error);
                None
            }
        }
    }
}

pub fn load_flight_settings(path: &Path) -> Result<FlightSettings, ConfigError> {
    let toml_str = std::fs::read_to_string(path)?;
    let settings = FlightSettings::from_toml_str(&toml_str)?;
    log::info!("Read flight settings from {}", path.to_string_lossy());
    Ok(settings)
}

/// Flat floor used for ground probes when no physics context is available.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct GroundPlane {
    pub height: f32,
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self { height: 0.0 }
    }
}

impl GroundPlane {
    pub fn probe_down(&self, origin: Vec3, max_distance: f32) -> Option<GroundHit> {
        let distance = origin.y - self.height;
        if !(0.0..=max_distance).contains(&distance) {
            return None;
        }

        Some(GroundHit {
            location: Vec3::new(origin.x, self.height, origin.z),
            normal: Vec3::Y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(FlightSettings::default().validate().is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = FlightSettings::from_toml_str(
            r#"
            [motion]
            dodge_force = 1000.0

            [divebomb]
            rate_scale = 4.0

            [animations.divebomb]
            name = "Dive"
            sections = { Default = 2.0, Land = 4.0 }
            "#,
        )
        .unwrap();

        assert_eq!(settings.motion.dodge_force, 1000.0);
        assert_eq!(settings.motion.base.max_speed, 850.0);
        assert_eq!(settings.divebomb.engage_height_buffer, 2400.0);
        assert_eq!(settings.character.gravity, 980.0);

        let divebomb = settings.animations.divebomb.as_ref().unwrap();
        assert_eq!(divebomb.blend_out, 0.25);
        let timings = DivebombTimings::resolve(Some(divebomb), &settings.divebomb).unwrap();
        assert_eq!(timings.start, 0.5);
        assert_eq!(timings.land, 1.0);
    }

    #[test]
    fn test_missing_section_is_reported() {
        let settings = FlightSettings::from_toml_str(
            r#"
            [animations.takeoff]
            name = "TakeOff"
            sections = { Default = 0.8, TakeOff = 1.5 }
            "#,
        )
        .unwrap();

        let errors = settings.validate();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ConfigError::Montage(MontageError::MissingSection { section, .. }) if section == "ChargeLoop"
        ));
        assert!(settings.takeoff_timings().is_none());
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(matches!(
            FlightSettings::from_toml_str("[motion\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_landing_notifies() {
        let settings = FlightSettings::default();
        assert!(settings.has_landing_notify("HardLanding", DEFAULT_SECTION));
        assert!(settings.has_landing_notify("Divebomb", "Land"));
        assert!(!settings.has_landing_notify("Divebomb", DEFAULT_SECTION));
        assert!(!settings.has_landing_notify("TakeOff", "TakeOff"));
    }

    #[test]
    fn test_ground_plane_probe() {
        let plane = GroundPlane { height: 100.0 };
        let hit = plane.probe_down(Vec3::new(5.0, 300.0, -2.0), 200.0).unwrap();
        assert_eq!(hit.location, Vec3::new(5.0, 100.0, -2.0));
        assert_eq!(hit.normal, Vec3::Y);

        assert!(plane.probe_down(Vec3::new(0.0, 300.0, 0.0), 199.0).is_none());
        assert!(plane.probe_down(Vec3::new(0.0, 50.0, 0.0), 1000.0).is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(matches!(
            load_flight_settings(Path::new("does/not/exist.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
