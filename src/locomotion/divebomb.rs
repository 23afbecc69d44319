use bevy::math::Vec3;
use serde::Deserialize;

use super::host::{FlightHost, FlightSignal};
use super::montage::{MontageError, MontageSpec, DEFAULT_SECTION};
use super::timer::Countdown;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DivebombSettings {
    /// Fall distance past which a dive can start
    pub engage_height_buffer: f32,
    /// Multiplier on the buffer for the clearance probe
    pub engage_probe_ratio: f32,
    /// Multiplier on the capsule half height for the ground probe while diving
    pub land_probe_ratio: f32,
    /// Divisor applied to montage section lengths
    pub rate_scale: f32,
    pub start_section: String,
    pub land_section: String,
}

impl Default for DivebombSettings {
    fn default() -> Self {
        Self {
            engage_height_buffer: 2400.0,
            engage_probe_ratio: 1.5,
            land_probe_ratio: 20.0,
            rate_scale: 2.0,
            start_section: DEFAULT_SECTION.to_string(),
            land_section: "Land".to_string(),
        }
    }
}

/// Section lengths of the dive-bomb montage, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct DivebombTimings {
    pub montage: String,
    pub land_section: String,
    pub start: f32,
    pub land: f32,
}

impl DivebombTimings {
    pub fn resolve(
        montage: Option<&MontageSpec>,
        settings: &DivebombSettings,
    ) -> Result<Self, MontageError> {
        let montage = montage.ok_or(MontageError::Missing("divebomb"))?;

        Ok(Self {
            montage: montage.name.clone(),
            land_section: settings.land_section.clone(),
            start: montage.scaled_section_length(&settings.start_section, settings.rate_scale)?,
            land: montage.scaled_section_length(&settings.land_section, settings.rate_scale)?,
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DiveBombPhase {
    #[default]
    Idle,
    /// Start section playing, waiting for the dive to begin
    Engaging,
    Diving,
    /// Ground found, land section playing
    Landing,
}

impl DiveBombPhase {
    pub fn is_engaged(self) -> bool {
        self != DiveBombPhase::Idle
    }

    pub fn is_divebombing(self) -> bool {
        matches!(self, DiveBombPhase::Diving | DiveBombPhase::Landing)
    }
}

/// Timer expiries that the owner has to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivebombTransition {
    Initiated,
    Finished,
}

#[derive(Debug, Clone)]
pub struct DiveBombController {
    settings: DivebombSettings,
    timings: Option<DivebombTimings>,
    dive_velocity: f32,
    phase: DiveBombPhase,
    start_timer: Countdown,
    land_timer: Countdown,
}

impl DiveBombController {
    /// A controller without timings never engages.
    pub fn new(
        settings: DivebombSettings,
        timings: Option<DivebombTimings>,
        dive_velocity: f32,
    ) -> Self {
        Self {
            settings,
            timings,
            dive_velocity,
            phase: DiveBombPhase::Idle,
            start_timer: Countdown::default(),
            land_timer: Countdown::default(),
        }
    }

    pub fn phase(&self) -> DiveBombPhase {
        self.phase
    }

    pub fn tick_timers(
        &mut self,
        host: &mut impl FlightHost,
        delta_seconds: f32,
    ) -> Option<DivebombTransition> {
        if self.start_timer.tick(delta_seconds) {
            self.phase = DiveBombPhase::Diving;
            host.set_locomotion_enabled(false);
            host.signal(FlightSignal::DivebombInitiated);
            log::debug!("divebomb initiated");
            return Some(DivebombTransition::Initiated);
        }

        if self.land_timer.tick(delta_seconds) {
            self.phase = DiveBombPhase::Idle;
            host.set_velocity(Vec3::ZERO);
            host.set_locomotion_enabled(true);
            log::debug!("divebomb finished");
            return Some(DivebombTransition::Finished);
        }

        None
    }

    /// Starts the dive when the fall is deep enough and nothing is below.
    pub fn try_engage(&mut self, host: &mut impl FlightHost, fall_distance: f32) -> bool {
        let Some(timings) = self.timings.as_ref() else {
            return false;
        };
        if self.phase.is_engaged() || fall_distance <= self.settings.engage_height_buffer {
            return false;
        }

        let clearance = self.settings.engage_height_buffer * self.settings.engage_probe_ratio;
        let origin = host.location();
        if host.probe_down(origin, clearance).is_some() {
            return false;
        }

        host.play_montage(&timings.montage, None, 1.0);
        self.phase = DiveBombPhase::Engaging;
        self.start_timer.arm(timings.start);
        log::debug!("divebomb engaged after falling {:.0}", fall_distance);
        true
    }

    /// Holds the dive velocity and watches for the ground while diving.
    pub fn update_dive(&mut self, host: &mut impl FlightHost, capsule_half_height: f32) {
        if !self.phase.is_divebombing() {
            return;
        }

        host.set_velocity(Vec3::NEG_Y * self.dive_velocity);

        if self.phase != DiveBombPhase::Diving {
            return;
        }

        let reach = capsule_half_height * self.settings.land_probe_ratio;
        let origin = host.location();
        if let Some(hit) = host.probe_down(origin, reach) {
            self.land(host, hit.location);
        }
    }

    /// Starts the landing section at `location`. Only a diving controller
    /// lands, so a touchdown the dive probe stepped over still finishes the
    /// sequence.
    pub fn land(&mut self, host: &mut impl FlightHost, location: Vec3) -> bool {
        if self.phase != DiveBombPhase::Diving {
            return false;
        }
        let Some(timings) = self.timings.as_ref() else {
            return false;
        };

        host.play_montage(&timings.montage, Some(&timings.land_section), 1.0);
        host.set_input_enabled(false);
        host.signal(FlightSignal::DivebombLanded { location });
        self.phase = DiveBombPhase::Landing;
        self.land_timer.arm(timings.land);
        log::debug!("divebomb landing at {:?}", location);
        true
    }

    /// Drops the dive without playing the landing. Locomotion stays as it was.
    pub fn stop(&mut self, host: &mut impl FlightHost) {
        if let Some(timings) = self.timings.as_ref() {
            host.stop_montage(Some(&timings.montage), None);
        }
        self.phase = DiveBombPhase::Idle;
        self.start_timer.clear();
        self.land_timer.clear();
    }
}
