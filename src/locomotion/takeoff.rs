use bevy::math::Vec3;
use serde::Deserialize;

use super::host::{FlightHost, FlightSignal};
use super::montage::{MontageError, MontageSpec, DEFAULT_SECTION};
use super::timer::Countdown;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TakeoffSettings {
    /// Play rate of the loop and release sections
    pub rate_scale: f32,
    pub engage_section: String,
    pub loop_section: String,
    pub release_section: String,
}

impl Default for TakeoffSettings {
    fn default() -> Self {
        Self {
            rate_scale: 1.0,
            engage_section: DEFAULT_SECTION.to_string(),
            loop_section: "ChargeLoop".to_string(),
            release_section: "TakeOff".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TakeoffTimings {
    pub montage: String,
    pub loop_section: String,
    pub release_section: String,
    pub engage: f32,
    pub charge_loop: f32,
    pub release: f32,
}

impl TakeoffTimings {
    pub fn resolve(
        montage: Option<&MontageSpec>,
        settings: &TakeoffSettings,
    ) -> Result<Self, MontageError> {
        let montage = montage.ok_or(MontageError::Missing("takeoff"))?;
        if settings.rate_scale <= 0.0 {
            return Err(MontageError::InvalidRateScale {
                montage: montage.name.clone(),
                rate_scale: settings.rate_scale,
            });
        }

        Ok(Self {
            montage: montage.name.clone(),
            loop_section: settings.loop_section.clone(),
            release_section: settings.release_section.clone(),
            engage: montage.section_length(&settings.engage_section)?,
            charge_loop: montage.section_length(&settings.loop_section)?,
            release: montage.section_length(&settings.release_section)?,
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TakeoffPhase {
    #[default]
    Idle,
    Engaging,
    Looping,
    Charged,
    Releasing { charged: bool },
}

impl TakeoffPhase {
    /// Engaged and not yet released.
    pub fn is_charging(self) -> bool {
        matches!(
            self,
            TakeoffPhase::Engaging | TakeoffPhase::Looping | TakeoffPhase::Charged
        )
    }

    /// Released with a full charge, pushing the character up.
    pub fn is_taking_off(self) -> bool {
        self == TakeoffPhase::Releasing { charged: true }
    }
}

/// Hold-to-charge, release-to-launch sequence.
#[derive(Debug, Clone)]
pub struct TakeoffController {
    settings: TakeoffSettings,
    timings: Option<TakeoffTimings>,
    base_force: f32,
    current_force: f32,
    release_elapsed: f32,
    phase: TakeoffPhase,
    loop_timer: Countdown,
    end_timer: Countdown,
}

impl TakeoffController {
    pub fn new(settings: TakeoffSettings, timings: Option<TakeoffTimings>, base_force: f32) -> Self {
        Self {
            settings,
            timings,
            base_force,
            current_force: 0.0,
            release_elapsed: 0.0,
            phase: TakeoffPhase::Idle,
            loop_timer: Countdown::default(),
            end_timer: Countdown::default(),
        }
    }

    pub fn phase(&self) -> TakeoffPhase {
        self.phase
    }

    pub fn current_force(&self) -> f32 {
        self.current_force
    }

    pub fn engage(&mut self, host: &mut impl FlightHost) -> bool {
        let Some(timings) = self.timings.as_ref() else {
            log::trace!("takeoff engage ignored, no montage");
            return false;
        };
        if !host.movement_mode().is_grounded() || self.phase != TakeoffPhase::Idle {
            log::trace!("takeoff engage rejected in {:?}", self.phase);
            return false;
        }

        host.set_locomotion_enabled(false);
        host.play_montage(&timings.montage, None, 1.0);
        self.phase = TakeoffPhase::Engaging;
        self.loop_timer.arm(timings.engage);
        log::debug!("takeoff engaged");
        true
    }

    pub fn release(&mut self, host: &mut impl FlightHost) -> bool {
        let Some(timings) = self.timings.as_ref() else {
            return false;
        };
        if !self.phase.is_charging() {
            log::trace!("takeoff release rejected in {:?}", self.phase);
            return false;
        }

        let end_after = if self.phase == TakeoffPhase::Charged {
            host.play_montage(
                &timings.montage,
                Some(&timings.release_section),
                self.settings.rate_scale,
            );
            host.signal(FlightSignal::TakeoffReleased { charged: true });
            self.release_elapsed = 0.0;
            self.current_force = self.base_force;
            self.phase = TakeoffPhase::Releasing { charged: true };
            log::debug!("takeoff released");
            timings.release
        } else {
            let blend_out = timings.engage / 2.0;
            host.stop_montage(Some(&timings.montage), Some(blend_out));
            host.signal(FlightSignal::TakeoffReleased { charged: false });
            self.loop_timer.clear();
            self.phase = TakeoffPhase::Releasing { charged: false };
            log::debug!("takeoff cancelled before charging");
            blend_out
        };

        self.end_timer.arm(end_after);
        true
    }

    /// Fires pending timers, then applies the release force.
    pub fn tick(&mut self, host: &mut impl FlightHost, delta_seconds: f32) {
        let Some(timings) = self.timings.as_ref() else {
            return;
        };

        if self.loop_timer.tick(delta_seconds) {
            match self.phase {
                TakeoffPhase::Engaging => {
                    host.play_montage(
                        &timings.montage,
                        Some(&timings.loop_section),
                        self.settings.rate_scale,
                    );
                    self.phase = TakeoffPhase::Looping;
                    self.loop_timer.arm(timings.charge_loop);
                }
                TakeoffPhase::Looping => {
                    self.phase = TakeoffPhase::Charged;
                    log::debug!("takeoff charged");
                }
                _ => {}
            }
        }

        if self.end_timer.tick(delta_seconds) {
            self.phase = TakeoffPhase::Idle;
            self.current_force = 0.0;
            host.set_locomotion_enabled(true);
            host.stop_montage(None, None);
            return;
        }

        if self.phase.is_taking_off() {
            host.add_force(Vec3::Y * self.current_force);
            self.release_elapsed += delta_seconds;
            let alpha = (self.release_elapsed / timings.release).clamp(0.0, 1.0);
            self.current_force = self.base_force * (1.0 - alpha);
        }
    }
}
