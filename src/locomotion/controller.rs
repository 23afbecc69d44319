use bevy::math::Vec3;
use serde::Deserialize;

use super::divebomb::{DiveBombController, DiveBombPhase, DivebombTimings, DivebombTransition};
use super::dodge::{DodgeController, DodgeSide, DodgeState};
use super::flags::LocomotionFlags;
use super::host::{FlightHost, GroundHit, MovementMode};
use super::profile::MotionProfile;
use super::rotation::{heading_from_velocity, without_pitch, LeanRates, RotationBlend};
use super::takeoff::TakeoffController;
use crate::resources::FlightSettings;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LocomotionSettings {
    /// Rate at which the character turns toward its flight heading
    pub rotation_interp_speed: f32,
    /// Share of the vertical velocity kept when flight ends
    pub z_momentum_coeff: f32,
    /// Falls deeper than this end in a hard landing
    pub soft_landing_limit: f32,
}

impl Default for LocomotionSettings {
    fn default() -> Self {
        Self {
            rotation_interp_speed: 8.0,
            z_momentum_coeff: 0.7,
            soft_landing_limit: 1500.0,
        }
    }
}

/// Flight mode arbitration plus the dodge and dive-bomb sub-behaviours.
///
/// The owner calls [`FlightLocomotion::initialize`] once its body exists and
/// [`FlightLocomotion::tick`] every frame. Every operation borrows the owner
/// as a [`FlightHost`] for the duration of the call.
#[derive(Debug, Clone)]
pub struct FlightLocomotion {
    settings: LocomotionSettings,
    motion: MotionProfile,
    dodge: DodgeController,
    divebomb: DiveBombController,
    rotation: RotationBlend,
    hard_landing_montage: Option<String>,
    capsule_half_height: f32,
    landing_reference: f32,
    initialized: bool,
}

impl FlightLocomotion {
    pub fn new(settings: &FlightSettings) -> Self {
        let timings = match DivebombTimings::resolve(
            settings.animations.divebomb.as_ref(),
            &settings.divebomb,
        ) {
            Ok(timings) => Some(timings),
            Err(error) => {
                log::error!("divebomb disabled: {}", error);
                None
            }
        };

        let hard_landing_montage = settings
            .animations
            .hard_landing
            .as_ref()
            .map(|montage| montage.name.clone());
        if hard_landing_montage.is_none() {
            log::error!("hard landing montage is not configured");
        }

        Self {
            settings: settings.locomotion.clone(),
            motion: settings.motion.clone(),
            dodge: DodgeController::new(settings.dodge.clone(), settings.motion.dodge_force),
            divebomb: DiveBombController::new(
                settings.divebomb.clone(),
                timings,
                settings.motion.divebomb_velocity,
            ),
            rotation: RotationBlend::default(),
            hard_landing_montage,
            capsule_half_height: 0.0,
            landing_reference: 0.0,
            initialized: false,
        }
    }

    /// Captures the resting capsule size and applies the base movement
    /// parameters. Must run after the host's body exists.
    pub fn initialize(&mut self, host: &mut impl FlightHost) {
        self.capsule_half_height = host.capsule_half_height();
        host.set_max_acceleration(self.motion.base.max_acceleration);
        host.set_braking_deceleration_flying(self.motion.braking_deceleration_flying);
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn fly(&mut self, host: &mut impl FlightHost) {
        host.set_speed_limits(self.motion.base);
        host.set_movement_mode(MovementMode::Flying);
    }

    /// Leaves flight, keeping part of the vertical momentum. Call once per
    /// flight exit.
    pub fn stop_flying(&mut self, host: &mut impl FlightHost) {
        self.landing_reference = host.location().y;

        let vertical = host.velocity().y * self.settings.z_momentum_coeff;
        host.launch_vertical(vertical);
        host.set_movement_mode(MovementMode::Falling);
        host.set_capsule_half_height(self.capsule_half_height);
    }

    pub fn dash(&mut self, host: &mut impl FlightHost) {
        host.set_speed_limits(self.motion.dash);
        let radius = host.capsule_radius();
        host.set_capsule_half_height(radius);
        self.rotation.cancel_pitch_reset();
    }

    pub fn stop_dashing(&mut self, host: &mut impl FlightHost) {
        host.set_speed_limits(self.motion.base);
        host.set_capsule_half_height(self.capsule_half_height);
        self.dodge.cancel_lateral();
        self.rotation.schedule_pitch_reset();
    }

    pub fn right_dodge(&mut self, host: &mut impl FlightHost) -> bool {
        self.dodge.request(DodgeSide::Right, host.is_dashing())
    }

    pub fn left_dodge(&mut self, host: &mut impl FlightHost) -> bool {
        self.dodge.request(DodgeSide::Left, host.is_dashing())
    }

    /// Decides whether a ground contact is a hard landing. On a hard landing
    /// input stays disabled until the landing animation hands it back.
    pub fn handle_character_landing(&mut self, host: &mut impl FlightHost, hit: &GroundHit) -> bool {
        // Touching down mid-dive starts the land section from here.
        if self.divebomb.land(host, hit.location) {
            return false;
        }

        if !host.is_walkable(hit) {
            return false;
        }

        let fall_distance = self.fall_distance(&*host);
        if fall_distance <= self.settings.soft_landing_limit || self.divebomb.phase().is_engaged() {
            return false;
        }

        if let Some(montage) = self.hard_landing_montage.as_ref() {
            host.set_input_enabled(false);
            host.play_montage(montage, None, 1.0);
        }
        log::debug!("hard landing after falling {:.0}", fall_distance);
        true
    }

    pub fn set_landing_reference(&mut self, height: f32) {
        self.landing_reference = height;
    }

    pub fn stop_divebomb(&mut self, host: &mut impl FlightHost) {
        self.divebomb.stop(host);
    }

    pub fn tick(&mut self, host: &mut impl FlightHost, delta_seconds: f32) {
        self.dodge.tick(delta_seconds);
        if self.divebomb.tick_timers(host, delta_seconds) == Some(DivebombTransition::Finished) {
            self.landing_reference = 0.0;
        }

        match host.movement_mode() {
            MovementMode::Flying => self.update_flight(host, delta_seconds),
            MovementMode::Falling => {
                let phase = self.divebomb.phase();
                if !phase.is_engaged() {
                    let fall_distance = self.fall_distance(&*host);
                    self.divebomb.try_engage(host, fall_distance);
                } else if phase.is_divebombing() {
                    self.divebomb.update_dive(host, self.capsule_half_height);
                }
            }
            MovementMode::Walking => {}
        }

        let rotation = host.rotation();
        if let Some(level) = self.rotation.step_pitch_reset(
            rotation,
            delta_seconds,
            self.settings.rotation_interp_speed,
        ) {
            host.set_rotation(level);
        }
    }

    fn update_flight(&mut self, host: &mut impl FlightHost, delta_seconds: f32) {
        let current = host.rotation();
        let target = if host.is_dashing() {
            heading_from_velocity(host.velocity()).unwrap_or(current)
        } else {
            without_pitch(host.camera_rotation())
        };
        host.set_rotation(self.rotation.blend_toward(
            current,
            target,
            delta_seconds,
            self.settings.rotation_interp_speed,
        ));

        self.rotation
            .update_lean_rates(host.rotation(), host.angular_velocity());

        let camera_right = host.camera_rotation() * Vec3::X;
        if let Some(force) = self.dodge.lateral_force(camera_right, delta_seconds) {
            host.add_force(force);
        }
    }

    fn fall_distance(&self, host: &impl FlightHost) -> f32 {
        self.landing_reference - host.location().y
    }

    pub fn lean_rates(&self) -> LeanRates {
        self.rotation.lean_rates()
    }

    pub fn is_dodging(&self) -> bool {
        self.dodge.is_dodging()
    }

    pub fn dodge_side(&self) -> Option<DodgeSide> {
        self.dodge.side()
    }

    pub fn dodge_state(&self) -> DodgeState {
        self.dodge.state()
    }

    pub fn divebomb_phase(&self) -> DiveBombPhase {
        self.divebomb.phase()
    }

    pub fn landing_reference(&self) -> f32 {
        self.landing_reference
    }

    pub fn is_pitch_reset_pending(&self) -> bool {
        self.rotation.is_pitch_reset_pending()
    }

    /// Capsule half height captured by [`FlightLocomotion::initialize`].
    pub fn resting_half_height(&self) -> f32 {
        self.capsule_half_height
    }

    pub fn flags(&self, host: &impl FlightHost, takeoff: &TakeoffController) -> LocomotionFlags {
        LocomotionFlags::collect(
            host.movement_mode(),
            host.is_dashing(),
            &self.dodge,
            self.divebomb.phase(),
            takeoff.phase(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use bevy::math::{EulerRot, Quat};

    use super::*;
    use crate::locomotion::host::FlightSignal;
    use crate::locomotion::rotation::pitch_of;
    use crate::locomotion::testing::{MockHost, MontageCall};

    const DT: f32 = 1.0 / 60.0;

    fn setup() -> (FlightLocomotion, MockHost) {
        let mut core = FlightLocomotion::new(&FlightSettings::default());
        let mut host = MockHost::default();
        core.initialize(&mut host);
        (core, host)
    }

    #[test]
    fn test_initialize_applies_base_parameters() {
        let (core, host) = setup();
        assert!(core.is_initialized());
        assert_eq!(core.resting_half_height(), 89.0);
        assert_eq!(host.max_acceleration, Some(2500.0));
        assert_eq!(host.braking_deceleration_flying, Some(2800.0));
    }

    #[test]
    fn test_fly_then_stop_flying_restores_half_height() {
        let (mut core, mut host) = setup();
        host.location = Vec3::new(0.0, 1200.0, 0.0);

        core.fly(&mut host);
        assert_eq!(host.mode, MovementMode::Flying);
        assert_eq!(host.speed_limits.unwrap().max_speed, 850.0);

        core.dash(&mut host);
        assert_eq!(host.capsule_half_height, 40.0);

        host.velocity = Vec3::new(100.0, 500.0, 0.0);
        core.stop_flying(&mut host);
        assert_eq!(host.mode, MovementMode::Falling);
        assert_eq!(host.capsule_half_height, 89.0);
        assert_eq!(core.landing_reference(), 1200.0);
        assert_eq!(host.launches, vec![350.0]);
        assert_eq!(host.velocity.x, 100.0);
    }

    #[test]
    fn test_stop_dashing_is_idempotent() {
        let (mut core, mut host) = setup();
        core.fly(&mut host);
        host.dashing = true;
        core.dash(&mut host);
        assert!(core.right_dodge(&mut host));

        core.stop_dashing(&mut host);
        let once = (
            core.dodge_state(),
            core.is_pitch_reset_pending(),
            host.capsule_half_height,
            host.speed_limits,
        );
        core.stop_dashing(&mut host);
        let twice = (
            core.dodge_state(),
            core.is_pitch_reset_pending(),
            host.capsule_half_height,
            host.speed_limits,
        );

        assert_eq!(once, twice);
        assert_eq!(core.dodge_side(), None);
        assert!(core.is_dodging());
    }

    #[test]
    fn test_dodge_needs_dash() {
        let (mut core, mut host) = setup();
        core.fly(&mut host);
        assert!(!core.left_dodge(&mut host));
        assert!(!core.is_dodging());
    }

    #[test]
    fn test_dodge_force_follows_camera_right() {
        let (mut core, mut host) = setup();
        core.fly(&mut host);
        host.dashing = true;
        host.velocity = Vec3::new(0.0, 0.0, -900.0);
        host.camera_rotation = Quat::from_rotation_y(FRAC_PI_2);
        core.right_dodge(&mut host);

        core.tick(&mut host, DT);
        let force = host.forces[0];
        let expected = Quat::from_rotation_y(FRAC_PI_2) * Vec3::X * 32_000_000.0;
        assert!(force.abs_diff_eq(expected, 1.0));

        for _ in 0..30 {
            core.tick(&mut host, DT);
        }
        let last = *host.forces.last().unwrap();
        assert!(last.length() < force.length());
        assert!(last.length() > 0.0);
    }

    #[test]
    fn test_flight_turns_toward_level_camera() {
        let (mut core, mut host) = setup();
        core.fly(&mut host);
        host.camera_rotation = Quat::from_euler(EulerRot::YXZ, 1.0, -0.6, 0.0);

        for _ in 0..240 {
            core.tick(&mut host, DT);
        }

        let (yaw, pitch, _) = host.rotation.to_euler(EulerRot::YXZ);
        assert!((yaw - 1.0).abs() < 1.0e-3);
        assert!(pitch.abs() < 1.0e-3);
    }

    #[test]
    fn test_dash_turns_toward_velocity() {
        let (mut core, mut host) = setup();
        core.fly(&mut host);
        host.dashing = true;
        host.velocity = Vec3::new(0.0, 1000.0, -1000.0);

        for _ in 0..240 {
            core.tick(&mut host, DT);
        }
        assert!((pitch_of(host.rotation) - std::f32::consts::FRAC_PI_4).abs() < 1.0e-3);

        host.dashing = false;
        core.stop_dashing(&mut host);
        host.mode = MovementMode::Walking;
        for _ in 0..600 {
            core.tick(&mut host, DT);
        }
        assert!(!core.is_pitch_reset_pending());
        assert!(pitch_of(host.rotation).abs() < 1.0e-6);
    }

    #[test]
    fn test_lean_rates_follow_angular_velocity() {
        let (mut core, mut host) = setup();
        core.fly(&mut host);
        host.angular_velocity = Vec3::new(0.0, std::f32::consts::PI, 0.0);
        core.tick(&mut host, DT);
        assert!((core.lean_rates().yaw - 0.5).abs() < 1.0e-4);
    }

    #[test]
    fn test_divebomb_engages_below_reference() {
        let (mut core, mut host) = setup();
        host.mode = MovementMode::Falling;
        core.set_landing_reference(10_000.0);
        host.location = Vec3::new(0.0, 10_000.0 - 2500.0, 0.0);

        core.tick(&mut host, DT);
        assert_eq!(core.divebomb_phase(), DiveBombPhase::Engaging);
        assert_eq!(host.probes, vec![3600.0]);
    }

    #[test]
    fn test_divebomb_full_cycle_resets_reference() {
        let (mut core, mut host) = setup();
        host.mode = MovementMode::Falling;
        core.set_landing_reference(20_000.0);
        host.location = Vec3::new(0.0, 17_000.0, 0.0);

        core.tick(&mut host, DT);
        for _ in 0..30 {
            core.tick(&mut host, DT);
        }
        assert_eq!(core.divebomb_phase(), DiveBombPhase::Diving);
        assert_eq!(host.signals, vec![FlightSignal::DivebombInitiated]);
        assert_eq!(host.velocity, Vec3::new(0.0, -65000.0, 0.0));

        host.ground_height = Some(17_000.0 - 500.0);
        core.tick(&mut host, DT);
        assert_eq!(core.divebomb_phase(), DiveBombPhase::Landing);

        // Ground contact ends the fall while the land section plays.
        host.mode = MovementMode::Walking;
        let hit = GroundHit {
            location: Vec3::new(0.0, 16_500.0, 0.0),
            normal: Vec3::Y,
        };
        host.location = hit.location;
        assert!(!core.handle_character_landing(&mut host, &hit));

        for _ in 0..80 {
            core.tick(&mut host, DT);
        }
        assert_eq!(core.divebomb_phase(), DiveBombPhase::Idle);
        assert_eq!(core.landing_reference(), 0.0);
        assert_eq!(host.locomotion_enabled, Some(true));
    }

    #[test]
    fn test_touchdown_while_diving_lands_the_divebomb() {
        let (mut core, mut host) = setup();
        host.mode = MovementMode::Falling;
        core.set_landing_reference(20_000.0);
        host.location = Vec3::new(0.0, 17_000.0, 0.0);
        for _ in 0..32 {
            core.tick(&mut host, DT);
        }
        assert_eq!(core.divebomb_phase(), DiveBombPhase::Diving);

        // The body reached the floor in one step, past the dive probe.
        host.mode = MovementMode::Walking;
        let hit = GroundHit {
            location: Vec3::new(0.0, 0.0, 0.0),
            normal: Vec3::Y,
        };
        host.location = Vec3::new(0.0, 89.0, 0.0);
        assert!(!core.handle_character_landing(&mut host, &hit));

        assert_eq!(core.divebomb_phase(), DiveBombPhase::Landing);
        assert_eq!(host.input_enabled, Some(false));
        assert_eq!(
            host.signals,
            vec![
                FlightSignal::DivebombInitiated,
                FlightSignal::DivebombLanded {
                    location: Vec3::ZERO
                }
            ]
        );
        assert_eq!(
            host.montages.last(),
            Some(&MontageCall::Play(
                "Divebomb".to_string(),
                Some("Land".to_string())
            ))
        );

        for _ in 0..80 {
            core.tick(&mut host, DT);
        }
        assert_eq!(core.divebomb_phase(), DiveBombPhase::Idle);
        assert_eq!(host.locomotion_enabled, Some(true));
    }

    #[test]
    fn test_hard_landing() {
        let (mut core, mut host) = setup();
        core.set_landing_reference(2000.0);
        host.location = Vec3::ZERO;
        let hit = GroundHit {
            location: Vec3::ZERO,
            normal: Vec3::Y,
        };

        assert!(core.handle_character_landing(&mut host, &hit));
        assert_eq!(host.input_enabled, Some(false));
        assert_eq!(
            host.montages,
            vec![MontageCall::Play("HardLanding".to_string(), None)]
        );

        core.set_landing_reference(1500.0);
        assert!(!core.handle_character_landing(&mut host, &hit));

        core.set_landing_reference(2000.0);
        host.walkable = false;
        assert!(!core.handle_character_landing(&mut host, &hit));
    }

    #[test]
    fn test_hard_landing_without_montage_keeps_input() {
        let mut settings = FlightSettings::default();
        settings.animations.hard_landing = None;
        let mut core = FlightLocomotion::new(&settings);
        let mut host = MockHost::default();
        core.initialize(&mut host);
        core.set_landing_reference(5000.0);

        let hit = GroundHit {
            location: Vec3::ZERO,
            normal: Vec3::Y,
        };
        assert!(core.handle_character_landing(&mut host, &hit));
        assert_eq!(host.input_enabled, None);
    }

    #[test]
    fn test_stop_divebomb_leaves_locomotion_disabled() {
        let (mut core, mut host) = setup();
        host.mode = MovementMode::Falling;
        core.set_landing_reference(20_000.0);
        host.location = Vec3::new(0.0, 17_000.0, 0.0);
        for _ in 0..32 {
            core.tick(&mut host, DT);
        }
        assert_eq!(core.divebomb_phase(), DiveBombPhase::Diving);

        core.stop_divebomb(&mut host);
        assert_eq!(core.divebomb_phase(), DiveBombPhase::Idle);
        assert_eq!(host.locomotion_enabled, Some(false));
    }
}
