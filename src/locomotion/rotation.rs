//! Rotation blending for flight.
//!
//! Coordinates follow Bevy: Y is up and forward is -Z. Euler angles are
//! decomposed in YXZ order, i.e. yaw about Y, then pitch about the local X
//! axis (positive is nose up), then roll about the local Z axis.

use bevy::math::{EulerRot, Quat, Vec3};

/// Differences below this are treated as already at the target.
const INTERP_SNAP_SQUARED: f32 = 1.0e-8;

/// Pitch (radians) below which the post-dash reset snaps to level.
pub const PITCH_RESET_TOLERANCE: f32 = 1.0e-4;

/// Angular speed, in degrees per second, mapped to a full lean of 1.
pub const LEAN_INPUT_RANGE_DEGREES: f32 = 360.0;

/// Moves `current` toward `target` by a fraction `delta * speed` of the
/// remaining distance, snapping once the distance is negligible.
pub fn interp_to(current: f32, target: f32, delta: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return target;
    }

    let distance = target - current;
    if distance * distance < INTERP_SNAP_SQUARED {
        return target;
    }

    current + distance * (delta * speed).clamp(0.0, 1.0)
}

/// Rotation counterpart of [`interp_to`].
pub fn rotation_interp_to(current: Quat, target: Quat, delta: f32, speed: f32) -> Quat {
    if speed <= 0.0 {
        return target;
    }

    current.slerp(target, (delta * speed).clamp(0.0, 1.0)).normalize()
}

/// Maps `value` from `input` to `output`, clamped to the output range.
pub fn map_range_clamped(input: (f32, f32), output: (f32, f32), value: f32) -> f32 {
    let span = input.1 - input.0;
    if span == 0.0 {
        return output.0;
    }

    let alpha = ((value - input.0) / span).clamp(0.0, 1.0);
    output.0 + (output.1 - output.0) * alpha
}

pub fn pitch_of(rotation: Quat) -> f32 {
    let (_, pitch, _) = rotation.to_euler(EulerRot::YXZ);
    pitch
}

/// Same yaw and roll with the pitch set to zero.
pub fn without_pitch(rotation: Quat) -> Quat {
    let (yaw, _, roll) = rotation.to_euler(EulerRot::YXZ);
    Quat::from_euler(EulerRot::YXZ, yaw, 0.0, roll)
}

/// Rotation facing along `velocity`, with no roll. `None` when not moving.
pub fn heading_from_velocity(velocity: Vec3) -> Option<Quat> {
    let direction = velocity.try_normalize()?;
    let yaw = (-direction.x).atan2(-direction.z);
    let pitch = direction
        .y
        .atan2(Vec3::new(direction.x, 0.0, direction.z).length());
    Some(Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0))
}

/// Normalized angular rates exposed for animation blending.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LeanRates {
    /// Turn rate about the world up axis
    pub yaw: f32,
    /// Rate about the character's local right axis
    pub lean: f32,
}

impl LeanRates {
    pub fn from_angular_velocity(rotation: Quat, angular_velocity: Vec3) -> Self {
        let range = (-LEAN_INPUT_RANGE_DEGREES, LEAN_INPUT_RANGE_DEGREES);
        let degrees = angular_velocity * (180.0 / std::f32::consts::PI);
        let local = rotation.inverse() * degrees;

        Self {
            yaw: map_range_clamped(range, (-1.0, 1.0), degrees.y),
            lean: map_range_clamped(range, (-1.0, 1.0), local.x),
        }
    }
}

/// Rotation state carried between flight ticks.
#[derive(Debug, Default, Clone)]
pub struct RotationBlend {
    pitch_reset_pending: bool,
    lean_rates: LeanRates,
}

impl RotationBlend {
    pub fn lean_rates(&self) -> LeanRates {
        self.lean_rates
    }

    pub fn is_pitch_reset_pending(&self) -> bool {
        self.pitch_reset_pending
    }

    pub fn schedule_pitch_reset(&mut self) {
        self.pitch_reset_pending = true;
    }

    pub fn cancel_pitch_reset(&mut self) {
        self.pitch_reset_pending = false;
    }

    /// Rotation one step closer to `target`.
    pub fn blend_toward(&self, current: Quat, target: Quat, delta: f32, speed: f32) -> Quat {
        rotation_interp_to(current, target, delta, speed)
    }

    pub fn update_lean_rates(&mut self, rotation: Quat, angular_velocity: Vec3) -> LeanRates {
        self.lean_rates = LeanRates::from_angular_velocity(rotation, angular_velocity);
        self.lean_rates
    }

    /// Steps the post-dash pitch reset. Returns the rotation to apply, or
    /// `None` when no reset is pending.
    pub fn step_pitch_reset(&mut self, current: Quat, delta: f32, speed: f32) -> Option<Quat> {
        if !self.pitch_reset_pending {
            return None;
        }

        let level = without_pitch(current);
        if pitch_of(current).abs() <= PITCH_RESET_TOLERANCE {
            self.pitch_reset_pending = false;
            Some(level)
        } else {
            Some(rotation_interp_to(current, level, delta, speed))
        }
    }
}
