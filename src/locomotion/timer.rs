use std::time::Duration;

use bevy::time::{Timer, TimerMode};

/// One-shot countdown owned by a controller and advanced from its tick.
///
/// Arming replaces any outstanding countdown, and clearing guarantees the
/// expiry is never reported afterwards. A countdown reports its expiry at
/// most once per arm.
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    timer: Option<Timer>,
}

impl Countdown {
    /// Arms the countdown, discarding any previous one. Non-positive
    /// durations expire on the next tick.
    pub fn arm(&mut self, seconds: f32) {
        self.timer = Some(Timer::from_seconds(seconds.max(0.0), TimerMode::Once));
    }

    pub fn clear(&mut self) {
        self.timer = None;
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Advances the countdown and returns true on the tick it expires.
    pub fn tick(&mut self, delta_seconds: f32) -> bool {
        let Some(timer) = self.timer.as_mut() else {
            return false;
        };

        timer.tick(Duration::from_secs_f32(delta_seconds.max(0.0)));
        if timer.is_finished() {
            self.timer = None;
            true
        } else {
            false
        }
    }
}
