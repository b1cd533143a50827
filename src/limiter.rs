//! # Slew-Rate Limiter Module
//!
//! Per-axis asymmetric slew-rate limiting for velocity targets.
//!
//! Input targets are instantaneous snapshots: a key press jumps the target
//! from 0 to full scale in one frame. Forwarding that directly makes the
//! robot lurch, so each axis holds a current velocity that ramps toward the
//! target at a bounded acceleration.
//!
//! ## Asymmetry
//!
//! Acceleration is limited by `max_velocity / ramp_time`; deceleration is
//! instantaneous. A symmetric limiter would cap stopping at the same slow
//! rate as starting, producing multi-second stopping distances after the
//! input already went to zero. Splitting the branches decouples how fast the
//! robot speeds up (a tunable comfort parameter) from how fast it stops
//! (always as fast as the transport allows). The actuator controller applies
//! its own torque limits, so an instantaneous commanded stop is safe.

use tracing::debug;

/// Per-axis slew-rate limiter state.
///
/// Owned exclusively by the frame-consuming side; the sampler never reads or
/// mutates it. One instance per velocity axis.
#[derive(Debug, Clone, Copy)]
pub struct AxisLimiter {
    /// Velocity ceiling for this axis (user-configurable, physical units).
    max_velocity: f32,
    /// Seconds to accelerate from 0 to `max_velocity`.
    ramp_time: f32,
    /// Current commanded velocity, persists across frames.
    current: f32,
}

impl AxisLimiter {
    /// Creates a zero-initialized limiter.
    ///
    /// # Arguments
    ///
    /// * `max_velocity` - Axis velocity ceiling (m/s or rad/s)
    /// * `ramp_time` - Seconds from standstill to `max_velocity`; values at
    ///   or below 10 ms give effectively instant response
    #[must_use]
    pub fn new(max_velocity: f32, ramp_time: f32) -> Self {
        Self {
            max_velocity,
            ramp_time,
            current: 0.0,
        }
    }

    /// Returns the current commanded velocity.
    #[must_use]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Returns the configured velocity ceiling.
    #[must_use]
    pub fn max_velocity(&self) -> f32 {
        self.max_velocity
    }

    /// Advances the limiter toward `target` over `dt` seconds.
    ///
    /// Deceleration (target magnitude below current magnitude) is applied
    /// instantly; acceleration is stepped by at most
    /// `max_velocity / ramp_time * dt`. Returns the new current velocity,
    /// clamped to `[-max_velocity, +max_velocity]`.
    pub fn advance(&mut self, target: f32, dt: f32) -> f32 {
        if target.abs() < self.current.abs() {
            // Target closer to zero: instant response on release
            self.current = target;
        } else {
            let max_accel = if self.ramp_time > 0.01 {
                self.max_velocity / self.ramp_time
            } else {
                // Degenerate ramp time: effectively instant
                1000.0
            };
            let max_step = max_accel * dt;
            let delta = target - self.current;
            self.current += delta.clamp(-max_step, max_step);
        }

        self.current = self.current.clamp(-self.max_velocity, self.max_velocity);
        self.current
    }

    /// Resets the current velocity to zero.
    ///
    /// Called on disconnect, control disable, emergency stop, and pose-mode
    /// entry, so a later frame never resumes from stale velocity.
    pub fn reset(&mut self) {
        if self.current != 0.0 {
            debug!(current = self.current, "axis limiter reset to zero");
        }
        self.current = 0.0;
    }

    /// Reconfigures the velocity ceiling.
    ///
    /// If the robot is moving faster than the new ceiling, the current
    /// velocity is clamped immediately instead of waiting for natural decay.
    pub fn set_max_velocity(&mut self, max_velocity: f32) {
        self.max_velocity = max_velocity;
        self.current = self.current.clamp(-max_velocity, max_velocity);
    }

    /// Reconfigures the ramp time.
    pub fn set_ramp_time(&mut self, ramp_time: f32) {
        self.ramp_time = ramp_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let limiter = AxisLimiter::new(0.6, 0.2);
        assert_eq!(limiter.current(), 0.0);
    }

    #[test]
    fn test_instant_deceleration_to_zero() {
        let mut limiter = AxisLimiter::new(1.0, 1.0);
        limiter.current = 0.6;

        // Any dt: release means stop now
        assert_eq!(limiter.advance(0.0, 0.001), 0.0);

        limiter.current = 0.6;
        assert_eq!(limiter.advance(0.0, 1.0), 0.0);
    }

    #[test]
    fn test_instant_deceleration_partial() {
        let mut limiter = AxisLimiter::new(1.0, 1.0);
        limiter.current = 0.8;

        // Target closer to zero but not zero: still instant
        assert!((limiter.advance(0.3, 0.01) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_acceleration_is_ramped() {
        let mut limiter = AxisLimiter::new(0.6, 0.2);

        // max_accel = 0.6 / 0.2 = 3.0; one 33ms tick allows ~0.1
        let v = limiter.advance(0.6, 0.033);
        assert!(v > 0.0 && v < 0.6);
        assert!((v - 0.099).abs() < 1e-3, "got {}", v);
    }

    #[test]
    fn test_full_ramp_window_reaches_target() {
        // current=0, target=0.6, ramp_time=0.2, dt=0.2: one full window
        let mut limiter = AxisLimiter::new(0.6, 0.2);
        let v = limiter.advance(0.6, 0.2);
        assert!((v - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_ramp_monotone_never_overshoots() {
        let mut limiter = AxisLimiter::new(0.6, 0.2);
        let mut elapsed = 0.0;
        let mut prev = 0.0;
        let dt = 0.033;

        for _ in 0..20 {
            let v = limiter.advance(0.6, dt);
            elapsed += dt;
            assert!(v >= prev, "ramp must be monotone");
            assert!(v <= 0.6 + 1e-6, "ramp must never overshoot");
            if elapsed < 0.2 - dt {
                assert!(v < 0.6, "target reached before the ramp window elapsed");
            }
            prev = v;
        }
        assert!((prev - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_acceleration_in_negative_direction() {
        let mut limiter = AxisLimiter::new(0.6, 0.2);
        let v = limiter.advance(-0.6, 0.033);
        assert!(v < 0.0 && v > -0.6);
    }

    #[test]
    fn test_sign_reversal_decelerates_then_ramps() {
        let mut limiter = AxisLimiter::new(0.6, 0.2);
        limiter.current = 0.3;

        // Reversing direction: |target| >= |current| so this is the
        // acceleration branch stepping toward the negative target
        let v = limiter.advance(-0.3, 0.033);
        assert!(v < 0.3);
        assert!(v > -0.3);
    }

    #[test]
    fn test_degenerate_ramp_time_is_instant() {
        let mut limiter = AxisLimiter::new(0.6, 0.0);
        let v = limiter.advance(0.6, 0.001);
        assert!((v - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_output_clamped_to_max() {
        let mut limiter = AxisLimiter::new(0.6, 0.2);
        // Target beyond the ceiling never produces more than the ceiling
        for _ in 0..100 {
            let v = limiter.advance(5.0, 0.1);
            assert!(v <= 0.6 + 1e-6);
        }
    }

    #[test]
    fn test_reset() {
        let mut limiter = AxisLimiter::new(0.6, 0.2);
        limiter.advance(0.6, 0.1);
        assert!(limiter.current() > 0.0);

        limiter.reset();
        assert_eq!(limiter.current(), 0.0);
    }

    #[test]
    fn test_lowering_max_clamps_current() {
        let mut limiter = AxisLimiter::new(1.0, 0.01);
        limiter.advance(1.0, 1.0);
        assert!((limiter.current() - 1.0).abs() < 1e-6);

        limiter.set_max_velocity(0.4);
        assert!((limiter.current() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_raising_max_keeps_current() {
        let mut limiter = AxisLimiter::new(0.4, 0.01);
        limiter.advance(0.4, 1.0);
        limiter.set_max_velocity(1.0);
        assert!((limiter.current() - 0.4).abs() < 1e-6);
    }
}
