//! # Frame Executor Module
//!
//! Consumes command frames in arrival order and turns them into actuator
//! commands: timestamp ordering, slew-rate limiting, hardware normalization,
//! and zero-velocity deduplication.
//!
//! The executor is the single writer for all limiter state. Frames are
//! processed strictly sequentially; pose frames bypass the limiter and
//! normalizer entirely, since a position target must be held, not ramped.
//!
//! Mode is switched explicitly by [`Executor::enter_pose`] and
//! [`Executor::exit_pose`] when the pose transition completes, never inferred
//! from frame variants: the sampler keeps emitting frames of the old kind
//! while a transition is in flight, and those stragglers must be dropped, not
//! interpreted under the robot's new semantics.

use tracing::{debug, info};

use crate::command::{ActuatorCommand, CommandFrame, FrameBody, VelocityFrame};
use crate::config::ControlConfig;
use crate::limiter::AxisLimiter;
use crate::normalizer::HardwareNormalizer;
use std::time::Duration;

/// Fallback `dt` when the inter-frame gap is implausible (nominal 30 Hz).
const FALLBACK_DT: f32 = 0.033;

/// Gaps above this are treated as a stall, not a real `dt`.
const MAX_PLAUSIBLE_GAP: Duration = Duration::from_millis(100);

/// Robot-side frame processor.
///
/// Owns the per-axis limiter state exclusively; the sampler never touches it.
#[derive(Debug)]
pub struct Executor {
    linear: AxisLimiter,
    strafe: AxisLimiter,
    rotation: AxisLimiter,
    normalizer: HardwareNormalizer,

    last_timestamp: Option<Duration>,
    in_pose_mode: bool,
    zero_sent: bool,
}

impl Executor {
    /// Builds an executor from the control configuration.
    #[must_use]
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            linear: AxisLimiter::new(config.linear.max_velocity, config.linear.ramp_time),
            strafe: AxisLimiter::new(config.strafe.max_velocity, config.strafe.ramp_time),
            rotation: AxisLimiter::new(config.rotation.max_velocity, config.rotation.ramp_time),
            normalizer: HardwareNormalizer::new(
                config.linear.max_velocity,
                config.strafe.max_velocity,
                config.rotation.max_velocity,
            ),
            last_timestamp: None,
            in_pose_mode: false,
            zero_sent: false,
        }
    }

    /// Processes one frame into an actuator command.
    ///
    /// Returns `None` when the frame is dropped (stale timestamp) or when a
    /// repeated zero-velocity command is deduplicated.
    pub fn process(&mut self, frame: CommandFrame) -> Option<ActuatorCommand> {
        // Ordering guard: dt must be strictly positive
        if let Some(last) = self.last_timestamp {
            if frame.timestamp <= last {
                debug!(
                    frame_ts = ?frame.timestamp,
                    last_ts = ?last,
                    "dropped out-of-order frame"
                );
                return None;
            }
        }
        let dt = self.compute_dt(frame.timestamp);
        self.last_timestamp = Some(frame.timestamp);

        match frame.body {
            FrameBody::Velocity(v) => {
                if self.in_pose_mode {
                    // Straggler sampled before the mode flip: under pose
                    // semantics ly would move body height, not walk forward
                    debug!("dropped velocity frame while pose mode active");
                    return None;
                }
                self.process_velocity(v, dt)
            }
            FrameBody::Pose(p) => {
                if !self.in_pose_mode {
                    debug!("dropped pose frame while velocity mode active");
                    return None;
                }
                // Position targets forward directly, clamped at the frame
                // boundary; no slew limiting is meaningful for a held pose
                Some(ActuatorCommand {
                    lx: p.roll,
                    ly: p.height,
                    rx: p.yaw,
                    ry: p.pitch,
                    keys: 0,
                })
            }
        }
    }

    /// Switches to pose semantics, zeroing the limiters.
    ///
    /// Called when the pose-mode enter sequence completes. The displaced
    /// velocity axes must not retain stale velocity for the eventual return
    /// to velocity mode.
    pub fn enter_pose(&mut self) {
        if !self.in_pose_mode {
            self.reset_limiters();
            self.zero_sent = false;
            self.in_pose_mode = true;
            info!("executor switched to pose semantics");
        }
    }

    /// Switches back to velocity semantics, zeroing the limiters.
    pub fn exit_pose(&mut self) {
        if self.in_pose_mode {
            self.reset_limiters();
            self.zero_sent = false;
            self.in_pose_mode = false;
            info!("executor switched back to velocity semantics");
        }
    }

    /// True while the executor applies pose semantics.
    #[must_use]
    pub fn in_pose_mode(&self) -> bool {
        self.in_pose_mode
    }

    fn process_velocity(&mut self, v: VelocityFrame, dt: f32) -> Option<ActuatorCommand> {
        let (vx, vy, vyaw) = if v.raw {
            // Rage mode: raw targets, still bounded by the normalizer clamp
            (v.vx, v.vy, v.vyaw)
        } else {
            (
                self.linear.advance(v.vx, dt),
                self.strafe.advance(v.vy, dt),
                self.rotation.advance(v.vyaw, dt),
            )
        };

        let command = self.normalizer.normalize(vx, vy, vyaw);

        if command.is_zero() {
            // Zero out limiter state so residue never drifts back in
            self.reset_limiters();
            if self.zero_sent {
                return None;
            }
            self.zero_sent = true;
        } else {
            self.zero_sent = false;
        }

        Some(command)
    }

    fn compute_dt(&self, timestamp: Duration) -> f32 {
        match self.last_timestamp {
            Some(last) => {
                let gap = timestamp.saturating_sub(last);
                if gap > MAX_PLAUSIBLE_GAP {
                    // Connection stalled; a huge dt would allow a huge step
                    FALLBACK_DT
                } else {
                    gap.as_secs_f32()
                }
            }
            None => FALLBACK_DT,
        }
    }

    /// Resets all limiter state and the ordering/dedup tracking.
    ///
    /// Called on disconnect, control disable, and emergency stop.
    pub fn reset(&mut self) {
        self.reset_limiters();
        self.last_timestamp = None;
        self.zero_sent = false;
        self.in_pose_mode = false;
    }

    fn reset_limiters(&mut self) {
        self.linear.reset();
        self.strafe.reset();
        self.rotation.reset();
    }

    /// Applies new velocity ceilings and ramp times.
    ///
    /// Lowering a ceiling mid-motion clamps the current velocity on the next
    /// frame instead of waiting for natural decay.
    pub fn apply_settings(&mut self, config: &ControlConfig) {
        self.linear.set_max_velocity(config.linear.max_velocity);
        self.linear.set_ramp_time(config.linear.ramp_time);
        self.strafe.set_max_velocity(config.strafe.max_velocity);
        self.strafe.set_ramp_time(config.strafe.ramp_time);
        self.rotation.set_max_velocity(config.rotation.max_velocity);
        self.rotation.set_ramp_time(config.rotation.ramp_time);
        self.normalizer.set_limits(
            config.linear.max_velocity,
            config.strafe.max_velocity,
            config.rotation.max_velocity,
        );
    }

    /// Current commanded velocities, for status reporting.
    #[must_use]
    pub fn current_velocities(&self) -> (f32, f32, f32) {
        (
            self.linear.current(),
            self.strafe.current(),
            self.rotation.current(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandFrame, PoseFrame, VelocityFrame};
    use crate::config::ControlConfig;
    use crate::normalizer::hardware;

    fn executor() -> Executor {
        Executor::new(&ControlConfig::default())
    }

    fn vel_frame(millis: u64, vx: f32, vy: f32, vyaw: f32) -> CommandFrame {
        CommandFrame::velocity(
            VelocityFrame {
                vx,
                vy,
                vyaw,
                raw: false,
            },
            Duration::from_millis(millis),
        )
    }

    fn pose_frame(millis: u64, yaw: f32, pitch: f32) -> CommandFrame {
        CommandFrame::pose(
            PoseFrame {
                roll: 0.0,
                height: 0.0,
                yaw,
                pitch,
            },
            Duration::from_millis(millis),
        )
    }

    #[test]
    fn test_first_frame_uses_fallback_dt() {
        let mut ex = executor();
        let cmd = ex.process(vel_frame(33, 0.6, 0.0, 0.0)).unwrap();

        // One 33ms step toward 0.6 at max_accel 0.6/1.0
        let expected = 0.6 * FALLBACK_DT / hardware::LINEAR;
        assert!((cmd.ly - expected).abs() < 1e-3, "got {}", cmd.ly);
    }

    #[test]
    fn test_stale_frame_dropped_state_unchanged() {
        let mut ex = executor();
        ex.process(vel_frame(66, 0.6, 0.0, 0.0)).unwrap();
        let (vx_before, _, _) = ex.current_velocities();

        // Same timestamp: dropped
        assert!(ex.process(vel_frame(66, 0.6, 0.0, 0.0)).is_none());
        // Earlier timestamp: dropped
        assert!(ex.process(vel_frame(33, 0.6, 0.0, 0.0)).is_none());

        let (vx_after, _, _) = ex.current_velocities();
        assert_eq!(vx_before, vx_after);
    }

    #[test]
    fn test_ramp_across_frames() {
        let mut ex = executor();
        let mut prev = 0.0;
        for n in 1..=40 {
            if let Some(cmd) = ex.process(vel_frame(33 * n, 0.6, 0.0, 0.0)) {
                assert!(cmd.ly >= prev, "ramp must be monotone");
                prev = cmd.ly;
            }
        }
        // After ~1.3s against a 1.0s ramp time the target is reached
        assert!((prev - 0.6 / hardware::LINEAR).abs() < 1e-4);
    }

    #[test]
    fn test_instant_stop_on_release() {
        let mut ex = executor();
        for n in 1..=10 {
            ex.process(vel_frame(33 * n, 0.6, 0.0, 0.0));
        }
        let (vx, _, _) = ex.current_velocities();
        assert!(vx > 0.0);

        let cmd = ex.process(vel_frame(1000, 0.0, 0.0, 0.0)).unwrap();
        assert!(cmd.is_zero());
        assert_eq!(ex.current_velocities().0, 0.0);
    }

    #[test]
    fn test_zero_velocity_deduplicated() {
        let mut ex = executor();
        ex.process(vel_frame(33, 0.6, 0.0, 0.0)).unwrap();

        // First zero command goes out
        assert!(ex.process(vel_frame(66, 0.0, 0.0, 0.0)).is_some());
        // Repeats are suppressed
        assert!(ex.process(vel_frame(99, 0.0, 0.0, 0.0)).is_none());
        assert!(ex.process(vel_frame(132, 0.0, 0.0, 0.0)).is_none());

        // Motion resumes: commands flow again
        assert!(ex.process(vel_frame(165, 0.6, 0.0, 0.0)).is_some());
    }

    #[test]
    fn test_large_gap_uses_fallback_dt() {
        let mut ex = executor();
        ex.process(vel_frame(33, 0.6, 0.0, 0.0)).unwrap();
        let (before, _, _) = ex.current_velocities();

        // 5 s stall must not allow a 5 s worth of acceleration in one step
        ex.process(vel_frame(5033, 0.6, 0.0, 0.0)).unwrap();
        let (after, _, _) = ex.current_velocities();
        let max_step = 0.6 / 1.0 * FALLBACK_DT;
        assert!(after - before <= max_step + 1e-5);
    }

    #[test]
    fn test_pose_frame_passes_through_unramped() {
        let mut ex = executor();
        ex.enter_pose();
        let cmd = ex.process(pose_frame(33, 0.7, -0.4)).unwrap();

        // Position targets forward directly, no slew limiting
        assert_eq!(cmd.rx, 0.7);
        assert_eq!(cmd.ry, -0.4);
    }

    #[test]
    fn test_pose_entry_resets_limiters() {
        let mut ex = executor();
        for n in 1..=10 {
            ex.process(vel_frame(33 * n, 0.6, 0.0, 0.0));
        }
        assert!(ex.current_velocities().0 > 0.0);

        ex.enter_pose();
        assert_eq!(ex.current_velocities(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_stale_velocity_frame_dropped_after_pose_entry() {
        let mut ex = executor();
        for n in 1..=60 {
            ex.process(vel_frame(33 * n, 0.6, 0.0, 0.0));
        }
        assert!((ex.current_velocities().0 - 0.6).abs() < 1e-4);

        // The enter sequence takes over a second; frames sampled during the
        // window still carry velocity targets. Under pose semantics their ly
        // would move body height, so they must produce no command at all
        ex.enter_pose();
        assert!(ex.process(vel_frame(33 * 61, 0.6, 0.0, 0.0)).is_none());
        assert!(ex.process(vel_frame(33 * 62, 0.6, 0.0, 0.0)).is_none());
        assert_eq!(ex.current_velocities(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_stale_pose_frame_dropped_after_exit() {
        let mut ex = executor();
        ex.enter_pose();
        ex.process(pose_frame(33, 0.5, 0.0)).unwrap();

        // Pose frames sampled during the exit window carry orientation
        // targets that mean nothing under velocity semantics
        ex.exit_pose();
        assert!(ex.process(pose_frame(66, 0.5, 0.0)).is_none());
    }

    #[test]
    fn test_velocity_resumes_from_zero_after_pose() {
        let mut ex = executor();
        for n in 1..=10 {
            ex.process(vel_frame(33 * n, 0.6, 0.0, 0.0));
        }
        ex.enter_pose();
        ex.process(pose_frame(400, 0.5, 0.0)).unwrap();
        ex.exit_pose();

        // Back to velocity mode: ramp starts from zero, not stale velocity
        let cmd = ex.process(vel_frame(433, 0.6, 0.0, 0.0)).unwrap();
        let max_first_step = 0.6 / 1.0 * FALLBACK_DT / hardware::LINEAR;
        assert!(cmd.ly <= max_first_step + 1e-5);
    }

    #[test]
    fn test_pose_zero_frames_not_deduplicated() {
        let mut ex = executor();
        ex.enter_pose();
        // A centered pose is a meaningful held position, sent every tick
        assert!(ex.process(pose_frame(33, 0.0, 0.0)).is_some());
        assert!(ex.process(pose_frame(66, 0.0, 0.0)).is_some());
    }

    #[test]
    fn test_mode_switches_are_idempotent() {
        let mut ex = executor();
        ex.enter_pose();
        ex.enter_pose();
        assert!(ex.in_pose_mode());
        ex.exit_pose();
        ex.exit_pose();
        assert!(!ex.in_pose_mode());
    }

    #[test]
    fn test_rage_mode_bypasses_limiter() {
        let mut ex = executor();
        let frame = CommandFrame::velocity(
            VelocityFrame {
                vx: 0.6,
                vy: 0.0,
                vyaw: 0.0,
                raw: true,
            },
            Duration::from_millis(33),
        );
        let cmd = ex.process(frame).unwrap();

        // Full target in one frame, still normalized against hardware
        assert!((cmd.ly - 0.6 / hardware::LINEAR).abs() < 1e-6);
    }

    #[test]
    fn test_reset_clears_ordering_state() {
        let mut ex = executor();
        ex.process(vel_frame(330, 0.6, 0.0, 0.0)).unwrap();

        ex.reset();
        // After reset a frame with a smaller timestamp is a new session
        assert!(ex.process(vel_frame(33, 0.6, 0.0, 0.0)).is_some());
    }

    #[test]
    fn test_lowered_limit_clamps_mid_motion() {
        let mut ex = executor();
        for n in 1..=60 {
            ex.process(vel_frame(33 * n, 0.6, 0.0, 0.0));
        }
        assert!((ex.current_velocities().0 - 0.6).abs() < 1e-4);

        let mut cfg = ControlConfig::default();
        cfg.linear.max_velocity = 0.2;
        ex.apply_settings(&cfg);
        assert!((ex.current_velocities().0 - 0.2).abs() < 1e-6);
    }
}
