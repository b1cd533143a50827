//! # Input Sampler Module
//!
//! Fixed-rate sampling of device state into command frames.
//!
//! The sampler runs on a periodic timer (default 30 Hz), never on raw input
//! events: event-driven sampling would produce bursty, variable-rate frames
//! the downstream rate limiter cannot reason about. Each tick re-derives the
//! digital axes from the currently held keys, drains the pointer accumulator,
//! shapes each axis through its configured strategy, and emits exactly one
//! [`CommandFrame`] tagged with a monotonic timestamp.
//!
//! ## Pose mode
//!
//! While pose mode is active the same tick produces a pose frame instead:
//! pointer deltas integrate into persistent yaw/pitch accumulators (position
//! semantics, clamped to `[-1, 1]` after each update), while roll and height
//! come straight from the held keys (spring-back semantics, no integration).
//! The velocity-shaping path is bypassed entirely.

use std::time::{Duration, Instant};

use crate::command::{CommandFrame, PoseFrame, VelocityFrame};
use crate::config::ControlConfig;
use crate::curve::{PointerScale, ResponseCurve};
use crate::input::state::DeviceState;

/// Default sampling period (30 Hz).
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(33);

/// Pose-mode orientation accumulators.
///
/// `yaw` and `pitch` persist across ticks while pose mode is active and are
/// discarded on exit, so re-entry always starts centered.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PoseAccumulator {
    yaw: f32,
    pitch: f32,
}

/// Produces one command frame per tick from the current device state.
///
/// Owns the pose accumulators and the per-axis shaping configuration. The
/// slew-rate limiter state lives on the receiving side and is never touched
/// here.
#[derive(Debug)]
pub struct InputSampler {
    forward: ResponseCurve,
    strafe: ResponseCurve,
    yaw_stick: ResponseCurve,
    yaw_pointer: PointerScale,

    /// Global speed scalar applied to digital keys and the pointer path.
    speed_scalar: f32,
    /// Pose-mode gain: accumulator units per pixel of pointer movement.
    pose_sensitivity: f32,

    pose_active: bool,
    pose: PoseAccumulator,

    started: Instant,
}

impl InputSampler {
    /// Builds a sampler from the control configuration.
    #[must_use]
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            forward: ResponseCurve::new(
                config.linear.alpha,
                config.linear.deadzone,
                config.linear.max_velocity,
            ),
            strafe: ResponseCurve::new(
                config.strafe.alpha,
                config.strafe.deadzone,
                config.strafe.max_velocity,
            ),
            yaw_stick: ResponseCurve::new(
                config.rotation.alpha,
                config.rotation.deadzone,
                config.rotation.max_velocity,
            ),
            yaw_pointer: PointerScale::new(
                config.pointer_sensitivity,
                config.rotation.max_velocity,
            ),
            speed_scalar: config.speed_scalar,
            pose_sensitivity: config.pose_sensitivity,
            pose_active: false,
            pose: PoseAccumulator::default(),
            started: Instant::now(),
        }
    }

    /// Returns the current speed scalar.
    #[must_use]
    pub fn speed_scalar(&self) -> f32 {
        self.speed_scalar
    }

    /// Updates the speed scalar, clamped to `(0, 2]`.
    pub fn set_speed_scalar(&mut self, scalar: f32) {
        self.speed_scalar = scalar.clamp(0.1, 2.0);
    }

    /// True while the sampler is emitting pose frames.
    #[must_use]
    pub fn pose_active(&self) -> bool {
        self.pose_active
    }

    /// Switches between velocity and pose frame production.
    ///
    /// Leaving pose mode discards the orientation accumulators so the next
    /// entry starts centered.
    pub fn set_pose_active(&mut self, active: bool) {
        if self.pose_active && !active {
            self.pose = PoseAccumulator::default();
        }
        self.pose_active = active;
    }

    /// Samples the device state, stamping the frame with the sampler clock.
    pub fn sample(&mut self, state: &mut DeviceState) -> CommandFrame {
        let timestamp = self.started.elapsed();
        self.sample_at(state, timestamp)
    }

    /// Samples the device state with an explicit timestamp.
    ///
    /// Exposed for deterministic tests; production code uses [`sample`].
    ///
    /// [`sample`]: InputSampler::sample
    pub fn sample_at(&mut self, state: &mut DeviceState, timestamp: Duration) -> CommandFrame {
        if self.pose_active {
            self.sample_pose(state, timestamp)
        } else {
            self.sample_velocity(state, timestamp)
        }
    }

    fn sample_velocity(&mut self, state: &mut DeviceState, timestamp: Duration) -> CommandFrame {
        // Digital keys contribute +/- speed_scalar, sticks their raw
        // position; both are bounded so the sum is clamped before shaping
        let forward_in =
            (state.forward_axis() * self.speed_scalar + state.stick_ly).clamp(-1.0, 1.0);
        let strafe_in =
            (state.strafe_axis() * self.speed_scalar + state.stick_lx).clamp(-1.0, 1.0);

        let vx = self.forward.shape(forward_in);
        let strafe = self.strafe.shape(strafe_in);

        // Yaw merges the curved stick path with the linear pointer path.
        // Pointer deltas are unbounded per tick and never go through the
        // curve; their path carries its own sensitivity and ceiling.
        let (dx, _dy) = state.take_pointer_delta();
        let yaw_cmd = self.yaw_stick.shape(state.stick_rx)
            + self.yaw_pointer.scale(dx, self.speed_scalar);
        let yaw_max = self.yaw_stick.max_velocity();
        let yaw_cmd = yaw_cmd.clamp(-yaw_max, yaw_max);

        // Robot frame: +vy is leftward, +vyaw is counter-clockwise
        CommandFrame::velocity(
            VelocityFrame {
                vx,
                vy: -strafe,
                vyaw: -yaw_cmd,
                raw: false,
            },
            timestamp,
        )
    }

    fn sample_pose(&mut self, state: &mut DeviceState, timestamp: Duration) -> CommandFrame {
        // Position semantics: integrate and hold, clamp after each update
        let (dx, dy) = state.take_pointer_delta();
        self.pose.yaw = (self.pose.yaw + dx * self.pose_sensitivity).clamp(-1.0, 1.0);
        self.pose.pitch = (self.pose.pitch + dy * self.pose_sensitivity).clamp(-1.0, 1.0);

        // Spring-back semantics: re-derived from held keys, no integration
        let roll = state.roll_axis();
        let height = state.height_axis();

        CommandFrame::pose(
            PoseFrame {
                roll,
                height,
                yaw: self.pose.yaw,
                pitch: self.pose.pitch,
            },
            timestamp,
        )
    }
}
