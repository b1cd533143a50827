//! # Command Types Module
//!
//! Frame and payload definitions for the controller-to-robot command path.
//!
//! A [`CommandFrame`] is one self-contained snapshot of desired axis values,
//! produced once per sampling tick. Velocity frames carry physical velocity
//! targets for the locomotion axes; pose frames carry normalized orientation
//! targets and remap the same channel fields to position semantics. The two
//! variants are a tagged union so the downstream consumer dispatches on the
//! frame instead of branching on a mode flag throughout the pipeline.
//!
//! The outbound [`ActuatorCommand`] mirrors the Go2 WirelessController topic
//! payload: four normalized joystick fields plus a discrete keys field.

use bytes::Bytes;
use serde::Serialize;
use std::time::Duration;

/// Sport-mode API identifiers for discrete robot requests.
///
/// These match the Go2 data-channel sport command ids.
pub mod api {
    /// Damp all motors (emergency stop).
    pub const DAMP: u32 = 1001;
    /// Balance stand, required before AI-mode movement.
    pub const BALANCE_STAND: u32 = 1002;
    /// Stop all movement.
    pub const STOP_MOVE: u32 = 1003;
    /// Stand up.
    pub const STAND_UP: u32 = 1004;
    /// Crouch down.
    pub const STAND_DOWN: u32 = 1005;
    /// Recovery stand. The only command that reliably exits pose mode.
    pub const RECOVERY_STAND: u32 = 1006;
    /// Toggle pose mode. A stateless toggle, not a "set" command.
    pub const POSE: u32 = 1028;
}

/// Velocity targets for the locomotion axes, in physical units.
///
/// Values are already shaped and scaled by the sampler; the receiving side
/// applies slew-rate limiting and hardware re-normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityFrame {
    /// Forward/back target (m/s, +forward).
    pub vx: f32,
    /// Strafe target (m/s, +left).
    pub vy: f32,
    /// Yaw rotation target (rad/s, +counter-clockwise).
    pub vyaw: f32,
    /// Bypass slew-rate limiting for this frame (rage mode).
    pub raw: bool,
}

impl VelocityFrame {
    /// A frame commanding zero velocity on all axes.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            vx: 0.0,
            vy: 0.0,
            vyaw: 0.0,
            raw: false,
        }
    }
}

/// Orientation and rate targets for pose mode, all normalized to `[-1, 1]`.
///
/// `roll` and `height` are spring-back rates recomputed each tick; `yaw` and
/// `pitch` are accumulated positions that hold until changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseFrame {
    /// Body roll rate (spring-back).
    pub roll: f32,
    /// Body height rate (spring-back).
    pub height: f32,
    /// Accumulated yaw position.
    pub yaw: f32,
    /// Accumulated pitch position.
    pub pitch: f32,
}

impl PoseFrame {
    /// Returns a copy with every field clamped to `[-1, 1]`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            roll: self.roll.clamp(-1.0, 1.0),
            height: self.height.clamp(-1.0, 1.0),
            yaw: self.yaw.clamp(-1.0, 1.0),
            pitch: self.pitch.clamp(-1.0, 1.0),
        }
    }
}

/// Desired axis values for one sampling tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameBody {
    /// Locomotion velocity targets.
    Velocity(VelocityFrame),
    /// Pose-mode position/rate targets.
    Pose(PoseFrame),
}

/// One command frame: a frame body plus a monotonic timestamp.
///
/// Timestamps are measured from session start. The consumer discards frames
/// whose timestamp is not strictly greater than the last processed one, so
/// `dt` on the receiving side can never be zero or negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandFrame {
    /// Desired axis values.
    pub body: FrameBody,
    /// Monotonic time since session start.
    pub timestamp: Duration,
}

impl CommandFrame {
    /// Creates a velocity frame.
    #[must_use]
    pub fn velocity(frame: VelocityFrame, timestamp: Duration) -> Self {
        Self {
            body: FrameBody::Velocity(frame),
            timestamp,
        }
    }

    /// Creates a pose frame, clamping every field to `[-1, 1]`.
    #[must_use]
    pub fn pose(frame: PoseFrame, timestamp: Duration) -> Self {
        Self {
            body: FrameBody::Pose(frame.clamped()),
            timestamp,
        }
    }

    /// True if this is a pose-mode frame.
    #[must_use]
    pub fn is_pose(&self) -> bool {
        matches!(self.body, FrameBody::Pose(_))
    }
}

/// Outbound joystick-emulation payload for the WirelessController topic.
///
/// All four axis fields are normalized to `[-1, 1]`, where 1.0 is the robot's
/// full hardware capability. In velocity mode `ry` must stay 0: driving pitch
/// through the Euler API switches the robot out of AI mode and breaks WASD
/// movement, so pitch is only sent while pose mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActuatorCommand {
    /// Strafe / roll channel.
    pub lx: f32,
    /// Forward / height channel.
    pub ly: f32,
    /// Yaw channel.
    pub rx: f32,
    /// Pitch channel (pose mode only).
    pub ry: f32,
    /// Discrete keys field.
    pub keys: u32,
}

impl ActuatorCommand {
    /// A command with all axes centered.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            lx: 0.0,
            ly: 0.0,
            rx: 0.0,
            ry: 0.0,
            keys: 0,
        }
    }

    /// True if every axis is within the stop threshold.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.lx.abs() < 1e-3 && self.ly.abs() < 1e-3 && self.rx.abs() < 1e-3 && self.ry.abs() < 1e-3
    }

    /// Encodes the command as the JSON wire payload.
    ///
    /// Axis values are rounded to four decimal places to keep the payload
    /// stable across ticks with unchanged input.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let rounded = Self {
            lx: round4(self.lx),
            ly: round4(self.ly),
            rx: round4(self.rx),
            ry: round4(self.ry),
            keys: self.keys,
        };
        // Serialize is derived over plain floats; this cannot fail
        Bytes::from(serde_json::to_vec(&rounded).unwrap_or_default())
    }
}

fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}
