//! # Hardware Normalizer Module
//!
//! Re-expresses rate-limited velocities as normalized actuator commands.
//!
//! The WirelessController topic expects joystick values in `[-1, 1]` where
//! 1.0 is the robot's full physical capability. Division therefore uses the
//! fixed hardware ceilings, never the user-configurable maxima: dividing by
//! the user max would cancel it out entirely (the value was multiplied by it
//! upstream) and the robot would always see full deflection regardless of the
//! user's speed limit. Dividing by the hardware constant keeps the intended
//! scaling: commanding 50% of the user max reaches the actuator as 50% of
//! the user max over the hardware envelope.

use crate::command::ActuatorCommand;

/// Go2 physical velocity ceilings. Constant, never user-configurable.
pub mod hardware {
    /// Max forward/back velocity (m/s).
    pub const LINEAR: f32 = 5.0;
    /// Max strafe velocity (m/s).
    pub const STRAFE: f32 = 1.0;
    /// Max yaw rotation velocity (rad/s).
    pub const ROTATION: f32 = 3.0;
    /// Max pitch angle (rad, ~20 degrees).
    pub const PITCH: f32 = 0.35;
}

/// Normalizes physical velocities against the fixed hardware ceilings.
#[derive(Debug, Clone, Copy)]
pub struct HardwareNormalizer {
    /// User ceiling for forward/back, used for the defensive pre-clamp.
    max_linear: f32,
    /// User ceiling for strafe.
    max_strafe: f32,
    /// User ceiling for rotation.
    max_rotation: f32,
}

impl HardwareNormalizer {
    /// Creates a normalizer with the given user velocity ceilings.
    ///
    /// Each ceiling is clamped to its hardware limit; configuration load
    /// rejects violations before this point, so the clamp is a backstop.
    #[must_use]
    pub fn new(max_linear: f32, max_strafe: f32, max_rotation: f32) -> Self {
        Self {
            max_linear: max_linear.min(hardware::LINEAR),
            max_strafe: max_strafe.min(hardware::STRAFE),
            max_rotation: max_rotation.min(hardware::ROTATION),
        }
    }

    /// Converts rate-limited physical velocities into an actuator command.
    ///
    /// Applies the original joystick sign conventions: forward velocity maps
    /// to `+ly`, leftward strafe to `-lx`, counter-clockwise yaw to `-rx`.
    /// `ry` stays 0 here; pose mode fills it separately.
    #[must_use]
    pub fn normalize(&self, vx: f32, vy: f32, vyaw: f32) -> ActuatorCommand {
        // Defensive clamp against the user ceilings; should already hold
        let vx = vx.clamp(-self.max_linear, self.max_linear);
        let vy = vy.clamp(-self.max_strafe, self.max_strafe);
        let vyaw = vyaw.clamp(-self.max_rotation, self.max_rotation);

        let ly = (vx / hardware::LINEAR).clamp(-1.0, 1.0);
        let lx = (-vy / hardware::STRAFE).clamp(-1.0, 1.0);
        let rx = (-vyaw / hardware::ROTATION).clamp(-1.0, 1.0);

        ActuatorCommand {
            lx,
            ly,
            rx,
            ry: 0.0,
            keys: 0,
        }
    }

    /// Updates the user velocity ceilings.
    pub fn set_limits(&mut self, max_linear: f32, max_strafe: f32, max_rotation: f32) {
        self.max_linear = max_linear.min(hardware::LINEAR);
        self.max_strafe = max_strafe.min(hardware::STRAFE);
        self.max_rotation = max_rotation.min(hardware::ROTATION);
    }
}
