//! # Device State Module
//!
//! Tracks the current state of the operator's input devices: which movement
//! keys are held, how far the pointer moved since the last sample, and where
//! the gamepad sticks sit.
//!
//! The capture layer (browser events, evdev, gamepad API) is an external
//! collaborator; it feeds already-decoded values in through the setters here.
//! Pointer deltas accumulate between samples and are drained exactly once per
//! tick by the sampler.

/// A movement binding the operator can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Forward (W).
    Forward,
    /// Backward (S).
    Back,
    /// Strafe left (A).
    StrafeLeft,
    /// Strafe right (D).
    StrafeRight,
    /// Pose-mode roll left (Q).
    RollLeft,
    /// Pose-mode roll right (E).
    RollRight,
    /// Pose-mode body up (Space).
    HeightUp,
    /// Pose-mode body down (Ctrl).
    HeightDown,
    /// Pose-mode hold-activation binding.
    PoseHold,
}

/// One opposing pair of digital keys driving a signed axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DigitalPair {
    positive: bool,
    negative: bool,
}

impl DigitalPair {
    /// Signed axis value: +1, -1, or 0 when both or neither key is held.
    fn value(self) -> f32 {
        match (self.positive, self.negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }
}

/// Complete state of the operator's input devices.
///
/// Key and stick state is level-triggered (re-read each tick); pointer deltas
/// are edge-accumulated and drained by [`take_pointer_delta`].
///
/// [`take_pointer_delta`]: DeviceState::take_pointer_delta
///
/// # Examples
///
/// ```
/// use go2_teleop::input::state::{DeviceState, Key};
///
/// let mut state = DeviceState::new();
/// state.press(Key::Forward);
/// assert_eq!(state.forward_axis(), 1.0);
///
/// state.release(Key::Forward);
/// assert_eq!(state.forward_axis(), 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceState {
    // Digital movement keys
    forward: DigitalPair,
    strafe: DigitalPair,

    // Pose-mode keys (spring-back axes)
    roll: DigitalPair,
    height: DigitalPair,

    /// Pose-mode hold binding.
    pose_hold: bool,

    // Accumulated pointer movement since the last sample (pixels)
    pointer_dx: f32,
    pointer_dy: f32,

    // Gamepad sticks, already normalized to [-1, 1]
    /// Left stick X (strafe).
    pub stick_lx: f32,
    /// Left stick Y (forward/back).
    pub stick_ly: f32,
    /// Right stick X (yaw).
    pub stick_rx: f32,
    /// Right stick Y (pitch, pose mode).
    pub stick_ry: f32,
}

impl DeviceState {
    /// Creates a state with nothing held and sticks centered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a key as held.
    pub fn press(&mut self, key: Key) {
        self.set_key(key, true);
    }

    /// Marks a key as released.
    pub fn release(&mut self, key: Key) {
        self.set_key(key, false);
    }

    fn set_key(&mut self, key: Key, held: bool) {
        match key {
            Key::Forward => self.forward.positive = held,
            Key::Back => self.forward.negative = held,
            Key::StrafeRight => self.strafe.positive = held,
            Key::StrafeLeft => self.strafe.negative = held,
            Key::RollRight => self.roll.positive = held,
            Key::RollLeft => self.roll.negative = held,
            Key::HeightUp => self.height.positive = held,
            Key::HeightDown => self.height.negative = held,
            Key::PoseHold => self.pose_hold = held,
        }
    }

    /// Signed forward/back key axis (+1 forward, -1 back, 0 otherwise).
    #[must_use]
    pub fn forward_axis(&self) -> f32 {
        self.forward.value()
    }

    /// Signed strafe key axis (+1 right, -1 left).
    #[must_use]
    pub fn strafe_axis(&self) -> f32 {
        self.strafe.value()
    }

    /// Signed pose-mode roll key axis (+1 right, -1 left).
    #[must_use]
    pub fn roll_axis(&self) -> f32 {
        self.roll.value()
    }

    /// Signed pose-mode height key axis (+1 up, -1 down).
    #[must_use]
    pub fn height_axis(&self) -> f32 {
        self.height.value()
    }

    /// True while the pose-mode hold binding is down.
    #[must_use]
    pub fn pose_hold(&self) -> bool {
        self.pose_hold
    }

    /// Accumulates a pointer movement event.
    pub fn add_pointer_delta(&mut self, dx: f32, dy: f32) {
        self.pointer_dx += dx;
        self.pointer_dy += dy;
    }

    /// Drains the accumulated pointer delta.
    ///
    /// Returns `(dx, dy)` in pixels since the previous drain and resets the
    /// accumulators, so each movement is consumed by exactly one tick.
    pub fn take_pointer_delta(&mut self) -> (f32, f32) {
        let delta = (self.pointer_dx, self.pointer_dy);
        self.pointer_dx = 0.0;
        self.pointer_dy = 0.0;
        delta
    }

    /// Updates the gamepad stick positions, clamping to `[-1, 1]`.
    pub fn set_sticks(&mut self, lx: f32, ly: f32, rx: f32, ry: f32) {
        self.stick_lx = lx.clamp(-1.0, 1.0);
        self.stick_ly = ly.clamp(-1.0, 1.0);
        self.stick_rx = rx.clamp(-1.0, 1.0);
        self.stick_ry = ry.clamp(-1.0, 1.0);
    }

    /// Releases every key and centers the sticks. Pending pointer deltas are
    /// discarded. Used when the capture surface loses focus.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
