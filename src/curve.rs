//! # Response Curve Module
//!
//! Applies deadzones and exponential response curves to normalized inputs,
//! producing per-axis velocity targets in physical units.
//!
//! ## Deadzone
//!
//! A deadzone eliminates small inputs near center to prevent drift and noise
//! from producing motion. Values within the deadzone map to 0.0; the range
//! above it is rescaled so the output stays continuous.
//!
//! ## Exponential Curves
//!
//! The curve exponent (alpha) shapes the interior of the input range:
//!
//! - `alpha < 1.0`: concave, more output at small deflections
//! - `alpha = 1.0`: linear
//! - `alpha > 1.0`: convex, finer control near center
//!
//! Full deflection always produces the configured maximum regardless of alpha,
//! since `1^alpha == 1`. Alpha shapes the interior of the range only.
//!
//! ## Pointer input
//!
//! Mouse deltas are unbounded per tick and never go through [`ResponseCurve`]:
//! clamping them first would destroy fast-flick dynamic range, and a convex
//! alpha would crush small movements. [`PointerScale`] is the separate linear
//! path with its own sensitivity and safety ceiling.
//!
//! ## Usage
//!
//! ```
//! use go2_teleop::curve::ResponseCurve;
//!
//! let curve = ResponseCurve::new(1.5, 0.10, 0.6); // alpha, deadzone, max m/s
//!
//! // Input inside the deadzone
//! assert_eq!(curve.shape(0.05), 0.0);
//!
//! // Full deflection reaches max velocity exactly
//! assert!((curve.shape(1.0) - 0.6).abs() < 1e-6);
//! ```

/// Maps a normalized input in `[-1, 1]` to a velocity target.
///
/// Output magnitude never exceeds `max_velocity`.
#[derive(Debug, Clone, Copy)]
pub struct ResponseCurve {
    /// Curve exponent. 1.0 is linear.
    alpha: f32,
    /// Deadzone as a fraction of the input range (0.0 to just under 1.0).
    deadzone: f32,
    /// Velocity at full deflection (m/s or rad/s).
    max_velocity: f32,
}

impl ResponseCurve {
    /// Creates a new response curve.
    ///
    /// # Arguments
    ///
    /// * `alpha` - Curve exponent. Values below 0.1 are clamped.
    /// * `deadzone` - Deadzone fraction, clamped to `[0.0, 0.99]`.
    /// * `max_velocity` - Output at full deflection (physical units).
    #[must_use]
    pub fn new(alpha: f32, deadzone: f32, max_velocity: f32) -> Self {
        Self {
            alpha: alpha.max(0.1),
            deadzone: deadzone.clamp(0.0, 0.99),
            max_velocity,
        }
    }

    /// Creates a linear curve (no deadzone, alpha = 1).
    #[must_use]
    pub fn linear(max_velocity: f32) -> Self {
        Self {
            alpha: 1.0,
            deadzone: 0.0,
            max_velocity,
        }
    }

    /// Returns the configured curve exponent.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Returns the configured deadzone.
    #[must_use]
    pub fn deadzone(&self) -> f32 {
        self.deadzone
    }

    /// Returns the velocity at full deflection.
    #[must_use]
    pub fn max_velocity(&self) -> f32 {
        self.max_velocity
    }

    /// Shapes a normalized input into a velocity target.
    ///
    /// Inputs outside `[-1, 1]` are clamped first. Inputs inside the deadzone
    /// return 0 regardless of sign.
    ///
    /// # Examples
    ///
    /// ```
    /// use go2_teleop::curve::ResponseCurve;
    ///
    /// let curve = ResponseCurve::new(1.0, 0.10, 1.0);
    ///
    /// assert_eq!(curve.shape(0.08), 0.0);
    /// // Halfway between deadzone and full scale, linear curve
    /// assert!((curve.shape(0.55) - 0.5).abs() < 1e-3);
    /// assert!((curve.shape(-0.55) + 0.5).abs() < 1e-3);
    /// ```
    #[must_use]
    pub fn shape(&self, input: f32) -> f32 {
        let clamped = input.clamp(-1.0, 1.0);
        let mag = clamped.abs();

        if mag < self.deadzone {
            return 0.0;
        }

        let normalized = (mag - self.deadzone) / (1.0 - self.deadzone);
        let curved = normalized.powf(self.alpha);
        curved * self.max_velocity * clamped.signum()
    }
}

/// Linear scaling path for unbounded pointer deltas.
///
/// Accumulated pixel deltas are multiplied by a fixed sensitivity and the
/// current speed scalar, then clamped to `max_velocity * speed_scalar`. The
/// ceiling scales with the speed scalar so that a slow setting also slows
/// mouse-driven yaw, matching the digital axes.
#[derive(Debug, Clone, Copy)]
pub struct PointerScale {
    /// Velocity per pixel of pointer movement per tick.
    sensitivity: f32,
    /// Velocity ceiling at 100% speed scalar (physical units).
    max_velocity: f32,
}

impl PointerScale {
    /// Creates a new pointer scaling path.
    #[must_use]
    pub fn new(sensitivity: f32, max_velocity: f32) -> Self {
        Self {
            sensitivity,
            max_velocity,
        }
    }

    /// Returns the configured sensitivity.
    #[must_use]
    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    /// Maps an accumulated pointer delta to a velocity target.
    ///
    /// # Arguments
    ///
    /// * `delta` - Pixels moved since the previous tick (unbounded, signed)
    /// * `speed_scalar` - Current speed scalar in `(0, 2]`
    #[must_use]
    pub fn scale(&self, delta: f32, speed_scalar: f32) -> f32 {
        let ceiling = (self.max_velocity * speed_scalar).abs();
        (delta * self.sensitivity * speed_scalar).clamp(-ceiling, ceiling)
    }
}

/// Per-axis shaping strategy.
///
/// Bounded sources (keys, sticks) go through the response curve; the
/// pointer-driven axis uses the linear path. The variant is selected per
/// axis-and-source combination when the sampler is built, not branched on
/// inside the shared curve function.
#[derive(Debug, Clone, Copy)]
pub enum AxisShaper {
    /// Deadzone + exponential curve for inputs already in `[-1, 1]`.
    Curved(ResponseCurve),
    /// Linear sensitivity scaling for unbounded pointer deltas.
    Pointer(PointerScale),
}

impl AxisShaper {
    /// Applies the shaping strategy to a raw axis value.
    #[must_use]
    pub fn apply(&self, raw: f32, speed_scalar: f32) -> f32 {
        match self {
            AxisShaper::Curved(curve) => curve.shape(raw),
            AxisShaper::Pointer(scale) => scale.scale(raw, speed_scalar),
        }
    }
}
