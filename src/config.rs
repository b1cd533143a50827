//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Per-axis shaping parameters live in the `[linear]`, `[strafe]` and
//! `[rotation]` sections. Every field has a default, so an empty file is a
//! valid configuration; named presets adjust the axis ceilings and deadzones
//! in one step for operators who do not want to hand-tune each axis.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, TeleopError};
use crate::normalizer::hardware;
use crate::pose::PoseTimings;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct ControlConfig {
    /// Named preset applied on top of the axis sections. When absent, the
    /// axis sections are used as written.
    #[serde(default)]
    pub preset: Option<String>,

    /// Pointer sensitivity for the yaw delta path (rad/s per count).
    #[serde(default = "default_pointer_sensitivity")]
    pub pointer_sensitivity: f32,

    /// Pose-mode pointer sensitivity (normalized units per count).
    #[serde(default = "default_pose_sensitivity")]
    pub pose_sensitivity: f32,

    /// Runtime speed multiplier applied to digital key input.
    #[serde(default = "default_speed_scalar")]
    pub speed_scalar: f32,

    #[serde(default = "default_linear_axis")]
    pub linear: AxisConfig,

    #[serde(default = "default_strafe_axis")]
    pub strafe: AxisConfig,

    #[serde(default = "default_rotation_axis")]
    pub rotation: AxisConfig,

    #[serde(default)]
    pub pose: PoseConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Shaping and rate-limit parameters for one velocity axis
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct AxisConfig {
    /// Response curve exponent. 1.0 is linear, higher softens the center.
    #[serde(default = "default_alpha")]
    pub alpha: f32,

    /// Normalized input below which the axis reads zero.
    #[serde(default = "default_deadzone")]
    pub deadzone: f32,

    /// User velocity ceiling in physical units.
    #[serde(default = "default_max_velocity")]
    pub max_velocity: f32,

    /// Seconds to ramp from zero to the ceiling.
    #[serde(default = "default_ramp_time")]
    pub ramp_time: f32,
}

/// Pose-mode sequencing delays
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct PoseConfig {
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    #[serde(default = "default_ack_timeout_ms")]
    pub ack_timeout_ms: u64,

    #[serde(default = "default_exit_stabilize_ms")]
    pub exit_stabilize_ms: u64,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            ack_timeout_ms: default_ack_timeout_ms(),
            exit_stabilize_ms: default_exit_stabilize_ms(),
        }
    }
}

impl PoseConfig {
    /// Converts the millisecond fields into controller timings.
    #[must_use]
    pub fn timings(&self) -> PoseTimings {
        PoseTimings {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            ack_timeout: Duration::from_millis(self.ack_timeout_ms),
            exit_stabilize: Duration::from_millis(self.exit_stabilize_ms),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
        }
    }
}

// Default value functions
fn default_pointer_sensitivity() -> f32 { 0.002 }
fn default_pose_sensitivity() -> f32 { 0.001 }
fn default_speed_scalar() -> f32 { 1.0 }

fn default_alpha() -> f32 { 1.5 }
fn default_deadzone() -> f32 { 0.10 }
fn default_max_velocity() -> f32 { 0.6 }
fn default_ramp_time() -> f32 { 1.0 }

fn default_linear_axis() -> AxisConfig {
    AxisConfig {
        alpha: 1.5,
        deadzone: 0.10,
        max_velocity: 0.6,
        ramp_time: 1.0,
    }
}

fn default_strafe_axis() -> AxisConfig {
    AxisConfig {
        alpha: 1.2,
        deadzone: 0.10,
        max_velocity: 0.4,
        ramp_time: 0.2,
    }
}

fn default_rotation_axis() -> AxisConfig {
    AxisConfig {
        alpha: 2.5,
        deadzone: 0.10,
        max_velocity: 0.8,
        ramp_time: 0.9,
    }
}

fn default_settle_delay_ms() -> u64 { 200 }
fn default_ack_timeout_ms() -> u64 { 1000 }
fn default_exit_stabilize_ms() -> u64 { 1000 }

fn default_telemetry_enabled() -> bool { true }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            preset: None,
            pointer_sensitivity: default_pointer_sensitivity(),
            pose_sensitivity: default_pose_sensitivity(),
            speed_scalar: default_speed_scalar(),
            linear: default_linear_axis(),
            strafe: default_strafe_axis(),
            rotation: default_rotation_axis(),
            pose: PoseConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// Named tuning presets, ordered from most to least restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Beginner,
    Normal,
    Advanced,
    Sport,
}

impl Preset {
    /// Parses a preset name (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "normal" => Ok(Self::Normal),
            "advanced" => Ok(Self::Advanced),
            "sport" => Ok(Self::Sport),
            other => Err(TeleopError::Config(toml::de::Error::custom(format!(
                "unknown preset '{}' (expected beginner, normal, advanced or sport)",
                other
            )))),
        }
    }

    /// (deadzone, max_linear, max_strafe, max_rotation, speed_scalar)
    fn tuning(self) -> (f32, f32, f32, f32, f32) {
        match self {
            Self::Beginner => (0.15, 0.4, 0.3, 0.5, 0.7),
            Self::Normal => (0.10, 0.6, 0.4, 0.8, 1.0),
            Self::Advanced => (0.05, 0.6, 0.4, 0.8, 1.3),
            Self::Sport => (0.05, 0.6, 0.4, 0.8, 1.5),
        }
    }
}

impl ControlConfig {
    /// Load configuration from a TOML file
    ///
    /// Applies the named preset, then validates.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use go2_teleop::config::ControlConfig;
    ///
    /// let config = ControlConfig::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: ControlConfig = toml::from_str(&contents)?;
        if let Some(name) = config.preset.clone() {
            config.apply_preset(Preset::from_name(&name)?);
        }
        config.validate()?;
        Ok(config)
    }

    /// Overwrites the deadzones, velocity ceilings and speed scalar with the
    /// preset's tuning. Curve exponents and ramp times are left alone.
    pub fn apply_preset(&mut self, preset: Preset) {
        let (deadzone, max_linear, max_strafe, max_rotation, speed_scalar) = preset.tuning();
        self.linear.deadzone = deadzone;
        self.strafe.deadzone = deadzone;
        self.rotation.deadzone = deadzone;
        self.linear.max_velocity = max_linear;
        self.strafe.max_velocity = max_strafe;
        self.rotation.max_velocity = max_rotation;
        self.speed_scalar = speed_scalar;
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        for (name, axis, hardware_limit) in [
            ("linear", &self.linear, hardware::LINEAR),
            ("strafe", &self.strafe, hardware::STRAFE),
            ("rotation", &self.rotation, hardware::ROTATION),
        ] {
            if axis.alpha <= 0.0 || axis.alpha > 10.0 {
                return Err(TeleopError::Config(toml::de::Error::custom(format!(
                    "{} alpha must be between 0.0 (exclusive) and 10.0",
                    name
                ))));
            }

            if axis.deadzone < 0.0 || axis.deadzone >= 1.0 {
                return Err(TeleopError::Config(toml::de::Error::custom(format!(
                    "{} deadzone must be between 0.0 and 1.0 (exclusive)",
                    name
                ))));
            }

            if axis.max_velocity <= 0.0 || axis.max_velocity > hardware_limit {
                return Err(TeleopError::Config(toml::de::Error::custom(format!(
                    "{} max_velocity must be between 0.0 (exclusive) and the hardware limit {}",
                    name, hardware_limit
                ))));
            }

            if axis.ramp_time <= 0.0 || axis.ramp_time > 10.0 {
                return Err(TeleopError::Config(toml::de::Error::custom(format!(
                    "{} ramp_time must be between 0.0 (exclusive) and 10.0 seconds",
                    name
                ))));
            }
        }

        if self.pointer_sensitivity <= 0.0 || self.pointer_sensitivity > 1.0 {
            return Err(TeleopError::Config(toml::de::Error::custom(
                "pointer_sensitivity must be between 0.0 (exclusive) and 1.0",
            )));
        }

        if self.pose_sensitivity <= 0.0 || self.pose_sensitivity > 1.0 {
            return Err(TeleopError::Config(toml::de::Error::custom(
                "pose_sensitivity must be between 0.0 (exclusive) and 1.0",
            )));
        }

        if self.speed_scalar < 0.1 || self.speed_scalar > 2.0 {
            return Err(TeleopError::Config(toml::de::Error::custom(
                "speed_scalar must be between 0.1 and 2.0",
            )));
        }

        if self.pose.settle_delay_ms == 0 || self.pose.settle_delay_ms > 5000 {
            return Err(TeleopError::Config(toml::de::Error::custom(
                "pose settle_delay_ms must be between 1 and 5000",
            )));
        }

        if self.pose.ack_timeout_ms == 0 || self.pose.ack_timeout_ms > 10000 {
            return Err(TeleopError::Config(toml::de::Error::custom(
                "pose ack_timeout_ms must be between 1 and 10000",
            )));
        }

        if self.pose.exit_stabilize_ms == 0 || self.pose.exit_stabilize_ms > 10000 {
            return Err(TeleopError::Config(toml::de::Error::custom(
                "pose exit_stabilize_ms must be between 1 and 10000",
            )));
        }

        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(TeleopError::Config(toml::de::Error::custom(
                "telemetry log_dir cannot be empty when enabled",
            )));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(TeleopError::Config(toml::de::Error::custom(
                "max_records_per_file must be greater than 0",
            )));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(TeleopError::Config(toml::de::Error::custom(
                "max_files_to_keep must be greater than 0",
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ControlConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_axis_tuning() {
        let config = ControlConfig::default();
        assert_eq!(config.linear.alpha, 1.5);
        assert_eq!(config.strafe.alpha, 1.2);
        assert_eq!(config.rotation.alpha, 2.5);
        assert_eq!(config.linear.ramp_time, 1.0);
        assert_eq!(config.strafe.ramp_time, 0.2);
        assert_eq!(config.rotation.ramp_time, 0.9);
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!(Preset::from_name("beginner").unwrap(), Preset::Beginner);
        assert_eq!(Preset::from_name("SPORT").unwrap(), Preset::Sport);
        assert!(Preset::from_name("turbo").is_err());
    }

    #[test]
    fn test_beginner_preset_tuning() {
        let mut config = ControlConfig::default();
        config.apply_preset(Preset::Beginner);
        assert_eq!(config.linear.deadzone, 0.15);
        assert_eq!(config.linear.max_velocity, 0.4);
        assert_eq!(config.strafe.max_velocity, 0.3);
        assert_eq!(config.rotation.max_velocity, 0.5);
        assert_eq!(config.speed_scalar, 0.7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_preset_preserves_curve_shape() {
        let mut config = ControlConfig::default();
        config.apply_preset(Preset::Sport);
        assert_eq!(config.rotation.alpha, 2.5);
        assert_eq!(config.linear.ramp_time, 1.0);
    }

    #[test]
    fn test_max_velocity_above_hardware_limit() {
        let mut config = ControlConfig::default();
        config.linear.max_velocity = hardware::LINEAR + 0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_strafe_hardware_limit_tighter_than_linear() {
        let mut config = ControlConfig::default();
        // 2.0 would be fine on the linear axis but not on strafe
        config.strafe.max_velocity = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_velocity_zero() {
        let mut config = ControlConfig::default();
        config.rotation.max_velocity = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deadzone_out_of_range() {
        let mut config = ControlConfig::default();
        config.linear.deadzone = 1.0;
        assert!(config.validate().is_err());

        config.linear.deadzone = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ramp_time_zero() {
        let mut config = ControlConfig::default();
        config.strafe.ramp_time = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_alpha_out_of_range() {
        let mut config = ControlConfig::default();
        config.rotation.alpha = 0.0;
        assert!(config.validate().is_err());

        config.rotation.alpha = 11.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_speed_scalar_out_of_range() {
        let mut config = ControlConfig::default();
        config.speed_scalar = 0.05;
        assert!(config.validate().is_err());

        config.speed_scalar = 2.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pose_timing_zero() {
        let mut config = ControlConfig::default();
        config.pose.settle_delay_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pose_timings_conversion() {
        let config = ControlConfig::default();
        let timings = config.pose.timings();
        assert_eq!(timings.settle_delay, Duration::from_millis(200));
        assert_eq!(timings.ack_timeout, Duration::from_millis(1000));
        assert_eq!(timings.exit_stabilize, Duration::from_millis(1000));
    }

    #[test]
    fn test_empty_log_dir_when_enabled() {
        let mut config = ControlConfig::default();
        config.telemetry.enabled = true;
        config.telemetry.log_dir = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_dir_when_disabled() {
        let mut config = ControlConfig::default();
        config.telemetry.enabled = false;
        config.telemetry.log_dir = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_records_per_file_zero() {
        let mut config = ControlConfig::default();
        config.telemetry.max_records_per_file = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
preset = "advanced"

[linear]
max_velocity = 0.5

[telemetry]
enabled = false
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = ControlConfig::load(temp_file.path()).unwrap();
        // Preset tuning wins over the axis section
        assert_eq!(config.linear.max_velocity, 0.6);
        assert_eq!(config.speed_scalar, 1.3);
        assert!(!config.telemetry.enabled);
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"").unwrap();
        temp_file.flush().unwrap();

        let config = ControlConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.linear.max_velocity, 0.6);
        assert_eq!(config.rotation.alpha, 2.5);
    }

    #[test]
    fn test_load_unknown_preset_fails() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"preset = \"turbo\"").unwrap();
        temp_file.flush().unwrap();

        assert!(ControlConfig::load(temp_file.path()).is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_pointer_sensitivity(), 0.002);
        assert_eq!(default_pose_sensitivity(), 0.001);
        assert_eq!(default_speed_scalar(), 1.0);
        assert_eq!(default_settle_delay_ms(), 200);
        assert_eq!(default_ack_timeout_ms(), 1000);
        assert_eq!(default_exit_stabilize_ms(), 1000);
        assert_eq!(default_max_records_per_file(), 10000);
        assert_eq!(default_max_files_to_keep(), 10);
    }
}
