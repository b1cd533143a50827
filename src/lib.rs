//! # go2-teleop Library
//!
//! Teleoperate a Unitree Go2 quadruped from keyboard, mouse, and gamepad input.
//!
//! This library provides the velocity-shaping pipeline that turns raw human
//! input into safe, hardware-compliant motion commands: per-axis response
//! curves, a fixed-rate input sampler, an asymmetric slew-rate limiter, and
//! re-normalization against the robot's physical limits.

pub mod channel;
pub mod command;
pub mod config;
pub mod curve;
pub mod error;
pub mod input;
pub mod limiter;
pub mod normalizer;
pub mod pose;
pub mod robot;
pub mod telemetry;
