//! # Robot Module
//!
//! The robot-facing side of the pipeline.
//!
//! This module handles:
//! - The transport seam ([`link::RobotLink`]) over which actuator commands
//!   and discrete sport requests travel
//! - The frame executor ([`executor::Executor`]) that applies slew-rate
//!   limiting and hardware normalization to incoming command frames

pub mod executor;
pub mod link;
