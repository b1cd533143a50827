//! # Input Module
//!
//! Device state tracking and fixed-rate sampling.
//!
//! This module handles:
//! - Held-key, pointer-delta, and stick state ([`state::DeviceState`])
//! - Fixed-rate frame production ([`sampler::InputSampler`])
//! - Pose-mode accumulation of orientation targets

pub mod sampler;
pub mod state;
