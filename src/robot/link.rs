//! Trait abstraction for the robot transport to enable testing.
//!
//! The physical transport (a WebRTC data channel on the real robot) is an
//! external collaborator; the pipeline only needs two operations from it:
//! best-effort publication of routine actuator frames, and acknowledged
//! requests for discrete sport-mode commands.

use async_trait::async_trait;
use bytes::Bytes;

use crate::command::ActuatorCommand;
use crate::error::Result;

/// Transport operations the pipeline needs from the robot connection.
#[async_trait]
pub trait RobotLink: Send {
    /// Publishes one actuator frame. Best-effort, no acknowledgment.
    async fn publish(&mut self, payload: Bytes) -> Result<()>;

    /// Issues a discrete sport-mode request and waits for its status code.
    async fn request(&mut self, api_id: u32) -> Result<u32>;
}

/// Convenience wrapper: encode and publish an actuator command.
pub async fn publish_command<L: RobotLink + ?Sized>(
    link: &mut L,
    command: &ActuatorCommand,
) -> Result<()> {
    link.publish(command.encode()).await
}

/// A link that drops everything, for running without a robot.
#[derive(Debug, Default)]
pub struct NullLink;

#[async_trait]
impl RobotLink for NullLink {
    async fn publish(&mut self, _payload: Bytes) -> Result<()> {
        Ok(())
    }

    async fn request(&mut self, _api_id: u32) -> Result<u32> {
        Ok(0)
    }
}
