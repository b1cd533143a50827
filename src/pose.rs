//! # Pose Mode Controller Module
//!
//! Entry/exit state machine for pose mode.
//!
//! Pose mode swaps velocity semantics for position semantics on the same
//! command channel: while active, the joystick fields drive body roll,
//! height, yaw, and pitch instead of locomotion. On the robot this is the
//! sport-mode Pose API, a stateless toggle: sending it twice undoes itself,
//! so duplicate enter triggers while a transition is in flight must be
//! swallowed, not replayed.
//!
//! Exit goes through RecoveryStand, the only command that reliably restores
//! normal walking after the pose toggle, followed by a stabilization delay.
//!
//! Acknowledgments are awaited with a bounded timeout and the machine then
//! proceeds optimistically: blocking operator input forever on a lost ack is
//! worse than a mode mismatch that self-corrects on the next transition.

use tokio::time::{sleep, timeout, Duration};
use tracing::{info, warn};

use crate::command::{api, ActuatorCommand};
use crate::robot::link::{publish_command, RobotLink};

/// Pose-mode transition timings.
#[derive(Debug, Clone, Copy)]
pub struct PoseTimings {
    /// Delay between the stop command and the pose toggle.
    pub settle_delay: Duration,
    /// How long to wait for a sport-request acknowledgment.
    pub ack_timeout: Duration,
    /// Stabilization delay after RecoveryStand before input resumes.
    pub exit_stabilize: Duration,
}

impl Default for PoseTimings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(200),
            ack_timeout: Duration::from_millis(1000),
            exit_stabilize: Duration::from_millis(1000),
        }
    }
}

/// Pose-mode state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseModeState {
    /// Normal velocity semantics.
    Inactive,
    /// Enter sequence in flight.
    Entering,
    /// Pose semantics active.
    Active,
    /// Exit sequence in flight.
    Exiting,
}

/// Drives pose-mode entry and exit against the robot link.
///
/// The controller only sequences the discrete robot commands; frame
/// remapping lives in the sampler and limiter resets in the executor, both
/// keyed off [`PoseModeController::is_active`].
#[derive(Debug)]
pub struct PoseModeController {
    state: PoseModeState,
    timings: PoseTimings,
}

impl Default for PoseModeController {
    fn default() -> Self {
        Self::new(PoseTimings::default())
    }
}

impl PoseModeController {
    /// Creates a controller in the `Inactive` state.
    #[must_use]
    pub fn new(timings: PoseTimings) -> Self {
        Self {
            state: PoseModeState::Inactive,
            timings,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> PoseModeState {
        self.state
    }

    /// True while pose semantics are in effect.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == PoseModeState::Active
    }

    /// Runs the enter sequence: stop motion, settle, pose toggle.
    ///
    /// Returns `Ok(true)` if the controller transitioned to `Active`,
    /// `Ok(false)` if the trigger was ignored because a transition was
    /// already in flight or pose mode is already active.
    pub async fn enter<L: RobotLink + ?Sized>(&mut self, link: &mut L) -> crate::error::Result<bool> {
        if self.state != PoseModeState::Inactive {
            warn!(state = ?self.state, "pose enter ignored");
            return Ok(false);
        }
        self.state = PoseModeState::Entering;

        // Stop all motion before the robot reinterprets the channel
        publish_command(link, &ActuatorCommand::neutral()).await?;
        sleep(self.timings.settle_delay).await;

        match timeout(self.timings.ack_timeout, link.request(api::POSE)).await {
            Ok(Ok(status)) => info!(status, "entered pose mode"),
            Ok(Err(e)) => warn!(error = %e, "pose toggle failed, proceeding optimistically"),
            Err(_) => warn!("pose toggle ack timed out, proceeding optimistically"),
        }

        self.state = PoseModeState::Active;
        Ok(true)
    }

    /// Runs the exit sequence: RecoveryStand, stabilization delay.
    ///
    /// Returns `Ok(true)` if the controller transitioned to `Inactive`,
    /// `Ok(false)` if the trigger was ignored.
    pub async fn exit<L: RobotLink + ?Sized>(&mut self, link: &mut L) -> crate::error::Result<bool> {
        if self.state != PoseModeState::Active {
            warn!(state = ?self.state, "pose exit ignored");
            return Ok(false);
        }
        self.state = PoseModeState::Exiting;

        match timeout(self.timings.ack_timeout, link.request(api::RECOVERY_STAND)).await {
            Ok(Ok(status)) => info!(status, "recovery stand acknowledged"),
            Ok(Err(e)) => warn!(error = %e, "recovery stand failed, proceeding optimistically"),
            Err(_) => warn!("recovery stand ack timed out, proceeding optimistically"),
        }
        sleep(self.timings.exit_stabilize).await;

        self.state = PoseModeState::Inactive;
        info!("exited pose mode, velocity semantics restored");
        Ok(true)
    }
}
