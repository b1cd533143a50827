//! # Command Channel Module
//!
//! Single-slot, latest-wins mailbox carrying command frames from the sampler
//! to the robot-side executor.
//!
//! The sampler and executor run as separate tasks, so the channel is the only
//! shared resource between them. An unbounded queue would let a slow consumer
//! fall behind into stale motion commands; a `tokio::sync::watch` slot keeps
//! at most one frame in flight and silently overwrites unconsumed frames.
//! Frames are idempotent snapshots, so dropping intermediate ones is safe.

use tokio::sync::watch;

use crate::command::CommandFrame;
use crate::error::{Result, TeleopError};

/// Creates a connected sender/receiver pair.
#[must_use]
pub fn command_channel() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = watch::channel(None);
    (CommandSender { tx }, CommandReceiver { rx })
}

/// Sampler-side handle: publishes the latest frame, overwriting any
/// unconsumed one.
#[derive(Debug)]
pub struct CommandSender {
    tx: watch::Sender<Option<CommandFrame>>,
}

impl CommandSender {
    /// Publishes a frame. Returns an error once the executor is gone.
    pub fn send(&self, frame: CommandFrame) -> Result<()> {
        self.tx
            .send(Some(frame))
            .map_err(|_| TeleopError::ChannelClosed)
    }
}

/// Executor-side handle: awaits the next unseen frame.
#[derive(Debug)]
pub struct CommandReceiver {
    rx: watch::Receiver<Option<CommandFrame>>,
}

impl CommandReceiver {
    /// Waits for a frame newer than the last one observed.
    ///
    /// If several frames were sent since the last call, only the newest is
    /// returned (latest-wins).
    pub async fn recv(&mut self) -> Result<CommandFrame> {
        loop {
            self.rx
                .changed()
                .await
                .map_err(|_| TeleopError::ChannelClosed)?;
            if let Some(frame) = *self.rx.borrow_and_update() {
                return Ok(frame);
            }
        }
    }

    /// Returns the newest frame if one arrived since the last observation,
    /// without waiting.
    pub fn try_recv(&mut self) -> Option<CommandFrame> {
        if self.rx.has_changed().unwrap_or(false) {
            *self.rx.borrow_and_update()
        } else {
            None
        }
    }
}
