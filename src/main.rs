//! # Go2 Teleop
//!
//! Velocity-shaping teleoperation pipeline for the Unitree Go2 quadruped.
//!
//! This binary wires the full command path: fixed-rate input sampling,
//! per-axis response shaping, latest-wins frame delivery, slew-rate limiting,
//! hardware normalization, and pose-mode sequencing against the robot link.

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tokio::time::interval;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use go2_teleop::channel::{command_channel, CommandReceiver};
use go2_teleop::config::ControlConfig;
use go2_teleop::input::sampler::{InputSampler, SAMPLE_PERIOD};
use go2_teleop::input::state::DeviceState;
use go2_teleop::pose::PoseModeController;
use go2_teleop::robot::executor::Executor;
use go2_teleop::robot::link::{publish_command, NullLink, RobotLink};
use go2_teleop::telemetry::{CommandLogger, CommandRecord};

/// Number of sampling ticks between status log messages (~30s at 30Hz)
const LOG_INTERVAL_TICKS: u64 = 900;

/// Default configuration file path
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Pose-mode transition requests from the sampling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PoseTrigger {
    Enter,
    Exit,
}

/// Edge detector for the pose-hold binding.
///
/// The committed state only advances once a trigger is actually delivered,
/// so a full trigger queue retries on the next tick instead of losing the
/// edge until the operator toggles the key again.
#[derive(Debug, Default)]
struct PoseHoldTracker {
    committed: bool,
}

impl PoseHoldTracker {
    /// Returns the trigger still owed for the current key state, if any.
    fn pending(&self, held: bool) -> Option<PoseTrigger> {
        if held == self.committed {
            return None;
        }
        Some(if held {
            PoseTrigger::Enter
        } else {
            PoseTrigger::Exit
        })
    }

    /// Marks the current key state as delivered.
    fn commit(&mut self, held: bool) {
        self.committed = held;
    }
}

/// Main entry point for the Go2 teleop pipeline
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging (console plus a rolling log file)
///    - Load and validate the TOML configuration
///    - Create the latest-wins command channel and spawn the dispatch task
///
/// 2. **Sampling Loop**
///    - One frame per 33ms tick from the current device state
///    - Pose-hold edges trigger enter/exit sequences on the dispatch task
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Dispatch Task**
///    - Owns the robot link, the per-axis limiters and the telemetry logger
///    - Processes frames in arrival order, publishes non-deduplicated commands
///
/// # Errors
///
/// Returns error if:
/// - Configuration fails to load or validate
/// - The dispatch task fails to publish to the robot link
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging: console plus a rolling daily file
    let file_appender = tracing_appender::rolling::daily("logs", "go2-teleop.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .init();

    info!("Go2 teleop v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = if std::path::Path::new(&config_path).exists() {
        ControlConfig::load(&config_path)?
    } else {
        info!("No config file at {}, using defaults", config_path);
        ControlConfig::default()
    };

    let (frame_tx, frame_rx) = command_channel();
    let (pose_tx, pose_rx) = mpsc::channel::<PoseTrigger>(4);
    let (active_tx, active_rx) = watch::channel(false);

    let logger = if config.telemetry.enabled {
        Some(CommandLogger::new(&config.telemetry)?)
    } else {
        None
    };

    // The dispatch task is the sole owner of the robot link and the limiter
    // state; the real transport (a WebRTC data channel) is provided by the
    // embedding application, so the standalone binary runs against NullLink
    let executor = Executor::new(&config);
    let pose = PoseModeController::new(config.pose.timings());
    let dispatch = tokio::spawn(run_dispatch(
        frame_rx,
        pose_rx,
        active_tx,
        NullLink,
        executor,
        pose,
        logger,
    ));

    let mut sampler = InputSampler::new(&config);
    let mut state = DeviceState::new();
    let mut tick_interval = interval(SAMPLE_PERIOD);

    info!("Starting sampling loop at ~30Hz");
    info!("Press Ctrl+C to exit");

    let mut tick_count: u64 = 0;
    let mut pose_hold = PoseHoldTracker::default();
    let mut active_rx = active_rx;

    // Main sampling loop
    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                // Frame semantics follow the dispatch task's view of pose
                // mode, not the raw key, so frames never flip mid-transition
                sampler.set_pose_active(*active_rx.borrow_and_update());

                let held = state.pose_hold();
                if let Some(trigger) = pose_hold.pending(held) {
                    if pose_tx.try_send(trigger).is_ok() {
                        pose_hold.commit(held);
                    } else {
                        warn!("pose trigger queue full, retrying next tick");
                    }
                }

                let frame = sampler.sample(&mut state);
                if frame_tx.send(frame).is_err() {
                    warn!("dispatch task gone, stopping sampler");
                    break;
                }

                tick_count += 1;
                if tick_count % LOG_INTERVAL_TICKS == 0 {
                    info!("Sampled {} frames (speed scalar {:.2})",
                        tick_count, sampler.speed_scalar());
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total frames sampled: {}", tick_count);
                break;
            }
        }
    }

    // Closing the channel ends the dispatch task
    drop(frame_tx);
    drop(pose_tx);
    dispatch.await??;

    Ok(())
}

/// Consumes frames and pose triggers sequentially against the robot link.
async fn run_dispatch<L: RobotLink>(
    mut frames: CommandReceiver,
    mut triggers: mpsc::Receiver<PoseTrigger>,
    active_tx: watch::Sender<bool>,
    mut link: L,
    mut executor: Executor,
    mut pose: PoseModeController,
    mut logger: Option<CommandLogger>,
) -> Result<()> {
    loop {
        tokio::select! {
            frame = frames.recv() => {
                let Ok(frame) = frame else { break };
                let mode = if frame.is_pose() { "pose" } else { "velocity" };
                if let Some(command) = executor.process(frame) {
                    // Routine frames are best-effort; a transient publish
                    // failure must not take down the whole pipeline
                    if let Err(e) = publish_command(&mut link, &command).await {
                        warn!(error = %e, "command publish failed");
                        continue;
                    }
                    if let Some(logger) = logger.as_mut() {
                        if let Err(e) = logger.log(&CommandRecord::now(mode, &command)) {
                            warn!(error = %e, "telemetry write failed");
                        }
                    }
                }
            }

            trigger = triggers.recv() => {
                let Some(trigger) = trigger else { break };
                match trigger {
                    PoseTrigger::Enter => {
                        if pose.enter(&mut link).await? {
                            // Zero the limiters now and drop velocity frames
                            // sampled before the watch flip reaches the
                            // sampler; the robot is already in pose semantics
                            executor.enter_pose();
                            let _ = active_tx.send(true);
                        }
                    }
                    PoseTrigger::Exit => {
                        if pose.exit(&mut link).await? {
                            executor.exit_pose();
                            let _ = active_tx.send(false);
                        }
                    }
                }
            }
        }
    }

    if let Some(logger) = logger.as_mut() {
        if let Err(e) = logger.flush() {
            warn!(error = %e, "telemetry flush failed");
        }
    }
    Ok(())
}
