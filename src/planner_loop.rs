//! The single loop thread that waits on goal requests, consumes the most
//! recent world frame, drives the roadmap, and publishes results (spec
//! §4.5). Driven from its own named OS thread rather than folded into a
//! generic tick-everything scheduler, the way the teacher names and spawns
//! its own background worker threads.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::algorithms::{Grid, Roadmap};
use crate::algorithms::roadmap::BuildOutcome;
use crate::concurrency::{GoalMailbox, WorldBuffer};
use crate::concurrency::goal_mailbox::Wake;
use crate::config::PlannerConfig;
use crate::messages::{PathPlan, Waypoint};
use crate::overlay::Overlay;

/// Receives completed paths from the planner loop. Implementations decide
/// the transport (pub/sub topic, channel, callback) — that's an external
/// collaborator per the spec's scope.
pub trait WaypointSink: Send + Sync {
    fn publish(&self, path: PathPlan);
}

/// Receives the debug overlay image, published on every build regardless
/// of whether a path was found.
pub trait OverlaySink: Send + Sync {
    fn publish(&self, overlay: Overlay);
}

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Owns the planner's background thread and the goal mailbox used to talk
/// to it. `shutdown()` requests cooperative cancellation and joins the
/// thread.
pub struct PlannerLoop {
    mailbox: Arc<GoalMailbox>,
    handle: Option<JoinHandle<()>>,
}

impl PlannerLoop {
    /// Spawn the planner loop thread. `world` is shared with the external
    /// grid/pose producers; `waypoint_sink`/`overlay_sink` receive this
    /// loop's outputs.
    pub fn spawn(
        config: PlannerConfig,
        world: Arc<WorldBuffer>,
        waypoint_sink: Arc<dyn WaypointSink>,
        overlay_sink: Arc<dyn OverlaySink>,
    ) -> Self {
        let mailbox = Arc::new(GoalMailbox::new());
        let loop_mailbox = mailbox.clone();

        let handle = std::thread::Builder::new()
            .name("planner-loop".to_string())
            .spawn(move || run(config, world, loop_mailbox, waypoint_sink, overlay_sink))
            .expect("failed to spawn planner-loop thread");

        Self {
            mailbox,
            handle: Some(handle),
        }
    }

    /// Submit a goal request; the service handler's side of the mailbox.
    /// Always "acks" per the spec — submission itself cannot fail.
    pub fn submit_goal(&self, x: f64, y: f64) {
        self.mailbox
            .submit_goal(crate::messages::WorldOrd::new(x, y));
    }

    /// Request cooperative shutdown and wait for the loop thread to exit.
    pub fn shutdown(mut self) {
        self.mailbox.request_shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PlannerLoop {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.mailbox.request_shutdown();
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
    }
}

fn run(
    config: PlannerConfig,
    world: Arc<WorldBuffer>,
    mailbox: Arc<GoalMailbox>,
    waypoint_sink: Arc<dyn WaypointSink>,
    overlay_sink: Arc<dyn OverlaySink>,
) {
    log::info!("planner loop: WaitingForWorld");
    while !world.has_both() {
        if mailbox.is_shutdown() {
            log::info!("planner loop: shutdown requested while waiting for world state");
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    let (grid_frame, pose) = world.try_pop_latest();
    let initial_reference = pose
        .map(|p| p.position())
        .unwrap_or(crate::messages::WorldOrd::new(0.0, 0.0));
    drop(grid_frame);

    let mut roadmap = Roadmap::new(&config, initial_reference);
    log::info!("planner loop: Idle");

    'idle: loop {
        let mut current_goal = match mailbox.wait() {
            Wake::Shutdown => {
                log::info!("planner loop: ShuttingDown");
                return;
            }
            Wake::Goal(g) => g,
        };

        loop {
            log::info!("planner loop: Planning towards ({}, {})", current_goal.x, current_goal.y);
            let (grid_frame, pose) = world.try_pop_latest();
            let (Some(grid_frame), Some(pose)) = (grid_frame, pose) else {
                log::warn!("planner loop: missing world frame, returning to Idle");
                break;
            };

            let grid = match Grid::from_frame(&grid_frame) {
                Ok(grid) => grid,
                Err(err) => {
                    log::error!("planner loop: malformed grid frame: {err}");
                    break;
                }
            };

            roadmap.set_reference(pose.position());
            let start = pose.position();

            let path = plan_with_retries(&mut roadmap, &grid, start, current_goal, &mailbox, config.max_retries);

            let overlay = roadmap.overlay(&grid, if path.is_empty() { None } else { Some(&path) });
            overlay_sink.publish(overlay);

            if !path.is_empty() {
                let waypoints = path
                    .iter()
                    .map(|w| Waypoint {
                        x: w.x,
                        y: w.y,
                        z: pose.z,
                    })
                    .collect();
                waypoint_sink.publish(PathPlan {
                    waypoints,
                    timestamp: now_nanos(),
                });
            } else {
                log::info!("planner loop: no path found, publishing overlay only");
            }

            match mailbox.try_take_goal() {
                Some(newer) => {
                    log::info!("planner loop: newer goal arrived during build, replanning immediately");
                    current_goal = newer;
                    continue;
                }
                None => break,
            }
        }

        if mailbox.is_shutdown() {
            log::info!("planner loop: ShuttingDown");
            return;
        }
        log::info!("planner loop: Idle");
        continue 'idle;
    }
}

fn plan_with_retries(
    roadmap: &mut Roadmap,
    grid: &Grid,
    start: crate::messages::WorldOrd,
    goal: crate::messages::WorldOrd,
    mailbox: &GoalMailbox,
    max_retries: usize,
) -> Vec<crate::messages::WorldOrd> {
    let attempts = max_retries.max(1);
    for attempt in 1..=attempts {
        if mailbox.is_shutdown() {
            return Vec::new();
        }
        let (path, outcome) = roadmap.build(grid, start, goal, &|| mailbox.is_shutdown());
        if !path.is_empty() {
            return path;
        }
        if matches!(outcome, BuildOutcome::GoalInaccessible | BuildOutcome::ShutdownRequested) {
            break;
        }
        log::info!("planner loop: build attempt {attempt}/{attempts} returned empty, retrying");
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{GridFrame, Pose2D, WorldOrd};
    use std::sync::Mutex as StdMutex;

    struct RecordingWaypointSink(StdMutex<Vec<PathPlan>>);
    impl WaypointSink for RecordingWaypointSink {
        fn publish(&self, path: PathPlan) {
            self.0.lock().unwrap().push(path);
        }
    }

    struct CountingOverlaySink(std::sync::atomic::AtomicUsize);
    impl OverlaySink for CountingOverlaySink {
        fn publish(&self, _overlay: Overlay) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn free_frame() -> GridFrame {
        GridFrame::new(vec![255; 40 * 40], 40, 40, 0.1, WorldOrd::new(0.0, 0.0), 0)
    }

    #[test]
    fn publishes_a_path_for_a_reachable_goal() {
        let world = Arc::new(WorldBuffer::default());
        world.push_grid(free_frame());
        world.push_pose(Pose2D::new(0.0, 0.0, 0.0, 1.5));

        let waypoints = Arc::new(RecordingWaypointSink(StdMutex::new(Vec::new())));
        let overlays = Arc::new(CountingOverlaySink(std::sync::atomic::AtomicUsize::new(0)));

        let mut cfg = PlannerConfig::default();
        cfg.sample_seed = Some(7);

        let planner = PlannerLoop::spawn(cfg, world, waypoints.clone(), overlays.clone());
        planner.submit_goal(1.0, 1.0);

        // Give the background thread a moment to process the goal.
        let mut observed = Vec::new();
        for _ in 0..50 {
            std::thread::sleep(Duration::from_millis(20));
            observed = waypoints.0.lock().unwrap().clone();
            if !observed.is_empty() {
                break;
            }
        }

        planner.shutdown();

        assert!(!observed.is_empty(), "expected at least one published path");
        let plan = &observed[0];
        assert!(!plan.is_empty());
        assert_eq!(plan.waypoints[0].z, 1.5);
        assert!(overlays.0.load(Ordering::Relaxed) >= 1);
    }
}
