//! Low-dispersion probabilistic roadmap (LD-PRM) planner for a 2D occupancy
//! grid.
//!
//! The crate is organised the way the wider corpus lays out a planning
//! node: message types at the boundary ([`messages`]), the core algorithms
//! ([`algorithms`]), the concurrency shell that serialises goal requests
//! against the background build loop ([`concurrency`]), debug overlay
//! composition ([`overlay`]), and the loop itself ([`planner_loop`]) that
//! ties all of the above into a long-lived background worker.
//!
//! Configuration is read once at construction ([`config::PlannerConfig`]);
//! everything downstream of that point is driven by [`PlannerLoop`] and the
//! [`WaypointSink`]/[`OverlaySink`] traits it publishes through.

pub mod algorithms;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod messages;
pub mod overlay;
pub mod planner_loop;

pub use algorithms::{Grid, Graph, Roadmap, VertexId};
pub use algorithms::roadmap::BuildOutcome;
pub use concurrency::{GoalMailbox, WorldBuffer};
pub use config::PlannerConfig;
pub use error::{PlannerError, PlannerResult};
pub use messages::{Cell, GridFrame, PathPlan, Pose2D, Waypoint, WorldOrd};
pub use overlay::Overlay;
pub use planner_loop::{OverlaySink, PlannerLoop, WaypointSink};

/// Common imports for crates embedding the planner loop.
pub mod prelude {
    pub use crate::config::PlannerConfig;
    pub use crate::error::{PlannerError, PlannerResult};
    pub use crate::messages::{GridFrame, PathPlan, Pose2D, WorldOrd};
    pub use crate::planner_loop::{OverlaySink, PlannerLoop, WaypointSink};
    pub use crate::concurrency::WorldBuffer;
}
