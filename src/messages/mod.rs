//! Message types carried across the crate's stream/sink boundaries.
//!
//! These mirror the shape of the spec's external interfaces (`grid_stream`,
//! `pose_stream`, `path_out`) without committing to any particular transport —
//! the transport itself is an external collaborator per the spec's scope.

pub mod geometry;
pub mod grid_frame;
pub mod path;

pub use geometry::{Cell, Pose2D, WorldOrd};
pub use grid_frame::GridFrame;
pub use path::{PathPlan, Waypoint};
