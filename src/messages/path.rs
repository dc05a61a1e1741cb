//! The `path_out` payload: an ordered sequence of waypoints.

use serde::{Deserialize, Serialize};

/// A single waypoint in world coordinates, with `z` copied from the most
/// recent robot pose (the planner itself is 2D).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A complete planned path, ready to hand to the waypoint sink.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathPlan {
    pub waypoints: Vec<Waypoint>,
    pub timestamp: u64,
}

impl PathPlan {
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}
