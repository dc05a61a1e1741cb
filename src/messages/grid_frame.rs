//! The raw occupancy grid frame as delivered by `grid_stream`.

use serde::{Deserialize, Serialize};

use super::geometry::WorldOrd;

/// A greyscale, row-major occupancy frame, 8 bits per cell, as it crosses
/// the boundary from the external grid producer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridFrame {
    pub bytes: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub resolution: f64,
    pub reference_pose: WorldOrd,
    /// Timestamp in nanoseconds since epoch.
    pub timestamp: u64,
}

impl GridFrame {
    pub fn new(
        bytes: Vec<u8>,
        width: usize,
        height: usize,
        resolution: f64,
        reference_pose: WorldOrd,
        timestamp: u64,
    ) -> Self {
        Self {
            bytes,
            width,
            height,
            resolution,
            reference_pose,
            timestamp,
        }
    }
}
