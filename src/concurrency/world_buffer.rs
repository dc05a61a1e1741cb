//! Bounded shared buffers for incoming grids and poses (spec §4.4).
//!
//! Mutual exclusion protects both sequences as a single unit; the critical
//! section never does I/O, and producers never block on the consumer —
//! pushing past the bound drops the oldest entry, matching the teacher's
//! own "never block a producer on a slow consumer" discipline for its
//! shared-memory hub.

use std::sync::Mutex;

use crate::messages::{GridFrame, Pose2D};

const DEFAULT_CAPACITY: usize = 4;

struct Inner {
    grids: Vec<GridFrame>,
    poses: Vec<Pose2D>,
    capacity: usize,
}

/// Shared buffer of the most recent grid and pose frames. The planner only
/// ever consumes the front of each sequence; producers push from their own
/// threads under a short-lived lock.
pub struct WorldBuffer {
    inner: Mutex<Inner>,
}

impl Default for WorldBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl WorldBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                grids: Vec::new(),
                poses: Vec::new(),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Append a grid frame; if the bound is exceeded, the oldest frame is
    /// dropped rather than blocking the caller.
    pub fn push_grid(&self, grid: GridFrame) {
        let mut inner = self.inner.lock().expect("world buffer mutex poisoned");
        inner.grids.push(grid);
        if inner.grids.len() > inner.capacity {
            inner.grids.remove(0);
        }
    }

    /// Append a pose frame; same drop-oldest policy as `push_grid`.
    pub fn push_pose(&self, pose: Pose2D) {
        let mut inner = self.inner.lock().expect("world buffer mutex poisoned");
        inner.poses.push(pose);
        if inner.poses.len() > inner.capacity {
            inner.poses.remove(0);
        }
    }

    /// Take the most recent grid and pose, if present. A missing side
    /// returns `None` for that side rather than blocking on the other.
    pub fn try_pop_latest(&self) -> (Option<GridFrame>, Option<Pose2D>) {
        let inner = self.inner.lock().expect("world buffer mutex poisoned");
        (inner.grids.last().cloned(), inner.poses.last().copied())
    }

    pub fn has_both(&self) -> bool {
        let inner = self.inner.lock().expect("world buffer mutex poisoned");
        !inner.grids.is_empty() && !inner.poses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::WorldOrd;

    fn frame() -> GridFrame {
        GridFrame::new(vec![255; 4], 2, 2, 0.1, WorldOrd::new(0.0, 0.0), 0)
    }

    #[test]
    fn has_both_false_until_both_sides_pushed() {
        let buf = WorldBuffer::default();
        assert!(!buf.has_both());
        buf.push_grid(frame());
        assert!(!buf.has_both());
        buf.push_pose(Pose2D::new(0.0, 0.0, 0.0, 0.0));
        assert!(buf.has_both());
    }

    #[test]
    fn try_pop_latest_returns_most_recent_of_each() {
        let buf = WorldBuffer::default();
        buf.push_pose(Pose2D::new(1.0, 1.0, 0.0, 0.0));
        buf.push_pose(Pose2D::new(2.0, 2.0, 0.0, 0.0));
        let (_, pose) = buf.try_pop_latest();
        assert_eq!(pose.unwrap().x, 2.0);
    }

    #[test]
    fn push_beyond_capacity_drops_oldest() {
        let buf = WorldBuffer::new(2);
        buf.push_pose(Pose2D::new(1.0, 0.0, 0.0, 0.0));
        buf.push_pose(Pose2D::new(2.0, 0.0, 0.0, 0.0));
        buf.push_pose(Pose2D::new(3.0, 0.0, 0.0, 0.0));
        let (_, pose) = buf.try_pop_latest();
        assert_eq!(pose.unwrap().x, 3.0);
    }
}
