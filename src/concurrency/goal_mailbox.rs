//! Instance-owned synchronised mailbox mediating goal arrival between the
//! goal-service handler and the planner loop (spec §9 design note: replaces
//! the source's module-scope mutex/condition/bool with something reachable
//! from both sides without global state).

use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::messages::WorldOrd;

struct State {
    pending_goal: Option<WorldOrd>,
    shutdown: bool,
}

/// A single-slot mailbox: the service handler overwrites `pending_goal`
/// atomically and signals one waiter; the planner loop blocks until a goal
/// arrives or shutdown is requested.
pub struct GoalMailbox {
    state: Mutex<State>,
    condvar: Condvar,
}

/// What woke a waiter on the mailbox.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wake {
    Goal(WorldOrd),
    Shutdown,
}

impl Default for GoalMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl GoalMailbox {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                pending_goal: None,
                shutdown: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Called by the goal-service handler: overwrites any pending goal and
    /// wakes exactly one waiter. Does not preempt an in-progress build —
    /// the planner only observes this on its next wait.
    pub fn submit_goal(&self, goal: WorldOrd) {
        let mut state = self.state.lock().expect("goal mailbox mutex poisoned");
        state.pending_goal = Some(goal);
        self.condvar.notify_one();
    }

    /// Request cooperative shutdown; wakes any waiter.
    pub fn request_shutdown(&self) {
        let mut state = self.state.lock().expect("goal mailbox mutex poisoned");
        state.shutdown = true;
        self.condvar.notify_one();
    }

    pub fn is_shutdown(&self) -> bool {
        self.state.lock().expect("goal mailbox mutex poisoned").shutdown
    }

    /// Take the pending goal without blocking, if one is present.
    pub fn try_take_goal(&self) -> Option<WorldOrd> {
        let mut state = self.state.lock().expect("goal mailbox mutex poisoned");
        state.pending_goal.take()
    }

    /// Block until a goal is received or shutdown is requested.
    pub fn wait(&self) -> Wake {
        let mut state = self.state.lock().expect("goal mailbox mutex poisoned");
        loop {
            if state.shutdown {
                return Wake::Shutdown;
            }
            if let Some(goal) = state.pending_goal.take() {
                return Wake::Goal(goal);
            }
            let (next, _) = self
                .condvar
                .wait_timeout(state, Duration::from_millis(250))
                .expect("goal mailbox condvar wait failed");
            state = next;
        }
    }
}
