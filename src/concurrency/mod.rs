//! The concurrency shell: bounded world-state buffers shared with external
//! producers, and the goal mailbox that serialises requests against the
//! planner loop (spec §4.4, §4.5, §5).

pub mod goal_mailbox;
pub mod world_buffer;

pub use goal_mailbox::GoalMailbox;
pub use world_buffer::WorldBuffer;
