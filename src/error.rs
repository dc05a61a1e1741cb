//! Error types for the roadmap planner.
//!
//! Only the handful of genuinely exceptional conditions from the spec's
//! error-handling design are represented here: a malformed frame crossing
//! a process boundary, a malformed configuration document, and cooperative
//! shutdown observed while waiting on the goal mailbox. Local edge-admission
//! rejections and "no path found" are expected control flow, not errors, and
//! are represented as `bool`/`Option`/empty-`Vec` returns throughout the rest
//! of the crate.

use thiserror::Error;

/// Errors surfaced by the planner as `Result`s.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// A `GridFrame` crossed a process boundary with inconsistent dimensions.
    #[error("grid frame is malformed: {0}")]
    MalformedGrid(String),

    /// A configuration document failed to parse or contained an invalid value.
    #[error("invalid planner configuration: {0}")]
    Config(String),

    /// Cooperative shutdown requested while the planner loop was idle or
    /// waiting for the first world frame.
    #[error("planner loop shutting down")]
    Shutdown,
}

pub type PlannerResult<T> = Result<T, PlannerError>;
