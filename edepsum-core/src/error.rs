//! Error types for edepsum-core.

use thiserror::Error;

/// Result type alias for edepsum operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for edepsum operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A parent-chain walk exceeded the depth bound. The per-event
    /// bookkeeping is cyclic or otherwise corrupted.
    #[error("parent chain for track {track_id} exceeds depth bound {bound}")]
    ParentChainTooDeep { track_id: i32, bound: usize },

    /// A trajectory referenced by a hit or a parent link is missing
    /// from the event.
    #[error("trajectory not found for track {0}")]
    TrajectoryNotFound(i32),

    /// A trajectory was handed to the selector with no points.
    #[error("trajectory for track {0} has no points")]
    EmptyTrajectory(i32),

    /// Invalid boundary pattern.
    #[error("invalid boundary pattern: {0}")]
    InvalidPattern(String),

    /// Configuration error, such as a refinement split requested on
    /// an interval with no interior point.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
