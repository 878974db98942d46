//! edepsum-algorithms: Hit-segment clustering and trajectory
//! polyline compression.
//!
//! Two algorithm families turn a fine-grained stream of simulation
//! output into a bounded-error, bounded-size summary:
//! - **Segment aggregation** - merges consecutive steps into hit
//!   segments within sagitta, length and time tolerances.
//! - **Point selection + refinement** - compresses a trajectory to a
//!   sparse index set whose polyline stays within an accuracy bound.
//!
#![warn(missing_docs)]

mod config;
mod mark;
mod refine;
mod segment;
mod select;
mod store;

pub use config::SummaryConfig;
pub use mark::{attribute_deposits, mark_trajectories};
pub use refine::{find_accuracy, refine_points, split_point, MAX_REFINE_ROUNDS};
pub use segment::{HitSegment, SegmentConfig, TIME_EPSILON};
pub use select::{select_trajectory_points, BoundaryMatcher, MIN_SD_DEPOSIT};
pub use store::SegmentStore;

// Re-export the core types the algorithm interfaces use.
pub use edepsum_core::{EventTrajectories, StepRecord, Trajectory, VolumeId};
