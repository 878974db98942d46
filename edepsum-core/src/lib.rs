//! edepsum-core: Core types for energy-deposit summarization.
//!
//! This crate provides the foundational abstractions shared by the
//! summarization algorithms: step records as delivered by the
//! transport engine, volume identity keys, trajectories with their
//! per-event bookkeeping, and the geometric tolerance helpers.
//!

pub mod error;
pub mod geometry;
pub mod step;
pub mod trajectory;
pub mod units;
pub mod volume;

pub use error::{Error, Result};
pub use geometry::FourVector;
pub use step::{ProcessKind, StepRecord, StepStatus};
pub use trajectory::{EventTrajectories, Trajectory, TrajectoryPoint};
pub use volume::{VolumeId, VolumeLevel};
