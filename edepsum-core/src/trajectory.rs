//! Trajectories and the per-event trajectory bookkeeping.

use std::collections::HashMap;

use nalgebra::Vector3;

use crate::error::{Error, Result};
use crate::step::{ProcessKind, StepStatus, NEUTRAL_CHARGE};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Depth bound on parent-chain walks. A chain longer than this means
/// the event bookkeeping is cyclic or corrupted.
pub const MAX_PARENT_DEPTH: usize = 10_000;

/// One recorded point along a trajectory.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrajectoryPoint {
    /// Position (mm).
    pub position: Vector3<f64>,
    /// Global time (ns).
    pub time: f64,
    /// Momentum at the point (MeV).
    pub momentum: Vector3<f64>,
    /// Process that defined the step ending here.
    pub process: ProcessKind,
    /// Energy deposited by that process at this point.
    pub process_deposit: f64,
    /// How the step ending here was terminated.
    pub status: StepStatus,
    /// Name of the volume containing the point.
    pub volume_name: String,
}

/// The full path of one track through the detector, with running
/// totals of its sensitive-detector activity.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trajectory {
    /// Track id.
    pub track_id: i32,
    /// Parent track id; 0 for primary particles.
    pub parent_id: i32,
    /// Particle name.
    pub particle: String,
    /// Particle charge.
    pub charge: f64,
    /// Process that created the track.
    pub process: ProcessKind,
    /// Momentum at creation (MeV).
    pub initial_momentum: Vector3<f64>,
    points: Vec<TrajectoryPoint>,
    sd_energy_deposit: f64,
    sd_total_energy_deposit: f64,
    sd_length: f64,
    save: bool,
}

impl Trajectory {
    /// Creates a trajectory with its creation point.
    pub fn new(
        track_id: i32,
        parent_id: i32,
        particle: impl Into<String>,
        charge: f64,
        process: ProcessKind,
        initial_momentum: Vector3<f64>,
        first_point: TrajectoryPoint,
    ) -> Self {
        Self {
            track_id,
            parent_id,
            particle: particle.into(),
            charge,
            process,
            initial_momentum,
            points: vec![first_point],
            sd_energy_deposit: 0.0,
            sd_total_energy_deposit: 0.0,
            sd_length: 0.0,
            save: false,
        }
    }

    /// Appends the end point of a completed step.
    pub fn append_point(&mut self, point: TrajectoryPoint) {
        self.points.push(point);
    }

    /// Recorded points, in step order.
    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    /// Mutable access to the point buffer, for the glue that owns
    /// trajectory construction.
    pub fn points_mut(&mut self) -> &mut Vec<TrajectoryPoint> {
        &mut self.points
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no points have been recorded.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Straight-line distance between the first and last point.
    pub fn range(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() >= 2 => {
                (last.position - first.position).norm()
            }
            _ => 0.0,
        }
    }

    /// Kinetic energy at creation, given the particle mass in MeV.
    pub fn initial_kinetic_energy(&self, mass: f64) -> f64 {
        let mom = self.initial_momentum.norm();
        let kin = (mom * mom + mass * mass).sqrt() - mass;
        kin.max(0.0)
    }

    /// True when the particle is effectively neutral.
    pub fn is_neutral(&self) -> bool {
        self.charge.abs() < NEUTRAL_CHARGE
    }

    /// Energy this track itself deposited in sensitive regions.
    pub fn sd_energy_deposit(&self) -> f64 {
        self.sd_energy_deposit
    }

    /// Energy this track and all of its descendants deposited in
    /// sensitive regions.
    pub fn sd_total_energy_deposit(&self) -> f64 {
        self.sd_total_energy_deposit
    }

    /// Track length inside sensitive regions.
    pub fn sd_length(&self) -> f64 {
        self.sd_length
    }

    /// Credits a sensitive-region deposit to this track.
    pub fn add_sd_energy_deposit(&mut self, energy: f64) {
        self.sd_energy_deposit += energy;
        self.sd_total_energy_deposit += energy;
    }

    /// Credits a descendant's sensitive-region deposit to this track.
    pub fn add_sd_daughter_deposit(&mut self, energy: f64) {
        self.sd_total_energy_deposit += energy;
    }

    /// Adds sensitive-region track length.
    pub fn add_sd_length(&mut self, length: f64) {
        self.sd_length += length;
    }

    /// Whether this trajectory has been marked for saving.
    pub fn is_marked(&self) -> bool {
        self.save
    }

    /// Marks this trajectory for saving. Ancestor propagation is
    /// handled by [`EventTrajectories::mark`].
    pub fn mark(&mut self) {
        self.save = true;
    }
}

/// Per-event map from track id to trajectory.
///
/// Owned by the current event's processing and cleared at the event
/// boundary; there is no global state.
#[derive(Debug, Default)]
pub struct EventTrajectories {
    map: HashMap<i32, Trajectory>,
}

impl EventTrajectories {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all trajectories. Call at the start of each event.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Registers a trajectory under its track id.
    pub fn add(&mut self, trajectory: Trajectory) {
        self.map.insert(trajectory.track_id, trajectory);
    }

    /// Looks up a trajectory.
    pub fn get(&self, track_id: i32) -> Option<&Trajectory> {
        self.map.get(&track_id)
    }

    /// Looks up a trajectory for mutation.
    pub fn get_mut(&mut self, track_id: i32) -> Option<&mut Trajectory> {
        self.map.get_mut(&track_id)
    }

    /// Number of trajectories in the event.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when the event holds no trajectories.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over the trajectories in the event (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &Trajectory> {
        self.map.values()
    }

    /// Track ids present in the event.
    pub fn track_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.map.keys().copied()
    }

    /// Walks the parent chain from `track_id` to the track that counts
    /// as the primary for reconstruction purposes.
    ///
    /// The walk stops at a track with no registered parent, at a
    /// parent id of 0, or at a decay product (decay daughters are
    /// reconstructed independently, so they count as primaries).
    pub fn find_primary_id(&self, track_id: i32) -> Result<i32> {
        let mut current = track_id;
        for _ in 0..MAX_PARENT_DEPTH {
            let Some(trajectory) = self.get(current) else {
                return Ok(current);
            };
            let parent = trajectory.parent_id;
            if self.get(parent).is_none() {
                return Ok(current);
            }
            if trajectory.process == ProcessKind::Decay {
                return Ok(current);
            }
            if parent == 0 {
                return Ok(current);
            }
            current = parent;
        }
        Err(Error::ParentChainTooDeep {
            track_id,
            bound: MAX_PARENT_DEPTH,
        })
    }

    /// Marks a trajectory for saving, propagating the mark up the
    /// parent chain when `with_ancestors` is set.
    pub fn mark(&mut self, track_id: i32, with_ancestors: bool) -> Result<()> {
        let Some(trajectory) = self.get_mut(track_id) else {
            return Err(Error::TrajectoryNotFound(track_id));
        };
        trajectory.mark();
        if !with_ancestors {
            return Ok(());
        }
        let mut current = trajectory.parent_id;
        for _ in 0..MAX_PARENT_DEPTH {
            let Some(parent) = self.get_mut(current) else {
                return Ok(());
            };
            parent.mark();
            current = parent.parent_id;
        }
        Err(Error::ParentChainTooDeep {
            track_id,
            bound: MAX_PARENT_DEPTH,
        })
    }
}
