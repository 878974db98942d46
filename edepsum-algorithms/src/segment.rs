//! Hit segments: bounded-size aggregates of consecutive steps.
//!
//! A segment merges steps as long as the combined path stays within a
//! configured sagitta and length, so a long straight ionization trail
//! becomes one hit instead of hundreds of steps.

use log::{debug, warn};
use nalgebra::Vector3;

use edepsum_core::geometry::{direction, perpendicular_distance, projection, FourVector};
use edepsum_core::step::{StepRecord, StepStatus};
use edepsum_core::trajectory::EventTrajectories;
use edepsum_core::units::{M, MM, NS};
use edepsum_core::volume::VolumeId;
use edepsum_core::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum time gap between a segment's stop time and the end of a
/// step that may still merge into it.
pub const TIME_EPSILON: f64 = 1.0 * NS;

/// A step whose start is further than this from the path tail did not
/// continue the path.
const DISCONTINUITY_TOLERANCE: f64 = 0.01 * MM;

/// A founder step starting within this distance of the path tail
/// extends the recorded path.
const PATH_EXTENSION_TOLERANCE: f64 = 0.1 * MM;

/// Returned by the sagitta and separation tests when the step cannot
/// possibly belong to the segment.
const REJECT_DISTANCE: f64 = 10.0 * M;

/// Length of the synthesized step when a neutral parent's deposit is
/// collapsed onto its stopping point.
const NEUTRAL_COLLAPSE_LENGTH: f64 = 0.5 * MM;

/// Geometric tolerances for one sensitive region's segments.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentConfig {
    /// Maximum perpendicular deviation of the recorded path from the
    /// proposed straight line. The same tolerance bounds the distance
    /// of a secondary track's step from the segment centerline.
    pub max_sagitta: f64,
    /// Maximum end-to-end extent of a segment.
    pub max_length: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            max_sagitta: 1.0 * MM,
            max_length: 10.0 * MM,
        }
    }
}

impl SegmentConfig {
    /// Creates a configuration with default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum sagitta.
    pub fn with_max_sagitta(mut self, sagitta: f64) -> Self {
        self.max_sagitta = sagitta;
        self
    }

    /// Sets the maximum segment length.
    pub fn with_max_length(mut self, length: f64) -> Self {
        self.max_length = length;
        self
    }
}

/// A clustered hit: the energy deposited by one or more tracks along
/// an approximately straight stretch of path in one volume.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HitSegment {
    max_sagitta: f64,
    max_length: f64,
    contributors: Vec<i32>,
    primary_id: i32,
    energy_deposit: f64,
    secondary_deposit: f64,
    track_length: f64,
    start: FourVector,
    stop: FourVector,
    path: Vec<Vector3<f64>>,
    volume: VolumeId,
}

impl HitSegment {
    /// Creates an empty segment with the region's tolerances.
    pub fn new(config: &SegmentConfig) -> Self {
        Self {
            max_sagitta: config.max_sagitta,
            max_length: config.max_length,
            contributors: Vec::new(),
            primary_id: 0,
            energy_deposit: 0.0,
            secondary_deposit: 0.0,
            track_length: 0.0,
            start: FourVector::zero(),
            stop: FourVector::zero(),
            path: Vec::with_capacity(500),
            volume: VolumeId::new(),
        }
    }

    /// Decides whether `step` belongs to this segment.
    ///
    /// The checks short-circuit in order: same volume, end-to-end
    /// distance within `max_length`, stop time within
    /// [`TIME_EPSILON`], and finally the geometric test — sagitta for
    /// the founder track, centerline separation for any other track.
    pub fn same_hit(&self, step: &StepRecord) -> bool {
        if self.volume.is_empty() || step.volume != self.volume {
            return false;
        }

        let end_to_end = (step.post.position - self.path[0]).norm();
        if end_to_end > self.max_length {
            return false;
        }

        let delta_t = (step.post.time - self.stop.time).abs();
        if delta_t > TIME_EPSILON {
            return false;
        }

        if self.contributors[0] == step.track_id {
            // The track that created this segment is still going.
            // Check whether the segment can be extended.
            self.find_sagitta(step) <= self.max_sagitta
        } else {
            // A different track, typically a delta-ray. Check whether
            // it stays close enough to the segment centerline.
            self.find_separation(step) <= self.max_sagitta
        }
    }

    /// Maximum perpendicular distance of the recorded path from the
    /// straight line the segment would have if `step` were appended.
    fn find_sagitta(&self, step: &StepRecord) -> f64 {
        let tail = self.path[self.path.len() - 1];

        // The step must begin where the current path ends.
        if (tail - step.pre.position).norm() > DISCONTINUITY_TOLERANCE {
            return REJECT_DISTANCE;
        }

        // The proposed new segment direction.
        let Some(new_dir) = direction(&tail, &step.post.position) else {
            // Zero-length step; nothing can fall out of tolerance.
            return 0.0;
        };

        let front = self.path[0];
        let mut max_sagitta: f64 = 0.0;
        for point in &self.path {
            let delta = point - front;
            max_sagitta = max_sagitta.max(perpendicular_distance(&delta, &new_dir));
            if max_sagitta > self.max_sagitta {
                break;
            }
        }
        max_sagitta
    }

    /// Perpendicular distance of `step` from the segment centerline,
    /// for contributions from tracks other than the founder.
    fn find_separation(&self, step: &StepRecord) -> f64 {
        let front = self.path[0];
        let back = self.path[self.path.len() - 1];
        let Some(dir) = direction(&front, &back) else {
            return REJECT_DISTANCE;
        };

        // The new step must start between the segment ends.
        let pre = step.pre.position;
        if projection(&pre, &back, &dir) > 0.0 {
            return REJECT_DISTANCE;
        }
        let along = projection(&pre, &front, &dir);
        if along < 0.0 {
            return REJECT_DISTANCE;
        }

        let s1 = (pre - front - along * dir).norm();
        let s2 = perpendicular_distance(&(step.post.position - front), &dir);
        s1.max(s2)
    }

    /// Merges a step into this segment.
    ///
    /// Inconsistent step data is logged and merged anyway; the only
    /// error is a corrupted parent chain while resolving the primary
    /// id of a fresh segment.
    pub fn add_step(&mut self, step: &StepRecord, event: &EventTrajectories) -> Result<()> {
        let mut pre_pos = step.pre.position;
        let post_pos = step.post.position;
        let mut step_length = step.step_length();
        let mut track_length = step.track_length;

        if track_length < 0.75 * step_length || track_length < step_length - 1.0 * MM {
            warn!(
                "track length shorter than step: {:.4} mm < {:.4} mm ({} depositing {:.4} MeV)",
                track_length, step_length, step.particle, step.energy_deposit
            );
        }
        track_length = track_length.max(step_length);

        if step.energy_deposit <= 0.0 {
            warn!("no energy deposited: {}", step.energy_deposit);
        }
        if track_length <= 0.0 {
            warn!("no track length: {}", track_length);
        }

        // A neutral particle may be credited with a deposit when a
        // sub-threshold charged daughter is collapsed into its step.
        // Move all of the energy to the stopping point, keeping a
        // short displaced pre-position so the path has a direction.
        if step.status == StepStatus::PostStepProcess && step.is_neutral() {
            let orig_step = step_length;
            if let Some(dir) = direction(&pre_pos, &post_pos) {
                step_length = NEUTRAL_COLLAPSE_LENGTH.min(0.8 * orig_step);
                track_length = step_length;
                pre_pos = post_pos - step_length * dir;
                debug!(
                    "{} deposited {:.4} MeV; step collapsed {:.4} mm -> {:.4} mm",
                    step.particle, step.energy_deposit, orig_step, step_length
                );
            }
        }

        if step_length > self.max_length || track_length > self.max_length {
            warn!(
                "long step: {:.4} mm step, {:.4} mm track ({} depositing {:.4} MeV, process {:?})",
                step_length, track_length, step.particle, step.energy_deposit, step.process
            );
        }

        if self.volume.is_empty() {
            // First step: seed the segment.
            self.volume = step.volume.clone();
            self.primary_id = event.find_primary_id(step.track_id)?;
            self.start = FourVector::new(pre_pos, step.pre.time);
            self.stop = FourVector::new(post_pos, step.post.time);
            self.path.push(pre_pos);
            self.path.push(post_pos);
            self.contributors.push(step.track_id);
        } else {
            if !self.contributors.contains(&step.track_id) {
                self.contributors.push(step.track_id);
            }

            // Only a contiguous continuation by the founder moves the
            // stopping point; other contributions just add energy.
            let tail = self.path[self.path.len() - 1];
            if step.track_id == self.contributors[0]
                && (tail - pre_pos).norm() < PATH_EXTENSION_TOLERANCE
            {
                self.stop = FourVector::new(post_pos, step.post.time);
                self.path.push(post_pos);
            }
        }

        self.energy_deposit += step.energy_deposit;
        self.secondary_deposit += step.non_ionizing_deposit;
        self.track_length += track_length;
        Ok(())
    }

    /// Total energy deposited in this segment.
    pub fn energy_deposit(&self) -> f64 {
        self.energy_deposit
    }

    /// Non-ionizing part of the deposit.
    pub fn secondary_deposit(&self) -> f64 {
        self.secondary_deposit
    }

    /// Summed track length of all merged steps.
    pub fn track_length(&self) -> f64 {
        self.track_length
    }

    /// Position and time where the segment starts.
    pub fn start(&self) -> &FourVector {
        &self.start
    }

    /// Position and time where the segment stops.
    pub fn stop(&self) -> &FourVector {
        &self.stop
    }

    /// Straight-line distance between start and stop.
    pub fn length(&self) -> f64 {
        (self.stop.position - self.start.position).norm()
    }

    /// Contributing track ids in insertion order; the first entry is
    /// the founder and never changes.
    pub fn contributors(&self) -> &[i32] {
        &self.contributors
    }

    /// Contributing track ids, sorted and deduplicated, for
    /// downstream summaries.
    pub fn sorted_contributors(&self) -> Vec<i32> {
        let mut ids = self.contributors.clone();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Primary track id resolved when the segment was created.
    pub fn primary_id(&self) -> i32 {
        self.primary_id
    }

    /// Identity of the volume containing the segment.
    pub fn volume(&self) -> &VolumeId {
        &self.volume
    }

    /// The recorded path points, from start to stop.
    pub fn path(&self) -> &[Vector3<f64>] {
        &self.path
    }
}
