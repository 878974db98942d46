//! Trajectory point selection.
//!
//! Picks the sparse index set worth keeping from a full trajectory:
//! the endpoints, crossings of watched volume boundaries, and points
//! with a large discrete energy deposit. The accuracy refinement pass
//! then fills in whatever the polyline still needs.

use log::debug;
use regex::Regex;

use edepsum_core::error::Error;
use edepsum_core::step::{ProcessKind, StepStatus};
use edepsum_core::trajectory::Trajectory;
use edepsum_core::units::EV;
use edepsum_core::Result;

use crate::config::SummaryConfig;
use crate::refine::refine_points;

/// Sensitive-region deposit below which a trajectory is treated as
/// not having deposited at all.
pub const MIN_SD_DEPOSIT: f64 = 1.0 * EV;

/// Matches volume boundary crossings worth recording.
///
/// Patterns are tested against a composed key of the form
/// `:<particle>:<charged|neutral>:<volume name>`, so one pattern can
/// select by particle, by charge class, by volume, or any mix.
#[derive(Debug, Default)]
pub struct BoundaryMatcher {
    patterns: Vec<Regex>,
}

impl BoundaryMatcher {
    /// Creates a matcher with no patterns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles and adds a boundary pattern.
    pub fn add_pattern(&mut self, pattern: &str) -> Result<()> {
        let regex = Regex::new(pattern)
            .map_err(|err| Error::InvalidPattern(format!("{pattern}: {err}")))?;
        self.patterns.push(regex);
        Ok(())
    }

    /// Drops all patterns.
    pub fn clear(&mut self) {
        self.patterns.clear();
    }

    /// True when no pattern has been added.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Decides whether a step into `current_volume` from
    /// `prev_volume` crosses a watched boundary.
    pub fn is_boundary(
        &self,
        trajectory: &Trajectory,
        status: StepStatus,
        current_volume: &str,
        prev_volume: &str,
    ) -> bool {
        if status != StepStatus::GeomBoundary {
            return false;
        }
        let charge_class = if trajectory.is_neutral() {
            "neutral"
        } else {
            "charged"
        };
        let current = format!(":{}:{}:{}", trajectory.particle, charge_class, current_volume);
        let previous = format!(":{}:{}:{}", trajectory.particle, charge_class, prev_volume);
        for regex in &self.patterns {
            let in_current = regex.is_match(&current);
            let in_previous = regex.is_match(&previous);
            // Entering a watched volume.
            if in_current && !in_previous {
                debug!("entering {current}");
                return true;
            }
            // Exiting a watched volume.
            if !in_current && in_previous {
                debug!("exiting {current}");
                return true;
            }
        }
        false
    }
}

/// Selects the trajectory point indices to keep, refined until the
/// polyline through them stays within the configured accuracy.
///
/// The result is sorted, duplicate-free, and always contains the
/// first and last index. Trajectories that never caused a
/// sensitive-region deposit compress to just their endpoints.
pub fn select_trajectory_points(
    trajectory: &Trajectory,
    matcher: &BoundaryMatcher,
    config: &SummaryConfig,
) -> Result<Vec<usize>> {
    let points = trajectory.points();
    if points.is_empty() {
        return Err(Error::EmptyTrajectory(trajectory.track_id));
    }

    let mut selected = vec![0];
    let last = points.len() - 1;
    if last < 1 {
        return Ok(selected);
    }
    selected.push(last);

    // A trajectory that deposited nothing (itself or through its
    // descendants) just disappears from the detector; its endpoints
    // are all that is worth keeping.
    if trajectory.sd_total_energy_deposit() < MIN_SD_DEPOSIT {
        return Ok(selected);
    }

    // Keep the points where the particle enters or leaves a watched
    // volume.
    let mut prev_volume = points[0].volume_name.as_str();
    for (index, point) in points.iter().enumerate().take(last).skip(1) {
        if matcher.is_boundary(trajectory, point.status, &point.volume_name, prev_volume) {
            selected.push(index);
        }
        prev_volume = point.volume_name.as_str();
    }

    // Keep the points with a big discrete interaction. Navigation,
    // step limits, continuous ionization and multiple scattering are
    // excluded no matter how much they deposit.
    for (index, point) in points.iter().enumerate().take(last).skip(1) {
        if point.process_deposit < config.trajectory_point_deposit {
            continue;
        }
        match point.process {
            ProcessKind::Transportation
            | ProcessKind::Optical
            | ProcessKind::General
            | ProcessKind::UserDefined
            | ProcessKind::Ionization
            | ProcessKind::MultipleScattering => continue,
            _ => selected.push(index),
        }
    }

    selected.sort_unstable();
    selected.dedup();

    // Only trajectories that deposited energy themselves get the
    // accuracy refinement.
    if trajectory.sd_energy_deposit() < MIN_SD_DEPOSIT {
        return Ok(selected);
    }

    refine_points(trajectory, &mut selected, config.trajectory_point_accuracy)?;
    Ok(selected)
}
