//! Accuracy refinement of a selected trajectory point set.
//!
//! Inserts additional indices between selected points until the
//! piecewise-linear reconstruction stays within the accuracy
//! tolerance everywhere, or the round cap is reached.

use log::warn;

use edepsum_core::error::Error;
use edepsum_core::geometry::{direction, perpendicular_distance};
use edepsum_core::trajectory::Trajectory;
use edepsum_core::Result;

/// Round cap for the refinement loop. A circuit breaker against
/// pathological trajectories, not a correctness guarantee.
pub const MAX_REFINE_ROUNDS: usize = 1000;

/// Maximum deviation of the recorded path between points `first` and
/// `last` from the straight line joining them.
///
/// Interior points are sampled with a stride of about a tenth of the
/// interval, so the returned value can under-estimate the true
/// deviation between samples; the tolerance is approximate by design.
/// Adjacent pairs are exact, and an interval whose end-to-end
/// distance is already below `tolerance` is treated as exact.
pub fn find_accuracy(trajectory: &Trajectory, first: usize, last: usize, tolerance: f64) -> f64 {
    if last - first < 2 {
        return 0.0;
    }

    let points = trajectory.points();
    let p1 = points[first].position;
    let p2 = points[last].position;

    if (p2 - p1).norm() < tolerance {
        return 0.0;
    }
    let Some(dir) = direction(&p1, &p2) else {
        return 0.0;
    };

    let stride = (last - first) / 10 + 1;
    let mut approach: f64 = 0.0;
    let mut index = first + 1;
    while index < last {
        let delta = points[index].position - p1;
        approach = approach.max(perpendicular_distance(&delta, &dir));
        index += stride;
    }
    approach
}

/// Finds the interior index splitting `(first, last)` with the
/// smallest combined accuracy of the two halves.
///
/// The midpoint seeds the search; every interior index is then tried.
/// Asking to split an interval with no interior point is a
/// configuration error.
pub fn split_point(
    trajectory: &Trajectory,
    first: usize,
    last: usize,
    tolerance: f64,
) -> Result<usize> {
    let mid = (first + last) / 2;
    if mid <= first || last <= mid {
        return Err(Error::ConfigError(format!(
            "points {first} and {last} too close to split"
        )));
    }

    let mut best = mid;
    let mut best_accuracy = find_accuracy(trajectory, first, mid, tolerance)
        .max(find_accuracy(trajectory, mid, last, tolerance));

    for candidate in (first + 1)..(last - 1) {
        let accuracy = find_accuracy(trajectory, first, candidate, tolerance)
            .max(find_accuracy(trajectory, candidate, last, tolerance));
        if accuracy < best_accuracy {
            best = candidate;
            best_accuracy = accuracy;
        }
    }

    Ok(best)
}

/// Refines `selected` in place until every adjacent pair is within
/// `tolerance`, or the round cap is reached (logged, not an error).
///
/// `selected` stays sorted and duplicate-free, and never loses an
/// index it already contains.
pub fn refine_points(
    trajectory: &Trajectory,
    selected: &mut Vec<usize>,
    tolerance: f64,
) -> Result<()> {
    for _ in 0..MAX_REFINE_ROUNDS {
        let mut added = false;
        for pair in 0..selected.len().saturating_sub(1) {
            let (first, last) = (selected[pair], selected[pair + 1]);
            if find_accuracy(trajectory, first, last, tolerance) <= tolerance {
                continue;
            }
            let split = split_point(trajectory, first, last, tolerance)?;
            selected.push(split);
            added = true;
            break;
        }
        selected.sort_unstable();
        selected.dedup();
        if !added {
            return Ok(());
        }
    }
    warn!(
        "refinement round cap ({}) reached for track {}",
        MAX_REFINE_ROUNDS, trajectory.track_id
    );
    Ok(())
}
