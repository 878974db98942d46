//! Geometric tolerance helpers shared by segment clustering and
//! trajectory compression.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A position with its time, used for segment start/stop points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FourVector {
    /// Spatial position (mm).
    pub position: Vector3<f64>,
    /// Global time (ns).
    pub time: f64,
}

impl FourVector {
    /// Creates a new four-vector.
    #[inline]
    pub fn new(position: Vector3<f64>, time: f64) -> Self {
        Self { position, time }
    }

    /// The origin at time zero.
    #[inline]
    pub fn zero() -> Self {
        Self {
            position: Vector3::zeros(),
            time: 0.0,
        }
    }
}

impl Default for FourVector {
    fn default() -> Self {
        Self::zero()
    }
}

/// Unit direction from `from` to `to`, or `None` when the points are
/// too close to define one.
#[inline]
pub fn direction(from: &Vector3<f64>, to: &Vector3<f64>) -> Option<Vector3<f64>> {
    let delta = to - from;
    let norm = delta.norm();
    if norm < f64::EPSILON {
        return None;
    }
    Some(delta / norm)
}

/// Perpendicular distance of `delta` from the line through the origin
/// along the unit vector `dir`.
#[inline]
pub fn perpendicular_distance(delta: &Vector3<f64>, dir: &Vector3<f64>) -> f64 {
    let along = delta.dot(dir);
    (delta - along * dir).norm()
}

/// Signed projection of `point` onto the line through `origin` along
/// the unit vector `dir`.
#[inline]
pub fn projection(point: &Vector3<f64>, origin: &Vector3<f64>, dir: &Vector3<f64>) -> f64 {
    (point - origin).dot(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_direction() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(3.0, 0.0, 4.0);
        let dir = direction(&a, &b).unwrap();
        assert_relative_eq!(dir.norm(), 1.0);
        assert_relative_eq!(dir.x, 0.6);
        assert_relative_eq!(dir.z, 0.8);

        assert!(direction(&a, &a).is_none());
    }

    #[test]
    fn test_perpendicular_distance() {
        let dir = Vector3::new(1.0, 0.0, 0.0);

        // On the line.
        let on = Vector3::new(5.0, 0.0, 0.0);
        assert_relative_eq!(perpendicular_distance(&on, &dir), 0.0);

        // Off the line.
        let off = Vector3::new(5.0, 2.0, 0.0);
        assert_relative_eq!(perpendicular_distance(&off, &dir), 2.0);
    }

    #[test]
    fn test_projection() {
        let origin = Vector3::new(1.0, 0.0, 0.0);
        let dir = Vector3::new(1.0, 0.0, 0.0);
        let p = Vector3::new(4.0, 7.0, 0.0);
        assert_relative_eq!(projection(&p, &origin, &dir), 3.0);

        let behind = Vector3::new(-2.0, 1.0, 0.0);
        assert_relative_eq!(projection(&behind, &origin, &dir), -3.0);
    }
}
