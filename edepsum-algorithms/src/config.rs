//! Configuration for trajectory summarization.

use edepsum_core::units::{MEV, MM};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Thresholds steering trajectory point selection and save-marking.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SummaryConfig {
    /// Maximum allowed perpendicular deviation between the compressed
    /// polyline and the recorded path.
    pub trajectory_point_accuracy: f64,
    /// Minimum local deposit for a point to count as a big
    /// interaction.
    pub trajectory_point_deposit: f64,
    /// Gammas above this momentum are saved when a descendant
    /// deposits energy in a sensitive region.
    pub gamma_threshold: f64,
    /// Neutrons above this momentum are saved when a descendant
    /// deposits energy in a sensitive region.
    pub neutron_threshold: f64,
    /// Tracks with more than this length in a sensitive region are
    /// saved.
    pub length_threshold: f64,
    /// Save every primary trajectory, depositing or not.
    pub save_all_primaries: bool,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            trajectory_point_accuracy: 1.0 * MM,
            trajectory_point_deposit: 1.0 * MEV,
            gamma_threshold: 5.0 * MEV,
            neutron_threshold: 50.0 * MEV,
            length_threshold: 10.0 * MM,
            save_all_primaries: true,
        }
    }
}

impl SummaryConfig {
    /// Creates a configuration with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the polyline accuracy tolerance.
    pub fn with_point_accuracy(mut self, accuracy: f64) -> Self {
        self.trajectory_point_accuracy = accuracy;
        self
    }

    /// Sets the big-interaction deposit threshold.
    pub fn with_point_deposit(mut self, deposit: f64) -> Self {
        self.trajectory_point_deposit = deposit;
        self
    }

    /// Sets the gamma momentum threshold.
    pub fn with_gamma_threshold(mut self, threshold: f64) -> Self {
        self.gamma_threshold = threshold;
        self
    }

    /// Sets the neutron momentum threshold.
    pub fn with_neutron_threshold(mut self, threshold: f64) -> Self {
        self.neutron_threshold = threshold;
        self
    }

    /// Sets the sensitive-region length threshold.
    pub fn with_length_threshold(mut self, threshold: f64) -> Self {
        self.length_threshold = threshold;
        self
    }

    /// Sets whether all primaries are saved.
    pub fn with_save_all_primaries(mut self, save: bool) -> Self {
        self.save_all_primaries = save;
        self
    }
}
