//! Step records delivered by the transport engine.

use crate::geometry::FourVector;
use crate::volume::VolumeId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Charge magnitude below which a particle counts as neutral.
pub const NEUTRAL_CHARGE: f64 = 0.1;

/// Classification of the process that limited a step or created a
/// track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProcessKind {
    /// Geometry navigation.
    Transportation,
    /// Optical photon processes.
    Optical,
    /// General-purpose processes, usually a step limit.
    General,
    /// User-defined processes.
    UserDefined,
    /// Continuous electromagnetic ionization.
    Ionization,
    /// Electromagnetic multiple scattering.
    MultipleScattering,
    /// Particle decay.
    Decay,
    /// Track created by the primary generator.
    Primary,
    /// Anything else.
    Other,
}

/// How a step was terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StepStatus {
    /// The step ended on a geometry boundary.
    GeomBoundary,
    /// The step ended in a discrete post-step process.
    PostStepProcess,
    /// Any other termination.
    Other,
}

/// One step of one track, as reported by the transport engine.
///
/// Positions are in mm, times in ns, energies in MeV.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepRecord {
    /// Id of the track taking this step.
    pub track_id: i32,
    /// Position and time at the start of the step.
    pub pre: FourVector,
    /// Position and time at the end of the step.
    pub post: FourVector,
    /// Total energy deposited along the step.
    pub energy_deposit: f64,
    /// Non-ionizing part of the deposit.
    pub non_ionizing_deposit: f64,
    /// Physical path length of the track over the step. May exceed
    /// the geometric displacement for curved or scattered paths.
    pub track_length: f64,
    /// Identity of the volume containing the step.
    pub volume: VolumeId,
    /// Charge of the particle.
    pub charge: f64,
    /// Particle name, for diagnostics.
    pub particle: String,
    /// How the step was terminated.
    pub status: StepStatus,
    /// Process that limited the step.
    pub process: ProcessKind,
}

impl StepRecord {
    /// Geometric displacement of the step (straight-line pre to post).
    #[inline]
    pub fn step_length(&self) -> f64 {
        (self.post.position - self.pre.position).norm()
    }

    /// True when the particle is effectively neutral.
    #[inline]
    pub fn is_neutral(&self) -> bool {
        self.charge.abs() < NEUTRAL_CHARGE
    }
}
