//! Deposit attribution and trajectory save-marking.
//!
//! After an event's segments are closed, their deposits are credited
//! back to the founder trajectories (and, as daughter deposits, to
//! every ancestor), and the trajectories worth persisting are marked.

use edepsum_core::error::Error;
use edepsum_core::step::ProcessKind;
use edepsum_core::trajectory::{EventTrajectories, MAX_PARENT_DEPTH};
use edepsum_core::Result;

use crate::config::SummaryConfig;
use crate::segment::HitSegment;
use crate::select::MIN_SD_DEPOSIT;

const NEUTRINOS: [&str; 6] = [
    "nu_e",
    "nu_mu",
    "nu_tau",
    "anti_nu_e",
    "anti_nu_mu",
    "anti_nu_tau",
];

/// Credits each segment's deposit to its founder trajectory and, as a
/// daughter deposit, to the founder's ancestors.
pub fn attribute_deposits(event: &mut EventTrajectories, segments: &[HitSegment]) -> Result<()> {
    for segment in segments {
        let Some(&founder) = segment.contributors().first() else {
            continue;
        };
        let energy = segment.energy_deposit();

        let Some(trajectory) = event.get_mut(founder) else {
            return Err(Error::TrajectoryNotFound(founder));
        };
        trajectory.add_sd_energy_deposit(energy);
        trajectory.add_sd_length(segment.length());

        let mut current = trajectory.parent_id;
        let mut depth = 0;
        while current != 0 {
            depth += 1;
            if depth > MAX_PARENT_DEPTH {
                return Err(Error::ParentChainTooDeep {
                    track_id: founder,
                    bound: MAX_PARENT_DEPTH,
                });
            }
            let Some(parent) = event.get_mut(current) else {
                return Err(Error::TrajectoryNotFound(current));
            };
            parent.add_sd_daughter_deposit(energy);
            current = parent.parent_id;
        }
    }
    Ok(())
}

/// Marks the trajectories worth saving:
///
/// - primaries whose family deposited in a sensitive region, or all
///   primaries when configured so, with ancestor propagation;
/// - decay products;
/// - tracks crossing enough sensitive length;
/// - energetic gammas and neutrons whose descendants deposited;
/// - the primary trajectory of every closed segment.
///
/// Neutrinos are never saved on their own.
pub fn mark_trajectories(
    event: &mut EventTrajectories,
    config: &SummaryConfig,
    segments: &[HitSegment],
) -> Result<()> {
    let mut marks: Vec<(i32, bool)> = Vec::new();

    for trajectory in event.iter() {
        let id = trajectory.track_id;

        // Primaries are saved whenever their family deposited; the
        // mark walks the (empty) ancestor chain for symmetry with the
        // descendant cases.
        if trajectory.parent_id == 0
            && (trajectory.sd_total_energy_deposit() > MIN_SD_DEPOSIT
                || config.save_all_primaries)
        {
            marks.push((id, true));
            continue;
        }

        if NEUTRINOS.contains(&trajectory.particle.as_str()) {
            continue;
        }

        if trajectory.process == ProcessKind::Decay {
            marks.push((id, false));
            continue;
        }

        if trajectory.sd_length() > config.length_threshold {
            marks.push((id, false));
            continue;
        }

        // The remaining cases only apply when the descendants
        // deposited energy in a sensitive region.
        if trajectory.sd_total_energy_deposit() < MIN_SD_DEPOSIT {
            continue;
        }

        let momentum = trajectory.initial_momentum.norm();
        if trajectory.particle == "gamma" && momentum > config.gamma_threshold {
            marks.push((id, false));
            continue;
        }
        if trajectory.particle == "neutron" && momentum > config.neutron_threshold {
            marks.push((id, false));
        }
    }

    for (id, with_ancestors) in marks {
        event.mark(id, with_ancestors)?;
    }

    // Whatever the thresholds said, the primary trajectory behind
    // every recorded segment must be available downstream.
    for segment in segments {
        event.mark(segment.primary_id(), false)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use edepsum_core::geometry::FourVector;
    use edepsum_core::step::{StepRecord, StepStatus};
    use edepsum_core::trajectory::{Trajectory, TrajectoryPoint};
    use edepsum_core::units::MEV;
    use edepsum_core::volume::VolumeId;
    use nalgebra::Vector3;

    use crate::segment::SegmentConfig;
    use crate::store::SegmentStore;

    fn trajectory(
        track_id: i32,
        parent_id: i32,
        particle: &str,
        charge: f64,
        process: ProcessKind,
        momentum: f64,
    ) -> Trajectory {
        Trajectory::new(
            track_id,
            parent_id,
            particle,
            charge,
            process,
            Vector3::new(momentum, 0.0, 0.0),
            TrajectoryPoint {
                position: Vector3::zeros(),
                time: 0.0,
                momentum: Vector3::new(momentum, 0.0, 0.0),
                process,
                process_deposit: 0.0,
                status: StepStatus::Other,
                volume_name: "tracker".into(),
            },
        )
    }

    fn one_segment(event: &EventTrajectories, track_id: i32) -> Vec<HitSegment> {
        let mut store = SegmentStore::new("tracker", SegmentConfig::default());
        let step = StepRecord {
            track_id,
            pre: FourVector::new(Vector3::zeros(), 0.0),
            post: FourVector::new(Vector3::new(2.0, 0.0, 0.0), 0.01),
            energy_deposit: 3.0 * MEV,
            non_ionizing_deposit: 0.0,
            track_length: 2.0,
            volume: VolumeId::from_levels([(1, 0)]),
            charge: -1.0,
            particle: "e-".into(),
            status: StepStatus::Other,
            process: ProcessKind::Ionization,
        };
        store.process_step(&step, event).unwrap();
        store.segments().to_vec()
    }

    #[test]
    fn test_attribute_deposits_walks_ancestors() {
        let mut event = EventTrajectories::new();
        event.add(trajectory(1, 0, "mu-", -1.0, ProcessKind::Primary, 100.0));
        event.add(trajectory(2, 1, "e-", -1.0, ProcessKind::Ionization, 5.0));
        let segments = one_segment(&event, 2);

        attribute_deposits(&mut event, &segments).unwrap();

        let daughter = event.get(2).unwrap();
        assert_relative_eq!(daughter.sd_energy_deposit(), 3.0);
        assert_relative_eq!(daughter.sd_length(), 2.0);
        let parent = event.get(1).unwrap();
        assert_relative_eq!(parent.sd_energy_deposit(), 0.0);
        assert_relative_eq!(parent.sd_total_energy_deposit(), 3.0);
    }

    #[test]
    fn test_attribute_deposits_missing_founder_is_fatal() {
        let mut event = EventTrajectories::new();
        event.add(trajectory(1, 0, "mu-", -1.0, ProcessKind::Primary, 100.0));
        let segments = one_segment(&event, 1);
        let mut stripped = EventTrajectories::new();
        assert!(matches!(
            attribute_deposits(&mut stripped, &segments),
            Err(Error::TrajectoryNotFound(1))
        ));
    }

    #[test]
    fn test_primary_marked_by_default() {
        let mut event = EventTrajectories::new();
        event.add(trajectory(1, 0, "mu-", -1.0, ProcessKind::Primary, 100.0));
        mark_trajectories(&mut event, &SummaryConfig::default(), &[]).unwrap();
        assert!(event.get(1).unwrap().is_marked());
    }

    #[test]
    fn test_quiet_primary_skipped_when_not_saving_all() {
        let mut event = EventTrajectories::new();
        event.add(trajectory(1, 0, "mu-", -1.0, ProcessKind::Primary, 100.0));
        let config = SummaryConfig::default().with_save_all_primaries(false);
        mark_trajectories(&mut event, &config, &[]).unwrap();
        assert!(!event.get(1).unwrap().is_marked());
    }

    #[test]
    fn test_neutrino_never_marked() {
        let mut event = EventTrajectories::new();
        event.add(trajectory(1, 0, "mu-", -1.0, ProcessKind::Primary, 100.0));
        let mut nu = trajectory(2, 1, "nu_mu", 0.0, ProcessKind::Decay, 50.0);
        nu.add_sd_daughter_deposit(5.0);
        event.add(nu);
        let config = SummaryConfig::default().with_save_all_primaries(false);
        mark_trajectories(&mut event, &config, &[]).unwrap();
        assert!(!event.get(2).unwrap().is_marked());
    }

    #[test]
    fn test_decay_product_marked() {
        let mut event = EventTrajectories::new();
        event.add(trajectory(1, 0, "pi+", 1.0, ProcessKind::Primary, 100.0));
        event.add(trajectory(2, 1, "mu+", 1.0, ProcessKind::Decay, 30.0));
        let config = SummaryConfig::default().with_save_all_primaries(false);
        mark_trajectories(&mut event, &config, &[]).unwrap();
        assert!(event.get(2).unwrap().is_marked());
    }

    #[test]
    fn test_gamma_threshold_gates_marking() {
        let mut event = EventTrajectories::new();
        event.add(trajectory(1, 0, "mu-", -1.0, ProcessKind::Primary, 100.0));
        let mut soft = trajectory(2, 1, "gamma", 0.0, ProcessKind::Other, 1.0);
        soft.add_sd_daughter_deposit(2.0);
        event.add(soft);
        let mut hard = trajectory(3, 1, "gamma", 0.0, ProcessKind::Other, 10.0);
        hard.add_sd_daughter_deposit(2.0);
        event.add(hard);

        let config = SummaryConfig::default().with_save_all_primaries(false);
        mark_trajectories(&mut event, &config, &[]).unwrap();
        assert!(!event.get(2).unwrap().is_marked());
        assert!(event.get(3).unwrap().is_marked());
    }

    #[test]
    fn test_segment_primary_always_marked() {
        let mut event = EventTrajectories::new();
        event.add(trajectory(1, 0, "mu-", -1.0, ProcessKind::Primary, 100.0));
        event.add(trajectory(2, 1, "e-", -1.0, ProcessKind::Ionization, 0.01));
        let segments = one_segment(&event, 2);

        let config = SummaryConfig::default().with_save_all_primaries(false);
        mark_trajectories(&mut event, &config, &segments).unwrap();
        // The segment's primary id resolves to the primary track.
        assert!(event.get(1).unwrap().is_marked());
    }
}
