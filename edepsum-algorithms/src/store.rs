//! Per-event, per-region collection of hit segments.

use log::trace;

use edepsum_core::step::StepRecord;
use edepsum_core::trajectory::EventTrajectories;
use edepsum_core::Result;

use crate::segment::{HitSegment, SegmentConfig};

/// Accumulates the hit segments of one sensitive region.
///
/// A step can only ever extend the most recently created segment, so
/// the store keeps an index to it as an O(1) fast path instead of
/// searching the whole collection. If the latest segment rejects the
/// step, a new segment is created and becomes the latest.
#[derive(Debug)]
pub struct SegmentStore {
    name: String,
    config: SegmentConfig,
    segments: Vec<HitSegment>,
    last_hit: Option<usize>,
}

impl SegmentStore {
    /// Creates a store for the named sensitive region.
    pub fn new(name: impl Into<String>, config: SegmentConfig) -> Self {
        Self {
            name: name.into(),
            config,
            segments: Vec::new(),
            last_hit: None,
        }
    }

    /// Name of the sensitive region.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The region's segment tolerances.
    pub fn config(&self) -> &SegmentConfig {
        &self.config
    }

    /// Routes one step into the latest segment or a new one.
    ///
    /// Steps without an energy deposit are ignored.
    pub fn process_step(&mut self, step: &StepRecord, event: &EventTrajectories) -> Result<()> {
        trace!(
            "{}: step of track {} with {:.6} MeV",
            self.name,
            step.track_id,
            step.energy_deposit
        );
        if step.energy_deposit <= 0.0 {
            return Ok(());
        }

        if let Some(index) = self.last_hit {
            if self.segments[index].same_hit(step) {
                return self.segments[index].add_step(step, event);
            }
        }

        self.segments.push(HitSegment::new(&self.config));
        let index = self.segments.len() - 1;
        self.last_hit = Some(index);
        self.segments[index].add_step(step, event)
    }

    /// The segments accumulated so far, in creation order.
    pub fn segments(&self) -> &[HitSegment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when no segment has been created.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Drops all segments. Call at the start of each event.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.last_hit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use edepsum_core::geometry::FourVector;
    use edepsum_core::step::{ProcessKind, StepStatus};
    use edepsum_core::trajectory::{Trajectory, TrajectoryPoint};
    use edepsum_core::volume::VolumeId;
    use nalgebra::Vector3;

    fn step(track_id: i32, pre: [f64; 3], post: [f64; 3], t: f64, deposit: f64) -> StepRecord {
        let pre = Vector3::from(pre);
        let post = Vector3::from(post);
        StepRecord {
            track_id,
            pre: FourVector::new(pre, t),
            post: FourVector::new(post, t + 0.01),
            energy_deposit: deposit,
            non_ionizing_deposit: 0.0,
            track_length: (post - pre).norm(),
            volume: VolumeId::from_levels([(10, 0), (1, 0)]),
            charge: -1.0,
            particle: "e-".into(),
            status: StepStatus::Other,
            process: ProcessKind::Ionization,
        }
    }

    fn event() -> EventTrajectories {
        let mut event = EventTrajectories::new();
        event.add(Trajectory::new(
            1,
            0,
            "e-",
            -1.0,
            ProcessKind::Primary,
            Vector3::new(1.0, 0.0, 0.0),
            TrajectoryPoint {
                position: Vector3::zeros(),
                time: 0.0,
                momentum: Vector3::new(1.0, 0.0, 0.0),
                process: ProcessKind::Primary,
                process_deposit: 0.0,
                status: StepStatus::Other,
                volume_name: "sensitive".into(),
            },
        ));
        event
    }

    #[test]
    fn test_single_track_single_segment() {
        let event = event();
        let mut store = SegmentStore::new("sensitive", SegmentConfig::default());

        for i in 0..3 {
            let x = f64::from(i);
            let s = step(1, [x, 0.0, 0.0], [x + 1.0, 0.0, 0.0], 0.01 * x, 1.0);
            store.process_step(&s, &event).unwrap();
        }

        assert_eq!(store.len(), 1);
        assert_relative_eq!(store.segments()[0].energy_deposit(), 3.0);
    }

    #[test]
    fn test_kink_starts_new_segment() {
        let event = event();
        let mut store = SegmentStore::new("sensitive", SegmentConfig::default());

        for i in 0..3 {
            let x = f64::from(i);
            let s = step(1, [x, 0.0, 0.0], [x + 1.0, 0.0, 0.0], 0.01 * x, 1.0);
            store.process_step(&s, &event).unwrap();
        }
        let kink = step(1, [3.0, 0.0, 0.0], [3.0, 2.0, 0.0], 0.03, 1.0);
        store.process_step(&kink, &event).unwrap();

        assert_eq!(store.len(), 2);
        // The first segment stays closed with its deposit intact.
        assert_relative_eq!(store.segments()[0].energy_deposit(), 3.0);
        assert_relative_eq!(store.segments()[1].energy_deposit(), 1.0);
    }

    #[test]
    fn test_only_latest_segment_is_extended() {
        let event = event();
        let mut store = SegmentStore::new("sensitive", SegmentConfig::default());

        for i in 0..2 {
            let x = f64::from(i);
            let s = step(1, [x, 0.0, 0.0], [x + 1.0, 0.0, 0.0], 0.01 * x, 1.0);
            store.process_step(&s, &event).unwrap();
        }
        let kink = step(1, [2.0, 0.0, 0.0], [2.0, 2.0, 0.0], 0.02, 1.0);
        store.process_step(&kink, &event).unwrap();
        assert_eq!(store.len(), 2);

        // Colinear with the first segment, but discontinuous from the
        // latest one: a third segment, never a merge into the first.
        let old_line = step(1, [3.0, 0.0, 0.0], [4.0, 0.0, 0.0], 0.03, 1.0);
        store.process_step(&old_line, &event).unwrap();
        assert_eq!(store.len(), 3);
        assert_relative_eq!(store.segments()[0].energy_deposit(), 2.0);
    }

    #[test]
    fn test_zero_deposit_ignored() {
        let event = event();
        let mut store = SegmentStore::new("sensitive", SegmentConfig::default());

        let s = step(1, [0.0; 3], [1.0, 0.0, 0.0], 0.0, 0.0);
        store.process_step(&s, &event).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_resets_fast_path() {
        let event = event();
        let mut store = SegmentStore::new("sensitive", SegmentConfig::default());

        let s = step(1, [0.0; 3], [1.0, 0.0, 0.0], 0.0, 1.0);
        store.process_step(&s, &event).unwrap();
        store.clear();
        assert!(store.is_empty());

        store.process_step(&s, &event).unwrap();
        assert_eq!(store.len(), 1);
    }
}
