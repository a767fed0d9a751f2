use std::collections::VecDeque;

use crate::cluster::LineCandidate;
use crate::contour::FlatContour;

/// Smoothed horizon line, the arithmetic mean of the history buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedLine {
    pub offset: f32,
    pub angle: f32,
}

/// What the renderer gets to draw for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub enum HorizonEstimate<'a> {
    Line(TrackedLine),
    Region(&'a FlatContour),
}

/// Per-stream temporal state: a bounded FIFO of accepted line candidates
/// plus the last accepted region contour. Frames with no usable candidate
/// leave the state untouched, so the previous estimate keeps being drawn.
pub struct HorizonTracker {
    capacity: usize,
    history: VecDeque<LineCandidate>,
    state: Option<TrackedLine>,
    region: Option<FlatContour>,
}

impl HorizonTracker {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            history: VecDeque::with_capacity(capacity),
            state: None,
            region: None,
        }
    }

    /// Fold one frame's worth of line candidates into the history and
    /// return the accepted one, if any.
    ///
    /// While the buffer is still filling, the candidate with the greatest
    /// support wins; once full, the one nearest the tracked offset does.
    /// Both comparisons are strict, so the first of tied candidates is
    /// chosen. An empty slate is a no-op.
    pub fn observe_lines(&mut self, candidates: &[LineCandidate]) -> Option<LineCandidate> {
        let chosen = if self.history.len() < self.capacity {
            let mut best: Option<(usize, u32)> = None;
            for (i, c) in candidates.iter().enumerate() {
                if best.map_or(true, |(_, support)| c.support > support) {
                    best = Some((i, c.support));
                }
            }
            best.map(|(i, _)| candidates[i])
        } else {
            let target = self.state.as_ref()?.offset;
            let mut best: Option<(usize, f32)> = None;
            for (i, c) in candidates.iter().enumerate() {
                let dist = (c.offset - target).abs();
                if best.map_or(true, |(_, d)| dist < d) {
                    best = Some((i, dist));
                }
            }
            best.map(|(i, _)| candidates[i])
        };
        if let Some(candidate) = chosen {
            if self.history.len() == self.capacity {
                self.history.pop_front();
            }
            self.history.push_back(candidate);
            self.refresh_state();
        }
        chosen
    }

    /// Replace the tracked region when a frame produced one; keep the old
    /// region otherwise.
    pub fn observe_region(&mut self, contour: Option<FlatContour>) {
        if contour.is_some() {
            self.region = contour;
        }
    }

    pub fn estimate(&self) -> Option<HorizonEstimate<'_>> {
        if let Some(region) = &self.region {
            Some(HorizonEstimate::Region(region))
        } else {
            self.state.map(HorizonEstimate::Line)
        }
    }

    pub fn state(&self) -> Option<TrackedLine> {
        self.state
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn refresh_state(&mut self) {
        if self.history.is_empty() {
            self.state = None;
            return;
        }
        let n = self.history.len() as f32;
        let mut offset = 0.0;
        let mut angle = 0.0;
        for c in &self.history {
            offset += c.offset;
            angle += c.angle;
        }
        self.state = Some(TrackedLine {
            offset: offset / n,
            angle: angle / n,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vector2f;
    use std::f32::consts::PI;

    fn candidate(offset: f32, support: u32) -> LineCandidate {
        LineCandidate {
            offset,
            angle: PI / 2.0,
            support,
        }
    }

    #[test]
    fn test_constant_candidate_converges_exactly() {
        let mut tracker = HorizonTracker::new(20);
        for _ in 0..25 {
            tracker.observe_lines(&[candidate(120.0, 2)]);
        }
        let state = tracker.state().unwrap();
        assert_eq!(state.offset, 120.0);
        assert_eq!(state.angle, PI / 2.0);
    }

    #[test]
    fn test_history_never_exceeds_capacity() {
        let mut tracker = HorizonTracker::new(20);
        for i in 0..50 {
            tracker.observe_lines(&[candidate(100.0 + i as f32, 1)]);
            assert!(tracker.history_len() <= 20);
        }
        assert_eq!(tracker.history_len(), 20);
    }

    #[test]
    fn test_empty_frame_changes_nothing() {
        let mut tracker = HorizonTracker::new(5);
        tracker.observe_lines(&[candidate(100.0, 1)]);
        let before = tracker.state();
        tracker.observe_lines(&[]);
        assert_eq!(tracker.state(), before);
        assert_eq!(tracker.history_len(), 1);
    }

    #[test]
    fn test_steady_state_picks_nearest_offset() {
        let mut tracker = HorizonTracker::new(1);
        tracker.observe_lines(&[candidate(100.0, 1)]);
        let accepted =
            tracker.observe_lines(&[candidate(80.0, 9), candidate(150.0, 9), candidate(102.0, 1)]);
        assert_eq!(accepted, Some(candidate(102.0, 1)));
        assert_eq!(tracker.state().unwrap().offset, 102.0);
    }

    #[test]
    fn test_empty_frame_accepts_nothing() {
        let mut tracker = HorizonTracker::new(3);
        assert_eq!(tracker.observe_lines(&[]), None);
    }

    #[test]
    fn test_nearest_tie_keeps_first_candidate() {
        let mut tracker = HorizonTracker::new(1);
        tracker.observe_lines(&[candidate(100.0, 1)]);
        tracker.observe_lines(&[candidate(98.0, 1), candidate(102.0, 1)]);
        assert_eq!(tracker.state().unwrap().offset, 98.0);
    }

    #[test]
    fn test_cold_start_prefers_greatest_support() {
        let mut tracker = HorizonTracker::new(10);
        tracker.observe_lines(&[
            candidate(60.0, 2),
            candidate(140.0, 5),
            candidate(90.0, 5),
        ]);
        assert_eq!(tracker.state().unwrap().offset, 140.0);
    }

    #[test]
    fn test_state_is_mean_of_history() {
        let mut tracker = HorizonTracker::new(4);
        tracker.observe_lines(&[candidate(100.0, 1)]);
        tracker.observe_lines(&[candidate(110.0, 1)]);
        assert_eq!(tracker.state().unwrap().offset, 105.0);
    }

    #[test]
    fn test_region_survives_empty_frames() {
        let contour = FlatContour {
            points: vec![
                Vector2f::new(10.0, 0.0),
                Vector2f::new(10.0, 40.0),
                Vector2f::new(90.0, 60.0),
                Vector2f::new(90.0, 0.0),
            ],
        };
        let mut tracker = HorizonTracker::new(5);
        tracker.observe_region(Some(contour.clone()));
        tracker.observe_region(None);
        match tracker.estimate() {
            Some(HorizonEstimate::Region(region)) => assert_eq!(region, &contour),
            other => panic!("expected a region estimate, got {other:?}"),
        }
    }

    #[test]
    fn test_no_estimate_before_first_observation() {
        let tracker = HorizonTracker::new(5);
        assert!(tracker.estimate().is_none());
        assert!(tracker.state().is_none());
    }
}
