use serde::Serialize;

use crate::config::Config;
use crate::extractor::{self, Candidates, FeatureExtractor};
use crate::image::RgbImage;
use crate::preprocess::Preprocessor;
use crate::render;
use crate::tracker::{HorizonEstimate, HorizonTracker};

/// What the pipeline concluded for one frame; also one line of the track
/// log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSummary {
    pub frame: usize,
    /// Distinct detections this frame, after clustering.
    pub candidates: usize,
    /// Tracked line state, when the strategy produces lines.
    pub offset: Option<f32>,
    pub angle: Option<f32>,
    /// Support of the candidate accepted this frame.
    pub support: Option<u32>,
    /// Leftmost and rightmost column of the tracked region span.
    pub region_span: Option<(f32, f32)>,
}

/// The per-stream detection pipeline: preprocessor, extraction strategy,
/// temporal tracker and overlay renderer, run strictly in order once per
/// frame. This is the only component that carries state across frames.
pub struct HorizonPipeline {
    preprocessor: Preprocessor,
    extractor: Box<dyn FeatureExtractor>,
    tracker: HorizonTracker,
    overlay: RgbImage,
    frame_index: usize,
}

impl HorizonPipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            preprocessor: Preprocessor::new(config),
            extractor: extractor::build(config),
            tracker: HorizonTracker::new(config.window_size),
            overlay: RgbImage::empty(),
            frame_index: 0,
        }
    }

    /// Run one frame through the pipeline. The rendered overlay is
    /// available from [`overlay`](Self::overlay) until the next call.
    pub fn process(&mut self, frame: &RgbImage) -> FrameSummary {
        let pre = self.preprocessor.run(frame);
        let candidates = self.extractor.extract(&pre);
        let count = candidates.count();
        let accepted = match candidates {
            Candidates::Lines(lines) => self.tracker.observe_lines(&lines),
            Candidates::Region(region) => {
                self.tracker.observe_region(region);
                None
            }
        };
        self.overlay.copy_from(frame);
        let mut region_span = None;
        if let Some(estimate) = self.tracker.estimate() {
            if let HorizonEstimate::Region(region) = &estimate {
                let points = &region.points;
                region_span = Some((points[0].x, points[points.len() - 1].x));
            }
            render::draw(&estimate, &mut self.overlay);
        }
        let state = self.tracker.state();
        let summary = FrameSummary {
            frame: self.frame_index,
            candidates: count,
            offset: state.map(|s| s.offset),
            angle: state.map(|s| s.angle),
            support: accepted.map(|c| c.support),
            region_span,
        };
        self.frame_index += 1;
        summary
    }

    /// Overlay rendered by the most recent [`process`](Self::process) call.
    pub fn overlay(&self) -> &RgbImage {
        &self.overlay
    }

    /// Temporal tracker behind the summaries, for callers that want the
    /// raw state.
    pub fn tracker(&self) -> &HorizonTracker {
        &self.tracker
    }
}
