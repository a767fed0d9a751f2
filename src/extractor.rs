use crate::cluster::{cluster_lines, LineCandidate};
use crate::config::{Config, StrategyKind};
use crate::contour::{self, FlatContour};
use crate::edges::EdgeDetector;
use crate::hough::{keep_near_horizontal, HoughParams, HoughTransform};
use crate::image::Image;
use crate::preprocess::{apply_threshold, Preprocessed};

/// Fraction of the frame width a contour may start from the left edge and
/// still count as the skyline region.
const LEFT_MARGIN_FRACTION: f32 = 0.2;

/// Per-frame detections, one variant per extraction strategy.
#[derive(Debug, Clone)]
pub enum Candidates {
    Lines(Vec<LineCandidate>),
    Region(Option<FlatContour>),
}

impl Candidates {
    /// Number of distinct detections this frame.
    pub fn count(&self) -> usize {
        match self {
            Candidates::Lines(lines) => lines.len(),
            Candidates::Region(region) => usize::from(region.is_some()),
        }
    }
}

/// A feature-extraction strategy turns a preprocessed frame into horizon
/// candidates. Implementations keep their scratch buffers across frames.
pub trait FeatureExtractor {
    fn extract(&mut self, pre: &Preprocessed) -> Candidates;
}

/// Build the extractor selected in the configuration.
pub fn build(config: &Config) -> Box<dyn FeatureExtractor> {
    match config.strategy {
        StrategyKind::Lines => Box::new(LineExtractor::new(config)),
        StrategyKind::Regions => Box::new(RegionExtractor::new(config)),
    }
}

/// Edge detection plus the polar line transform, then clustering of the
/// surviving near-horizontal lines.
pub struct LineExtractor {
    threshold_factor: f32,
    cluster_distance: f32,
    binary: Image,
    edges: EdgeDetector,
    hough: HoughTransform,
}

impl LineExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            threshold_factor: config.threshold_factor,
            cluster_distance: config.cluster_distance,
            binary: Image::empty(),
            edges: EdgeDetector::default(),
            hough: HoughTransform::new(HoughParams {
                vote_threshold: config.vote_threshold,
                ..HoughParams::default()
            }),
        }
    }
}

impl FeatureExtractor for LineExtractor {
    fn extract(&mut self, pre: &Preprocessed) -> Candidates {
        let threshold = self.threshold_factor * pre.band_mean;
        apply_threshold(pre.image, threshold, &mut self.binary);
        let points = self.edges.run(&self.binary);
        let raw = self.hough.detect(&points, pre.frame_width, pre.frame_height);
        let raw = keep_near_horizontal(raw, pre.frame_height);
        Candidates::Lines(cluster_lines(&raw, self.cluster_distance))
    }
}

/// Bright-region tracing: threshold, trace boundaries, pick the largest
/// contour anchored near the left edge, flatten it into the skyline span.
pub struct RegionExtractor {
    binary: Image,
}

impl RegionExtractor {
    pub fn new(_config: &Config) -> Self {
        Self {
            binary: Image::empty(),
        }
    }
}

impl FeatureExtractor for RegionExtractor {
    fn extract(&mut self, pre: &Preprocessed) -> Candidates {
        let threshold = glare_factor(pre.band_mean) * pre.band_mean;
        apply_threshold(pre.image, threshold, &mut self.binary);
        let contours = contour::trace_regions(&self.binary);
        let margin = LEFT_MARGIN_FRACTION * pre.frame_width as f32;
        let skyline = contours.iter().find(|c| c.min_x <= margin);
        Candidates::Region(skyline.map(contour::flatten))
    }
}

/// Glare damping: the brighter the probe band, the further below the mean
/// the region threshold is pulled.
fn glare_factor(band_mean: f32) -> f32 {
    if band_mean <= 150.0 {
        0.9
    } else if band_mean <= 200.0 {
        0.75
    } else {
        0.6
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vector2f;

    fn sea_and_sky(width: usize, height: usize, horizon: usize) -> Image {
        let mut image = Image::filled(width, height, 60);
        for y in 0..horizon {
            for x in 0..width {
                image.set_value(x, y, 200);
            }
        }
        image
    }

    fn preprocessed(image: &Image) -> Preprocessed<'_> {
        Preprocessed {
            image,
            band_mean: 200.0,
            frame_width: image.width,
            frame_height: image.height,
        }
    }

    #[test]
    fn test_line_strategy_finds_horizon_row() {
        let image = sea_and_sky(320, 240, 100);
        let mut extractor = LineExtractor::new(&Config::default());
        let candidates = extractor.extract(&preprocessed(&image));
        match candidates {
            Candidates::Lines(lines) => {
                assert_eq!(lines.len(), 1);
                assert!((lines[0].offset - 99.0).abs() <= 1.0);
                assert!(lines[0].support >= 1);
            }
            other => panic!("expected line candidates, got {other:?}"),
        }
    }

    #[test]
    fn test_line_strategy_rejects_boundary_outside_band() {
        // A boundary in the top fifth of the frame is cloud bank territory.
        let image = sea_and_sky(320, 240, 30);
        let mut extractor = LineExtractor::new(&Config::default());
        match extractor.extract(&preprocessed(&image)) {
            Candidates::Lines(lines) => assert!(lines.is_empty()),
            other => panic!("expected line candidates, got {other:?}"),
        }
    }

    #[test]
    fn test_region_strategy_flattens_sky() {
        let image = sea_and_sky(320, 240, 100);
        let mut extractor = RegionExtractor::new(&Config::default());
        match extractor.extract(&preprocessed(&image)) {
            Candidates::Region(Some(flat)) => {
                let n = flat.points.len();
                assert_eq!(flat.points[0], Vector2f::new(0.0, 0.0));
                assert_eq!(flat.points[n - 1], Vector2f::new(319.0, 0.0));
                // The span itself is the last sky row, left to right.
                assert_eq!(flat.points[1], Vector2f::new(0.0, 99.0));
                assert_eq!(flat.points[n - 2], Vector2f::new(319.0, 99.0));
            }
            other => panic!("expected a region, got {other:?}"),
        }
    }

    #[test]
    fn test_region_strategy_needs_left_anchor() {
        // Bright patch well right of the margin: not the skyline.
        let mut image = Image::filled(320, 240, 60);
        for y in 0..80 {
            for x in 200..320 {
                image.set_value(x, y, 200);
            }
        }
        let mut extractor = RegionExtractor::new(&Config::default());
        match extractor.extract(&preprocessed(&image)) {
            Candidates::Region(region) => assert!(region.is_none()),
            other => panic!("expected a region variant, got {other:?}"),
        }
    }

    #[test]
    fn test_region_strategy_empty_frame() {
        let image = Image::zeros(320, 240);
        let mut extractor = RegionExtractor::new(&Config::default());
        match extractor.extract(&preprocessed(&image)) {
            Candidates::Region(region) => assert!(region.is_none()),
            other => panic!("expected a region variant, got {other:?}"),
        }
    }

    #[test]
    fn test_glare_factor_tiers() {
        assert_eq!(glare_factor(120.0), 0.9);
        assert_eq!(glare_factor(150.0), 0.9);
        assert_eq!(glare_factor(180.0), 0.75);
        assert_eq!(glare_factor(200.0), 0.75);
        assert_eq!(glare_factor(230.0), 0.6);
    }

    #[test]
    fn test_candidate_count() {
        assert_eq!(Candidates::Lines(vec![]).count(), 0);
        assert_eq!(Candidates::Region(None).count(), 0);
    }
}
