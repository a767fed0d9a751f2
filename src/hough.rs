use std::f32::consts::PI;

use crate::edges::EdgePoint;

pub const DEFAULT_RHO_RESOLUTION: f32 = 1.0;
pub const DEFAULT_THETA_RESOLUTION: f32 = PI / 180.0;

/// Half-width of the accepted angle window around a level line.
pub const ANGLE_TOLERANCE: f32 = PI / 32.0;
/// Accepted offset band, as fractions of the frame height. Lines above the
/// band are usually cloud banks, lines below it wave crests.
pub const MIN_OFFSET_FRACTION: f32 = 0.2;
pub const MAX_OFFSET_FRACTION: f32 = 0.5;

/// Detection straight out of the accumulator, before clustering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawLine {
    /// Signed distance from the origin to the line (rho).
    pub offset: f32,
    /// Direction of the line normal (theta), in [0, pi).
    pub angle: f32,
    pub votes: u32,
}

#[derive(Debug, Clone)]
pub struct HoughParams {
    pub rho_resolution: f32,
    pub theta_resolution: f32,
    pub vote_threshold: u32,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            rho_resolution: DEFAULT_RHO_RESOLUTION,
            theta_resolution: DEFAULT_THETA_RESOLUTION,
            vote_threshold: 150,
        }
    }
}

/// Polar (rho, theta) line transform over a sparse edge point set.
///
/// The accumulator is kept between frames to avoid re-allocating a few
/// megabytes per frame on large inputs.
pub struct HoughTransform {
    params: HoughParams,
    accum: Vec<u32>,
    sin_table: Vec<f32>,
    cos_table: Vec<f32>,
}

impl HoughTransform {
    pub fn new(params: HoughParams) -> Self {
        let num_theta = (PI / params.theta_resolution).round() as usize;
        let mut sin_table = Vec::with_capacity(num_theta);
        let mut cos_table = Vec::with_capacity(num_theta);
        for t in 0..num_theta {
            let theta = t as f32 * params.theta_resolution;
            sin_table.push(theta.sin());
            cos_table.push(theta.cos());
        }
        Self {
            params,
            accum: vec![],
            sin_table,
            cos_table,
        }
    }

    /// Vote every edge point over the full angle sweep and report the
    /// accumulator cells that clear the vote threshold and are local maxima
    /// over their (rho, theta) neighbors. Results are sorted by descending
    /// votes; ties keep accumulator scan order.
    pub fn detect(&mut self, points: &[EdgePoint], width: usize, height: usize) -> Vec<RawLine> {
        if points.is_empty() {
            return vec![];
        }
        let num_theta = self.sin_table.len();
        let diag = ((width * width + height * height) as f32).sqrt().ceil();
        let num_rho = 2 * (diag / self.params.rho_resolution).ceil() as usize + 1;
        self.accum.clear();
        self.accum.resize(num_theta * num_rho, 0);
        for p in points {
            let x = p.x as f32;
            let y = p.y as f32;
            for t in 0..num_theta {
                let rho = x * self.cos_table[t] + y * self.sin_table[t];
                let bin = ((rho + diag) / self.params.rho_resolution).round() as usize;
                self.accum[t * num_rho + bin] += 1;
            }
        }
        let mut lines = Vec::new();
        let at = |accum: &[u32], t: i64, r: i64| -> u32 {
            if t < 0 || r < 0 || t >= num_theta as i64 || r >= num_rho as i64 {
                0
            } else {
                accum[t as usize * num_rho + r as usize]
            }
        };
        for t in 0..num_theta as i64 {
            for r in 0..num_rho as i64 {
                let votes = self.accum[t as usize * num_rho + r as usize];
                if votes < self.params.vote_threshold {
                    continue;
                }
                // Mixed strict / non-strict comparisons so a flat two-cell
                // peak reports exactly once.
                if votes > at(&self.accum, t, r - 1)
                    && votes >= at(&self.accum, t, r + 1)
                    && votes > at(&self.accum, t - 1, r)
                    && votes >= at(&self.accum, t + 1, r)
                {
                    lines.push(RawLine {
                        offset: r as f32 * self.params.rho_resolution - diag,
                        angle: t as f32 * self.params.theta_resolution,
                        votes,
                    });
                }
            }
        }
        lines.sort_by_key(|l| std::cmp::Reverse(l.votes));
        lines
    }
}

/// Drop everything that cannot be a horizon: keep lines within
/// `ANGLE_TOLERANCE` of level whose offset falls inside the accepted band.
pub fn keep_near_horizontal(mut lines: Vec<RawLine>, frame_height: usize) -> Vec<RawLine> {
    let min_offset = MIN_OFFSET_FRACTION * frame_height as f32;
    let max_offset = MAX_OFFSET_FRACTION * frame_height as f32;
    lines.retain(|l| {
        (PI / 2.0 - l.angle).abs() <= ANGLE_TOLERANCE
            && l.offset >= min_offset
            && l.offset <= max_offset
    });
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_of_points(y: u32, x0: u32, x1: u32) -> Vec<EdgePoint> {
        (x0..=x1).map(|x| EdgePoint { x, y }).collect()
    }

    #[test]
    fn test_detects_horizontal_row() {
        let points = row_of_points(30, 0, 200);
        let mut hough = HoughTransform::new(HoughParams::default());
        let lines = hough.detect(&points, 320, 240);
        assert_eq!(lines.len(), 1);
        let line = lines[0];
        assert_eq!(line.votes, 201);
        assert!((line.offset - 30.0).abs() <= 0.5);
        assert!((line.angle - PI / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_too_few_votes_reports_nothing() {
        let points = row_of_points(30, 0, 100);
        let mut hough = HoughTransform::new(HoughParams::default());
        assert!(hough.detect(&points, 320, 240).is_empty());
    }

    #[test]
    fn test_strongest_line_comes_first() {
        let mut points = row_of_points(100, 0, 319);
        points.extend(row_of_points(160, 0, 200));
        let mut hough = HoughTransform::new(HoughParams::default());
        let lines = hough.detect(&points, 320, 240);
        assert_eq!(lines.len(), 2);
        assert!((lines[0].offset - 100.0).abs() <= 0.5);
        assert!((lines[1].offset - 160.0).abs() <= 0.5);
        assert!(lines[0].votes > lines[1].votes);
    }

    #[test]
    fn test_keep_near_horizontal_angle_window() {
        let lines = vec![
            RawLine { offset: 100.0, angle: PI / 2.0, votes: 200 },
            RawLine { offset: 100.0, angle: PI / 4.0, votes: 200 },
            RawLine { offset: 100.0, angle: PI / 2.0 + ANGLE_TOLERANCE * 1.5, votes: 200 },
        ];
        let kept = keep_near_horizontal(lines, 480);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].angle, PI / 2.0);
    }

    #[test]
    fn test_keep_near_horizontal_offset_band() {
        let h = 480;
        let mk = |offset: f32| RawLine { offset, angle: PI / 2.0, votes: 151 };
        let kept = keep_near_horizontal(vec![mk(50.0), mk(96.0), mk(240.0), mk(300.0)], h);
        let offsets: Vec<f32> = kept.iter().map(|l| l.offset).collect();
        assert_eq!(offsets, vec![96.0, 240.0]);
    }

    #[test]
    fn test_empty_input_is_fine() {
        let mut hough = HoughTransform::new(HoughParams::default());
        assert!(hough.detect(&[], 320, 240).is_empty());
    }
}
