use crate::image::Image;

pub const DEFAULT_LOW_THRESHOLD: f32 = 100.0;
pub const DEFAULT_HIGH_THRESHOLD: f32 = 200.0;

/// tan(22.5 degrees), used to split gradient directions into the four
/// suppression sectors without calling atan2.
const TAN_22_5_DEG: f32 = 0.414_213_56;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgePoint {
    pub x: u32,
    pub y: u32,
}

/// Canny-style edge detector: Scharr gradients, L2 magnitude, directional
/// non-maximum suppression and double-threshold hysteresis. Returns the
/// surviving edge pixels as a sparse list in row-major order.
///
/// The scratch buffers live in the detector so repeated frames reuse their
/// allocations.
pub struct EdgeDetector {
    low: f32,
    high: f32,
    mag: Vec<f32>,
    gx: Vec<f32>,
    gy: Vec<f32>,
    class: Vec<u8>,
    stack: Vec<usize>,
}

// Pixel classes after suppression.
const NONE: u8 = 0;
const WEAK: u8 = 1;
const CONFIRMED: u8 = 2;

impl EdgeDetector {
    pub fn new(low: f32, high: f32) -> Self {
        Self {
            low,
            high,
            mag: vec![],
            gx: vec![],
            gy: vec![],
            class: vec![],
            stack: vec![],
        }
    }

    pub fn run(&mut self, image: &Image) -> Vec<EdgePoint> {
        let w = image.width;
        let h = image.height;
        if w < 3 || h < 3 {
            return vec![];
        }
        self.gradients(image);
        self.suppress(w, h);
        self.hysteresis(w, h);
        let mut points = Vec::new();
        for y in 0..h {
            for x in 0..w {
                if self.class[y * w + x] == CONFIRMED {
                    points.push(EdgePoint {
                        x: x as u32,
                        y: y as u32,
                    });
                }
            }
        }
        points
    }

    /// Normalized Scharr derivatives with replicated borders.
    fn gradients(&mut self, image: &Image) {
        let w = image.width as i32;
        let h = image.height as i32;
        let n = (w * h) as usize;
        self.gx.clear();
        self.gx.resize(n, 0.0);
        self.gy.clear();
        self.gy.resize(n, 0.0);
        self.mag.clear();
        self.mag.resize(n, 0.0);
        let sample = |x: i32, y: i32| -> f32 {
            image.value_i32(x.clamp(0, w - 1), y.clamp(0, h - 1)) as f32
        };
        for y in 0..h {
            for x in 0..w {
                let tl = sample(x - 1, y - 1);
                let tm = sample(x, y - 1);
                let tr = sample(x + 1, y - 1);
                let ml = sample(x - 1, y);
                let mr = sample(x + 1, y);
                let bl = sample(x - 1, y + 1);
                let bm = sample(x, y + 1);
                let br = sample(x + 1, y + 1);
                let gx = (3.0 * (tr - tl) + 10.0 * (mr - ml) + 3.0 * (br - bl)) / 16.0;
                let gy = (3.0 * (bl - tl) + 10.0 * (bm - tm) + 3.0 * (br - tr)) / 16.0;
                let i = (y * w + x) as usize;
                self.gx[i] = gx;
                self.gy[i] = gy;
                self.mag[i] = (gx * gx + gy * gy).sqrt();
            }
        }
    }

    /// Keep only pixels that are maximal along their gradient direction and
    /// classify them against the double threshold. The comparison is strict
    /// against the scan-order-earlier neighbor and non-strict against the
    /// later one, so exactly one side of a two-pixel plateau survives.
    fn suppress(&mut self, w: usize, h: usize) {
        self.class.clear();
        self.class.resize(w * h, NONE);
        let at = |mag: &[f32], x: i32, y: i32| -> f32 {
            if x < 0 || y < 0 || x >= w as i32 || y >= h as i32 {
                0.0
            } else {
                mag[y as usize * w + x as usize]
            }
        };
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                let i = y as usize * w + x as usize;
                let m = self.mag[i];
                if m <= self.low {
                    continue;
                }
                let ax = self.gx[i].abs();
                let ay = self.gy[i].abs();
                let (prev, next) = if ay <= TAN_22_5_DEG * ax {
                    ((x - 1, y), (x + 1, y))
                } else if ax <= TAN_22_5_DEG * ay {
                    ((x, y - 1), (x, y + 1))
                } else if self.gx[i] * self.gy[i] > 0.0 {
                    ((x - 1, y - 1), (x + 1, y + 1))
                } else {
                    ((x + 1, y - 1), (x - 1, y + 1))
                };
                if m > at(&self.mag, prev.0, prev.1) && m >= at(&self.mag, next.0, next.1) {
                    self.class[i] = if m > self.high { CONFIRMED } else { WEAK };
                }
            }
        }
    }

    /// Promote weak pixels that connect (8-neighborhood) to a confirmed one.
    fn hysteresis(&mut self, w: usize, h: usize) {
        self.stack.clear();
        for i in 0..w * h {
            if self.class[i] == CONFIRMED {
                self.stack.push(i);
            }
        }
        while let Some(i) = self.stack.pop() {
            let x = (i % w) as i32;
            let y = (i / w) as i32;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let nx = x + dx;
                    let ny = y + dy;
                    if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                        continue;
                    }
                    let ni = ny as usize * w + nx as usize;
                    if self.class[ni] == WEAK {
                        self.class[ni] = CONFIRMED;
                        self.stack.push(ni);
                    }
                }
            }
        }
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_THRESHOLD, DEFAULT_HIGH_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_down_at(width: usize, height: usize, row: usize) -> Image {
        let mut image = Image::zeros(width, height);
        for y in 0..row {
            for x in 0..width {
                image.set_value(x, y, 255);
            }
        }
        image
    }

    #[test]
    fn test_horizontal_step_gives_single_edge_row() {
        let image = step_down_at(8, 10, 5);
        let points = EdgeDetector::default().run(&image);
        assert_eq!(points.len(), 8);
        for p in &points {
            assert_eq!(p.y, 4);
        }
    }

    #[test]
    fn test_vertical_step_gives_single_edge_column() {
        let mut image = Image::zeros(10, 8);
        for y in 0..8 {
            for x in 0..5 {
                image.set_value(x, y, 255);
            }
        }
        let points = EdgeDetector::default().run(&image);
        assert_eq!(points.len(), 8);
        for p in &points {
            assert_eq!(p.x, 4);
        }
    }

    #[test]
    fn test_diagonal_step_stays_on_boundary() {
        let mut image = Image::zeros(12, 12);
        for y in 0..12 {
            for x in 0..12 {
                if x + y < 12 {
                    image.set_value(x, y, 255);
                }
            }
        }
        let points = EdgeDetector::default().run(&image);
        assert!(!points.is_empty());
        for p in &points {
            let s = p.x as i32 + p.y as i32;
            assert!((s - 11).abs() <= 1, "off-boundary edge at {p:?}");
        }
    }

    #[test]
    fn test_weak_edges_need_a_strong_anchor() {
        // Bright step (strong) that continues at lower contrast (weak),
        // plus a detached low-contrast run that must stay suppressed.
        let mut image = Image::zeros(16, 10);
        for y in 0..5 {
            for x in 0..16 {
                let value = match x {
                    0..=5 => 255,
                    6..=7 => 150,
                    10..=12 => 150,
                    _ => 0,
                };
                image.set_value(x, y, value);
            }
        }
        let points = EdgeDetector::default().run(&image);
        assert!(points.contains(&EdgePoint { x: 2, y: 4 }));
        assert!(points.contains(&EdgePoint { x: 6, y: 4 }));
        for p in &points {
            assert!(p.x < 8, "detached weak edge survived at {p:?}");
        }
    }

    #[test]
    fn test_tiny_image_yields_nothing() {
        let image = Image::filled(2, 2, 255);
        assert!(EdgeDetector::default().run(&image).is_empty());
    }
}
