use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::image::RgbImage;

/// Procedural sea/sky footage: a constant-brightness sky above a (possibly
/// tilted, slowly drifting) horizon, textured sea below. Frames are a pure
/// function of the parameters and the frame index, so sequences replay
/// identically for a given seed.
#[derive(Debug, Clone)]
pub struct SceneParams {
    pub width: usize,
    pub height: usize,
    /// Horizon row at the center column.
    pub horizon: f32,
    /// Horizon tilt in radians; 0 is level.
    pub tilt: f32,
    /// Per-frame vertical drift amplitude in pixels.
    pub drift: f32,
    pub sky: u8,
    pub sea: u8,
    /// Peak sea texture amplitude above the base brightness.
    pub waves: u8,
    pub seed: u64,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            horizon: 190.0,
            tilt: 0.0,
            drift: 0.0,
            sky: 205,
            sea: 70,
            waves: 18,
            seed: 0,
        }
    }
}

impl SceneParams {
    /// Horizon row for the given frame and column.
    pub fn horizon_at(&self, index: usize, x: f32) -> f32 {
        let drift = self.drift * (index as f32 * 0.3).sin();
        let slope = (x - self.width as f32 / 2.0) * self.tilt.tan();
        self.horizon + drift + slope
    }

    pub fn render_into(&self, index: usize, frame: &mut RgbImage) {
        frame.reset(self.width, self.height);
        let stream = self.seed ^ (index as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(stream);
        for y in 0..self.height {
            for x in 0..self.width {
                let v = if (y as f32) < self.horizon_at(index, x as f32) {
                    self.sky
                } else {
                    let swell: u8 = rng.gen_range(0..=self.waves);
                    self.sea.saturating_add(swell)
                };
                frame.set_pixel(x, y, [v, v, v]);
            }
        }
    }

    pub fn render_frame(&self, index: usize) -> RgbImage {
        let mut frame = RgbImage::empty();
        self.render_into(index, &mut frame);
        frame
    }
}
