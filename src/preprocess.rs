use crate::config::Config;
use crate::image::{Image, RgbImage};
use crate::morphology;

/// Height of the brightness probe band as a fraction of the frame height.
pub const BAND_FRACTION: f32 = 0.2;

/// Filtered frame handed to the extraction strategies.
pub struct Preprocessed<'a> {
    /// Smoothed intensity frame, possibly restricted to the top of the frame.
    /// Row coordinates match the captured frame, so offsets need no
    /// re-mapping downstream.
    pub image: &'a Image,
    /// Mean intensity over the brightness probe band.
    pub band_mean: f32,
    pub frame_width: usize,
    pub frame_height: usize,
}

/// Turns captured RGB frames into the filtered intensity frame and brightness
/// probe that both extraction strategies start from.
pub struct Preprocessor {
    band_top: usize,
    roi_fraction: f32,
    smoothing: bool,
    kernel: usize,
    gray: Image,
    smoothed: Image,
    scratch: Image,
}

impl Preprocessor {
    pub fn new(config: &Config) -> Self {
        Self {
            band_top: config.band_top,
            roi_fraction: config.roi_fraction,
            smoothing: !config.no_smoothing,
            // The box filter needs an odd width.
            kernel: config.smooth_kernel | 1,
            gray: Image::empty(),
            smoothed: Image::empty(),
            scratch: Image::empty(),
        }
    }

    pub fn run(&mut self, frame: &RgbImage) -> Preprocessed<'_> {
        let roi_height = ((frame.height as f32 * self.roi_fraction) as usize)
            .clamp(1, frame.height);
        self.gray.reset(frame.width, roi_height);
        for y in 0..roi_height {
            for x in 0..frame.width {
                let [r, g, b] = frame.pixel(x, y);
                let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
                self.gray.data[y * frame.width + x] = luma as u8;
            }
        }
        let image: &Image = if self.smoothing {
            morphology::dilate(&self.gray, &mut self.smoothed);
            morphology::box_blur(&self.smoothed, &mut self.gray, &mut self.scratch, self.kernel);
            morphology::erode(&self.gray, &mut self.smoothed);
            &self.smoothed
        } else {
            &self.gray
        };
        let band_mean = band_mean(image, self.band_top, frame.height);
        Preprocessed {
            image,
            band_mean,
            frame_width: frame.width,
            frame_height: frame.height,
        }
    }
}

fn band_mean(image: &Image, band_top: usize, frame_height: usize) -> f32 {
    let band_height = ((frame_height as f32 * BAND_FRACTION) as usize).max(1);
    let mut y0 = band_top.min(image.height);
    let mut y1 = (band_top + band_height).min(image.height);
    if y0 == y1 {
        // Frame too small to fit the band below the top strip, probe
        // whatever rows exist instead.
        y0 = 0;
        y1 = image.height;
    }
    let mut sum = 0u64;
    for y in y0..y1 {
        for &value in image.row(y) {
            sum += u64::from(value);
        }
    }
    sum as f32 / ((y1 - y0) * image.width) as f32
}

/// Binary threshold: strictly brighter than `threshold` becomes 255, the
/// rest 0.
pub fn apply_threshold(src: &Image, threshold: f32, dst: &mut Image) {
    dst.reset(src.width, src.height);
    for (d, s) in dst.data.iter_mut().zip(src.data.iter()) {
        *d = if *s as f32 > threshold { 255 } else { 0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_frame(width: usize, height: usize, rgb: [u8; 3]) -> RgbImage {
        let mut frame = RgbImage::zeros(width, height);
        for y in 0..height {
            for x in 0..width {
                frame.set_pixel(x, y, rgb);
            }
        }
        frame
    }

    #[test]
    fn test_luma_conversion() {
        let frame = flat_frame(4, 4, [10, 20, 30]);
        let mut pre = Preprocessor::new(&Config {
            no_smoothing: true,
            ..Config::default()
        });
        let out = pre.run(&frame);
        // 0.299 * 10 + 0.587 * 20 + 0.114 * 30 = 18.15
        assert_eq!(out.image.value(0, 0), 18);
    }

    #[test]
    fn test_band_skips_top_strip() {
        // Dark strip at the top (burned-in timestamp area) must not drag the
        // probe down.
        let mut frame = flat_frame(50, 100, [200, 200, 200]);
        for y in 0..40 {
            for x in 0..50 {
                frame.set_pixel(x, y, [0, 0, 0]);
            }
        }
        let mut pre = Preprocessor::new(&Config {
            no_smoothing: true,
            ..Config::default()
        });
        let out = pre.run(&frame);
        assert_eq!(out.band_mean, 200.0);
    }

    #[test]
    fn test_band_clamps_on_tiny_frames() {
        let frame = flat_frame(8, 10, [100, 100, 100]);
        let mut pre = Preprocessor::new(&Config {
            no_smoothing: true,
            band_top: 40,
            ..Config::default()
        });
        let out = pre.run(&frame);
        assert_eq!(out.band_mean, 100.0);
    }

    #[test]
    fn test_roi_restricts_rows_but_keeps_frame_height() {
        let frame = flat_frame(20, 100, [90, 90, 90]);
        let mut pre = Preprocessor::new(&Config {
            no_smoothing: true,
            roi_fraction: 0.5,
            band_top: 10,
            ..Config::default()
        });
        let out = pre.run(&frame);
        assert_eq!(out.image.height, 50);
        assert_eq!(out.frame_height, 100);
    }

    #[test]
    fn test_smoothing_keeps_flat_regions() {
        let frame = flat_frame(30, 30, [120, 120, 120]);
        let mut pre = Preprocessor::new(&Config::default());
        let out = pre.run(&frame);
        assert_eq!(out.image.value(15, 15), 120);
        assert_eq!(out.image.value(0, 0), 120);
    }

    #[test]
    fn test_even_kernel_width_is_rounded_up() {
        let frame = flat_frame(30, 30, [120, 120, 120]);
        let mut pre = Preprocessor::new(&Config {
            smooth_kernel: 8,
            ..Config::default()
        });
        let out = pre.run(&frame);
        assert_eq!(out.image.value(15, 15), 120);
    }

    #[test]
    fn test_apply_threshold_is_strict() {
        let mut image = Image::zeros(2, 1);
        image.set_value(0, 0, 180);
        image.set_value(1, 0, 181);
        let mut out = Image::empty();
        apply_threshold(&image, 180.0, &mut out);
        assert_eq!(out.value(0, 0), 0);
        assert_eq!(out.value(1, 0), 255);
    }
}
