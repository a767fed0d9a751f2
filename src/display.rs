use cv2::prelude::*;
use opencv as cv2;

use std::time::Instant;

use anyhow::Result;
use log::info;

use crate::image::RgbImage;

const WINDOW_NAME: &str = "horizon";
const KEY_ESCAPE: i32 = 27;
const KEY_SKIP_TOGGLE: i32 = b'x' as i32;
const KEY_SKIP_TOGGLE_UPPER: i32 = b'X' as i32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayEvent {
    Continue,
    Exit,
}

/// HighGUI preview window. Pacing subtracts the time spent processing the
/// frame from the playback delay so display stays close to source fps.
pub struct Display {
    frame_delay: i64,
    skip_delay: bool,
    last_shown: Option<Instant>,
    bgr: cv2::core::Mat,
}

impl Display {
    pub fn new(fps: f64, skip_delay: bool) -> Self {
        let frame_delay = if fps.is_finite() && fps > 0.0 {
            (1000.0 / fps).round() as i64
        } else {
            33
        };
        Self {
            frame_delay,
            skip_delay,
            last_shown: None,
            bgr: cv2::core::Mat::default(),
        }
    }

    pub fn show(&mut self, frame: &RgbImage) -> Result<DisplayEvent> {
        let rgb = rgb_to_cv_8uc3(frame);
        cv2::imgproc::cvt_color(&rgb, &mut self.bgr, cv2::imgproc::COLOR_RGB2BGR, 0)?;
        cv2::highgui::imshow(WINDOW_NAME, &self.bgr)?;

        let elapsed = match self.last_shown {
            Some(at) => at.elapsed().as_millis() as i64,
            None => 0,
        };
        let delay = if self.skip_delay {
            1
        } else {
            (self.frame_delay - elapsed).max(1)
        };
        let key = cv2::highgui::wait_key(delay as i32)?;
        self.last_shown = Some(Instant::now());
        Ok(self.handle_key(key))
    }

    fn handle_key(&mut self, key: i32) -> DisplayEvent {
        match key {
            KEY_ESCAPE => DisplayEvent::Exit,
            KEY_SKIP_TOGGLE | KEY_SKIP_TOGGLE_UPPER => {
                self.skip_delay = !self.skip_delay;
                info!(
                    "playback delay {}",
                    if self.skip_delay { "off" } else { "on" }
                );
                DisplayEvent::Continue
            }
            _ => DisplayEvent::Continue,
        }
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        let _ = cv2::highgui::destroy_all_windows();
    }
}

fn rgb_to_cv_8uc3(img: &RgbImage) -> cv2::core::Mat {
    unsafe {
        cv2::core::Mat::new_rows_cols_with_data(
            img.height as i32,
            img.width as i32,
            cv2::core::CV_8UC3,
            std::mem::transmute(img.data.as_ptr()),
            cv2::core::Mat_AUTO_STEP,
        )
        .unwrap()
    }
}
