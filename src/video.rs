use std::path::Path;

use anyhow::{bail, Context as AnyhowContext, Result};
use cv2::prelude::*;
use opencv as cv2;

use crate::image::RgbImage;

/// Decoded video source. Frames come out as the crate's own [`RgbImage`];
/// the BGR to RGB swap happens here, at the boundary.
pub struct VideoInput {
    capture: cv2::videoio::VideoCapture,
    bgr: cv2::core::Mat,
    rgb: cv2::core::Mat,
    pub width: usize,
    pub height: usize,
    pub fps: f64,
    /// Total frames when the container reports them; live streams do not.
    pub frame_count: Option<u64>,
}

impl VideoInput {
    pub fn open(path: &Path) -> Result<Self> {
        let path_str = path.to_str().context("video path is not valid UTF-8")?;
        let capture = cv2::videoio::VideoCapture::from_file(path_str, cv2::videoio::CAP_ANY)
            .with_context(|| format!("unable to open video {path_str}"))?;
        if !capture.is_opened()? {
            bail!("unable to open video {path_str}");
        }
        let width = capture.get(cv2::videoio::CAP_PROP_FRAME_WIDTH)? as usize;
        let height = capture.get(cv2::videoio::CAP_PROP_FRAME_HEIGHT)? as usize;
        let fps = capture.get(cv2::videoio::CAP_PROP_FPS)?;
        let frames = capture.get(cv2::videoio::CAP_PROP_FRAME_COUNT)?;
        let frame_count = if frames > 0.0 { Some(frames as u64) } else { None };
        Ok(Self {
            capture,
            bgr: cv2::core::Mat::default(),
            rgb: cv2::core::Mat::default(),
            width,
            height,
            fps,
            frame_count,
        })
    }

    /// Decode the next frame into `frame`, reusing its allocation. Returns
    /// false at the end of the stream.
    pub fn read(&mut self, frame: &mut RgbImage) -> Result<bool> {
        if !self.capture.read(&mut self.bgr)? || self.bgr.empty() {
            return Ok(false);
        }
        cv2::imgproc::cvt_color(&self.bgr, &mut self.rgb, cv2::imgproc::COLOR_BGR2RGB, 0)?;
        let size = self.rgb.size()?;
        frame.width = size.width as usize;
        frame.height = size.height as usize;
        frame.data.clear();
        frame.data.extend_from_slice(self.rgb.data_bytes()?);
        Ok(true)
    }
}
