use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context as AnyhowContext, Result};
use ndarray as nd;
use rerun::{RecordingStream, RecordingStreamBuilder};

use crate::image::RgbImage;
use crate::pipeline::FrameSummary;

/// Optional sinks for rendered overlays (rerun recording) and per-frame
/// track summaries (JSON lines).
pub struct Recorder {
    stream: Option<RecordingStream>,
    track_log: Option<BufWriter<File>>,
}

impl Recorder {
    pub fn new(recording: Option<&Path>, track_log: Option<&Path>) -> Result<Self> {
        let stream = match recording {
            Some(path) => Some(
                RecordingStreamBuilder::new("horizon")
                    .save(path)
                    .with_context(|| format!("unable to create recording {}", path.display()))?,
            ),
            None => None,
        };
        let track_log = match track_log {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("unable to create track log {}", path.display()))?;
                Some(BufWriter::new(file))
            }
            None => None,
        };
        Ok(Self { stream, track_log })
    }

    pub fn log_frame(&mut self, overlay: &RgbImage, summary: &FrameSummary) -> Result<()> {
        if let Some(stream) = &self.stream {
            let shape = (overlay.height, overlay.width, 3);
            let array = nd::Array3::from_shape_vec(shape, overlay.data.clone())?;
            stream.log("camera/overlay", &rerun::Image::try_from(array)?)?;
        }
        if let Some(writer) = &mut self.track_log {
            serde_json::to_writer(&mut *writer, summary)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn finish(&mut self) -> Result<()> {
        if let Some(writer) = &mut self.track_log {
            writer.flush()?;
        }
        Ok(())
    }
}
