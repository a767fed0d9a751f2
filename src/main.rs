use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;

use indicatif::ProgressStyle;
use tracing::info_span;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use skyline_rust::config::*;
use skyline_rust::display::{Display, DisplayEvent};
use skyline_rust::image::RgbImage;
use skyline_rust::pipeline::HorizonPipeline;
use skyline_rust::recorder::Recorder;
use skyline_rust::scene::SceneParams;
use skyline_rust::video::VideoInput;

#[derive(Parser)]
pub struct Args {
    /// Input video path. Omit to run on the synthetic scene.
    pub input: Option<PathBuf>,
    /// Number of frames the synthetic scene produces.
    #[clap(long, default_value = "300")]
    pub synthetic_frames: usize,
    /// Save rendered overlays to a rerun recording at this path.
    #[clap(long)]
    pub record: Option<PathBuf>,
    /// Append one JSON summary per frame to this path.
    #[clap(long)]
    pub track_log: Option<PathBuf>,
    /// Run without the preview window.
    #[clap(long)]
    pub headless: bool,
    /// Start with playback pacing disabled.
    #[clap(long)]
    pub no_delay: bool,
    /// Only log warnings and errors.
    #[clap(long)]
    pub quiet: bool,
    #[clap(flatten)]
    pub config: Config,
}

enum FrameSource {
    Video(VideoInput),
    Synthetic {
        params: SceneParams,
        total: usize,
        index: usize,
    },
}

impl FrameSource {
    fn next_frame(&mut self, frame: &mut RgbImage) -> Result<bool> {
        match self {
            FrameSource::Video(input) => input.read(frame),
            FrameSource::Synthetic {
                params,
                total,
                index,
            } => {
                if *index >= *total {
                    return Ok(false);
                }
                params.render_into(*index, frame);
                *index += 1;
                Ok(true)
            }
        }
    }

    fn frame_count(&self) -> Option<u64> {
        match self {
            FrameSource::Video(input) => input.frame_count,
            FrameSource::Synthetic { total, .. } => Some(*total as u64),
        }
    }

    fn fps(&self) -> f64 {
        match self {
            FrameSource::Video(input) => input.fps,
            FrameSource::Synthetic { .. } => 30.0,
        }
    }
}

fn main() -> Result<()> {
    // parse the config
    let args = Args::parse();
    let _ = CONFIG.set(args.config);
    let config = CONFIG.get().unwrap();

    // setup logging
    let level = if args.quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };
    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(level)
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stdout_writer()))
        .with(indicatif_layer)
        .init();

    // open the frame source
    let mut source = match &args.input {
        Some(path) => {
            let input = VideoInput::open(path)?;
            info!(
                "video {}x{} at {:.1} fps",
                input.width, input.height, input.fps
            );
            FrameSource::Video(input)
        }
        None => {
            info!("no input given, running the synthetic scene");
            FrameSource::Synthetic {
                params: SceneParams {
                    seed: config.seed,
                    ..SceneParams::default()
                },
                total: args.synthetic_frames,
                index: 0,
            }
        }
    };

    let header_span = info_span!("header");
    header_span.pb_set_style(&ProgressStyle::default_bar());
    if let Some(total) = source.frame_count() {
        header_span.pb_set_length(total);
    }
    let header_span_enter = header_span.enter();

    // create the pipeline and the sinks
    let mut pipeline = HorizonPipeline::new(config);
    let mut recorder = Recorder::new(args.record.as_deref(), args.track_log.as_deref())?;
    let mut display = if args.headless {
        None
    } else {
        info!("keys: Esc quits, x toggles the playback delay");
        Some(Display::new(source.fps(), args.no_delay))
    };

    let mut frame = RgbImage::empty();
    loop {
        if !source.next_frame(&mut frame)? {
            break;
        }
        let summary = pipeline.process(&frame);
        recorder.log_frame(pipeline.overlay(), &summary)?;

        if let Some(display) = &mut display {
            if display.show(pipeline.overlay())? == DisplayEvent::Exit {
                info!("stopped at frame {}", summary.frame);
                break;
            }
        }
        Span::current().pb_inc(1);
    }
    recorder.finish()?;

    std::mem::drop(header_span_enter);
    std::mem::drop(header_span);

    Ok(())
}
