use std::sync::OnceLock;

pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Which feature-extraction strategy drives the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(clap::ValueEnum)]
pub enum StrategyKind {
    /// Edge detection followed by a polar line transform.
    Lines,
    /// Bright-region boundary tracing.
    Regions,
}

#[derive(Debug, Clone)]
#[derive(clap::Parser)]
pub struct Config {
    /// Feature-extraction strategy.
    #[clap(long, value_enum, default_value = "lines")]
    pub strategy: StrategyKind,

    /// Capacity of the temporal history buffer.
    #[clap(long, default_value = "20")]
    pub window_size: usize,

    /// Offset distance below which two raw lines share a cluster, in pixels.
    #[clap(long, default_value = "30.0")]
    pub cluster_distance: f32,

    /// Accumulator votes required to report a raw line.
    #[clap(long, default_value = "150")]
    pub vote_threshold: u32,

    /// Rows skipped at the top of the frame before the brightness band,
    /// reserved for burned-in timestamps.
    #[clap(long, default_value = "40")]
    pub band_top: usize,

    /// Brightness threshold as a fraction of the band mean (line strategy).
    #[clap(long, default_value = "0.9")]
    pub threshold_factor: f32,

    /// Fraction of the frame height the detector looks at, from the top.
    #[clap(long, default_value = "1.0")]
    pub roi_fraction: f32,

    /// Box blur kernel width in the smoothing pass. Rounded up to odd.
    #[clap(long, default_value = "9")]
    pub smooth_kernel: usize,

    /// Skip the dilate/blur/erode smoothing pass.
    #[clap(long)]
    pub no_smoothing: bool,

    /// Seed for the synthetic scene generator.
    #[clap(long, default_value = "0")]
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Lines,
            window_size: 20,
            cluster_distance: 30.0,
            vote_threshold: 150,
            band_top: 40,
            threshold_factor: 0.9,
            roi_fraction: 1.0,
            smooth_kernel: 9,
            no_smoothing: false,
            seed: 0,
        }
    }
}
