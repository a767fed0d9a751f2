//! Horizon detection and tracking for maritime video.
//!
//! Frames go through brightness-adaptive preprocessing, one of two
//! feature-extraction strategies (polar lines or bright-region tracing),
//! and a windowed temporal tracker that keeps the estimate stable across
//! frames where detection fails.

pub mod cluster;
pub mod config;
pub mod contour;
pub mod display;
pub mod edges;
pub mod extractor;
pub mod hough;
pub mod image;
pub mod morphology;
pub mod pipeline;
pub mod preprocess;
pub mod recorder;
pub mod render;
pub mod scene;
pub mod tracker;
pub mod types;
pub mod video;
