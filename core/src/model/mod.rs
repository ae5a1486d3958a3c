pub mod detection;
pub mod image;
pub mod stats;

pub use detection::{BoundingBox, DetectResponse, DetectionResult};
pub use image::SelectedImage;
pub use stats::{StatsResponse, StatsSeries};
