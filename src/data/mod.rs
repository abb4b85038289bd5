pub mod idx;
pub mod mnist;

pub use mnist::Mnist;

use serde::{Deserialize, Serialize};

/// Pixels per flattened 28×28 image.
pub const IMAGE_PIXELS: usize = 784;

/// Digit classes 0..=9.
pub const NUM_CLASSES: usize = 10;

/// Fixed normalization constants applied to every pixel:
/// (pixel/255 - mean) / std.
///
/// Threaded explicitly to the dataset loader and the exporter; the export
/// document records the same values so a consumer can reproduce the
/// training-time preprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    pub mean: f32,
    pub std: f32,
}

impl Normalization {
    /// The standard MNIST constants.
    pub const MNIST: Normalization = Normalization {
        mean: 0.1307,
        std: 0.3081,
    };

    pub fn apply(&self, pixel: u8) -> f32 {
        (pixel as f32 / 255.0 - self.mean) / self.std
    }
}
