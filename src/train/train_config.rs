use std::path::PathBuf;

use crate::device::Device;

/// Configuration for one training run.
///
/// # Fields
/// - `epochs`        — total number of full passes over the training data
/// - `batch_size`    — samples per mini-batch
/// - `learning_rate` — Adam step size
/// - `hidden_dims`   — hidden layer widths, outermost first; empty means a
///                     single-layer linear classifier
/// - `device`        — resolved compute target
/// - `export_path`   — where the final weight document is written
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    pub hidden_dims: Vec<usize>,
    pub device: Device,
    pub export_path: PathBuf,
}
