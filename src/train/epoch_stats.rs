/// Loss/accuracy pair returned by both the training and evaluation loops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochMetrics {
    /// Mean over batches of each batch's mean sample loss.
    pub mean_loss: f64,
    /// Correct top-1 predictions divided by total samples, in [0, 1].
    pub accuracy: f64,
}
