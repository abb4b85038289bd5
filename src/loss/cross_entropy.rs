/// Softmax cross-entropy over raw logits with an integer class label.
///
/// The network's output layer is identity, so both the loss and its
/// gradient are computed from logits directly. The max-shift inside
/// `log_sum_exp` keeps exp() from overflowing for large logit magnitudes.
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// Scalar loss: -log softmax(logits)[label] = logsumexp(logits) - logits[label].
    pub fn loss(logits: &[f32], label: usize) -> f32 {
        Self::log_sum_exp(logits) - logits[label]
    }

    /// Gradient of the combined softmax + cross-entropy w.r.t. the logits:
    ///   ∂L/∂z_i = softmax(z)_i - [i == label]
    ///
    /// This is the initial delta passed into the backward pass. The output
    /// layer's identity derivative passes it through unchanged, so the
    /// combined gradient is not double-applied.
    pub fn derivative(logits: &[f32], label: usize) -> Vec<f32> {
        let max = Self::max(logits);
        let sum: f32 = logits.iter().map(|&z| (z - max).exp()).sum();
        logits
            .iter()
            .enumerate()
            .map(|(i, &z)| {
                let p = (z - max).exp() / sum;
                if i == label {
                    p - 1.0
                } else {
                    p
                }
            })
            .collect()
    }

    fn log_sum_exp(logits: &[f32]) -> f32 {
        let max = Self::max(logits);
        let sum: f32 = logits.iter().map(|&z| (z - max).exp()).sum();
        max + sum.ln()
    }

    fn max(logits: &[f32]) -> f32 {
        logits.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }
}
