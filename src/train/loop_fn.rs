use rand::seq::SliceRandom;
use tracing::info;

use crate::data::mnist::Mnist;
use crate::error::{Error, Result};
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::optim::adam::Adam;
use crate::train::epoch_stats::EpochMetrics;

/// Batches between progress observations.
const PROGRESS_EVERY: usize = 100;

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------

/// Trains `network` for one epoch of sequential mini-batch gradient descent.
///
/// Sample order is reshuffled, then for each batch in turn: fresh zeroed
/// gradient accumulators, per-sample forward/backward with loss and top-1
/// bookkeeping, gradients averaged by the actual batch size, and one
/// optimizer step over the whole network. Batch N completes fully before
/// batch N+1 begins.
///
/// Returns the epoch's mean batch loss and overall accuracy. A non-finite
/// batch loss aborts the epoch with `Error::NonFiniteLoss` before the
/// optimizer step that would spread it into the parameters.
///
/// # Panics
/// Panics if the dataset is empty, `batch_size` is zero, or an image length
/// disagrees with the network input dimension.
pub fn train_epoch(
    network: &mut Network,
    data: &Mnist,
    optimizer: &mut Adam,
    batch_size: usize,
) -> Result<EpochMetrics> {
    assert!(!data.is_empty(), "training dataset must not be empty");
    assert!(batch_size > 0, "batch_size must be at least 1");

    let n = data.len();

    // Shuffle sample order each epoch.
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rand::thread_rng());

    let mut total_loss = 0.0f64;
    let mut batches = 0usize;
    let mut correct = 0usize;
    let mut seen = 0usize;

    for batch_start in (0..n).step_by(batch_size) {
        let batch_end = (batch_start + batch_size).min(n);
        let actual_batch_size = (batch_end - batch_start) as f32;

        // Zero-initialize accumulated gradient storage (one pair per layer);
        // this is the per-batch "clear gradients" step.
        let mut acc_grads: Vec<(Matrix, Matrix)> = network
            .layers
            .iter()
            .map(|layer| {
                (
                    Matrix::zeros(layer.weights.rows, layer.weights.cols),
                    Matrix::zeros(layer.bias.rows, layer.bias.cols),
                )
            })
            .collect();

        let mut batch_loss = 0.0f32;

        // Accumulate gradients over the mini-batch.
        for &idx in &indices[batch_start..batch_end] {
            let image = data.image(idx);
            let label = data.label(idx) as usize;

            let logits = network.forward(image);

            batch_loss += CrossEntropyLoss::loss(&logits, label);
            if argmax(&logits) == label {
                correct += 1;
            }

            // Initial delta: combined softmax + CE gradient over the logits.
            let error = CrossEntropyLoss::derivative(&logits, label);
            let mut delta = Matrix::column(error);

            // Backward pass — accumulate gradients layer by layer (reversed).
            for i in (0..network.layers.len()).rev() {
                let input_for_layer = if i == 0 {
                    Matrix::column(image.to_vec())
                } else {
                    network.layers[i - 1].activations().clone()
                };

                let (w_grad, b_grad) =
                    network.layers[i].compute_gradients(&delta, &input_for_layer);

                if i > 0 {
                    // Propagate δ through the weights to get ∂L/∂a for layer i-1.
                    delta = &network.layers[i].weights.transpose() * &b_grad;
                }

                acc_grads[i].0 += &w_grad;
                acc_grads[i].1 += &b_grad;
            }
        }

        seen += batch_end - batch_start;
        batches += 1;

        let batch_mean_loss = batch_loss / actual_batch_size;
        if !batch_mean_loss.is_finite() {
            return Err(Error::NonFiniteLoss { batch: batches });
        }
        total_loss += batch_mean_loss as f64;

        // Average the accumulated gradients and apply one Adam step.
        let inv_batch = 1.0 / actual_batch_size;
        let avg_grads: Vec<(Matrix, Matrix)> = acc_grads
            .into_iter()
            .map(|(w_acc, b_acc)| (w_acc.map(|x| x * inv_batch), b_acc.map(|x| x * inv_batch)))
            .collect();
        optimizer.step(&mut network.layers, &avg_grads);

        if batches % PROGRESS_EVERY == 0 {
            info!(
                batch = batches,
                avg_loss = total_loss / batches as f64,
                accuracy = correct as f64 / seen as f64,
                "training progress"
            );
        }
    }

    Ok(EpochMetrics {
        mean_loss: total_loss / batches as f64,
        accuracy: correct as f64 / n as f64,
    })
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluates `network` over the full dataset in file order.
///
/// Uses the read-only `infer` path, so neither the parameters nor any
/// cached state change; two runs over the same parameters and data order
/// return bit-identical results.
pub fn evaluate(network: &Network, data: &Mnist, batch_size: usize) -> EpochMetrics {
    assert!(batch_size > 0, "batch_size must be at least 1");

    let n = data.len();
    if n == 0 {
        return EpochMetrics {
            mean_loss: 0.0,
            accuracy: 0.0,
        };
    }

    let mut total_loss = 0.0f64;
    let mut batches = 0usize;
    let mut correct = 0usize;

    for batch_start in (0..n).step_by(batch_size) {
        let batch_end = (batch_start + batch_size).min(n);
        let actual_batch_size = (batch_end - batch_start) as f32;

        let mut batch_loss = 0.0f32;
        for idx in batch_start..batch_end {
            let label = data.label(idx) as usize;
            let logits = network.infer(data.image(idx));
            batch_loss += CrossEntropyLoss::loss(&logits, label);
            if argmax(&logits) == label {
                correct += 1;
            }
        }

        total_loss += (batch_loss / actual_batch_size) as f64;
        batches += 1;
    }

    EpochMetrics {
        mean_loss: total_loss / batches as f64,
        accuracy: correct as f64 / n as f64,
    }
}

/// Index of the maximum element in a slice.
fn argmax(v: &[f32]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
