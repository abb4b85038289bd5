use crate::{layers::dense::Dense, math::matrix::Matrix};

const BETA1: f32 = 0.9;
const BETA2: f32 = 0.999;
const EPSILON: f32 = 1e-8;

/// Adam: adaptive moment-estimation gradient descent.
///
/// Maintains, per layer, exponential-average estimates of the gradient
/// (first moment) and squared gradient (second moment) for both the weight
/// matrix and the bias vector, plus one shared timestep:
///
///   m = β1·m + (1-β1)·g
///   v = β2·v + (1-β2)·g²
///   θ = θ - lr · m̂ / (√v̂ + ε)     with  m̂ = m/(1-β1^t),  v̂ = v/(1-β2^t)
///
/// The bias correction (m̂, v̂) compensates for the zero-initialized moments
/// during the early-training transient.
pub struct Adam {
    pub learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: i32,
    state: Vec<LayerMoments>,
}

/// Moment estimates for one layer's parameters.
struct LayerMoments {
    m_weights: Matrix,
    v_weights: Matrix,
    m_bias: Matrix,
    v_bias: Matrix,
}

impl LayerMoments {
    fn zeros_like(layer: &Dense) -> LayerMoments {
        LayerMoments {
            m_weights: Matrix::zeros(layer.weights.rows, layer.weights.cols),
            v_weights: Matrix::zeros(layer.weights.rows, layer.weights.cols),
            m_bias: Matrix::zeros(layer.bias.rows, layer.bias.cols),
            v_bias: Matrix::zeros(layer.bias.rows, layer.bias.cols),
        }
    }
}

impl Adam {
    pub fn new(learning_rate: f32) -> Adam {
        Adam {
            learning_rate,
            beta1: BETA1,
            beta2: BETA2,
            epsilon: EPSILON,
            t: 0,
            state: Vec::new(),
        }
    }

    /// Applies one update to every layer from its averaged batch gradients.
    ///
    /// Covers the whole network in a single call so the timestep advances
    /// exactly once per batch. Moment state is sized lazily from the first
    /// gradient set seen.
    ///
    /// # Panics
    /// Panics if `grads` does not hold one (weights, bias) pair per layer,
    /// or if any gradient shape disagrees with its parameter.
    pub fn step(&mut self, layers: &mut [Dense], grads: &[(Matrix, Matrix)]) {
        assert_eq!(
            layers.len(),
            grads.len(),
            "one gradient pair per layer is required"
        );

        if self.state.len() < layers.len() {
            for layer in layers[self.state.len()..].iter() {
                self.state.push(LayerMoments::zeros_like(layer));
            }
        }

        self.t += 1;
        let lr = self.learning_rate;
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);
        let bias_correction1 = 1.0 - beta1.powi(self.t);
        let bias_correction2 = 1.0 - beta2.powi(self.t);

        for ((layer, (w_grad, b_grad)), moments) in
            layers.iter_mut().zip(grads).zip(self.state.iter_mut())
        {
            update_tensor(
                &mut layer.weights,
                w_grad,
                &mut moments.m_weights,
                &mut moments.v_weights,
                lr,
                beta1,
                beta2,
                epsilon,
                bias_correction1,
                bias_correction2,
            );
            update_tensor(
                &mut layer.bias,
                b_grad,
                &mut moments.m_bias,
                &mut moments.v_bias,
                lr,
                beta1,
                beta2,
                epsilon,
                bias_correction1,
                bias_correction2,
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn update_tensor(
    param: &mut Matrix,
    grad: &Matrix,
    m: &mut Matrix,
    v: &mut Matrix,
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    bias_correction1: f32,
    bias_correction2: f32,
) {
    assert_eq!(
        (param.rows, param.cols),
        (grad.rows, grad.cols),
        "gradient shape must match its parameter"
    );

    for (((p, &g), m_i), v_i) in param
        .data_mut()
        .iter_mut()
        .zip(grad.data())
        .zip(m.data_mut().iter_mut())
        .zip(v.data_mut().iter_mut())
    {
        *m_i = beta1 * *m_i + (1.0 - beta1) * g;
        *v_i = beta2 * *v_i + (1.0 - beta2) * g * g;
        let m_hat = *m_i / bias_correction1;
        let v_hat = *v_i / bias_correction2;
        *p -= lr * m_hat / (v_hat.sqrt() + epsilon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::Activation;

    fn unit_layer(weight: f32) -> Dense {
        Dense::from_parts(
            Matrix::from_rows(vec![vec![weight]]),
            Matrix::zeros(1, 1),
            Activation::None,
        )
    }

    #[test]
    fn first_step_moves_parameter_by_learning_rate() {
        // With zero-initialized moments, the bias-corrected first step for a
        // unit gradient is lr·g/(|g| + ε) ≈ lr, not lr·(1-β1).
        let mut layers = vec![unit_layer(1.0)];
        let mut optimizer = Adam::new(0.001);
        let grads = vec![(Matrix::from_rows(vec![vec![1.0]]), Matrix::zeros(1, 1))];
        optimizer.step(&mut layers, &grads);
        let moved = 1.0 - layers[0].weights.get(0, 0);
        assert!((moved - 0.001).abs() < 1e-6);
    }

    #[test]
    fn steps_descend_against_the_gradient() {
        let mut layers = vec![unit_layer(0.5)];
        let mut optimizer = Adam::new(0.01);
        for _ in 0..10 {
            let grads = vec![(Matrix::from_rows(vec![vec![-2.0]]), Matrix::zeros(1, 1))];
            optimizer.step(&mut layers, &grads);
        }
        // Negative gradient means the parameter must increase.
        assert!(layers[0].weights.get(0, 0) > 0.5);
    }

    #[test]
    fn update_stays_finite_for_tiny_gradients() {
        let mut layers = vec![unit_layer(1.0)];
        let mut optimizer = Adam::new(0.001);
        for _ in 0..100 {
            let grads = vec![(Matrix::from_rows(vec![vec![1e-30]]), Matrix::zeros(1, 1))];
            optimizer.step(&mut layers, &grads);
        }
        assert!(layers[0].weights.get(0, 0).is_finite());
    }

    #[test]
    #[should_panic]
    fn step_rejects_gradient_count_mismatch() {
        let mut layers = vec![unit_layer(1.0)];
        let mut optimizer = Adam::new(0.001);
        optimizer.step(&mut layers, &[]);
    }
}
