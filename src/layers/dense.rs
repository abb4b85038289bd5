use crate::{activation::activation::Activation, math::matrix::Matrix};

/// A fully-connected layer: a = act(W·x + b).
///
/// Weights are stored (out_dim, in_dim); the bias is a column vector
/// (out_dim, 1). The training-path `forward()` caches the pre-activation
/// and activation column vectors needed by the backward pass;
/// `infer()` is the same arithmetic with no caching.
#[derive(Debug)]
pub struct Dense {
    pub weights: Matrix,
    pub bias: Matrix,
    pub activation: Activation,
    pre_activation: Matrix, // z = W·x + b, needed for correct derivative
    activations: Matrix,
}

impl Dense {
    /// New layer with randomly initialized weights and zero bias.
    /// He init before ReLU, Xavier before the identity output layer.
    pub fn new(in_dim: usize, out_dim: usize, activation: Activation) -> Dense {
        let weights = match activation {
            Activation::Relu => Matrix::he(out_dim, in_dim),
            Activation::None => Matrix::xavier(out_dim, in_dim),
        };

        Dense {
            weights,
            bias: Matrix::zeros(out_dim, 1),
            activation,
            pre_activation: Matrix::zeros(out_dim, 1),
            activations: Matrix::zeros(out_dim, 1),
        }
    }

    /// Builds a layer from explicit parameter values.
    pub fn from_parts(weights: Matrix, bias: Matrix, activation: Activation) -> Dense {
        assert_eq!(weights.rows, bias.rows, "bias length must equal out_dim");
        assert_eq!(bias.cols, 1, "bias must be a column vector");
        let out_dim = weights.rows;
        Dense {
            weights,
            bias,
            activation,
            pre_activation: Matrix::zeros(out_dim, 1),
            activations: Matrix::zeros(out_dim, 1),
        }
    }

    pub fn in_dim(&self) -> usize {
        self.weights.cols
    }

    pub fn out_dim(&self) -> usize {
        self.weights.rows
    }

    /// Most recent activation column vector, cached by `forward()`.
    pub fn activations(&self) -> &Matrix {
        &self.activations
    }

    /// Training-path forward: computes and caches z and a, returns a.
    pub fn forward(&mut self, input: &Matrix) -> Matrix {
        let activation = self.activation;
        let z = &(&self.weights * input) + &self.bias;
        let a = z.map(|x| activation.apply(x));
        self.pre_activation = z;
        self.activations = a.clone();
        a
    }

    /// Read-only forward: identical arithmetic, no caching.
    pub fn infer(&self, input: &Matrix) -> Matrix {
        let z = &(&self.weights * input) + &self.bias;
        z.map(|x| self.activation.apply(x))
    }

    /// Computes gradient adjustments. Returns (weights_grad, bias_grad).
    /// `delta` is ∂L/∂a for this layer (error in activation space);
    /// `input` is the column vector this layer was fed during `forward()`.
    pub fn compute_gradients(&self, delta: &Matrix, input: &Matrix) -> (Matrix, Matrix) {
        // Use pre-activation z so that derivative(z) is computed correctly
        let act_derivative = self.pre_activation.map(|x| self.activation.derivative(x));
        // δ_z = ∂L/∂a ⊙ act'(z)
        let dz = delta.hadamard(&act_derivative);

        let weights_grad = &dz * &input.transpose();
        (weights_grad, dz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_applies_affine_then_activation() {
        let mut layer = Dense::from_parts(
            Matrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, -1.0]]),
            Matrix::column(vec![0.5, 0.5]),
            Activation::Relu,
        );
        let out = layer.forward(&Matrix::column(vec![2.0, 3.0]));
        // z = [2.5, -2.5]; ReLU clamps the second component.
        assert_eq!(out.to_column_vec(), vec![2.5, 0.0]);
    }

    #[test]
    fn zero_input_yields_bias_pre_activation() {
        let mut layer = Dense::from_parts(
            Matrix::he(4, 8),
            Matrix::column(vec![1.0, -1.0, 0.25, -0.25]),
            Activation::Relu,
        );
        let out = layer.forward(&Matrix::column(vec![0.0; 8]));
        // W·0 = 0, so the pre-activation is the bias alone; ReLU then
        // zeroes the negative components.
        assert_eq!(out.to_column_vec(), vec![1.0, 0.0, 0.25, 0.0]);
    }

    #[test]
    fn gradients_have_parameter_shapes() {
        let mut layer = Dense::new(3, 2, Activation::Relu);
        let input = Matrix::column(vec![1.0, 2.0, 3.0]);
        layer.forward(&input);
        let delta = Matrix::column(vec![0.1, -0.2]);
        let (w_grad, b_grad) = layer.compute_gradients(&delta, &input);
        assert_eq!((w_grad.rows, w_grad.cols), (2, 3));
        assert_eq!((b_grad.rows, b_grad.cols), (2, 1));
    }

    #[test]
    fn identity_layer_gradient_is_outer_product() {
        let mut layer = Dense::from_parts(
            Matrix::from_rows(vec![vec![1.0, 1.0]]),
            Matrix::column(vec![0.0]),
            Activation::None,
        );
        let input = Matrix::column(vec![2.0, -3.0]);
        layer.forward(&input);
        let (w_grad, b_grad) = layer.compute_gradients(&Matrix::column(vec![0.5]), &input);
        assert_eq!(w_grad.to_rows(), vec![vec![1.0, -1.5]]);
        assert_eq!(b_grad.to_column_vec(), vec![0.5]);
    }
}
