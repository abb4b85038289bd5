use crate::{activation::activation::Activation, layers::dense::Dense, math::matrix::Matrix};

/// A feedforward classifier: dense layers chained input → output.
///
/// Every hidden layer uses ReLU; the final layer is identity, so the
/// network maps a flattened pixel vector to raw per-class logits.
pub struct Network {
    pub layers: Vec<Dense>,
}

impl Network {
    /// Builds the layer chain for `input_dim → hidden_dims... → num_classes`.
    ///
    /// An empty `hidden_dims` gives a single-layer linear classifier.
    pub fn new(input_dim: usize, hidden_dims: &[usize], num_classes: usize) -> Network {
        let mut layers = Vec::with_capacity(hidden_dims.len() + 1);
        let mut prev_dim = input_dim;

        for &hidden_dim in hidden_dims {
            layers.push(Dense::new(prev_dim, hidden_dim, Activation::Relu));
            prev_dim = hidden_dim;
        }
        layers.push(Dense::new(prev_dim, num_classes, Activation::None));

        Network { layers }
    }

    pub fn input_dim(&self) -> usize {
        self.layers[0].in_dim()
    }

    pub fn output_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].out_dim()
    }

    /// Layer widths including input and output: [in, h1, ..., out].
    pub fn architecture(&self) -> Vec<usize> {
        let mut dims = Vec::with_capacity(self.layers.len() + 1);
        dims.push(self.input_dim());
        dims.extend(self.layers.iter().map(|layer| layer.out_dim()));
        dims
    }

    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.out_dim() * (layer.in_dim() + 1))
            .sum()
    }

    /// Training-path forward pass; stores per-layer activations for backprop.
    /// Panics if `input` does not match the first layer's input dimension.
    pub fn forward(&mut self, input: &[f32]) -> Vec<f32> {
        assert_eq!(
            input.len(),
            self.input_dim(),
            "input length must equal the network input dimension"
        );
        let mut current = Matrix::column(input.to_vec());
        for layer in &mut self.layers {
            current = layer.forward(&current);
        }
        current.to_column_vec()
    }

    /// Read-only forward pass; no caching, no mutation of any kind.
    pub fn infer(&self, input: &[f32]) -> Vec<f32> {
        assert_eq!(
            input.len(),
            self.input_dim(),
            "input length must equal the network input dimension"
        );
        let mut current = Matrix::column(input.to_vec());
        for layer in &self.layers {
            current = layer.infer(&current);
        }
        current.to_column_vec()
    }
}
