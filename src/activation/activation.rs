use serde::{Deserialize, Serialize};

/// Activation applied after a dense layer's affine transform.
///
/// Hidden layers use `Relu`; the output layer uses `None` so the network
/// emits raw logits. The serialized labels ("relu" / "none") are reused
/// verbatim in the export document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    None,
}

impl Activation {
    /// Element-wise activation.
    pub fn apply(&self, x: f32) -> f32 {
        match self {
            Activation::Relu => {
                if x > 0.0 {
                    x
                } else {
                    0.0
                }
            }
            Activation::None => x,
        }
    }

    /// Element-wise derivative of the activation.
    pub fn derivative(&self, x: f32) -> f32 {
        match self {
            Activation::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::None => 1.0,
        }
    }
}
