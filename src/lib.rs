pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;
pub mod data;
pub mod export;
pub mod device;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::Activation;
pub use layers::dense::Dense;
pub use network::network::Network;
pub use loss::cross_entropy::CrossEntropyLoss;
pub use optim::adam::Adam;
pub use train::{evaluate, train_epoch, EpochMetrics, TrainConfig};
pub use data::{Mnist, Normalization, IMAGE_PIXELS, NUM_CLASSES};
pub use export::ExportDocument;
pub use device::Device;
pub use error::{Error, Result};
