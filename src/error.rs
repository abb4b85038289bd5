use std::path::PathBuf;
use thiserror::Error;

/// Result type for fallible library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the library. None of these are retried: the run
/// either completes or aborts on the first failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading a dataset file or writing the export document failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An IDX file violated the format.
    #[error("invalid IDX data: {message}")]
    Idx { message: String },

    /// The image and label files disagree on sample count.
    #[error("dataset mismatch: {images} images but {labels} labels")]
    CountMismatch { images: usize, labels: usize },

    /// The requested compute target is not supported.
    #[error("unsupported device '{requested}' (supported: auto, cpu)")]
    UnsupportedDevice { requested: String },

    /// Training produced a non-finite loss; the model must not be trained
    /// further or exported.
    #[error("non-finite loss at batch {batch}")]
    NonFiniteLoss { batch: usize },

    /// Encoding or decoding the export document failed.
    #[error("export document error: {0}")]
    Json(#[from] serde_json::Error),
}
