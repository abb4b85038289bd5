use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::data::{idx, Normalization, NUM_CLASSES};
use crate::error::{Error, Result};

const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

/// In-memory MNIST split: normalized images paired with integer labels.
///
/// The training and evaluation loops draw batches of indices out of this
/// store: shuffled for training, file order for evaluation.
#[derive(Debug)]
pub struct Mnist {
    images: Vec<Vec<f32>>,
    labels: Vec<u8>,
}

impl Mnist {
    /// Loads the training split from `data_dir` (plain or `.gz` IDX files).
    pub fn load_training(data_dir: &Path, normalization: Normalization) -> Result<Mnist> {
        Mnist::load(
            &resolve(data_dir, TRAIN_IMAGES)?,
            &resolve(data_dir, TRAIN_LABELS)?,
            normalization,
        )
    }

    /// Loads the held-out test split from `data_dir`.
    pub fn load_test(data_dir: &Path, normalization: Normalization) -> Result<Mnist> {
        Mnist::load(
            &resolve(data_dir, TEST_IMAGES)?,
            &resolve(data_dir, TEST_LABELS)?,
            normalization,
        )
    }

    /// Loads one split from an explicit image/label file pair.
    pub fn load(
        images_path: &Path,
        labels_path: &Path,
        normalization: Normalization,
    ) -> Result<Mnist> {
        let images = idx::parse_images(&read_maybe_gz(images_path)?, normalization)?;
        let labels = idx::parse_labels(&read_maybe_gz(labels_path)?, NUM_CLASSES)?;
        Mnist::from_parts(images, labels)
    }

    /// Builds a split from already-decoded samples.
    pub fn from_parts(images: Vec<Vec<f32>>, labels: Vec<u8>) -> Result<Mnist> {
        if images.len() != labels.len() {
            return Err(Error::CountMismatch {
                images: images.len(),
                labels: labels.len(),
            });
        }
        Ok(Mnist { images, labels })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn image(&self, idx: usize) -> &[f32] {
        &self.images[idx]
    }

    pub fn label(&self, idx: usize) -> u8 {
        self.labels[idx]
    }
}

/// Finds `name` in `dir`, falling back to `name.gz`.
fn resolve(dir: &Path, name: &str) -> Result<PathBuf> {
    let plain = dir.join(name);
    if plain.exists() {
        return Ok(plain);
    }
    let gz = dir.join(format!("{name}.gz"));
    if gz.exists() {
        return Ok(gz);
    }
    Err(Error::Io {
        path: plain,
        source: io::Error::new(io::ErrorKind::NotFound, "no such file (also tried .gz)"),
    })
}

/// Reads a whole file, transparently gunzipping `.gz` paths.
fn read_maybe_gz(path: &Path) -> Result<Vec<u8>> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(io_err)?;
    let mut bytes = Vec::new();
    if path.extension().is_some_and(|ext| ext == "gz") {
        GzDecoder::new(file)
            .read_to_end(&mut bytes)
            .map_err(io_err)?;
    } else {
        file.read_to_end(&mut bytes).map_err(io_err)?;
    }
    Ok(bytes)
}
