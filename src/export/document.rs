use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;
use crate::data::Normalization;
use crate::error::{Error, Result};
use crate::network::network::Network;

/// Format version of the export document. Bump only with a consumer-visible
/// schema change.
pub const EXPORT_VERSION: u32 = 2;

/// Numeric precision of every serialized weight and bias value.
pub const EXPORT_DTYPE: &str = "float32";

/// The versioned weight document handed to the visualization tool.
///
/// Built exactly once, from the final trained network, and never mutated
/// after writing. This document is the sole contract between training and
/// visualization: a consumer that has never seen this crate must be able to
/// reconstruct the full network from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub version: u32,
    pub dtype: String,
    pub network: NetworkSection,
    /// Reserved for future training-progress snapshots; always empty today.
    pub timeline: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSection {
    /// Layer widths including input and output: [784, h1, ..., 10].
    pub architecture: Vec<usize>,
    /// The training-time pixel normalization constants.
    pub normalization: Normalization,
    /// One record per dense layer, in forward order.
    pub layers: Vec<LayerRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerRecord {
    pub layer_index: usize,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub activation: Activation,
    /// [out_dim, in_dim], so a consumer can validate shapes without
    /// counting array lengths.
    pub weight_shape: [usize; 2],
    pub bias_shape: [usize; 1],
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

impl ExportDocument {
    /// Builds the document from a frozen network. Every layer in the
    /// network is weight-bearing (activations are folded onto the dense
    /// records), so the layer walk is a straight enumeration.
    pub fn from_network(network: &Network, normalization: Normalization) -> ExportDocument {
        let layers = network
            .layers
            .iter()
            .enumerate()
            .map(|(idx, layer)| LayerRecord {
                layer_index: idx,
                kind: "dense".to_owned(),
                name: format!("dense_{idx}"),
                activation: layer.activation,
                weight_shape: [layer.out_dim(), layer.in_dim()],
                bias_shape: [layer.out_dim()],
                weights: layer.weights.to_rows(),
                bias: layer.bias.to_column_vec(),
            })
            .collect();

        ExportDocument {
            version: EXPORT_VERSION,
            dtype: EXPORT_DTYPE.to_owned(),
            network: NetworkSection {
                architecture: network.architecture(),
                normalization,
                layers,
            },
            timeline: Vec::new(),
        }
    }

    /// Serializes the document to pretty-printed JSON at `path`, creating
    /// missing parent directories first.
    pub fn write(&self, path: &Path) -> Result<()> {
        let io_err = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let file = File::create(path).map_err(io_err)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a document previously written by `write`.
    pub fn read(path: &Path) -> Result<ExportDocument> {
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("digit-mlp-export-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn records_activation_sequence_and_shapes() {
        let network = Network::new(784, &[64, 32], 10);
        let doc = ExportDocument::from_network(&network, Normalization::MNIST);

        assert_eq!(doc.version, 2);
        assert_eq!(doc.dtype, "float32");
        assert!(doc.timeline.is_empty());
        assert_eq!(doc.network.architecture, vec![784, 64, 32, 10]);

        let activations: Vec<Activation> =
            doc.network.layers.iter().map(|l| l.activation).collect();
        assert_eq!(
            activations,
            vec![Activation::Relu, Activation::Relu, Activation::None]
        );
    }

    #[test]
    fn architecture_and_weight_shapes_are_consistent() {
        let hidden = [48, 24, 12];
        let network = Network::new(784, &hidden, 10);
        let doc = ExportDocument::from_network(&network, Normalization::MNIST);

        let arch = &doc.network.architecture;
        assert_eq!(arch.len(), hidden.len() + 2);
        assert_eq!(arch.len(), doc.network.layers.len() + 1);

        for (i, layer) in doc.network.layers.iter().enumerate() {
            assert_eq!(layer.layer_index, i);
            assert_eq!(layer.kind, "dense");
            assert_eq!(layer.name, format!("dense_{i}"));
            assert_eq!(layer.weight_shape, [arch[i + 1], arch[i]]);
            assert_eq!(layer.bias_shape, [arch[i + 1]]);
            assert_eq!(layer.weights.len(), arch[i + 1]);
            assert_eq!(layer.weights[0].len(), arch[i]);
            assert_eq!(layer.bias.len(), arch[i + 1]);
        }
    }

    #[test]
    fn write_read_round_trip_preserves_values() {
        let network = Network::new(16, &[8], 4);
        let doc = ExportDocument::from_network(&network, Normalization::MNIST);

        let path = temp_dir("roundtrip").join("weights.json");
        doc.write(&path).unwrap();
        let reloaded = ExportDocument::read(&path).unwrap();

        assert_eq!(reloaded.version, doc.version);
        assert_eq!(reloaded.dtype, doc.dtype);
        assert_eq!(reloaded.network.architecture, doc.network.architecture);
        assert_eq!(
            reloaded.network.normalization,
            doc.network.normalization
        );
        for (a, b) in reloaded.network.layers.iter().zip(doc.network.layers.iter()) {
            // f32 values survive the JSON round trip bit-exactly.
            assert_eq!(a.weights, b.weights);
            assert_eq!(a.bias, b.bias);
            assert_eq!(a.activation, b.activation);
            assert_eq!(a.weight_shape, b.weight_shape);
        }
    }

    #[test]
    fn write_creates_missing_directories() {
        let path = temp_dir("mkdir").join("nested/deeper/weights.json");
        let network = Network::new(4, &[], 2);
        ExportDocument::from_network(&network, Normalization::MNIST)
            .write(&path)
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn serialized_json_matches_the_wire_format() {
        let network = Network::new(4, &[3], 2);
        let doc = ExportDocument::from_network(&network, Normalization::MNIST);
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["version"], 2);
        assert_eq!(value["dtype"], "float32");
        assert_eq!(value["network"]["architecture"][0], 4);
        assert_eq!(value["network"]["normalization"]["mean"], 0.1307f32);
        let first = &value["network"]["layers"][0];
        assert_eq!(first["type"], "dense");
        assert_eq!(first["name"], "dense_0");
        assert_eq!(first["activation"], "relu");
        assert_eq!(first["weight_shape"][0], 3);
        assert_eq!(first["weight_shape"][1], 4);
        assert_eq!(value["timeline"].as_array().unwrap().len(), 0);
    }
}
