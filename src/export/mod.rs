pub mod document;

pub use document::{ExportDocument, LayerRecord, NetworkSection};
