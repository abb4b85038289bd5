//! Parsers for the IDX binary files MNIST ships in.
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x03        (number of dimensions = 3)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (image height in pixels, big-endian u32)
//! bytes 12-15:  cols        (image width in pixels, big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x01        (number of dimensions = 1)
//! bytes  4-7:   N           (number of labels, big-endian u32)
//! bytes  8..:   N bytes, each a class index in [0, n_classes)
//! ```

use crate::data::{Normalization, IMAGE_PIXELS};
use crate::error::{Error, Result};

const IMAGE_HEADER_LEN: usize = 16;
const LABEL_HEADER_LEN: usize = 8;

/// Parses an IDX3 image file into per-image pixel vectors, each of length
/// 784 and normalized as (pixel/255 - mean) / std.
pub fn parse_images(bytes: &[u8], normalization: Normalization) -> Result<Vec<Vec<f32>>> {
    if bytes.len() < IMAGE_HEADER_LEN {
        return Err(idx_error(format!(
            "image file too short: expected at least {} header bytes, got {}",
            IMAGE_HEADER_LEN,
            bytes.len()
        )));
    }
    check_header(bytes, 0x03, "image")?;

    let n_items = be_u32(bytes, 4) as usize;
    let rows = be_u32(bytes, 8) as usize;
    let cols = be_u32(bytes, 12) as usize;

    let n_pixels = rows
        .checked_mul(cols)
        .filter(|&p| p == IMAGE_PIXELS)
        .ok_or_else(|| {
            idx_error(format!(
                "expected 28×28 images ({} pixels), got {}×{}",
                IMAGE_PIXELS, rows, cols
            ))
        })?;

    let required = n_items
        .checked_mul(n_pixels)
        .and_then(|data_len| data_len.checked_add(IMAGE_HEADER_LEN))
        .ok_or_else(|| idx_error("image data length overflows usize".to_owned()))?;
    if bytes.len() < required {
        return Err(idx_error(format!(
            "image file too short: header declares {} images but file holds {} bytes (need {})",
            n_items,
            bytes.len(),
            required
        )));
    }

    let image_data = &bytes[IMAGE_HEADER_LEN..required];
    Ok(image_data
        .chunks_exact(n_pixels)
        .map(|chunk| chunk.iter().map(|&px| normalization.apply(px)).collect())
        .collect())
}

/// Parses an IDX1 label file into class indices, validating each against
/// `n_classes`.
pub fn parse_labels(bytes: &[u8], n_classes: usize) -> Result<Vec<u8>> {
    if bytes.len() < LABEL_HEADER_LEN {
        return Err(idx_error(format!(
            "label file too short: expected at least {} header bytes, got {}",
            LABEL_HEADER_LEN,
            bytes.len()
        )));
    }
    check_header(bytes, 0x01, "label")?;

    let n_items = be_u32(bytes, 4) as usize;
    let required = LABEL_HEADER_LEN + n_items;
    if bytes.len() < required {
        return Err(idx_error(format!(
            "label file too short: header declares {} labels but file holds {} bytes (need {})",
            n_items,
            bytes.len(),
            required
        )));
    }

    let labels = bytes[LABEL_HEADER_LEN..required].to_vec();
    for (i, &class) in labels.iter().enumerate() {
        if class as usize >= n_classes {
            return Err(idx_error(format!(
                "label at index {}: class {} is out of range for {} classes",
                i, class, n_classes
            )));
        }
    }
    Ok(labels)
}

fn check_header(bytes: &[u8], expected_dims: u8, kind: &str) -> Result<()> {
    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(idx_error(format!(
            "{} file: bytes 0-1 must be 0x00 0x00 (reserved), got 0x{:02X} 0x{:02X}",
            kind, bytes[0], bytes[1]
        )));
    }
    if bytes[2] != 0x08 {
        return Err(idx_error(format!(
            "{} file: byte 2 (dtype) must be 0x08 (uint8), got 0x{:02X}",
            kind, bytes[2]
        )));
    }
    if bytes[3] != expected_dims {
        return Err(idx_error(format!(
            "{} file: byte 3 (dimensions) must be {}, got {}",
            kind, expected_dims, bytes[3]
        )));
    }
    Ok(())
}

fn be_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn idx_error(message: String) -> Error {
    Error::Idx { message }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::NUM_CLASSES;

    pub(crate) fn image_bytes(images: &[[u8; IMAGE_PIXELS]]) -> Vec<u8> {
        let mut bytes = vec![0x00, 0x00, 0x08, 0x03];
        bytes.extend_from_slice(&(images.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&28u32.to_be_bytes());
        bytes.extend_from_slice(&28u32.to_be_bytes());
        for image in images {
            bytes.extend_from_slice(image);
        }
        bytes
    }

    pub(crate) fn label_bytes(labels: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0x00, 0x00, 0x08, 0x01];
        bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
        bytes.extend_from_slice(labels);
        bytes
    }

    #[test]
    fn parses_well_formed_pair() {
        let mut image = [0u8; IMAGE_PIXELS];
        image[0] = 255;
        let norm = Normalization::MNIST;

        let images = parse_images(&image_bytes(&[image]), norm).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].len(), IMAGE_PIXELS);
        assert!((images[0][0] - norm.apply(255)).abs() < 1e-6);
        assert!((images[0][1] - norm.apply(0)).abs() < 1e-6);

        let labels = parse_labels(&label_bytes(&[7, 0, 9]), NUM_CLASSES).unwrap();
        assert_eq!(labels, vec![7, 0, 9]);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = image_bytes(&[[0u8; IMAGE_PIXELS]]);
        bytes[2] = 0x09;
        assert!(parse_images(&bytes, Normalization::MNIST).is_err());

        let mut bytes = label_bytes(&[1]);
        bytes[3] = 0x03; // an image header in a label file
        assert!(parse_labels(&bytes, NUM_CLASSES).is_err());
    }

    #[test]
    fn rejects_truncated_payload() {
        let mut bytes = image_bytes(&[[0u8; IMAGE_PIXELS]]);
        bytes.truncate(bytes.len() - 10);
        assert!(parse_images(&bytes, Normalization::MNIST).is_err());

        let mut bytes = label_bytes(&[1, 2, 3]);
        bytes.truncate(bytes.len() - 1);
        assert!(parse_labels(&bytes, NUM_CLASSES).is_err());
    }

    #[test]
    fn rejects_non_mnist_image_dimensions() {
        let mut bytes = vec![0x00, 0x00, 0x08, 0x03];
        bytes.extend_from_slice(&1u32.to_be_bytes());
        bytes.extend_from_slice(&16u32.to_be_bytes());
        bytes.extend_from_slice(&16u32.to_be_bytes());
        bytes.extend_from_slice(&[0u8; 256]);
        assert!(parse_images(&bytes, Normalization::MNIST).is_err());
    }

    #[test]
    fn rejects_out_of_range_label() {
        assert!(parse_labels(&label_bytes(&[3, 10]), NUM_CLASSES).is_err());
    }
}
