//! Embedding vector encoding and distance math.
//!
//! Vectors are stored as native-endian `f32` BLOBs on the story row; the
//! decode path mirrors the encode path byte for byte.

use zerocopy::IntoBytes;

use crate::error::{Result, StoreError};

/// Encode an embedding vector as a BLOB.
pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    vector.as_bytes().to_vec()
}

/// Decode a BLOB back into an embedding vector.
pub fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(StoreError::InvalidData(format!(
            "Embedding blob length {} is not a multiple of 4",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Euclidean distance between two vectors (lower = more similar).
///
/// Mismatched lengths return `f32::MAX` so such pairs sort last.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::MAX;
    }

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}
