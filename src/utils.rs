//! This module provides shared, low-level conversions used at the edges of the
//! bridge.
//!
//! Some hosts hand over their argument arrays as raw native-endian bytes rather
//! than typed `f64` slices. These helpers convert between the two without any
//! `unsafe` of our own, using `bytemuck`'s checked casts.

use crate::error::GspyError;

const F64_WIDTH: usize = std::mem::size_of::<f64>();

/// Copies a native-endian byte buffer into a vector of doubles.
///
/// The copy sidesteps alignment requirements on the input.
///
/// # Errors
/// Returns `GspyError::FfiError` if the byte length is not a multiple of 8.
pub fn bytes_to_doubles(bytes: &[u8]) -> Result<Vec<f64>, GspyError> {
    if bytes.len() % F64_WIDTH != 0 {
        return Err(GspyError::FfiError(format!(
            "byte buffer of length {} is not a whole number of doubles",
            bytes.len()
        )));
    }
    let mut doubles = vec![0.0f64; bytes.len() / F64_WIDTH];
    bytemuck::cast_slice_mut::<f64, u8>(&mut doubles).copy_from_slice(bytes);
    Ok(doubles)
}

/// Views a slice of doubles as its native-endian bytes.
pub fn doubles_to_bytes(doubles: &[f64]) -> &[u8] {
    bytemuck::cast_slice(doubles)
}
