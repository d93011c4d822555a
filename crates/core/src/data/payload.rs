//! Decoding of headerless float64 payloads
//!
//! The data endpoints stream IEEE-754 doubles back to back, in the byte order
//! of the machine, without any framing.

use nexus_domain::{ApiError, Result};

const VALUE_SIZE: usize = std::mem::size_of::<f64>();

/// Decode a payload into native-endian `f64` values.
///
/// # Errors
/// Returns [`ApiError::InvalidDataLength`] when the payload length is not a
/// multiple of 8.
pub fn decode_f64_payload(bytes: &[u8]) -> Result<Vec<f64>> {
    if bytes.len() % VALUE_SIZE != 0 {
        return Err(ApiError::InvalidDataLength { length: bytes.len() });
    }

    Ok(bytes
        .chunks_exact(VALUE_SIZE)
        .map(|chunk| {
            let mut raw = [0_u8; VALUE_SIZE];
            raw.copy_from_slice(chunk);
            f64::from_ne_bytes(raw)
        })
        .collect())
}
