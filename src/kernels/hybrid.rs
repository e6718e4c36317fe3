//! This module contains the fixed-width "hybrid" payload kernels.
//!
//! Each symbol is written as one big-endian `f32`, in input order. There is no
//! tree and no variable-length code, so the path is lossless by construction
//! and trades ratio for speed.

use crate::error::CloudpackError;

/// Bytes per encoded symbol.
pub const SYMBOL_WIDTH: usize = std::mem::size_of::<f32>();

/// Concatenates `symbols` as big-endian `f32` units.
pub fn encode(symbols: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(symbols.len() * SYMBOL_WIDTH);
    for symbol in symbols {
        out.extend_from_slice(&symbol.to_be_bytes());
    }
    out
}

/// Parses exactly `count` big-endian `f32` units from `bytes`.
pub fn decode(bytes: &[u8], count: usize) -> Result<Vec<f32>, CloudpackError> {
    let expected = count.checked_mul(SYMBOL_WIDTH).ok_or_else(|| {
        CloudpackError::Format(format!("symbol count {} overflows the payload size", count))
    })?;
    if bytes.len() != expected {
        return Err(CloudpackError::Format(format!(
            "hybrid payload holds {} bytes, expected {} for {} symbols",
            bytes.len(),
            expected,
            count
        )));
    }
    Ok(bytes
        .chunks_exact(SYMBOL_WIDTH)
        .map(|unit| f32::from_be_bytes([unit[0], unit[1], unit[2], unit[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::bit_identical;

    #[test]
    fn test_layout_is_big_endian_f32() {
        let bytes = encode(&[1.0, -2.5]);
        assert_eq!(bytes, vec![0x3F, 0x80, 0x00, 0x00, 0xC0, 0x20, 0x00, 0x00]);
    }

    #[test]
    fn test_roundtrip_preserves_bits() {
        let symbols = vec![0.0f32, -0.0, 0.1, f32::MIN_POSITIVE, -123456.78];
        let decoded = decode(&encode(&symbols), symbols.len()).unwrap();
        assert!(bit_identical(&decoded, &symbols));
    }

    #[test]
    fn test_length_mismatch_is_format_error() {
        let bytes = encode(&[1.0, 2.0]);
        assert!(matches!(decode(&bytes, 3), Err(CloudpackError::Format(_))));
        assert!(matches!(decode(&bytes[..7], 2), Err(CloudpackError::Format(_))));
        assert!(decode(&[], 0).unwrap().is_empty());
    }
}
