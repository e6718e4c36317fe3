// In: src/pipeline/orchestrator.rs

//! The pure compression engine: sequences the kernels into the public
//! Compress / Uncompress / CheckCompression pipeline.
//!
//! Compress:   sort -> delta -> (huffman | hybrid) -> frame
//! Uncompress: parse -> (huffman | hybrid) -> inverse delta -> inverse permute

use ndarray::{concatenate, ArrayView1, Axis as ArrayAxis};

use crate::config::{CompressOptions, CompressionMethod};
use crate::error::{Axis, CloudpackError};
use crate::kernels::{delta, huffman, hybrid, permutation};
use crate::pipeline::artifact::{CompressedContainer, Payload};
use crate::types::PointCloud;

//==================================================================================
// 1. Compress Helpers
//==================================================================================

/// Largest `n` whose `2n` symbols still fit the `i32` tree weight field.
const MAX_HUFFMAN_POINTS: usize = (i32::MAX as usize) / 2;

/// Inverse permutation and deltas for one coordinate axis.
struct PreparedAxis {
    inverse: Vec<u32>,
    deltas: Vec<f32>,
}

fn prepare_axis(values: &[f32], axis: Axis) -> Result<PreparedAxis, CloudpackError> {
    let (sorted, inverse) = permutation::forward(values)?;
    let deltas = delta::encode(&sorted, axis)?;
    Ok(PreparedAxis { inverse, deltas })
}

fn huffman_payload(symbols: &[f32]) -> Result<Payload, CloudpackError> {
    let encoded = huffman::encode(symbols)?;
    let original_bit_count = u32::try_from(encoded.bitstream.bit_len).map_err(|_| {
        CloudpackError::Shape(format!(
            "{} coded bits exceed the u32 bit-count field",
            encoded.bitstream.bit_len
        ))
    })?;
    Ok(Payload::Huffman {
        tree_bytes: huffman::serialize_tree(&encoded.tree)?,
        original_bit_count,
        bitstream: encoded.bitstream.bytes,
    })
}

/// Resolves `method` into a concrete payload. `Auto` encodes both and keeps the
/// strictly smaller Huffman payload, otherwise Hybrid.
fn encode_payload(symbols: &[f32], method: CompressionMethod) -> Result<Payload, CloudpackError> {
    let n = symbols.len() / 2;
    match method {
        CompressionMethod::Hybrid => Ok(Payload::Hybrid(hybrid::encode(symbols))),
        CompressionMethod::Huffman => {
            if n > MAX_HUFFMAN_POINTS {
                return Err(CloudpackError::Shape(format!(
                    "huffman method supports at most {} points, got {}",
                    MAX_HUFFMAN_POINTS, n
                )));
            }
            huffman_payload(symbols)
        }
        CompressionMethod::Auto => {
            let raw = Payload::Hybrid(hybrid::encode(symbols));
            if n > MAX_HUFFMAN_POINTS {
                log::info!("auto: {} points exceed huffman limits, using hybrid", n);
                return Ok(raw);
            }
            let coded = huffman_payload(symbols)?;
            log::info!(
                "auto: hybrid payload {} bytes, huffman payload {} bytes",
                raw.encoded_len(),
                coded.encoded_len()
            );
            if coded.encoded_len() < raw.encoded_len() {
                Ok(coded)
            } else {
                Ok(raw)
            }
        }
    }
}

//==================================================================================
// 2. Decompress Helpers
//==================================================================================

fn decode_payload(payload: &Payload, symbol_count: usize) -> Result<Vec<f32>, CloudpackError> {
    match payload {
        Payload::Hybrid(bytes) => hybrid::decode(bytes, symbol_count),
        Payload::Huffman {
            tree_bytes,
            original_bit_count,
            bitstream,
        } => {
            let (tree, rest) = huffman::deserialize_tree(tree_bytes)?;
            if !rest.is_empty() {
                return Err(CloudpackError::Format(format!(
                    "{} bytes left over after the huffman tree",
                    rest.len()
                )));
            }
            huffman::bitstream::decode_bits(
                bitstream,
                *original_bit_count as usize,
                &tree,
                symbol_count,
            )
        }
    }
}

/// Inverse delta then inverse permutation for one axis. `initial` must match
/// the first delta bit for bit.
fn restore_axis(
    deltas: &[f32],
    initial: f32,
    inverse: &[u32],
    axis: Axis,
) -> Result<Vec<f32>, CloudpackError> {
    if deltas.first().map(|d| d.to_bits()) != Some(initial.to_bits()) {
        return Err(CloudpackError::Format(format!(
            "initial_{} does not match the first {} delta",
            axis, axis
        )));
    }
    let sorted = delta::decode(deltas)?;
    permutation::apply_inverse(&sorted, inverse)
}

//==================================================================================
// 3. Public Orchestration API
//==================================================================================

/// Compresses `cloud` into a self-describing container.
pub fn compress(cloud: &PointCloud, options: &CompressOptions) -> Result<Vec<u8>, CloudpackError> {
    let n = cloud.len();
    if n > u32::MAX as usize {
        return Err(CloudpackError::Shape(format!(
            "{} points exceed the u32 point-count field",
            n
        )));
    }

    // 1. Sort each axis independently and delta-encode the sorted values.
    let x = prepare_axis(cloud.x(), Axis::X)?;
    let y = prepare_axis(cloud.y(), Axis::Y)?;

    // 2. One combined symbol sequence: x deltas then y deltas.
    let symbols = concatenate(
        ArrayAxis(0),
        &[ArrayView1::from(&x.deltas), ArrayView1::from(&y.deltas)],
    )
    .map_err(|e| CloudpackError::Shape(e.to_string()))?
    .to_vec();

    // 3. Entropy-code or copy the symbols.
    let payload = encode_payload(&symbols, options.method)?;
    log::debug!(
        "compress: n={}, requested {:?}, stored {:?}, payload {} bytes",
        n,
        options.method,
        payload.method(),
        payload.encoded_len()
    );

    // 4. Frame.
    let container = CompressedContainer {
        initial_x: x.deltas[0],
        initial_y: y.deltas[0],
        x_inv_perm: x.inverse,
        y_inv_perm: y.inverse,
        payload,
    };
    let bytes = container.to_bytes()?;
    log_metric!(
        "event" = "compress",
        "method" = format!("{:?}", container.payload.method()),
        "n" = n,
        "bytes" = bytes.len()
    );
    Ok(bytes)
}

/// Reverses `compress`.
pub fn uncompress(bytes: &[u8]) -> Result<PointCloud, CloudpackError> {
    let container = CompressedContainer::from_bytes(bytes)?;
    let n = container.n();

    let symbols = decode_payload(&container.payload, 2 * n)?;
    let (x_deltas, y_deltas) = symbols.split_at(n);

    let x = restore_axis(x_deltas, container.initial_x, &container.x_inv_perm, Axis::X)?;
    let y = restore_axis(y_deltas, container.initial_y, &container.y_inv_perm, Axis::Y)?;

    log_metric!(
        "event" = "uncompress",
        "method" = format!("{:?}", container.payload.method()),
        "n" = n,
        "bytes" = bytes.len()
    );
    PointCloud::new(x, y)
}

/// Round-trips `cloud` and reports whether every element survived bit for bit.
///
/// A cloud whose deltas cannot be reconstructed exactly reports `false`; every
/// other failure is returned as an error.
pub fn check_compression(
    cloud: &PointCloud,
    options: &CompressOptions,
) -> Result<bool, CloudpackError> {
    let bytes = match compress(cloud, options) {
        Ok(bytes) => bytes,
        Err(CloudpackError::PrecisionLoss { axis, index }) => {
            log::info!("check_compression: {}[{}] is not exactly representable", axis, index);
            return Ok(false);
        }
        Err(e) => return Err(e),
    };
    let restored = uncompress(&bytes)?;
    Ok(restored.is_identical_to(cloud))
}

//==================================================================================
// 4. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn opts(method: CompressionMethod) -> CompressOptions {
        CompressOptions::with_method(method)
    }

    #[test]
    fn test_roundtrip_both_methods() {
        let cloud = PointCloud::new(vec![3.0, 1.0, 2.0, 1.0], vec![0.5, 0.5, -1.0, 8.0]).unwrap();
        for method in [CompressionMethod::Hybrid, CompressionMethod::Huffman] {
            let bytes = compress(&cloud, &opts(method)).unwrap();
            assert!(uncompress(&bytes).unwrap().is_identical_to(&cloud));
        }
    }

    #[test]
    fn test_hybrid_container_size_is_fixed() {
        let cloud = PointCloud::new(vec![1.0; 10], vec![2.0; 10]).unwrap();
        let bytes = compress(&cloud, &opts(CompressionMethod::Hybrid)).unwrap();
        // header + perms + section len + flag + 2n f32
        assert_eq!(bytes.len(), 12 + 80 + 4 + 1 + 80);
    }

    #[test]
    fn test_initial_values_are_sorted_minimums() {
        let cloud = PointCloud::new(vec![4.0, -2.0, 9.0], vec![7.0, 6.0, 5.0]).unwrap();
        let bytes = compress(&cloud, &opts(CompressionMethod::Huffman)).unwrap();
        let container = CompressedContainer::from_bytes(&bytes).unwrap();
        assert_eq!(container.initial_x, -2.0);
        assert_eq!(container.initial_y, 5.0);
        assert_eq!(container.x_inv_perm, vec![1, 0, 2]);
        assert_eq!(container.y_inv_perm, vec![2, 1, 0]);
    }

    #[test]
    fn test_auto_prefers_huffman_on_repetitive_deltas() {
        let xs: Vec<f32> = (0..512).map(|i| i as f32).collect();
        let cloud = PointCloud::new(xs.clone(), xs).unwrap();
        let bytes = compress(&cloud, &opts(CompressionMethod::Auto)).unwrap();
        let container = CompressedContainer::from_bytes(&bytes).unwrap();
        assert_eq!(container.payload.method(), CompressionMethod::Huffman);
        assert!(check_compression(&cloud, &opts(CompressionMethod::Auto)).unwrap());
    }

    #[test]
    fn test_auto_falls_back_to_hybrid_for_tiny_clouds() {
        // One point: the huffman fields and tree outweigh two raw floats.
        let cloud = PointCloud::new(vec![3.2], vec![-1.0]).unwrap();
        let bytes = compress(&cloud, &opts(CompressionMethod::Auto)).unwrap();
        let container = CompressedContainer::from_bytes(&bytes).unwrap();
        assert_eq!(container.payload.method(), CompressionMethod::Hybrid);
    }

    #[test]
    fn test_mismatched_initial_value_is_rejected() {
        let cloud = PointCloud::new(vec![1.0, 2.0], vec![3.0, 4.0]).unwrap();
        let bytes = compress(&cloud, &opts(CompressionMethod::Hybrid)).unwrap();
        let mut container = CompressedContainer::from_bytes(&bytes).unwrap();
        container.initial_x = 99.0;
        let tampered = container.to_bytes().unwrap();
        assert!(matches!(uncompress(&tampered), Err(CloudpackError::Format(_))));
    }

    #[test]
    fn test_precision_loss_aborts_compress() {
        let a = f32::from_bits(0xc0a7_b3e0);
        let b = f32::from_bits(0x3f62_7421);
        let cloud = PointCloud::new(vec![a, b], vec![0.0, 1.0]).unwrap();
        let result = compress(&cloud, &CompressOptions::default());
        assert!(matches!(
            result,
            Err(CloudpackError::PrecisionLoss { axis: Axis::X, index: 1 })
        ));
    }

    #[test]
    fn test_check_compression_reports_precision_loss_as_false() {
        let a = f32::from_bits(0xc0a7_b3e0);
        let b = f32::from_bits(0x3f62_7421);
        let cloud = PointCloud::new(vec![0.0, 1.0], vec![a, b]).unwrap();
        for method in [CompressionMethod::Hybrid, CompressionMethod::Huffman] {
            assert!(!check_compression(&cloud, &opts(method)).unwrap());
        }
    }
}
