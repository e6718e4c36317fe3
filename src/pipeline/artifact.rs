//! Defines the self-describing byte layout of a compressed point cloud.
//! This module is the single source of truth for serialization, deserialization,
//! and metadata peeking of the container. It frames and parses only; it never
//! runs a transform.

use std::io::{Cursor, Read};

use crate::bridge::format::{
    ContainerStats, HuffmanStats, FIXED_HEADER_SIZE, HUFFMAN_FIELDS_SIZE,
    INDEX_WIDTH, METHOD_FLAG_HUFFMAN, METHOD_FLAG_HYBRID, SECTION_LEN_SIZE,
};
use crate::config::CompressionMethod;
use crate::error::CloudpackError;
use crate::kernels::huffman::deserialize_tree;
use crate::kernels::permutation;

//==================================================================================
// Public Structs
//==================================================================================

/// The method-specific bytes that follow the method flag.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `2n` big-endian `f32` deltas.
    Hybrid(Vec<u8>),
    Huffman {
        tree_bytes: Vec<u8>,
        /// Meaningful bits in `bitstream` before padding.
        original_bit_count: u32,
        bitstream: Vec<u8>,
    },
}

impl Payload {
    pub fn flag(&self) -> u8 {
        match self {
            Payload::Hybrid(_) => METHOD_FLAG_HYBRID,
            Payload::Huffman { .. } => METHOD_FLAG_HUFFMAN,
        }
    }

    pub fn method(&self) -> CompressionMethod {
        match self {
            Payload::Hybrid(_) => CompressionMethod::Hybrid,
            Payload::Huffman { .. } => CompressionMethod::Huffman,
        }
    }

    /// Serialized size excluding the method flag.
    pub fn encoded_len(&self) -> usize {
        match self {
            Payload::Hybrid(bytes) => bytes.len(),
            Payload::Huffman {
                tree_bytes,
                bitstream,
                ..
            } => HUFFMAN_FIELDS_SIZE + tree_bytes.len() + bitstream.len(),
        }
    }
}

/// A fully parsed container. `n` is the permutation length.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedContainer {
    /// First sorted x value; equals the first x delta.
    pub initial_x: f32,
    /// First sorted y value; equals the first y delta.
    pub initial_y: f32,
    pub x_inv_perm: Vec<u32>,
    pub y_inv_perm: Vec<u32>,
    pub payload: Payload,
}

//==================================================================================
// Core Implementation
//==================================================================================

impl CompressedContainer {
    pub fn n(&self) -> usize {
        self.x_inv_perm.len()
    }

    /// Serializes the container into its canonical byte layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CloudpackError> {
        let n = self.n();
        if n == 0 || self.y_inv_perm.len() != n {
            return Err(CloudpackError::Shape(format!(
                "permutation lengths must be equal and non-zero, got {} and {}",
                n,
                self.y_inv_perm.len()
            )));
        }
        let n_field = to_u32(n, "point count")?;
        let section_len = to_u32(1 + self.payload.encoded_len(), "delta section")?;

        let total = FIXED_HEADER_SIZE
            + 2 * n * INDEX_WIDTH
            + SECTION_LEN_SIZE
            + section_len as usize;
        let mut buf = Vec::with_capacity(total);

        buf.extend_from_slice(&self.initial_x.to_be_bytes());
        buf.extend_from_slice(&self.initial_y.to_be_bytes());
        buf.extend_from_slice(&n_field.to_be_bytes());
        for idx in self.x_inv_perm.iter().chain(&self.y_inv_perm) {
            buf.extend_from_slice(&idx.to_be_bytes());
        }

        buf.extend_from_slice(&section_len.to_be_bytes());
        buf.push(self.payload.flag());
        match &self.payload {
            Payload::Hybrid(bytes) => buf.extend_from_slice(bytes),
            Payload::Huffman {
                tree_bytes,
                original_bit_count,
                bitstream,
            } => {
                buf.extend_from_slice(&to_u32(tree_bytes.len(), "tree")?.to_be_bytes());
                buf.extend_from_slice(tree_bytes);
                buf.extend_from_slice(&original_bit_count.to_be_bytes());
                buf.extend_from_slice(&to_u32(bitstream.len(), "bitstream")?.to_be_bytes());
                buf.extend_from_slice(bitstream);
            }
        }

        debug_assert_eq!(buf.len(), total);
        Ok(buf)
    }

    /// Parses and validates a full container.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CloudpackError> {
        let mut cursor = Cursor::new(bytes);
        let (initial_x, initial_y, n) = read_fixed_header(&mut cursor)?;
        ensure_permutations_fit(&cursor, n)?;

        let x_inv_perm = read_indices(&mut cursor, n)?;
        permutation::validate(&x_inv_perm)?;
        let y_inv_perm = read_indices(&mut cursor, n)?;
        permutation::validate(&y_inv_perm)?;

        let section = read_delta_section(&mut cursor)?;
        let payload = parse_payload(section)?;

        Ok(Self {
            initial_x,
            initial_y,
            x_inv_perm,
            y_inv_perm,
            payload,
        })
    }

    /// Peeks into a container to report its layout without decoding any
    /// symbols or reading the permutations.
    pub fn peek_info(bytes: &[u8]) -> Result<ContainerStats, CloudpackError> {
        let mut cursor = Cursor::new(bytes);
        let (_, _, n) = read_fixed_header(&mut cursor)?;
        ensure_permutations_fit(&cursor, n)?;
        let permutation_size = 2 * n * INDEX_WIDTH;
        cursor.set_position((FIXED_HEADER_SIZE + permutation_size) as u64);

        let section = read_delta_section(&mut cursor)?;
        let payload = parse_payload(section)?;

        let huffman = match &payload {
            Payload::Hybrid(_) => None,
            Payload::Huffman {
                tree_bytes,
                original_bit_count,
                bitstream,
            } => {
                let (tree, _) = deserialize_tree(tree_bytes)?;
                Some(HuffmanStats {
                    tree_size: tree_bytes.len(),
                    distinct_symbols: tree.leaf_count(),
                    original_bit_count: *original_bit_count as usize,
                    bitstream_bytes: bitstream.len(),
                })
            }
        };

        let raw_size = 2 * n * std::mem::size_of::<f32>();
        Ok(ContainerStats {
            n,
            method: payload.method(),
            header_size: FIXED_HEADER_SIZE,
            permutation_size,
            delta_section_size: SECTION_LEN_SIZE + section.len(),
            total_size: bytes.len(),
            raw_size,
            compression_ratio: raw_size as f64 / bytes.len() as f64,
            huffman,
        })
    }
}

//==================================================================================
// Private Helpers
//==================================================================================

fn to_u32(len: usize, what: &str) -> Result<u32, CloudpackError> {
    u32::try_from(len).map_err(|_| {
        CloudpackError::Format(format!("{} of {} bytes is too large to frame", what, len))
    })
}

fn remaining(cursor: &Cursor<&[u8]>) -> usize {
    cursor.get_ref().len().saturating_sub(cursor.position() as usize)
}

fn read_u32(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<u32, CloudpackError> {
    let mut buf = [0u8; 4];
    cursor
        .read_exact(&mut buf)
        .map_err(|e| CloudpackError::truncated(what, e))?;
    Ok(u32::from_be_bytes(buf))
}

fn read_f32(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<f32, CloudpackError> {
    read_u32(cursor, what).map(f32::from_bits)
}

/// Borrows the next `len` bytes, checking the length before touching them.
fn take_slice<'a>(
    cursor: &mut Cursor<&'a [u8]>,
    len: usize,
    what: &str,
) -> Result<&'a [u8], CloudpackError> {
    if len > remaining(cursor) {
        return Err(CloudpackError::Format(format!(
            "{} declares {} bytes but only {} remain",
            what,
            len,
            remaining(cursor)
        )));
    }
    let start = cursor.position() as usize;
    let bytes: &'a [u8] = *cursor.get_ref();
    cursor.set_position((start + len) as u64);
    Ok(&bytes[start..start + len])
}

fn read_fixed_header(cursor: &mut Cursor<&[u8]>) -> Result<(f32, f32, usize), CloudpackError> {
    let initial_x = read_f32(cursor, "initial_x")?;
    let initial_y = read_f32(cursor, "initial_y")?;
    let n = read_u32(cursor, "n")? as usize;
    if n == 0 {
        return Err(CloudpackError::Format("container declares n = 0".into()));
    }
    Ok((initial_x, initial_y, n))
}

/// Rejects an `n` whose permutations cannot fit in the buffer before any
/// allocation is sized from it.
fn ensure_permutations_fit(cursor: &Cursor<&[u8]>, n: usize) -> Result<(), CloudpackError> {
    let needed = n
        .checked_mul(2 * INDEX_WIDTH)
        .ok_or_else(|| CloudpackError::Format(format!("n = {} overflows", n)))?;
    if needed > remaining(cursor) {
        return Err(CloudpackError::Format(format!(
            "n = {} needs {} permutation bytes but only {} remain",
            n,
            needed,
            remaining(cursor)
        )));
    }
    Ok(())
}

fn read_indices(cursor: &mut Cursor<&[u8]>, n: usize) -> Result<Vec<u32>, CloudpackError> {
    let raw = take_slice(cursor, n * INDEX_WIDTH, "inverse permutation")?;
    Ok(raw
        .chunks_exact(INDEX_WIDTH)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Reads `delta_section_len` and returns the section (flag + payload). The
/// section must end exactly at the end of the buffer.
fn read_delta_section<'a>(cursor: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], CloudpackError> {
    let section_len = read_u32(cursor, "delta_section_len")? as usize;
    if section_len == 0 {
        return Err(CloudpackError::Format(
            "delta section must hold at least the method flag".into(),
        ));
    }
    let section = take_slice(cursor, section_len, "delta section")?;
    if remaining(cursor) != 0 {
        return Err(CloudpackError::Format(format!(
            "{} trailing bytes after the delta section",
            remaining(cursor)
        )));
    }
    Ok(section)
}

fn parse_payload(section: &[u8]) -> Result<Payload, CloudpackError> {
    let (&flag, body) = section
        .split_first()
        .ok_or_else(|| CloudpackError::Format("missing method flag".into()))?;

    match flag {
        METHOD_FLAG_HYBRID => Ok(Payload::Hybrid(body.to_vec())),
        METHOD_FLAG_HUFFMAN => {
            let mut cursor = Cursor::new(body);
            let tree_size = read_u32(&mut cursor, "tree_size")? as usize;
            let tree_bytes = take_slice(&mut cursor, tree_size, "tree")?.to_vec();
            let original_bit_count = read_u32(&mut cursor, "original_bit_count")?;
            let bitstream_bytes = read_u32(&mut cursor, "bitstream_bytes")? as usize;
            let expected = (original_bit_count as usize).div_ceil(8);
            if bitstream_bytes != expected {
                return Err(CloudpackError::Format(format!(
                    "{} meaningful bits need {} bitstream bytes, header declares {}",
                    original_bit_count, expected, bitstream_bytes
                )));
            }
            let bitstream = take_slice(&mut cursor, bitstream_bytes, "bitstream")?.to_vec();
            if remaining(&cursor) != 0 {
                return Err(CloudpackError::Format(format!(
                    "{} unaccounted bytes inside the huffman payload",
                    remaining(&cursor)
                )));
            }
            Ok(Payload::Huffman {
                tree_bytes,
                original_bit_count,
                bitstream,
            })
        }
        other => Err(CloudpackError::Format(format!(
            "unrecognized method flag {}",
            other
        ))),
    }
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn hybrid_container() -> CompressedContainer {
        let mut deltas = Vec::new();
        for v in [1.0f32, 2.0, 3.0, 1.0] {
            deltas.extend_from_slice(&v.to_be_bytes());
        }
        CompressedContainer {
            initial_x: 1.0,
            initial_y: 3.0,
            x_inv_perm: vec![1, 0],
            y_inv_perm: vec![0, 1],
            payload: Payload::Hybrid(deltas),
        }
    }

    fn huffman_container() -> CompressedContainer {
        CompressedContainer {
            initial_x: 0.0,
            initial_y: 0.0,
            x_inv_perm: vec![0, 1, 2],
            y_inv_perm: vec![2, 1, 0],
            payload: Payload::Huffman {
                tree_bytes: vec![2, 0, 0, 0, 6, 0, 0, 0, 0],
                original_bit_count: 6,
                bitstream: vec![0],
            },
        }
    }

    #[test]
    fn test_hybrid_layout_is_exact() {
        let bytes = hybrid_container().to_bytes().unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(&1.0f32.to_be_bytes());
        expected.extend_from_slice(&3.0f32.to_be_bytes());
        expected.extend_from_slice(&2u32.to_be_bytes());
        for idx in [1u32, 0, 0, 1] {
            expected.extend_from_slice(&idx.to_be_bytes());
        }
        expected.extend_from_slice(&17u32.to_be_bytes());
        expected.push(METHOD_FLAG_HYBRID);
        for v in [1.0f32, 2.0, 3.0, 1.0] {
            expected.extend_from_slice(&v.to_be_bytes());
        }
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_container_roundtrip() {
        for original in [hybrid_container(), huffman_container()] {
            let bytes = original.to_bytes().unwrap();
            assert_eq!(CompressedContainer::from_bytes(&bytes).unwrap(), original);
        }
    }

    #[test]
    fn test_every_truncation_is_rejected() {
        for original in [hybrid_container(), huffman_container()] {
            let bytes = original.to_bytes().unwrap();
            for cut in 0..bytes.len() {
                let result = CompressedContainer::from_bytes(&bytes[..cut]);
                assert!(
                    matches!(result, Err(CloudpackError::Format(_))),
                    "prefix of {} bytes was accepted",
                    cut
                );
            }
        }
    }

    #[test]
    fn test_trailing_bytes_are_rejected() {
        let mut bytes = hybrid_container().to_bytes().unwrap();
        bytes.push(0);
        assert!(matches!(
            CompressedContainer::from_bytes(&bytes),
            Err(CloudpackError::Format(_))
        ));
    }

    #[test]
    fn test_unknown_method_flag_is_rejected() {
        let mut bytes = hybrid_container().to_bytes().unwrap();
        let flag_pos = FIXED_HEADER_SIZE + 4 * INDEX_WIDTH + SECTION_LEN_SIZE;
        bytes[flag_pos] = 9;
        assert!(matches!(
            CompressedContainer::from_bytes(&bytes),
            Err(CloudpackError::Format(_))
        ));
    }

    #[test]
    fn test_invalid_permutation_is_rejected() {
        let mut container = hybrid_container();
        container.x_inv_perm = vec![1, 1];
        let bytes = container.to_bytes().unwrap();
        assert!(matches!(
            CompressedContainer::from_bytes(&bytes),
            Err(CloudpackError::Format(_))
        ));
    }

    #[test]
    fn test_huge_n_is_rejected_before_allocating() {
        let mut bytes = hybrid_container().to_bytes().unwrap();
        bytes[8..12].copy_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(
            CompressedContainer::from_bytes(&bytes),
            Err(CloudpackError::Format(_))
        ));
    }

    #[test]
    fn test_bitstream_size_must_match_bit_count() {
        let mut container = huffman_container();
        container.payload = Payload::Huffman {
            tree_bytes: vec![2, 0, 0, 0, 6, 0, 0, 0, 0],
            original_bit_count: 6,
            bitstream: vec![0, 0],
        };
        let bytes = container.to_bytes().unwrap();
        assert!(matches!(
            CompressedContainer::from_bytes(&bytes),
            Err(CloudpackError::Format(_))
        ));
    }

    #[test]
    fn test_mismatched_permutations_cannot_be_framed() {
        let mut container = hybrid_container();
        container.y_inv_perm = vec![0];
        assert!(matches!(container.to_bytes(), Err(CloudpackError::Shape(_))));
    }

    #[test]
    fn test_peek_info_reports_layout() {
        let bytes = huffman_container().to_bytes().unwrap();
        let info = CompressedContainer::peek_info(&bytes).unwrap();
        assert_eq!(info.n, 3);
        assert_eq!(info.method, CompressionMethod::Huffman);
        assert_eq!(info.permutation_size, 24);
        assert_eq!(
            info.header_size + info.permutation_size + info.delta_section_size,
            info.total_size
        );
        assert_eq!(info.total_size, bytes.len());
        assert_eq!(info.raw_size, 24);
        let huff = info.huffman.unwrap();
        assert_eq!(huff.distinct_symbols, 1);
        assert_eq!(huff.original_bit_count, 6);
        assert_eq!(huff.tree_size, 9);

        let info = CompressedContainer::peek_info(&hybrid_container().to_bytes().unwrap()).unwrap();
        assert_eq!(info.method, CompressionMethod::Hybrid);
        assert!(info.huffman.is_none());
    }
}
