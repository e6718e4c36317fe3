// In: src/bridge/format.rs

//! Defines all on-wire constants and the public stats structures for the
//! cloudpack container. This is the single source of truth for the byte values
//! shared by the container codec and the Huffman tree serializer.
//!
//! Container layout (big-endian):
//! ```text
//! initial_x:          f32
//! initial_y:          f32
//! n:                  u32
//! x_inv_perm:         u32[n]
//! y_inv_perm:         u32[n]
//! delta_section_len:  u32          bytes of method_flag + payload
//! method_flag:        u8           0 = hybrid, 1 = huffman
//! payload:            u8[delta_section_len - 1]
//! ```
//! Huffman payload:
//! ```text
//! tree_size:          u32
//! tree_bytes:         u8[tree_size]
//! original_bit_count: u32
//! bitstream_bytes:    u32
//! bitstream:          u8[bitstream_bytes]
//! ```

use serde::Serialize;

use crate::config::CompressionMethod;
use crate::error::CloudpackError;

//==================================================================================
// I. Container Constants
//==================================================================================

/// `initial_x` + `initial_y` + `n`.
pub const FIXED_HEADER_SIZE: usize = 12;
/// Bytes per stored inverse-permutation index.
pub const INDEX_WIDTH: usize = 4;
/// The `delta_section_len` field.
pub const SECTION_LEN_SIZE: usize = 4;

pub const METHOD_FLAG_HYBRID: u8 = 0;
pub const METHOD_FLAG_HUFFMAN: u8 = 1;

/// `tree_size` + `original_bit_count` + `bitstream_bytes`.
pub const HUFFMAN_FIELDS_SIZE: usize = 12;

//==================================================================================
// II. Huffman Tree Node Tags
//==================================================================================

pub const NODE_EMPTY: u8 = 0;
pub const NODE_INTERNAL: u8 = 1;
pub const NODE_LEAF: u8 = 2;

//==================================================================================
// III. Public Stats Structures
//==================================================================================

/// Huffman-specific figures reported by `analyze_container`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HuffmanStats {
    pub tree_size: usize,
    pub distinct_symbols: usize,
    pub original_bit_count: usize,
    pub bitstream_bytes: usize,
}

/// The public-facing result of `analyze_container`. All sizes are in bytes.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ContainerStats {
    pub n: usize,
    pub method: CompressionMethod,
    /// `initial_x`, `initial_y` and `n`.
    pub header_size: usize,
    /// Both inverse permutations.
    pub permutation_size: usize,
    /// `delta_section_len` field, method flag and payload.
    pub delta_section_size: usize,
    pub total_size: usize,
    /// Size of the two uncompressed `f32` arrays, `8n`.
    pub raw_size: usize,
    /// `raw_size / total_size`.
    pub compression_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub huffman: Option<HuffmanStats>,
}

impl ContainerStats {
    pub fn to_json(&self) -> Result<String, CloudpackError> {
        Ok(serde_json::to_string(self)?)
    }
}
