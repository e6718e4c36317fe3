//! This module contains the from-scratch Huffman entropy coder for delta symbols.
//!
//! The stages are exposed individually (`frequency`, `tree`, `codebook`,
//! `bitstream`) and composed by `encode` / `decode` below. Symbols are `f32`
//! values compared by bit pattern.

pub mod bitstream;
pub mod codebook;
pub mod frequency;
pub mod tree;

pub use bitstream::Bitstream;
pub use codebook::{assign_codes, Code, Codebook};
pub use frequency::FrequencyTable;
pub use tree::{build_tree, deserialize_tree, serialize_tree, HuffmanTree};

use crate::error::CloudpackError;

/// The coder's output: the tree that decodes it plus the packed bits.
#[derive(Debug, Clone, PartialEq)]
pub struct HuffmanEncoded {
    pub tree: HuffmanTree,
    pub bitstream: Bitstream,
}

/// Frequency analysis -> tree -> codebook -> bitstream.
pub fn encode(symbols: &[f32]) -> Result<HuffmanEncoded, CloudpackError> {
    let table = FrequencyTable::from_symbols(symbols);
    let tree = build_tree(&table)?;
    let codebook = assign_codes(&tree)?;
    let bitstream = bitstream::encode(symbols, &codebook)?;

    log::debug!(
        "huffman: {} symbols, {} distinct, entropy {:.3} bits/symbol, {} coded bits",
        symbols.len(),
        table.len(),
        table.entropy(),
        bitstream.bit_len
    );

    Ok(HuffmanEncoded { tree, bitstream })
}

/// Decodes exactly `symbol_count` symbols.
pub fn decode(encoded: &HuffmanEncoded, symbol_count: usize) -> Result<Vec<f32>, CloudpackError> {
    bitstream::decode(&encoded.bitstream, &encoded.tree, symbol_count)
}
