//! Bit-level encode/decode of symbols against a codebook / tree.
//!
//! Bits are packed MSB-first into bytes (`bitvec` `Msb0`); the final byte is
//! zero-padded and the meaningful bit count travels alongside the bytes.

use bitvec::prelude::*;

use super::codebook::Codebook;
use super::tree::HuffmanTree;
use crate::error::CloudpackError;

/// Concatenated codewords padded to a byte boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitstream {
    pub bytes: Vec<u8>,
    /// Meaningful bits before padding.
    pub bit_len: usize,
}

/// Emits each symbol's codeword in input order.
///
/// A symbol missing from the codebook is an internal-consistency failure: the
/// codebook is always built from the same population being encoded.
pub fn encode(symbols: &[f32], codebook: &Codebook) -> Result<Bitstream, CloudpackError> {
    let mut bits: BitVec<u8, Msb0> = BitVec::with_capacity(symbols.len());
    for (i, &symbol) in symbols.iter().enumerate() {
        let code = codebook.get(symbol).ok_or_else(|| {
            CloudpackError::Codec(format!(
                "symbol {} (bits {:#010x}) at position {} has no codeword",
                symbol,
                symbol.to_bits(),
                i
            ))
        })?;
        bits.extend(code.iter_bits());
    }

    let bit_len = bits.len();
    bits.set_uninitialized(false);
    Ok(Bitstream {
        bytes: bits.into_vec(),
        bit_len,
    })
}

/// Decodes an owned `Bitstream`. See `decode_bits`.
pub fn decode(
    stream: &Bitstream,
    tree: &HuffmanTree,
    symbol_count: usize,
) -> Result<Vec<f32>, CloudpackError> {
    decode_bits(&stream.bytes, stream.bit_len, tree, symbol_count)
}

/// Walks `tree` from the root once per symbol: `0` goes left, `1` goes right.
///
/// Only the first `bit_len` bits of `bytes` are read. Stops after exactly
/// `symbol_count` symbols. Running out of bits first, or having meaningful bits
/// left afterwards, is a fatal corruption error.
pub fn decode_bits(
    bytes: &[u8],
    bit_len: usize,
    tree: &HuffmanTree,
    symbol_count: usize,
) -> Result<Vec<f32>, CloudpackError> {
    let available = bytes.len() * 8;
    if bit_len > available {
        return Err(CloudpackError::Format(format!(
            "declared {} meaningful bits but only {} bytes of bitstream",
            bit_len,
            bytes.len()
        )));
    }
    let bits = &bytes.view_bits::<Msb0>()[..bit_len];
    let underrun = |decoded: usize| {
        CloudpackError::Codec(format!(
            "bitstream exhausted after {} of {} symbols",
            decoded, symbol_count
        ))
    };

    let mut out = Vec::with_capacity(symbol_count);
    let mut pos = 0usize;

    match tree {
        HuffmanTree::Empty if symbol_count > 0 => {
            return Err(CloudpackError::Codec(
                "cannot decode symbols with an empty tree".into(),
            ))
        }
        HuffmanTree::Empty => {}
        // A lone leaf spends one bit per symbol.
        HuffmanTree::Leaf { symbol, .. } => {
            if bits.len() < symbol_count {
                return Err(underrun(bits.len()));
            }
            if let Some(at) = bits[..symbol_count].first_one() {
                return Err(CloudpackError::Codec(format!(
                    "bit {} is set but the only codeword is 0",
                    at
                )));
            }
            out.resize(symbol_count, *symbol);
            pos = symbol_count;
        }
        HuffmanTree::Internal { .. } => {
            while out.len() < symbol_count {
                let mut node = tree;
                loop {
                    match node {
                        HuffmanTree::Leaf { symbol, .. } => {
                            out.push(*symbol);
                            break;
                        }
                        HuffmanTree::Internal { left, right, .. } => {
                            let bit = *bits.get(pos).ok_or_else(|| underrun(out.len()))?;
                            pos += 1;
                            node = if bit { right } else { left };
                        }
                        HuffmanTree::Empty => {
                            return Err(CloudpackError::Codec(format!(
                                "bit path reached an empty node at bit {}",
                                pos
                            )))
                        }
                    }
                }
            }
        }
    }

    if pos != bits.len() {
        return Err(CloudpackError::Codec(format!(
            "{} meaningful bits left over after {} symbols",
            bits.len() - pos,
            symbol_count
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::huffman::codebook::assign_codes;
    use crate::kernels::huffman::frequency::FrequencyTable;
    use crate::kernels::huffman::tree::build_tree;
    use crate::utils::bit_identical;

    fn setup(symbols: &[f32]) -> (HuffmanTree, Codebook) {
        let tree = build_tree(&FrequencyTable::from_symbols(symbols)).unwrap();
        let book = assign_codes(&tree).unwrap();
        (tree, book)
    }

    #[test]
    fn test_encode_packs_msb_first_with_zero_padding() {
        // Codes: 0.0 -> 00, 1.0 -> 01, 0.5 -> 1
        let symbols = [0.5f32, 0.0, 0.5, 1.0, 0.5];
        let (_, book) = setup(&symbols);
        let stream = encode(&symbols, &book).unwrap();
        // 1 00 1 01 1 -> 1001_011(0)
        assert_eq!(stream.bit_len, 7);
        assert_eq!(stream.bytes, vec![0b1001_0110]);
    }

    #[test]
    fn test_roundtrip_exact_symbol_count() {
        let symbols: Vec<f32> = (0..777).map(|i| ((i * 31) % 11) as f32 - 5.0).collect();
        let (tree, book) = setup(&symbols);
        let stream = encode(&symbols, &book).unwrap();
        assert_eq!(stream.bytes.len(), stream.bit_len.div_ceil(8));
        let decoded = decode(&stream, &tree, symbols.len()).unwrap();
        assert!(bit_identical(&decoded, &symbols));
    }

    #[test]
    fn test_single_symbol_stream() {
        let symbols = [0.25f32; 9];
        let (tree, book) = setup(&symbols);
        let stream = encode(&symbols, &book).unwrap();
        assert_eq!(stream.bit_len, 9);
        assert_eq!(stream.bytes, vec![0, 0]);
        assert_eq!(decode(&stream, &tree, 9).unwrap(), symbols.to_vec());
    }

    #[test]
    fn test_missing_symbol_is_fatal_on_encode() {
        let (_, book) = setup(&[1.0, 2.0]);
        let result = encode(&[1.0, 3.0], &book);
        assert!(matches!(result, Err(CloudpackError::Codec(_))));
    }

    #[test]
    fn test_underrun_is_fatal_not_padded() {
        let symbols = [0.5f32, 0.0, 0.5, 1.0, 0.5];
        let (tree, book) = setup(&symbols);
        let stream = encode(&symbols, &book).unwrap();
        let result = decode(&stream, &tree, symbols.len() + 1);
        assert!(matches!(result, Err(CloudpackError::Codec(_))));

        let (tree, book) = setup(&[7.0; 4]);
        let stream = encode(&[7.0; 4], &book).unwrap();
        assert!(matches!(decode(&stream, &tree, 5), Err(CloudpackError::Codec(_))));
    }

    #[test]
    fn test_leftover_bits_are_fatal() {
        let symbols = [0.5f32, 0.0, 0.5, 1.0, 0.5];
        let (tree, book) = setup(&symbols);
        let stream = encode(&symbols, &book).unwrap();
        let result = decode(&stream, &tree, symbols.len() - 1);
        assert!(matches!(result, Err(CloudpackError::Codec(_))));
    }

    #[test]
    fn test_padding_bits_are_never_read() {
        let symbols = [0.5f32, 0.0, 0.5, 1.0, 0.5];
        let (tree, book) = setup(&symbols);
        let mut stream = encode(&symbols, &book).unwrap();
        // Garbage in the padding bit must not change the result.
        stream.bytes[0] |= 0b0000_0001;
        assert_eq!(decode(&stream, &tree, 5).unwrap(), symbols.to_vec());
    }

    #[test]
    fn test_lone_leaf_rejects_set_bits() {
        let (tree, _) = setup(&[7.0; 4]);
        let stream = Bitstream {
            bytes: vec![0xF0],
            bit_len: 4,
        };
        assert!(matches!(decode(&stream, &tree, 4), Err(CloudpackError::Codec(_))));

        // A set bit in the padding is still ignored.
        let stream = Bitstream {
            bytes: vec![0x0F],
            bit_len: 4,
        };
        assert_eq!(decode(&stream, &tree, 4).unwrap(), vec![7.0; 4]);
    }

    #[test]
    fn test_bit_len_beyond_bytes_is_format_error() {
        let (tree, _) = setup(&[1.0, 2.0]);
        let stream = Bitstream {
            bytes: vec![0],
            bit_len: 9,
        };
        assert!(matches!(decode(&stream, &tree, 1), Err(CloudpackError::Format(_))));
    }
}
