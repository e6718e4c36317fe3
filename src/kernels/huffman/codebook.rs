//! Code assignment: turns a `HuffmanTree` into a prefix-free symbol -> bits map.

use hashbrown::HashMap;

use super::tree::HuffmanTree;
use crate::error::CloudpackError;

/// Widest codeword a `Code` can hold.
pub const MAX_CODE_LEN: usize = 64;

/// A codeword stored right-aligned in `bits`, most significant bit emitted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code {
    pub bits: u64,
    pub len: u8,
}

impl Code {
    /// Iterates the codeword's bits in emission order.
    pub fn iter_bits(self) -> impl Iterator<Item = bool> {
        (0..self.len).rev().map(move |i| (self.bits >> i) & 1 == 1)
    }

    /// `true` if `self` is a prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        if self.len == 0 {
            return true;
        }
        self.len <= other.len && other.bits >> (other.len - self.len) == self.bits
    }
}

/// Symbol (by `f32` bit pattern) -> codeword.
#[derive(Debug, Clone, Default)]
pub struct Codebook {
    codes: HashMap<u32, Code>,
}

impl Codebook {
    pub fn get(&self, symbol: f32) -> Option<Code> {
        self.codes.get(&symbol.to_bits()).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f32, Code)> + '_ {
        self.codes.iter().map(|(&bits, &code)| (f32::from_bits(bits), code))
    }
}

/// Depth-first code assignment: `0` per left edge, `1` per right edge.
///
/// Traversal uses an explicit stack and carries each path as a packed integer.
/// A lone-leaf tree gets the one-bit code `0`. Depth beyond the number of
/// distinct symbols (or beyond `MAX_CODE_LEN`) means the tree is malformed.
pub fn assign_codes(tree: &HuffmanTree) -> Result<Codebook, CloudpackError> {
    let mut codebook = Codebook::default();
    let depth_limit = tree.leaf_count().min(MAX_CODE_LEN);

    if let HuffmanTree::Leaf { symbol, .. } = tree {
        codebook.codes.insert(symbol.to_bits(), Code { bits: 0, len: 1 });
        return Ok(codebook);
    }

    let mut stack: Vec<(&HuffmanTree, u64, usize)> = vec![(tree, 0, 0)];
    while let Some((node, bits, depth)) = stack.pop() {
        if depth > depth_limit {
            return Err(CloudpackError::Codec(format!(
                "code assignment depth {} exceeds limit {}",
                depth, depth_limit
            )));
        }
        match node {
            HuffmanTree::Empty => {}
            HuffmanTree::Leaf { symbol, .. } => {
                let code = Code {
                    bits,
                    len: depth as u8,
                };
                if codebook.codes.insert(symbol.to_bits(), code).is_some() {
                    return Err(CloudpackError::Codec(format!(
                        "symbol {} appears in more than one leaf",
                        symbol
                    )));
                }
            }
            HuffmanTree::Internal { left, right, .. } => {
                if depth == MAX_CODE_LEN {
                    return Err(CloudpackError::Codec(format!(
                        "codeword would exceed {} bits",
                        MAX_CODE_LEN
                    )));
                }
                stack.push((right, (bits << 1) | 1, depth + 1));
                stack.push((left, bits << 1, depth + 1));
            }
        }
    }
    Ok(codebook)
}
