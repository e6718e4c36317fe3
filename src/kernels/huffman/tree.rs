//! Huffman tree construction and its pre-order wire serialization.
//!
//! Wire grammar (big-endian):
//! ```text
//! node     := EMPTY | INTERNAL weight:i32 node node | LEAF weight:i32 value:f32
//! EMPTY    := 0x00
//! INTERNAL := 0x01
//! LEAF     := 0x02
//! ```

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::{Cursor, Read};

use super::frequency::FrequencyTable;
use crate::bridge::format::{NODE_EMPTY, NODE_INTERNAL, NODE_LEAF};
use crate::error::CloudpackError;

/// Deserialization refuses trees nested deeper than this. Any tree built from
/// weights that fit an `i32` is far shallower.
pub const MAX_TREE_DEPTH: usize = 64;

/// A binary coding tree. `Empty` only appears as the root of a tree built from
/// an empty population.
#[derive(Debug, Clone, PartialEq)]
pub enum HuffmanTree {
    Empty,
    Leaf {
        weight: u32,
        symbol: f32,
    },
    Internal {
        weight: u32,
        left: Box<HuffmanTree>,
        right: Box<HuffmanTree>,
    },
}

impl HuffmanTree {
    pub fn weight(&self) -> u32 {
        match self {
            HuffmanTree::Empty => 0,
            HuffmanTree::Leaf { weight, .. } | HuffmanTree::Internal { weight, .. } => *weight,
        }
    }

    /// Number of leaves, i.e. distinct symbols the tree can emit.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                HuffmanTree::Empty => {}
                HuffmanTree::Leaf { .. } => count += 1,
                HuffmanTree::Internal { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        count
    }
}

//==================================================================================
// 1. Construction
//==================================================================================

/// Greedy Huffman reduction over `table`.
///
/// Nodes are ordered by `(weight, creation sequence)`: leaves are numbered in
/// first-appearance order and each merged node takes the next number, so equal
/// weights always resolve the same way. The lower node of each pair becomes
/// the left child.
pub fn build_tree(table: &FrequencyTable) -> Result<HuffmanTree, CloudpackError> {
    let mut arena: Vec<Option<HuffmanTree>> = Vec::with_capacity(table.len() * 2);
    let mut heap = BinaryHeap::with_capacity(table.len());

    for (symbol, count) in table.iter() {
        heap.push(Reverse((count, arena.len())));
        arena.push(Some(HuffmanTree::Leaf {
            weight: count,
            symbol,
        }));
    }

    while heap.len() > 1 {
        let (Some(Reverse((w_left, i_left))), Some(Reverse((w_right, i_right)))) =
            (heap.pop(), heap.pop())
        else {
            break;
        };
        let weight = w_left.checked_add(w_right).ok_or_else(|| {
            CloudpackError::Shape("symbol population too large for 32-bit tree weights".into())
        })?;
        let left = take_node(&mut arena, i_left)?;
        let right = take_node(&mut arena, i_right)?;
        heap.push(Reverse((weight, arena.len())));
        arena.push(Some(HuffmanTree::Internal {
            weight,
            left: Box::new(left),
            right: Box::new(right),
        }));
    }

    match heap.pop() {
        Some(Reverse((_, root))) => take_node(&mut arena, root),
        None => Ok(HuffmanTree::Empty),
    }
}

fn take_node(arena: &mut [Option<HuffmanTree>], idx: usize) -> Result<HuffmanTree, CloudpackError> {
    arena
        .get_mut(idx)
        .and_then(Option::take)
        .ok_or_else(|| CloudpackError::Codec(format!("tree node {} consumed twice", idx)))
}

//==================================================================================
// 2. Serialization
//==================================================================================

/// Writes `tree` in pre-order. Fails if a weight does not fit the `i32` field.
pub fn serialize_tree(tree: &HuffmanTree) -> Result<Vec<u8>, CloudpackError> {
    let mut out = Vec::new();
    let mut stack = vec![tree];
    while let Some(node) = stack.pop() {
        match node {
            HuffmanTree::Empty => out.push(NODE_EMPTY),
            HuffmanTree::Leaf { weight, symbol } => {
                out.push(NODE_LEAF);
                out.extend_from_slice(&wire_weight(*weight)?.to_be_bytes());
                out.extend_from_slice(&symbol.to_be_bytes());
            }
            HuffmanTree::Internal {
                weight,
                left,
                right,
            } => {
                out.push(NODE_INTERNAL);
                out.extend_from_slice(&wire_weight(*weight)?.to_be_bytes());
                // Right is pushed first so left is written first.
                stack.push(right);
                stack.push(left);
            }
        }
    }
    Ok(out)
}

fn wire_weight(weight: u32) -> Result<i32, CloudpackError> {
    i32::try_from(weight).map_err(|_| {
        CloudpackError::Shape(format!("tree weight {} does not fit an i32 field", weight))
    })
}

/// Parses one tree from the front of `bytes`, returning it with the unread rest.
pub fn deserialize_tree(bytes: &[u8]) -> Result<(HuffmanTree, &[u8]), CloudpackError> {
    let mut cursor = Cursor::new(bytes);
    let tree = read_node(&mut cursor, 0)?;
    let consumed = cursor.position() as usize;
    Ok((tree, &bytes[consumed..]))
}

fn read_node(cursor: &mut Cursor<&[u8]>, depth: usize) -> Result<HuffmanTree, CloudpackError> {
    if depth > MAX_TREE_DEPTH {
        return Err(CloudpackError::Format(format!(
            "tree nesting exceeds {} levels",
            MAX_TREE_DEPTH
        )));
    }

    let mut tag = [0u8; 1];
    cursor
        .read_exact(&mut tag)
        .map_err(|e| CloudpackError::truncated("tree node tag", e))?;

    match tag[0] {
        NODE_EMPTY => Ok(HuffmanTree::Empty),
        NODE_LEAF => {
            let weight = read_weight(cursor)?;
            let mut buf = [0u8; 4];
            cursor
                .read_exact(&mut buf)
                .map_err(|e| CloudpackError::truncated("leaf value", e))?;
            Ok(HuffmanTree::Leaf {
                weight,
                symbol: f32::from_be_bytes(buf),
            })
        }
        NODE_INTERNAL => {
            let weight = read_weight(cursor)?;
            let left = read_node(cursor, depth + 1)?;
            let right = read_node(cursor, depth + 1)?;
            if matches!(left, HuffmanTree::Empty) || matches!(right, HuffmanTree::Empty) {
                return Err(CloudpackError::Format(
                    "internal tree node has an empty child".into(),
                ));
            }
            if u64::from(left.weight()) + u64::from(right.weight()) != u64::from(weight) {
                return Err(CloudpackError::Format(format!(
                    "internal node weight {} is not the sum of its children ({} + {})",
                    weight,
                    left.weight(),
                    right.weight()
                )));
            }
            Ok(HuffmanTree::Internal {
                weight,
                left: Box::new(left),
                right: Box::new(right),
            })
        }
        other => Err(CloudpackError::Format(format!(
            "unknown tree node tag {}",
            other
        ))),
    }
}

fn read_weight(cursor: &mut Cursor<&[u8]>) -> Result<u32, CloudpackError> {
    let mut buf = [0u8; 4];
    cursor
        .read_exact(&mut buf)
        .map_err(|e| CloudpackError::truncated("node weight", e))?;
    let weight = i32::from_be_bytes(buf);
    u32::try_from(weight)
        .map_err(|_| CloudpackError::Format(format!("negative tree weight {}", weight)))
}
