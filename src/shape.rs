//! Pre-order serialization of a tree's shape.
//!
//! An internal node is a `0` bit followed by its left then right subtree. A
//! leaf is a `1` bit followed by its symbol as 8 raw bits. Weights are not
//! written; a rebuilt tree codes every symbol exactly like the tree it came from.

use crate::bits::{BitReader, BitSink, BitSource};
use crate::error::{Error, Result};
use crate::{NodeId, NodeKind, Tree, PLACEHOLDER_WEIGHT};
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// A serialized shape packed into bytes, for storage with any serde format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedShape {
    bit_len: usize,
    data: Box<[u8]>,
}

impl PackedShape {
    /// Number of meaningful bits in `data`; the rest of the last byte is padding.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl From<BitVec<u8, Msb0>> for PackedShape {
    fn from(mut bits: BitVec<u8, Msb0>) -> Self {
        bits.set_uninitialized(false);
        Self {
            bit_len: bits.len(),
            data: bits.into_vec().into_boxed_slice(),
        }
    }
}

impl Tree {
    /// Writes the shape of the whole tree.
    pub fn serialize_shape<S>(&self, sink: &mut S) -> Result<()>
    where
        S: BitSink + ?Sized,
    {
        let root = self.root.ok_or(Error::EmptyTree)?;
        self.serialize_subtree(root, sink)
    }

    /// Writes the shape of the subtree under `node`.
    pub fn serialize_subtree<S>(&self, node: NodeId, sink: &mut S) -> Result<()>
    where
        S: BitSink + ?Sized,
    {
        if !self.owns(node) {
            return Err(Error::NotANode(node.index));
        }

        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            match self.nodes[id.index].kind {
                NodeKind::Leaf { symbol } => {
                    sink.write_bit(true)?;
                    sink.write_byte(symbol)?;
                }
                NodeKind::Internal { left, right } => {
                    sink.write_bit(false)?;
                    stack.push(right);
                    stack.push(left);
                }
            }
        }

        Ok(())
    }

    /// Rebuilds a tree from a shape written by [`serialize_shape`](Self::serialize_shape).
    ///
    /// Reads exactly one shape and leaves any following bits in `source`.
    pub fn deserialize_shape<S>(source: &mut S) -> Result<Tree>
    where
        S: BitSource + ?Sized,
    {
        let mut tree = Tree::default();
        // one entry per internal node still waiting for children; holds the
        // left child once it is complete
        let mut open: Vec<Option<NodeId>> = Vec::new();

        loop {
            if !source.read_bit()? {
                open.push(None);
                continue;
            }

            let symbol = source.read_byte()?;
            let mut done = tree.push_leaf(symbol, PLACEHOLDER_WEIGHT);

            loop {
                match open.last_mut() {
                    None => {
                        tree.root = Some(done);
                        log::debug!(
                            "rebuilt tree: {} leaves, {} nodes, depth {}",
                            tree.symbol_count(),
                            tree.len(),
                            tree.depth()
                        );
                        return Ok(tree);
                    }
                    Some(slot) => match slot.take() {
                        None => {
                            *slot = Some(done);
                            break;
                        }
                        Some(left) => {
                            open.pop();
                            done = tree.push_internal(left, done);
                        }
                    },
                }
            }
        }
    }

    /// Serializes the shape into a [`PackedShape`].
    pub fn pack_shape(&self) -> Result<PackedShape> {
        let mut bits = BitVec::<u8, Msb0>::new();
        self.serialize_shape(&mut bits)?;
        Ok(bits.into())
    }

    pub fn from_packed_shape(packed: &PackedShape) -> Result<Tree> {
        let bits = packed.data.view_bits::<Msb0>();
        let end = packed.bit_len.min(bits.len());
        Tree::deserialize_shape(&mut BitReader::new(&bits[..end]))
    }
}
