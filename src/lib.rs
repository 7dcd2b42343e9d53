//! A Huffman coding tree over the byte alphabet.
//!
//! A [`Tree`] is built once from a table of 256 symbol frequencies (or
//! rebuilt from a serialized shape, see [`Tree::deserialize_shape`]) and is
//! read-only afterwards. Symbols are coded one at a time through the
//! [`BitSink`] / [`BitSource`] boundary.
//!
//! ```
//! use huffman_tree::{BitReader, Tree};
//! use bitvec::prelude::*;
//!
//! let mut freq = [0u64; 256];
//! for b in "abracadabra".bytes() {
//!     freq[b as usize] += 1;
//! }
//! let tree = Tree::build(&freq);
//!
//! let mut bits = BitVec::<u8, Msb0>::new();
//! tree.encode(b'r', &mut bits)?;
//! assert_eq!(tree.decode(&mut BitReader::new(&bits))?, b'r');
//! # Ok::<(), huffman_tree::Error>(())
//! ```

use bitvec::prelude::*;
use derivative::Derivative;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub mod bits;
pub mod error;
mod shape;

pub use bits::{BitReader, BitSink, BitSource, IoBitReader, IoBitWriter};
pub use error::{Error, Result};
pub use shape::PackedShape;

/// Number of distinct symbols a tree can hold.
pub const ALPHABET_SIZE: usize = 256;

/// Weight given to leaves rebuilt from a serialized shape.
pub const PLACEHOLDER_WEIGHT: u64 = 1;

static NEXT_TREE: AtomicU64 = AtomicU64::new(0);

/// Handle to a node of the [`Tree`] that created it (or a clone of that tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    tree: u64,
    index: usize,
}

impl NodeId {
    /// Position of the node in its tree's arena.
    pub fn index(self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf {
        symbol: u8,
    },
    /// `left` is reached with a 0 bit, `right` with a 1 bit.
    Internal {
        left: NodeId,
        right: NodeId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    weight: u64,
    parent: Option<NodeId>,
    kind: NodeKind,
}

impl Node {
    pub fn weight(&self) -> u64 {
        self.weight
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// The leaf's symbol; internal nodes have none.
    pub fn symbol(&self) -> Option<u8> {
        match self.kind {
            NodeKind::Leaf { symbol } => Some(symbol),
            NodeKind::Internal { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            NodeKind::Leaf { .. } => None,
            NodeKind::Internal { left, right } => Some((left, right)),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NodeKind::Leaf { symbol } => {
                write!(f, "leaf {:#04x} (weight {})", symbol, self.weight)
            }
            NodeKind::Internal { .. } => write!(f, "internal (weight {})", self.weight),
        }
    }
}

/// Priority of a subtree waiting to be merged: lighter first, then the
/// smaller tiebreak byte.
///
/// A leaf's tiebreak is its symbol. A merged subtree takes the tiebreak of
/// its first-extracted operand, which keeps every pending key distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MergeKey {
    pub weight: u64,
    pub tiebreak: u8,
}

impl MergeKey {
    pub fn new(weight: u64, tiebreak: u8) -> Self {
        Self { weight, tiebreak }
    }

    /// Key of the subtree formed by merging `self` (extracted first) with
    /// `other`.
    pub fn merge(self, other: MergeKey) -> Self {
        Self {
            weight: self.weight.saturating_add(other.weight),
            tiebreak: self.tiebreak,
        }
    }
}

#[derive(Debug, Clone, Copy, Derivative)]
#[derivative(PartialEq, Eq, PartialOrd, Ord)]
struct Pending {
    key: MergeKey,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(Ord = "ignore")]
    node: NodeId,
}

/// A Huffman tree stored as a node arena, plus a per-symbol leaf index.
#[derive(Debug, Clone)]
pub struct Tree {
    id: u64,
    nodes: Vec<Node>,
    root: Option<NodeId>,
    leaves: [Option<NodeId>; ALPHABET_SIZE],
}

impl Default for Tree {
    fn default() -> Self {
        Self {
            id: NEXT_TREE.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
            root: None,
            leaves: [None; ALPHABET_SIZE],
        }
    }
}

impl Tree {
    /// Builds the tree for `freq`, where `freq[s]` is the count of symbol `s`.
    ///
    /// Every symbol with a nonzero count gets a leaf. An all-zero table gives
    /// an empty tree, and a single nonzero entry gives a lone leaf whose code
    /// is the empty bit string.
    pub fn build(freq: &[u64; ALPHABET_SIZE]) -> Self {
        let mut tree = Tree::default();
        let mut pq = BinaryHeap::new();

        for (s, &count) in freq.iter().enumerate() {
            if count > 0 {
                let symbol = s as u8;
                let node = tree.push_leaf(symbol, count);
                pq.push(Reverse(Pending {
                    key: MergeKey::new(count, symbol),
                    node,
                }));
            }
        }

        while let Some(Reverse(a)) = pq.pop() {
            let b = match pq.pop() {
                Some(Reverse(b)) => b,
                None => {
                    tree.root = Some(a.node);
                    break;
                }
            };

            let node = tree.push_internal(a.node, b.node);
            let key = a.key.merge(b.key);
            log::trace!("merged {:?} and {:?} into {:?}", a.key, b.key, key);
            pq.push(Reverse(Pending { key, node }));
        }

        log::debug!(
            "built tree: {} leaves, {} nodes, depth {}",
            tree.symbol_count(),
            tree.len(),
            tree.depth()
        );
        tree
    }

    fn next_id(&self) -> NodeId {
        NodeId {
            tree: self.id,
            index: self.nodes.len(),
        }
    }

    /// True when `id` was handed out by this tree (or the tree it was cloned from).
    pub fn owns(&self, id: NodeId) -> bool {
        id.tree == self.id && id.index < self.nodes.len()
    }

    fn push_leaf(&mut self, symbol: u8, weight: u64) -> NodeId {
        let id = self.next_id();
        self.nodes.push(Node {
            weight,
            parent: None,
            kind: NodeKind::Leaf { symbol },
        });
        self.leaves[symbol as usize] = Some(id);
        id
    }

    fn push_internal(&mut self, left: NodeId, right: NodeId) -> NodeId {
        let id = self.next_id();
        let weight = self.nodes[left.index]
            .weight
            .saturating_add(self.nodes[right.index].weight);
        self.nodes[left.index].parent = Some(id);
        self.nodes[right.index].parent = Some(id);
        self.nodes.push(Node {
            weight,
            parent: None,
            kind: NodeKind::Internal { left, right },
        });
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The node behind `id`, or `None` for an id from another tree.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        if self.owns(id) {
            self.nodes.get(id.index)
        } else {
            None
        }
    }

    /// The leaf holding `symbol`, if the symbol occurs in this tree.
    pub fn leaf(&self, symbol: u8) -> Option<NodeId> {
        self.leaves[symbol as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes, leaves and internal nodes together.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct symbols in the leaf index.
    ///
    /// A shape with a repeated symbol has more leaf nodes than symbols; only
    /// the last leaf of each symbol is indexed.
    pub fn symbol_count(&self) -> usize {
        self.leaves.iter().filter(|l| l.is_some()).count()
    }

    /// Length of the longest code. A lone leaf has depth 0.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 0)).into_iter().collect();

        while let Some((id, depth)) = stack.pop() {
            match self.nodes[id.index].kind {
                NodeKind::Leaf { .. } => deepest = deepest.max(depth),
                NodeKind::Internal { left, right } => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
            }
        }

        deepest
    }

    /// The root-to-leaf path of `symbol`, 0 for left and 1 for right.
    pub fn code_for(&self, symbol: u8) -> Result<BitVec<u8, Msb0>> {
        if self.is_empty() {
            return Err(Error::EmptyTree);
        }
        let leaf = self.leaf(symbol).ok_or(Error::UnknownSymbol(symbol))?;

        // walked leaf to root, so reversed at the end
        let mut path = BitVec::new();
        let mut current = leaf;
        while let Some(parent) = self.nodes[current.index].parent {
            let is_right = matches!(
                self.nodes[parent.index].kind,
                NodeKind::Internal { right, .. } if right == current
            );
            path.push(is_right);
            current = parent;
        }
        path.reverse();

        Ok(path)
    }

    /// Writes the code of `symbol` to `sink`.
    pub fn encode<S>(&self, symbol: u8, sink: &mut S) -> Result<()>
    where
        S: BitSink + ?Sized,
    {
        let code = self.code_for(symbol)?;
        for bit in code.iter().by_vals() {
            sink.write_bit(bit)?;
        }
        Ok(())
    }

    /// Reads one code from `source` and returns its symbol.
    ///
    /// Stops as soon as a leaf is reached, so a lone-leaf tree reads nothing.
    pub fn decode<S>(&self, source: &mut S) -> Result<u8>
    where
        S: BitSource + ?Sized,
    {
        let mut current = self.root.ok_or(Error::EmptyTree)?;
        loop {
            match self.nodes[current.index].kind {
                NodeKind::Leaf { symbol } => return Ok(symbol),
                NodeKind::Internal { left, right } => {
                    current = if source.read_bit()? { right } else { left };
                }
            }
        }
    }

    /// True when both trees have the same topology and the same symbol at
    /// every corresponding leaf. Weights are not compared.
    pub fn same_shape(&self, other: &Tree) -> bool {
        let mut stack = vec![(self.root, other.root)];

        while let Some(pair) = stack.pop() {
            match pair {
                (None, None) => {}
                (Some(a), Some(b)) => {
                    let (x, y) = (&self.nodes[a.index], &other.nodes[b.index]);
                    match (x.children(), y.children()) {
                        (Some((xl, xr)), Some((yl, yr))) => {
                            stack.push((Some(xl), Some(yl)));
                            stack.push((Some(xr), Some(yr)));
                        }
                        (None, None) => {
                            if x.symbol() != y.symbol() {
                                return false;
                            }
                        }
                        _ => return false,
                    }
                }
                _ => return false,
            }
        }

        true
    }
}
