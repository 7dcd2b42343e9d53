//! Error types for tree construction and the bit-level codecs.

use thiserror::Error;

/// Everything that can go wrong while coding through a [`Tree`](crate::Tree).
#[derive(Debug, Error)]
pub enum Error {
    /// The tree was built from an all-zero frequency table and has no root.
    #[error("tree has no root")]
    EmptyTree,

    /// The symbol has no leaf in this tree.
    #[error("symbol {0:#04x} is not in the tree")]
    UnknownSymbol(u8),

    /// A `NodeId` handed out by a different tree.
    #[error("node id {0} does not belong to this tree")]
    NotANode(usize),

    /// The bit source ran dry.
    #[error("bit source exhausted at bit {position}")]
    Exhausted { position: usize },

    /// An I/O error from an underlying reader or writer.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for tree operations.
pub type Result<T> = std::result::Result<T, Error>;
