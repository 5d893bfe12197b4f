//! Node storage with stable integer handles.
//!
//! Nodes are stored in a flat arena and referred to by [`NodeId`] everywhere
//! else in the crate. Handles stay valid for the lifetime of the owning
//! [`crate::program::Program`], so analyses can keep them across passes
//! without borrowing the arena itself.

use std::fmt;

use super::node::Node;

/// Defines a `u32`-backed identifier newtype.
///
/// Dedicated newtypes instead of raw integers keep the different handle
/// spaces (nodes, source files, symbols) from being mixed up by accident.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default)]
        pub struct $name(u32);

        impl $name {
            /// Construct an identifier from a raw value.
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Retrieve the underlying integer value.
            pub const fn to_raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

pub(crate) use define_id;

define_id!(NodeId);
define_id!(SourceFileId);

/// Source position of a node: owning file plus 1-indexed line and 0-indexed
/// column, matching the positions reported in evaluation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub file: SourceFileId,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub const fn new(file: SourceFileId, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }
}

/// Flat arena holding every node of a program.
///
/// Allocation only happens while the front-end assembles the program; after
/// that the arena is read-only.
#[derive(Debug, Default)]
pub struct NodeArena {
    entries: Vec<Node>,
}

impl NodeArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node and return its stable handle.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_raw(self.entries.len() as u32);
        self.entries.push(node);
        id
    }

    /// Look up a node by handle.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.entries.get(id.to_raw() as usize)
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the arena contains no nodes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
