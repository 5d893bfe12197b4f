//! Front-end parse tree model.
//!
//! The analyses in this crate never parse source text themselves; the
//! embedding front-end assembles nodes into a [`NodeArena`] and binds
//! identifiers to symbols through [`crate::program::ProgramBuilder`]. The
//! types here are the shared vocabulary for that handoff: stable handles,
//! source positions, and the sealed [`NodeKind`] union.

pub mod arena;
pub mod node;

pub use arena::{NodeArena, NodeId, SourceFileId, Span};
pub use node::{BinaryOp, Node, NodeKind, UnaryOp};
