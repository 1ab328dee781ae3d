//! Python syntax tree for the pyz type checker.
//!
//! The tree is immutable once built: nodes live in a [`NodeArena`] and are
//! addressed by [`NodeIndex`]. Kind-specific payloads live in parallel data
//! pools; parent pointers live in a parallel `ExtendedNodeInfo` pool so the
//! core `Node` stays four words. Analysis phases never mutate nodes — all
//! mutable analysis state is attached out-of-band (see `pyz-binder`).

pub mod node;
pub mod node_arena;
pub mod syntax_kind;

pub use node::{Node, NodeIndex, NodeList};
pub use node_arena::NodeArena;
