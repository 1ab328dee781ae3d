//! Internal consistency failures.
//!
//! These indicate that an earlier analysis phase did not run (or was
//! invalidated without re-running), not a defect in user code. They abort
//! the current file's analysis pass and must never be silently swallowed.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalError {
    /// An upward walk exhausted all ancestors without finding an attached
    /// scope. The scope-assignment phase must run before evaluation.
    ScopeNotFound { node: u32 },
    /// A node has no module-root ancestor, so file-level metadata cannot
    /// be resolved.
    ModuleRootNotFound { node: u32 },
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScopeNotFound { node } => {
                write!(f, "no enclosing scope found for node {node}")
            }
            Self::ModuleRootNotFound { node } => {
                write!(f, "no module root found for node {node}")
            }
        }
    }
}

impl std::error::Error for InternalError {}
