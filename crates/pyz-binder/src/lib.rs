//! Binding-phase data structures consumed by the checker.
//!
//! The binder proper (scope assignment, symbol declaration, control-flow
//! graph construction) runs as an earlier phase; this crate defines the
//! data it produces — scopes, symbols, declarations, flow nodes — plus the
//! node side-table that attaches those results to syntax nodes without
//! mutating the tree.

pub mod analysis;
pub mod flow;
pub mod scopes;
pub mod symbols;

pub use analysis::{AnalysisInfo, AnalysisTable, DunderAllInfo, FileInfo};
pub use flow::{FlowNode, FlowNodeArena, FlowNodeId, flow_flags};
pub use scopes::{Scope, ScopeArena, ScopeId, ScopeKind};
pub use symbols::{
    DeclId, Declaration, DeclarationArena, DeclarationKind, Symbol, SymbolArena, SymbolId,
    symbol_flags,
};
