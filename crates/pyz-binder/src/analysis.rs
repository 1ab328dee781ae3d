//! The node side-table.
//!
//! Analysis phases attach mutable results to otherwise-immutable syntax
//! nodes through this out-of-band table keyed by node identity. When a file
//! is invalidated for re-analysis, the table entries are cleared without
//! discarding the tree, which is what makes incremental reanalysis possible
//! without a reparse.
//!
//! A field that was never set reads back as `None`. Callers must treat
//! absence as "not yet analyzed", never as "known empty".

use std::sync::Arc;

use pyz_common::InternalError;
use pyz_common::limits::MAX_TREE_WALK_ITERATIONS;
use pyz_parser::{NodeArena, NodeIndex, syntax_kind};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::flow::FlowNodeId;
use crate::scopes::ScopeId;
use crate::symbols::DeclId;

/// File-level metadata attached to a module root node and inherited by
/// every node beneath it through ancestry.
#[derive(Clone, Debug)]
pub struct FileInfo {
    pub file_name: String,
    pub is_stub: bool,
}

/// Contents of a module's `__all__` assignment, when one was recognized.
#[derive(Clone, Debug, Default)]
pub struct DunderAllInfo {
    pub names: Vec<String>,
    /// True when `__all__` was manipulated in a way the binder could not
    /// model (e.g. `__all__ += computed()`).
    pub uses_unsupported_operation: bool,
}

/// Per-node analysis record. All fields start absent and are filled lazily
/// by the phases that compute them.
#[derive(Clone, Debug, Default)]
pub struct AnalysisInfo {
    pub scope: Option<ScopeId>,
    pub declaration: Option<DeclId>,
    pub flow_node: Option<FlowNodeId>,
    pub after_flow_node: Option<FlowNodeId>,
    pub file_info: Option<Arc<FileInfo>>,
    pub code_flow_expressions: Option<FxHashSet<String>>,
    pub code_flow_complexity: Option<u32>,
    pub dunder_all_info: Option<DunderAllInfo>,
}

/// Side-table keyed by node identity. O(1) amortized access per field.
pub struct AnalysisTable {
    records: FxHashMap<u32, AnalysisInfo>,
}

impl AnalysisTable {
    pub fn new() -> AnalysisTable {
        AnalysisTable {
            records: FxHashMap::default(),
        }
    }

    pub fn record(&self, node: NodeIndex) -> Option<&AnalysisInfo> {
        self.records.get(&node.0)
    }

    /// Apply a multi-field update in one call. Re-entrant readers observe
    /// either none or all of the fields written by `f`, never a partial
    /// update.
    pub fn update(&mut self, node: NodeIndex, f: impl FnOnce(&mut AnalysisInfo)) {
        f(self.records.entry(node.0).or_default());
    }

    /// Remove every analysis field for exactly this node. Not recursive;
    /// a tree-wide clean is the caller's walk.
    pub fn clean(&mut self, node: NodeIndex) {
        trace!(node = node.0, "cleaning analysis record");
        self.records.remove(&node.0);
    }

    // ========================================================================
    // Per-field accessors
    // ========================================================================

    pub fn scope(&self, node: NodeIndex) -> Option<ScopeId> {
        self.record(node)?.scope
    }

    pub fn set_scope(&mut self, node: NodeIndex, scope: ScopeId) {
        self.update(node, |info| info.scope = Some(scope));
    }

    pub fn declaration(&self, node: NodeIndex) -> Option<DeclId> {
        self.record(node)?.declaration
    }

    pub fn set_declaration(&mut self, node: NodeIndex, decl: DeclId) {
        self.update(node, |info| info.declaration = Some(decl));
    }

    pub fn flow_node(&self, node: NodeIndex) -> Option<FlowNodeId> {
        self.record(node)?.flow_node
    }

    pub fn set_flow_node(&mut self, node: NodeIndex, flow: FlowNodeId) {
        self.update(node, |info| info.flow_node = Some(flow));
    }

    pub fn after_flow_node(&self, node: NodeIndex) -> Option<FlowNodeId> {
        self.record(node)?.after_flow_node
    }

    pub fn set_after_flow_node(&mut self, node: NodeIndex, flow: FlowNodeId) {
        self.update(node, |info| info.after_flow_node = Some(flow));
    }

    pub fn set_file_info(&mut self, node: NodeIndex, file_info: Arc<FileInfo>) {
        self.update(node, |info| info.file_info = Some(file_info));
    }

    pub fn code_flow_complexity(&self, node: NodeIndex) -> Option<u32> {
        self.record(node)?.code_flow_complexity
    }

    pub fn set_code_flow_complexity(&mut self, node: NodeIndex, complexity: u32) {
        self.update(node, |info| info.code_flow_complexity = Some(complexity));
    }

    pub fn code_flow_expressions(&self, node: NodeIndex) -> Option<&FxHashSet<String>> {
        self.record(node)?.code_flow_expressions.as_ref()
    }

    pub fn set_code_flow_expressions(&mut self, node: NodeIndex, exprs: FxHashSet<String>) {
        self.update(node, |info| info.code_flow_expressions = Some(exprs));
    }

    pub fn dunder_all_info(&self, node: NodeIndex) -> Option<&DunderAllInfo> {
        self.record(node)?.dunder_all_info.as_ref()
    }

    pub fn set_dunder_all_info(&mut self, node: NodeIndex, info: DunderAllInfo) {
        self.update(node, |rec| rec.dunder_all_info = Some(info));
    }

    /// File metadata for any node, inherited from the nearest module-root
    /// ancestor. Metadata is stored once per module rather than per node.
    pub fn file_info(
        &self,
        arena: &NodeArena,
        node: NodeIndex,
    ) -> Result<Arc<FileInfo>, InternalError> {
        let mut current = node;
        let mut iterations = 0u32;
        while !current.is_none() {
            iterations += 1;
            if iterations > MAX_TREE_WALK_ITERATIONS {
                break;
            }
            if let Some(n) = arena.get(current)
                && n.kind == syntax_kind::MODULE
            {
                return self
                    .record(current)
                    .and_then(|info| info.file_info.clone())
                    .ok_or(InternalError::ModuleRootNotFound { node: node.0 });
            }
            current = arena.parent(current);
        }
        Err(InternalError::ModuleRootNotFound { node: node.0 })
    }
}
