//! Checker state: borrowed analysis inputs, the type store, the evaluator
//! boundary, and the diagnostics sink.

use pyz_binder::{AnalysisTable, DeclarationArena, FlowNodeArena, ScopeArena, SymbolArena};
use pyz_common::diagnostics::Diagnostic;
use pyz_parser::{NodeArena, NodeIndex};
use pyz_solver::{TypeId, TypeStore};
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::evaluator::{EvalFlags, TypeEvalProvider};

/// Results of the binding phase for one module, bundled for the checker.
pub struct BindResults {
    pub scopes: ScopeArena,
    pub symbols: SymbolArena,
    pub declarations: DeclarationArena,
    pub flow_nodes: FlowNodeArena,
}

impl BindResults {
    pub fn new() -> BindResults {
        BindResults {
            scopes: ScopeArena::new(),
            symbols: SymbolArena::new(),
            declarations: DeclarationArena::new(),
            flow_nodes: FlowNodeArena::new(),
        }
    }
}

impl Default for BindResults {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub struct CheckerOptions {
    /// Report when a property's getter and setter use assignable but not
    /// identical types.
    pub report_property_type_mismatch: bool,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        CheckerOptions {
            report_property_type_mismatch: true,
        }
    }
}

/// Everything the checker borrows for the duration of one module's check.
pub struct CheckerContext<'a> {
    pub arena: &'a NodeArena,
    pub binder: &'a BindResults,
    pub analysis: &'a AnalysisTable,
    pub types: &'a mut TypeStore,
    pub evaluator: &'a mut dyn TypeEvalProvider,
    pub options: CheckerOptions,
    pub file_name: String,
    pub diagnostics: Vec<Diagnostic>,
    /// Evaluated type per node, keyed by node identity. This is the
    /// checker's produced surface: re-requesting a node's type must yield
    /// the same `TypeId`.
    type_cache: FxHashMap<u32, TypeId>,
}

pub struct CheckerState<'a> {
    pub ctx: CheckerContext<'a>,
}

impl<'a> CheckerState<'a> {
    pub fn new(
        arena: &'a NodeArena,
        binder: &'a BindResults,
        analysis: &'a AnalysisTable,
        types: &'a mut TypeStore,
        evaluator: &'a mut dyn TypeEvalProvider,
        options: CheckerOptions,
        file_name: &str,
    ) -> CheckerState<'a> {
        CheckerState {
            ctx: CheckerContext {
                arena,
                binder,
                analysis,
                types,
                evaluator,
                options,
                file_name: file_name.to_string(),
                diagnostics: Vec::new(),
                type_cache: FxHashMap::default(),
            },
        }
    }

    // ========================================================================
    // Node type cache
    // ========================================================================

    pub fn cache_type_of_node(&mut self, node: NodeIndex, ty: TypeId) {
        self.ctx.type_cache.insert(node.0, ty);
    }

    pub fn cached_type_of_node(&self, node: NodeIndex) -> Option<TypeId> {
        self.ctx.type_cache.get(&node.0).copied()
    }

    // ========================================================================
    // Evaluator plumbing
    // ========================================================================

    pub fn evaluate_expression_type(&mut self, node: NodeIndex, flags: EvalFlags) -> TypeId {
        let ty = self
            .ctx
            .evaluator
            .evaluate_expression_type(self.ctx.types, node, flags);
        self.cache_type_of_node(node, ty);
        ty
    }

    /// Whether the file containing `node` is a stub. Falls back to `false`
    /// when the file metadata is missing (detached test trees).
    pub fn is_stub_file(&self, node: NodeIndex) -> bool {
        match self.ctx.analysis.file_info(self.ctx.arena, node) {
            Ok(info) => info.is_stub,
            Err(err) => {
                warn!(node = node.0, %err, "no file info for node; assuming non-stub");
                false
            }
        }
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    pub fn error_at_node(&mut self, node: NodeIndex, code: u32, message: &str) {
        let (start, length) = self.node_span(node);
        self.ctx.diagnostics.push(Diagnostic::error(
            &self.ctx.file_name,
            start,
            length,
            message,
            code,
        ));
    }

    pub fn warning_at_node(&mut self, node: NodeIndex, code: u32, message: &str) {
        let (start, length) = self.node_span(node);
        self.ctx.diagnostics.push(Diagnostic::warning(
            &self.ctx.file_name,
            start,
            length,
            message,
            code,
        ));
    }

    /// Report an error with addendum lines attached as related information
    /// at the same location.
    pub fn error_at_node_with_addenda(
        &mut self,
        node: NodeIndex,
        code: u32,
        message: &str,
        addenda: &[String],
    ) {
        let (start, length) = self.node_span(node);
        let mut diag = Diagnostic::error(&self.ctx.file_name, start, length, message, code);
        for line in addenda {
            diag = diag.with_related(&self.ctx.file_name, start, length, line);
        }
        self.ctx.diagnostics.push(diag);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.ctx.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.ctx.diagnostics)
    }

    fn node_span(&self, node: NodeIndex) -> (u32, u32) {
        match self.ctx.arena.get(node) {
            Some(n) => (n.pos, n.end.saturating_sub(n.pos)),
            None => (0, 0),
        }
    }
}
