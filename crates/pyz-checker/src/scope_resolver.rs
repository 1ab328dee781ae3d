//! Maps syntax nodes to their enclosing lexical scopes.
//!
//! The walk tracks the previous and previous-previous node to tell apart
//! the pieces of a definition that evaluate inside it from the pieces that
//! evaluate outside it: a parameter's name binds in the function scope but
//! its default value evaluates in the enclosing scope, a class body is
//! inside the class but its decorators are not, and a comprehension's
//! first iterable runs before the comprehension's own scope exists.

use pyz_binder::{ScopeId, ScopeKind};
use pyz_common::InternalError;
use pyz_common::limits::MAX_TREE_WALK_ITERATIONS;
use pyz_parser::{NodeIndex, syntax_kind};

use crate::state::CheckerState;

/// A resolved evaluation scope. `uses_proxy_scope` is set when the result
/// is a type-parameter-list scope reached from inside the list itself;
/// such scopes are transparent to lookups of outer names.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvaluationScope {
    pub scope: ScopeId,
    pub uses_proxy_scope: bool,
}

impl CheckerState<'_> {
    /// The scope in which `node` is evaluated.
    ///
    /// A missing scope after exhausting all ancestors is a fatal
    /// internal-consistency error: the binding phase that assigns scopes
    /// must have run before the checker.
    pub fn evaluation_scope(&self, node: NodeIndex) -> Result<EvaluationScope, InternalError> {
        let mut prev = NodeIndex::NONE;
        let mut prev_prev = NodeIndex::NONE;
        let mut current = node;
        let mut iterations = 0u32;

        while !current.is_none() {
            iterations += 1;
            if iterations > MAX_TREE_WALK_ITERATIONS {
                break;
            }
            let Some(n) = self.ctx.arena.get(current) else {
                break;
            };
            match n.kind {
                syntax_kind::TYPE_PARAMETER_LIST => {
                    return self.scope_attached_to(current, node, true);
                }
                syntax_kind::MODULE => {
                    return self.scope_attached_to(current, node, false);
                }
                syntax_kind::FUNCTION_DEF => {
                    if let Some(data) = self.ctx.arena.get_function(n)
                        && self.is_inside_signature(&data.parameters.nodes, data.suite, prev, prev_prev)
                    {
                        // A declared type-parameter list takes priority
                        // over the plain function scope.
                        let target = if data.type_parameters.is_none() {
                            current
                        } else {
                            data.type_parameters
                        };
                        return self.scope_attached_to(target, node, false);
                    }
                }
                syntax_kind::LAMBDA => {
                    if let Some(data) = self.ctx.arena.get_lambda(n)
                        && self.is_inside_signature(
                            &data.parameters.nodes,
                            data.expression,
                            prev,
                            prev_prev,
                        )
                    {
                        return self.scope_attached_to(current, node, false);
                    }
                }
                syntax_kind::CLASS_DEF => {
                    if let Some(data) = self.ctx.arena.get_class(n) {
                        if !prev.is_none() && prev == data.suite {
                            return self.scope_attached_to(current, node, false);
                        }
                        // Base-class and keyword arguments see PEP 695
                        // type parameters when the class declares them.
                        if !data.type_parameters.is_none()
                            && data.arguments.nodes.contains(&prev)
                        {
                            return self.scope_attached_to(data.type_parameters, node, false);
                        }
                    }
                }
                syntax_kind::COMPREHENSION => {
                    if let Some(data) = self.ctx.arena.get_comprehension(n)
                        && !self.is_first_comprehension_iterable(data, prev, prev_prev)
                    {
                        return self.scope_attached_to(current, node, false);
                    }
                }
                _ => {}
            }
            prev_prev = prev;
            prev = current;
            current = self.ctx.arena.parent(current);
        }

        Err(InternalError::ScopeNotFound { node: node.0 })
    }

    /// The scope in which `node` actually executes. Class bodies and
    /// comprehensions evaluate names in their own scope but execute in
    /// their container, so those scopes are skipped; a type-parameter
    /// scope resolves to its owning definition's scope first.
    pub fn execution_scope(&self, node: NodeIndex) -> Result<ScopeId, InternalError> {
        let mut resolved = self.evaluation_scope(node)?;
        let mut iterations = 0u32;
        loop {
            iterations += 1;
            if iterations > MAX_TREE_WALK_ITERATIONS {
                return Err(InternalError::ScopeNotFound { node: node.0 });
            }
            let scope = self
                .ctx
                .binder
                .scopes
                .get(resolved.scope)
                .ok_or(InternalError::ScopeNotFound { node: node.0 })?;
            if scope.kind.is_execution_scope() {
                return Ok(resolved.scope);
            }
            if scope.kind == ScopeKind::TypeParameter {
                // The list's scope stands in for its owning function
                // or class definition.
                let owner = self.ctx.arena.parent(scope.node);
                let owner_scope = self
                    .ctx
                    .analysis
                    .scope(owner)
                    .ok_or(InternalError::ScopeNotFound { node: node.0 })?;
                resolved = EvaluationScope {
                    scope: owner_scope,
                    uses_proxy_scope: false,
                };
            } else {
                let container = self.ctx.arena.parent(scope.node);
                resolved = self.evaluation_scope(container)?;
            }
        }
    }

    fn scope_attached_to(
        &self,
        target: NodeIndex,
        query: NodeIndex,
        uses_proxy_scope: bool,
    ) -> Result<EvaluationScope, InternalError> {
        match self.ctx.analysis.scope(target) {
            Some(scope) => Ok(EvaluationScope {
                scope,
                uses_proxy_scope,
            }),
            None => Err(InternalError::ScopeNotFound { node: query.0 }),
        }
    }

    /// Whether the walk arrived from a part of a function or lambda that
    /// evaluates inside its scope: the body, or a parameter's name node.
    /// Decorators, annotations, and default values evaluate outside.
    fn is_inside_signature(
        &self,
        parameters: &[NodeIndex],
        body: NodeIndex,
        prev: NodeIndex,
        prev_prev: NodeIndex,
    ) -> bool {
        if prev.is_none() {
            return false;
        }
        if prev == body {
            return true;
        }
        if parameters.contains(&prev)
            && let Some(param) = self
                .ctx
                .arena
                .get(prev)
                .and_then(|n| self.ctx.arena.get_parameter(n))
        {
            return !prev_prev.is_none() && prev_prev == param.name;
        }
        false
    }

    /// Whether the walk arrived from the first `for` clause's iterable,
    /// which evaluates in the enclosing scope.
    fn is_first_comprehension_iterable(
        &self,
        data: &pyz_parser::node::ComprehensionData,
        prev: NodeIndex,
        prev_prev: NodeIndex,
    ) -> bool {
        let Some(&first) = data.for_if_nodes.nodes.first() else {
            return false;
        };
        if prev != first {
            return false;
        }
        self.ctx
            .arena
            .get(first)
            .and_then(|n| self.ctx.arena.get_comprehension_for(n))
            .is_some_and(|clause| !prev_prev.is_none() && prev_prev == clause.iterable)
    }
}
