//! Overload accumulation.
//!
//! A run of sibling declarations sharing one name, all but (at most) one
//! marked `@overload`, merges into a single overload set. Earlier
//! declarations are force-evaluated in forward order rather than through
//! bottom-up recursion, so a file with hundreds of overloads costs linear
//! stack depth.

use pyz_common::InternalError;
use pyz_common::diagnostics::{diagnostic_codes, diagnostic_messages, format_message};
use pyz_common::limits::MAX_OVERLOAD_COUNT;
use pyz_parser::NodeIndex;
use pyz_solver::{FunctionId, TypeData, TypeId};
use tracing::{debug, warn};

use crate::state::CheckerState;

impl CheckerState<'_> {
    /// Fold `new_fn_type` into the overload chain formed by earlier
    /// declarations of the same name in the enclosing scope. Returns the
    /// input unchanged when there is no chain to fold into.
    pub fn add_overloads_to_function_type(
        &mut self,
        node: NodeIndex,
        new_fn_type: TypeId,
    ) -> Result<TypeId, InternalError> {
        let Some(new_fn) = self.ctx.types.function_id_of(new_fn_type) else {
            return Ok(new_fn_type);
        };
        let Some(name) = self.function_name(node) else {
            return Ok(new_fn_type);
        };

        let scope = self.evaluation_scope(node)?.scope;
        let Some(symbol) = self.ctx.binder.scopes.lookup_symbol_recursive(scope, &name) else {
            return Ok(new_fn_type);
        };
        let decls: Vec<_> = self
            .ctx
            .binder
            .symbols
            .declarations_for_symbol(symbol)
            .to_vec();

        let current_decl = self.ctx.analysis.declaration(node);
        let Some(index) = decls.iter().position(|&d| {
            current_decl == Some(d)
                || self
                    .ctx
                    .binder
                    .declarations
                    .get(d)
                    .is_some_and(|decl| decl.node == node)
        }) else {
            return Ok(new_fn_type);
        };
        if index == 0 {
            return Ok(new_fn_type);
        }
        if decls.len() > MAX_OVERLOAD_COUNT {
            warn!(name = %name, count = decls.len(), "overload chain exceeds limit; not folding");
            return Ok(new_fn_type);
        }

        // Forward order keeps stack depth linear regardless of chain
        // length.
        for &decl in &decls[..index] {
            self.ctx
                .evaluator
                .evaluate_declaration_type(self.ctx.types, decl);
        }

        let previous = self
            .ctx
            .evaluator
            .evaluate_declaration_type(self.ctx.types, decls[index - 1]);
        let mut entries: Vec<FunctionId> = match previous.map(|ty| self.ctx.types.data(ty)) {
            Some(TypeData::Function(f)) if self.ctx.types.function(*f).is_overloaded() => {
                vec![*f]
            }
            Some(TypeData::Overloaded(existing)) => existing.clone(),
            _ => Vec::new(),
        };
        entries.push(new_fn);

        // A lone entry means the previous "overload" was a false positive
        // (e.g. a redefinition); return the function unwrapped.
        if entries.len() == 1 {
            return Ok(new_fn_type);
        }

        self.propagate_implementation_metadata(&entries);
        self.check_abstract_consistency(&entries, &name, node);

        debug!(name = %name, count = entries.len(), "accumulated overload set");
        Ok(self.ctx.types.overloaded_type(entries))
    }

    /// Copy the implementation's docstring and deprecation message onto
    /// overloaded entries that lack their own.
    fn propagate_implementation_metadata(&mut self, entries: &[FunctionId]) {
        let Some(&implementation) = entries
            .iter()
            .find(|&&e| !self.ctx.types.function(e).is_overloaded())
        else {
            return;
        };
        let docstring = self.ctx.types.function(implementation).docstring.clone();
        let deprecation = self
            .ctx
            .types
            .function(implementation)
            .deprecation_message
            .clone();
        for &entry in entries {
            if entry == implementation {
                continue;
            }
            let record = self.ctx.types.function_mut(entry);
            if record.docstring.is_none() {
                record.docstring = docstring.clone();
            }
            if record.deprecation_message.is_none() {
                record.deprecation_message = deprecation.clone();
            }
        }
    }

    /// Inconsistent abstractness between the newest entry and its
    /// predecessor is a style defect: report and continue.
    fn check_abstract_consistency(
        &mut self,
        entries: &[FunctionId],
        name: &str,
        node: NodeIndex,
    ) {
        let [.., previous, newest] = entries else {
            return;
        };
        if self.ctx.types.function(*previous).is_abstract()
            != self.ctx.types.function(*newest).is_abstract()
        {
            let message = format_message(
                diagnostic_messages::OVERLOAD_ABSTRACT_MISMATCH,
                &[name],
            );
            self.error_at_node(
                node,
                diagnostic_codes::OVERLOAD_ABSTRACT_MISMATCH,
                &message,
            );
        }
    }

    fn function_name(&self, node: NodeIndex) -> Option<String> {
        let data = self
            .ctx
            .arena
            .get(node)
            .and_then(|n| self.ctx.arena.get_function(n))?;
        self.ctx.arena.name_text(data.name).map(str::to_string)
    }
}
