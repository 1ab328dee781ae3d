//! Ordering-method synthesis for `functools.total_ordering`.
//!
//! A known library decorator handled by fully-qualified name instead of
//! the generic call fallback: the class must define at least one rich
//! comparison method, and the three missing ones are synthesized from the
//! first one found.

use pyz_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use pyz_parser::NodeIndex;
use pyz_solver::{ClassMember, FunctionParam, FunctionType, FunctionTypeFlags, TypeId};
use tracing::debug;

use crate::state::CheckerState;

const ORDERING_METHODS: &[&str] = &["__lt__", "__le__", "__gt__", "__ge__"];

impl CheckerState<'_> {
    /// Synthesize the missing comparison methods on a decorated class.
    /// `class_type` must be an instantiable, non-subclassable class
    /// object; anything else is returned unchanged. A class with none of
    /// the four methods gets a diagnostic and no synthesized members.
    pub fn synthesize_ordering_methods(
        &mut self,
        class_type: TypeId,
        error_node: NodeIndex,
    ) -> TypeId {
        let Some(class) = self.ctx.types.instantiable_class_of(class_type) else {
            return class_type;
        };
        let instance = self.ctx.types.instance_type(class);

        // First member found determines the model signature.
        let model = ORDERING_METHODS
            .iter()
            .find_map(|&name| self.ctx.types.lookup_member(class, name).map(|(_, m)| m.ty));
        let Some(model) = model else {
            self.error_at_node(
                error_node,
                diagnostic_codes::TOTAL_ORDERING_MISSING_METHOD,
                diagnostic_messages::TOTAL_ORDERING_MISSING_METHOD,
            );
            return class_type;
        };

        // Operand type from the model's second parameter when annotated,
        // else the universal base.
        let operand = self
            .ctx
            .types
            .function_id_of(model)
            .and_then(|f| self.ctx.types.function(f).params.get(1).and_then(|p| p.ty))
            .unwrap_or(TypeId::OBJECT);

        let full_name_base = self.ctx.types.class(class).full_name.clone();
        for &name in ORDERING_METHODS {
            if self.ctx.types.lookup_member(class, name).is_some() {
                continue;
            }
            debug!(class = %full_name_base, method = name, "synthesizing ordering method");
            let mut method = FunctionType::new(name, &format!("{full_name_base}.{name}"));
            method.params = vec![
                FunctionParam::simple("self", Some(instance)),
                FunctionParam::simple("other", Some(operand)),
            ];
            method.declared_return_type = Some(TypeId::BOOL);
            method.flags = FunctionTypeFlags::SYNTHESIZED_METHOD;
            let id = self.ctx.types.add_function(method);
            let ty = self.ctx.types.function_type(id);
            self.ctx
                .types
                .class_mut(class)
                .members
                .insert(name.to_string(), ClassMember::new(ty));
        }
        class_type
    }
}
