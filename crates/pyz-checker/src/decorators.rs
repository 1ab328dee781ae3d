//! Decorator classification.
//!
//! Decorators are recognized by the fully-qualified name of their
//! evaluated type, never by spelling at the use site, so aliased imports
//! classify the same as direct ones. Recognized no-wrap markers mutate
//! flag bits on the input records in place; structural transforms
//! (property creation, accessor re-decoration, ordering synthesis) build
//! new records. Everything else falls through to a generic call-based
//! application with two identity heuristics for unannotated passthrough
//! wrappers.

use pyz_common::InternalError;
use pyz_common::diagnostics::{diagnostic_codes, diagnostic_messages, format_message};
use pyz_common::limits::MAX_TREE_WALK_ITERATIONS;
use pyz_parser::{NodeIndex, syntax_kind};
use pyz_solver::{
    ClassId, ClassTypeFlags, DataClassBehaviors, FunctionId, FunctionTypeFlags, ParamCategory,
    TypeData, TypeId,
};
use tracing::debug;

use crate::evaluator::EvalFlags;
use crate::state::CheckerState;

/// Decorator factories recognized as dataclass-style by the full name of
/// their call target.
const DATACLASS_DECORATORS: &[&str] = &[
    "dataclasses.dataclass",
    "attr.s",
    "attr.attrs",
    "attr.define",
    "attr.frozen",
    "attr.mutable",
];

const DEPRECATED_MARKERS: &[&str] = &[
    "warnings.deprecated",
    "typing.deprecated",
    "typing_extensions.deprecated",
];

/// No-wrap function markers: each sets a flag and returns its input.
const FUNCTION_MARKERS: &[(&str, FunctionTypeFlags)] = &[
    ("abc.abstractmethod", FunctionTypeFlags::ABSTRACT_METHOD),
    ("typing.type_check_only", FunctionTypeFlags::TYPE_CHECK_ONLY),
    ("typing.final", FunctionTypeFlags::FINAL),
    ("typing.override", FunctionTypeFlags::OVERRIDDEN),
    ("typing.no_type_check", FunctionTypeFlags::NO_TYPE_CHECK),
];

const CLASS_MARKERS: &[(&str, ClassTypeFlags)] = &[
    ("typing.final", ClassTypeFlags::FINAL),
    ("typing.runtime_checkable", ClassTypeFlags::RUNTIME_CHECKABLE),
    ("typing.type_check_only", ClassTypeFlags::TYPE_CHECK_ONLY),
];

impl CheckerState<'_> {
    /// Apply every decorator on a function definition, innermost first,
    /// then fold the result into any preceding overload chain. The final
    /// type is cached on the function node.
    pub fn apply_function_decorators(
        &mut self,
        function_node: NodeIndex,
        undecorated_type: TypeId,
    ) -> Result<TypeId, InternalError> {
        let decorators = self
            .ctx
            .arena
            .get(function_node)
            .and_then(|n| self.ctx.arena.get_function(n))
            .map(|data| data.decorators.nodes.clone())
            .unwrap_or_default();

        let mut result = undecorated_type;
        for &decorator in decorators.iter().rev() {
            result = self.apply_function_decorator(result, undecorated_type, decorator, function_node);
        }
        if self.ctx.types.function_id_of(result).is_some() {
            result = self.add_overloads_to_function_type(function_node, result)?;
        }
        self.cache_type_of_node(function_node, result);
        Ok(result)
    }

    /// Apply every decorator on a class definition, innermost first. The
    /// final type is cached on the class node.
    pub fn apply_class_decorators(
        &mut self,
        class_node: NodeIndex,
        undecorated_type: TypeId,
    ) -> TypeId {
        let decorators = self
            .ctx
            .arena
            .get(class_node)
            .and_then(|n| self.ctx.arena.get_class(n))
            .map(|data| data.decorators.nodes.clone())
            .unwrap_or_default();

        let mut result = undecorated_type;
        for &decorator in decorators.iter().rev() {
            result = self.apply_class_decorator(result, undecorated_type, decorator);
        }
        self.cache_type_of_node(class_node, result);
        result
    }

    /// Classify and apply one function decorator.
    pub fn apply_function_decorator(
        &mut self,
        input_type: TypeId,
        undecorated_type: TypeId,
        decorator_node: NodeIndex,
        function_node: NodeIndex,
    ) -> TypeId {
        let Some(expr) = self.decorator_expression(decorator_node) else {
            return input_type;
        };
        let flags = self.decorator_eval_flags(decorator_node, expr);
        let decorator_type = self.evaluate_expression_type(expr, flags);
        debug!(
            decorator = %self.ctx.types.display(decorator_type),
            "applying function decorator"
        );

        // @overload marks, never wraps.
        if self.matches_special_form(decorator_type, "typing.overload") {
            self.mark_function_flags(input_type, FunctionTypeFlags::OVERLOADED);
            self.mark_function_flags(undecorated_type, FunctionTypeFlags::OVERLOADED);
            return input_type;
        }

        // Decorator factories, recognized by their call target.
        if let Some((callee, arguments)) = self.call_parts(expr) {
            let callee_type = self.evaluate_expression_type(callee, flags | EvalFlags::CALLEE_ONLY);
            if self.matches_special_form(callee_type, "typing.dataclass_transform") {
                let behaviors = self.dataclass_behaviors_from_arguments(&arguments);
                if let Some(f) = self.ctx.types.function_id_of(undecorated_type) {
                    self.ctx.types.function_mut(f).dataclass_behaviors = Some(behaviors);
                }
                return input_type;
            }
            if self.matches_any_special_form(callee_type, DEPRECATED_MARKERS) {
                let message = self.first_string_argument(&arguments).unwrap_or_default();
                self.mark_function_deprecated(input_type, &message);
                self.mark_function_deprecated(undecorated_type, &message);
                return input_type;
            }
        }

        for &(name, flag) in FUNCTION_MARKERS {
            if self.matches_special_form(decorator_type, name) {
                self.mark_function_flags(input_type, flag);
                self.mark_function_flags(undecorated_type, flag);
                return input_type;
            }
        }

        // @x.setter / @x.deleter / @x.getter re-decoration.
        if let Some((left, member)) = self.member_access_parts(expr)
            && matches!(member.as_str(), "setter" | "deleter" | "getter")
        {
            let left_type = self.evaluate_expression_type(left, flags & !EvalFlags::CALLEE_ONLY);
            return self.apply_accessor_decorator(
                input_type,
                left_type,
                &member,
                decorator_node,
                function_node,
            );
        }

        // staticmethod/classmethod rewrite flag bits, skipping functions
        // that already carry the flag (redecoration after an intermediate
        // transform must not double-wrap).
        for (name, flag) in [
            ("builtins.staticmethod", FunctionTypeFlags::STATIC_METHOD),
            ("builtins.classmethod", FunctionTypeFlags::CLASS_METHOD),
        ] {
            if self.matches_special_form(decorator_type, name) {
                if let Some(f) = self.ctx.types.function_id_of(input_type) {
                    let record = self.ctx.types.function_mut(f);
                    if !record.flags.contains(flag) {
                        record.flags.remove(
                            FunctionTypeFlags::CONSTRUCTOR_METHOD
                                | FunctionTypeFlags::STATIC_METHOD
                                | FunctionTypeFlags::CLASS_METHOD,
                        );
                        record.flags.insert(flag);
                    }
                }
                return input_type;
            }
        }

        // property and property subclasses.
        if let Some(marker) = self.property_marker_class(decorator_type) {
            let declared_in = self.enclosing_class_id(function_node);
            if let Some(getter) = self.ctx.types.function_id_of(input_type) {
                return self.create_property(marker, getter, declared_in);
            }
            // A callable instance contributes its bound __call__ as the
            // getter.
            if let Some(getter) = self.bound_call_method(input_type) {
                return self.create_property(marker, getter, declared_in);
            }
        }

        self.apply_generic_decorator(decorator_type, undecorated_type, decorator_node)
    }

    /// Classify and apply one class decorator.
    pub fn apply_class_decorator(
        &mut self,
        input_type: TypeId,
        original_class_type: TypeId,
        decorator_node: NodeIndex,
    ) -> TypeId {
        let Some(expr) = self.decorator_expression(decorator_node) else {
            return input_type;
        };
        let flags = self.decorator_eval_flags(decorator_node, expr);
        let decorator_type = self.evaluate_expression_type(expr, flags);
        debug!(
            decorator = %self.ctx.types.display(decorator_type),
            "applying class decorator"
        );

        if let Some((callee, arguments)) = self.call_parts(expr) {
            let callee_type = self.evaluate_expression_type(callee, flags | EvalFlags::CALLEE_ONLY);
            if self.matches_special_form(callee_type, "typing.dataclass_transform") {
                let behaviors = self.dataclass_behaviors_from_arguments(&arguments);
                if let Some(class) = self.class_record_of(input_type, original_class_type) {
                    self.ctx.types.class_mut(class).dataclass_behaviors = Some(behaviors);
                }
                return input_type;
            }
            if self.matches_any_special_form(callee_type, DEPRECATED_MARKERS) {
                let message = self.first_string_argument(&arguments).unwrap_or_default();
                if let Some(class) = self.class_record_of(input_type, original_class_type) {
                    self.ctx.types.class_mut(class).deprecation_message = Some(message);
                }
                return input_type;
            }
            if self.matches_any_special_form(callee_type, DATACLASS_DECORATORS) {
                let behaviors = self.dataclass_behaviors_from_arguments(&arguments);
                if let Some(class) = self.class_record_of(input_type, original_class_type) {
                    self.ctx.types.class_mut(class).dataclass_behaviors = Some(behaviors);
                }
                return input_type;
            }
        }

        for &(name, flag) in CLASS_MARKERS {
            if self.matches_special_form(decorator_type, name) {
                if let Some(class) = self.class_record_of(input_type, original_class_type) {
                    self.ctx.types.class_mut(class).flags |= flag;
                }
                return input_type;
            }
        }

        // Bare dataclass-style decorator, including overload-shaped
        // library declarations.
        if self.matches_any_special_form(decorator_type, DATACLASS_DECORATORS) {
            if let Some(class) = self.class_record_of(input_type, original_class_type) {
                self.ctx.types.class_mut(class).dataclass_behaviors =
                    Some(DataClassBehaviors {
                        eq_default: true,
                        ..Default::default()
                    });
            }
            return input_type;
        }

        if self.matches_special_form(decorator_type, "functools.total_ordering") {
            return self.synthesize_ordering_methods(input_type, decorator_node);
        }

        self.apply_generic_decorator(decorator_type, original_class_type, decorator_node)
    }

    // ========================================================================
    // Generic application
    // ========================================================================

    /// Fall-through path: call the decorator with the undecorated value as
    /// its sole argument. Two identity heuristics keep unannotated
    /// passthrough wrappers from degrading the decorated type to unknown.
    fn apply_generic_decorator(
        &mut self,
        decorator_type: TypeId,
        undecorated_type: TypeId,
        decorator_node: NodeIndex,
    ) -> TypeId {
        if let Some(d) = self.ctx.types.function_id_of(decorator_type)
            && let Some(ret) = self.ctx.types.function(d).declared_return_type
            && self.is_passthrough_shape(ret)
        {
            return undecorated_type;
        }

        let result = self.ctx.evaluator.call_type(
            self.ctx.types,
            decorator_type,
            &[undecorated_type],
            decorator_node,
        );
        let Some(result) = result else {
            return TypeId::UNKNOWN;
        };
        if self.is_fully_unannotated(decorator_type) && self.ctx.types.is_partly_unknown(result) {
            return undecorated_type;
        }
        result
    }

    /// A return type declared as an unannotated callable taking only
    /// `*args`/`**kwargs` parameters: the shape of a wrapper that forwards
    /// everything.
    fn is_passthrough_shape(&self, ty: TypeId) -> bool {
        let Some(f) = self.ctx.types.function_id_of(ty) else {
            return false;
        };
        let record = self.ctx.types.function(f);
        record.declared_return_type.is_none()
            && !record.params.is_empty()
            && record.params.iter().all(|p| {
                p.ty.is_none()
                    && matches!(p.category, ParamCategory::ArgsList | ParamCategory::KwargsDict)
            })
    }

    fn is_fully_unannotated(&self, ty: TypeId) -> bool {
        let Some(f) = self.ctx.types.function_id_of(ty) else {
            return false;
        };
        let record = self.ctx.types.function(f);
        record.declared_return_type.is_none() && record.params.iter().all(|p| p.ty.is_none())
    }

    // ========================================================================
    // Accessor re-decoration
    // ========================================================================

    fn apply_accessor_decorator(
        &mut self,
        input_type: TypeId,
        property_type: TypeId,
        accessor: &str,
        decorator_node: NodeIndex,
        function_node: NodeIndex,
    ) -> TypeId {
        if self.property_class_of(property_type).is_none() {
            let message = format_message(
                diagnostic_messages::ACCESSOR_ON_NON_PROPERTY,
                &[accessor],
            );
            self.error_at_node(
                decorator_node,
                diagnostic_codes::ACCESSOR_ON_NON_PROPERTY,
                &message,
            );
            return input_type;
        }
        let Some(function) = self.ctx.types.function_id_of(input_type) else {
            return input_type;
        };
        if self.ctx.types.function(function).is_static_method() && accessor != "getter" {
            let name = self.ctx.types.function(function).name.clone();
            let (code, template) = if accessor == "setter" {
                (
                    diagnostic_codes::SETTER_ON_STATIC_METHOD,
                    diagnostic_messages::SETTER_ON_STATIC_METHOD,
                )
            } else {
                (
                    diagnostic_codes::DELETER_ON_STATIC_METHOD,
                    diagnostic_messages::DELETER_ON_STATIC_METHOD,
                )
            };
            self.error_at_node(decorator_node, code, &format_message(template, &[&name]));
            return input_type;
        }

        let declared_in = self.enclosing_class_id(function_node);
        match accessor {
            "setter" => {
                self.clone_property_with_setter(property_type, function, declared_in, decorator_node)
            }
            "deleter" => {
                self.clone_property_with_deleter(property_type, function, declared_in, decorator_node)
            }
            _ => self.clone_property_with_getter(property_type, function, declared_in, decorator_node),
        }
    }

    // ========================================================================
    // Recognition helpers
    // ========================================================================

    /// Whether a type is a special form with the given fully-qualified
    /// name. Tolerates the differing shapes libraries declare these under:
    /// a class, a plain function, or an overloaded function.
    pub(crate) fn matches_special_form(&self, ty: TypeId, full_name: &str) -> bool {
        match self.ctx.types.data(ty) {
            TypeData::Class(id) => self.ctx.types.class(*id).full_name == full_name,
            TypeData::Function(id) => self.ctx.types.function(*id).full_name == full_name,
            TypeData::Overloaded(entries) => entries
                .first()
                .is_some_and(|&e| self.ctx.types.function(e).full_name == full_name),
            _ => false,
        }
    }

    fn matches_any_special_form(&self, ty: TypeId, names: &[&str]) -> bool {
        names.iter().any(|name| self.matches_special_form(ty, name))
    }

    /// The class record when `ty` is the property marker class or one of
    /// its subclasses.
    fn property_marker_class(&self, ty: TypeId) -> Option<ClassId> {
        let class = self.ctx.types.instantiable_class_of(ty)?;
        let is_property_class = |id: ClassId| {
            self.ctx
                .types
                .class(id)
                .flags
                .contains(ClassTypeFlags::PROPERTY_CLASS)
                || self.ctx.types.class(id).full_name == "builtins.property"
        };
        if is_property_class(class) {
            return Some(class);
        }
        self.ctx
            .types
            .class(class)
            .mro
            .iter()
            .any(|&entry| is_property_class(entry))
            .then_some(class)
    }

    /// The bound `__call__` method of a callable instance, for use as a
    /// property getter.
    fn bound_call_method(&mut self, instance: TypeId) -> Option<FunctionId> {
        let class = self.ctx.types.instance_class_of(instance)?;
        let (_, member) = self.ctx.types.lookup_member(class, "__call__")?;
        let call_fn = self.ctx.types.function_id_of(member.ty)?;
        let bound = self
            .ctx
            .evaluator
            .bind_method_to_receiver(self.ctx.types, instance, call_fn)?;
        self.ctx.types.function_id_of(bound)
    }

    fn mark_function_flags(&mut self, ty: TypeId, flags: FunctionTypeFlags) {
        if let Some(f) = self.ctx.types.function_id_of(ty) {
            self.ctx.types.function_mut(f).flags |= flags;
        }
    }

    fn mark_function_deprecated(&mut self, ty: TypeId, message: &str) {
        if let Some(f) = self.ctx.types.function_id_of(ty) {
            self.ctx.types.function_mut(f).deprecation_message = Some(message.to_string());
        }
    }

    fn class_record_of(&self, input: TypeId, original: TypeId) -> Option<ClassId> {
        self.ctx
            .types
            .instantiable_class_of(input)
            .or_else(|| self.ctx.types.instantiable_class_of(original))
    }

    // ========================================================================
    // Syntax helpers
    // ========================================================================

    fn decorator_expression(&self, decorator_node: NodeIndex) -> Option<NodeIndex> {
        let node = self.ctx.arena.get(decorator_node)?;
        self.ctx.arena.get_decorator(node).map(|d| d.expression)
    }

    /// Forward references are allowed inside stub files; a bare (non-call)
    /// decorator expression is implicitly invoked, so it evaluates with
    /// call-target semantics.
    fn decorator_eval_flags(&self, decorator_node: NodeIndex, expr: NodeIndex) -> EvalFlags {
        let mut flags = EvalFlags::empty();
        if self.is_stub_file(decorator_node) {
            flags |= EvalFlags::ALLOW_FORWARD_REFERENCES;
        }
        let is_call = self
            .ctx
            .arena
            .get(expr)
            .is_some_and(|n| n.kind == syntax_kind::CALL);
        if !is_call {
            flags |= EvalFlags::CALLEE_ONLY;
        }
        flags
    }

    fn call_parts(&self, expr: NodeIndex) -> Option<(NodeIndex, Vec<NodeIndex>)> {
        let node = self.ctx.arena.get(expr)?;
        let call = self.ctx.arena.get_call(node)?;
        Some((call.callee, call.arguments.nodes.clone()))
    }

    fn member_access_parts(&self, expr: NodeIndex) -> Option<(NodeIndex, String)> {
        let node = self.ctx.arena.get(expr)?;
        let access = self.ctx.arena.get_member_access(node)?;
        let name = self.ctx.arena.name_text(access.member_name)?.to_string();
        Some((access.left_expression, name))
    }

    fn first_string_argument(&self, arguments: &[NodeIndex]) -> Option<String> {
        arguments.iter().find_map(|&arg| {
            let node = self.ctx.arena.get(arg)?;
            let data = self.ctx.arena.get_argument(node)?;
            if !data.name.is_none() {
                return None;
            }
            self.ctx.arena.string_text(data.value).map(str::to_string)
        })
    }

    /// Keyword arguments of a dataclass-style or dataclass-transform
    /// call. Only literal True/False values are modeled.
    fn dataclass_behaviors_from_arguments(&self, arguments: &[NodeIndex]) -> DataClassBehaviors {
        let mut behaviors = DataClassBehaviors {
            eq_default: true,
            ..Default::default()
        };
        for &arg in arguments {
            let Some(data) = self
                .ctx
                .arena
                .get(arg)
                .and_then(|n| self.ctx.arena.get_argument(n))
            else {
                continue;
            };
            let Some(keyword) = self.ctx.arena.name_text(data.name) else {
                continue;
            };
            let value = self.ctx.arena.name_text(data.value) == Some("True");
            match keyword {
                "eq" | "eq_default" => behaviors.eq_default = value,
                "order" | "order_default" => behaviors.order_default = value,
                "kw_only" | "kw_only_default" => behaviors.kw_only_default = value,
                "frozen" | "frozen_default" => behaviors.frozen_default = value,
                _ => {}
            }
        }
        behaviors
    }

    /// The class this function is defined in, recovered through the node
    /// type cache on the enclosing class definition.
    fn enclosing_class_id(&self, node: NodeIndex) -> Option<ClassId> {
        let mut current = self.ctx.arena.parent(node);
        let mut iterations = 0u32;
        while !current.is_none() {
            iterations += 1;
            if iterations > MAX_TREE_WALK_ITERATIONS {
                return None;
            }
            if self
                .ctx
                .arena
                .get(current)
                .is_some_and(|n| n.kind == syntax_kind::CLASS_DEF)
            {
                return self
                    .cached_type_of_node(current)
                    .and_then(|ty| self.ctx.types.instantiable_class_of(ty));
            }
            current = self.ctx.arena.parent(current);
        }
        None
    }
}
