//! Property synthesis.
//!
//! `@property` and its accessor re-decorations (`@x.setter`, `@x.deleter`,
//! `@x.getter`) each produce a fresh synthesized class modeled on the
//! property-marker class, carrying the accessor functions and a member
//! table with `__get__`/`__set__`/`__delete__` descriptor methods derived
//! from them. Cloning with a changed accessor regenerates all three
//! descriptor methods, never just the changed one, so the member table can
//! never disagree with the accessor slots.

use pyz_common::diagnostics::{diagnostic_codes, diagnostic_messages, format_message};
use pyz_parser::NodeIndex;
use pyz_solver::{
    AccessorInfo, ClassId, ClassMember, ClassType, ClassTypeFlags, FunctionId, FunctionParam,
    FunctionType, FunctionTypeFlags, PropertyInfo, TypeId,
};
use tracing::debug;

use crate::state::CheckerState;

impl CheckerState<'_> {
    /// Build a property object from its getter. `marker_class` is the
    /// property class (or subclass) named in the decorator; the synthesized
    /// class borrows its shape. Returns the property object's instance
    /// type.
    pub fn create_property(
        &mut self,
        marker_class: ClassId,
        getter: FunctionId,
        declared_in: Option<ClassId>,
    ) -> TypeId {
        debug!(
            getter = %self.ctx.types.function(getter).full_name,
            "creating property"
        );
        let is_class_property = self.ctx.types.function(getter).is_class_method();
        let class = self.clone_property_shell(marker_class);
        self.ctx.types.class_mut(class).property = Some(PropertyInfo {
            fget: Some(AccessorInfo {
                function: getter,
                declared_in,
            }),
            fset: None,
            fdel: None,
            is_asymmetric: false,
            is_class_property,
        });
        self.regenerate_descriptor_methods(class);
        self.ctx.types.instance_type(class)
    }

    /// Re-decoration with `@x.getter`: replace the getter, keep the other
    /// accessors. No-op when `prop` is not a property object.
    pub fn clone_property_with_getter(
        &mut self,
        prop: TypeId,
        getter: FunctionId,
        declared_in: Option<ClassId>,
        error_node: NodeIndex,
    ) -> TypeId {
        let Some(source) = self.property_class_of(prop) else {
            return prop;
        };
        let class = self.clone_property_shell(source);
        let mut info = self.ctx.types.class(source).property.clone().unwrap_or_default();
        info.is_class_property = self.ctx.types.function(getter).is_class_method();
        info.fget = Some(AccessorInfo {
            function: getter,
            declared_in,
        });
        self.finish_property_clone(class, info, error_node)
    }

    pub fn clone_property_with_setter(
        &mut self,
        prop: TypeId,
        setter: FunctionId,
        declared_in: Option<ClassId>,
        error_node: NodeIndex,
    ) -> TypeId {
        let Some(source) = self.property_class_of(prop) else {
            return prop;
        };
        let class = self.clone_property_shell(source);
        let mut info = self.ctx.types.class(source).property.clone().unwrap_or_default();
        info.fset = Some(AccessorInfo {
            function: setter,
            declared_in,
        });
        self.finish_property_clone(class, info, error_node)
    }

    pub fn clone_property_with_deleter(
        &mut self,
        prop: TypeId,
        deleter: FunctionId,
        declared_in: Option<ClassId>,
        error_node: NodeIndex,
    ) -> TypeId {
        let Some(source) = self.property_class_of(prop) else {
            return prop;
        };
        let class = self.clone_property_shell(source);
        let mut info = self.ctx.types.class(source).property.clone().unwrap_or_default();
        info.fdel = Some(AccessorInfo {
            function: deleter,
            declared_in,
        });
        self.finish_property_clone(class, info, error_node)
    }

    /// Structural compatibility between two property objects: every
    /// accessor `dest` declares must exist on `src` and be mutually
    /// assignable after rebinding to its owning instance. Failures
    /// accumulate per accessor in `addenda` rather than stopping at the
    /// first one.
    pub fn assign_property(
        &mut self,
        dest: TypeId,
        src: TypeId,
        addenda: &mut Vec<String>,
    ) -> bool {
        let (Some(dest_class), Some(src_class)) =
            (self.property_class_of(dest), self.property_class_of(src))
        else {
            return false;
        };
        let dest_info = self.ctx.types.class(dest_class).property.clone().unwrap_or_default();
        let src_info = self.ctx.types.class(src_class).property.clone().unwrap_or_default();
        let prop_name = self.ctx.types.class(dest_class).name.clone();

        let slots = [
            ("fget", &dest_info.fget, &src_info.fget),
            ("fset", &dest_info.fset, &src_info.fset),
            ("fdel", &dest_info.fdel, &src_info.fdel),
        ];

        let mut compatible = true;
        for (label, dest_accessor, src_accessor) in slots {
            let Some(dest_accessor) = dest_accessor else {
                continue;
            };
            let Some(src_accessor) = src_accessor else {
                addenda.push(format_message(
                    diagnostic_messages::PROPERTY_MISSING_ACCESSOR,
                    &[&prop_name, label],
                ));
                compatible = false;
                continue;
            };
            if !self.accessor_compatible(dest_accessor, src_accessor, addenda) {
                addenda.push(format_message(
                    diagnostic_messages::PROPERTY_ACCESSOR_INCOMPATIBLE,
                    &[label, &prop_name],
                ));
                compatible = false;
            }
        }
        compatible
    }

    // ========================================================================
    // Internals
    // ========================================================================

    pub(crate) fn property_class_of(&self, ty: TypeId) -> Option<ClassId> {
        let class = self.ctx.types.instance_class_of(ty)?;
        self.ctx.types.class(class).is_property().then_some(class)
    }

    /// Clone the marker class's shape: name, module, type-parameter scope,
    /// bases plus `object`, and every member except the three descriptor
    /// methods (always regenerated) and protocol-excluded entries.
    fn clone_property_shell(&mut self, marker_class: ClassId) -> ClassId {
        let marker = self.ctx.types.class(marker_class).clone();
        let mut class = ClassType::new(&marker.name, &marker.full_name, &marker.module_name);
        class.flags = marker.flags | ClassTypeFlags::PROPERTY_CLASS | ClassTypeFlags::SYNTHESIZED;
        class.type_var_scope_id = marker.type_var_scope_id;
        class.bases = marker.bases.clone();
        let object = self.ctx.types.object_class();
        if !class.bases.contains(&object) {
            class.bases.push(object);
        }
        for (name, member) in &marker.members {
            if matches!(name.as_str(), "__get__" | "__set__" | "__delete__") {
                continue;
            }
            if member.excluded_from_protocol {
                continue;
            }
            class.members.insert(name.clone(), member.clone());
        }
        let id = self.ctx.types.add_class(class);
        self.ctx.types.class_mut(id).mro = self.ctx.types.linearize_mro(id);
        id
    }

    fn finish_property_clone(
        &mut self,
        class: ClassId,
        mut info: PropertyInfo,
        error_node: NodeIndex,
    ) -> TypeId {
        info.is_asymmetric = self.compute_asymmetry(&info, error_node);
        self.ctx.types.class_mut(class).property = Some(info);
        self.regenerate_descriptor_methods(class);
        self.ctx.types.instance_type(class)
    }

    /// A descriptor is asymmetric when the setter's accepted value type is
    /// not exactly the getter's returned type. Mere assignability is not
    /// enough; when the two are assignable but not identical, that is
    /// reported separately as a (suppressible) mismatch.
    fn compute_asymmetry(&mut self, info: &PropertyInfo, error_node: NodeIndex) -> bool {
        let (Some(fget), Some(fset)) = (&info.fget, &info.fset) else {
            return false;
        };
        let getter = self.ctx.types.function(fget.function);
        let setter = self.ctx.types.function(fset.function);
        let (Some(getter_return), Some(setter_value)) = (
            getter.declared_return_type,
            setter.params.get(1).and_then(|p| p.ty),
        ) else {
            return false;
        };
        let getter_name = getter.name.clone();
        if self.ctx.types.is_same_type(getter_return, setter_value) {
            return false;
        }
        if self.ctx.options.report_property_type_mismatch
            && self.ctx.evaluator.is_assignable(
                self.ctx.types,
                setter_value,
                getter_return,
                None,
            )
        {
            let message = format_message(
                diagnostic_messages::PROPERTY_SETTER_TYPE_MISMATCH,
                &[&getter_name],
            );
            self.warning_at_node(
                error_node,
                diagnostic_codes::PROPERTY_SETTER_TYPE_MISMATCH,
                &message,
            );
        }
        true
    }

    /// Drop and re-synthesize `__get__`/`__set__`/`__delete__` from the
    /// current accessor slots.
    fn regenerate_descriptor_methods(&mut self, class: ClassId) {
        let info = self.ctx.types.class(class).property.clone().unwrap_or_default();
        let prop_instance = self.ctx.types.instance_type(class);
        {
            let members = &mut self.ctx.types.class_mut(class).members;
            members.swap_remove("__get__");
            members.swap_remove("__set__");
            members.swap_remove("__delete__");
        }
        if let Some(fget) = &info.fget {
            self.add_get_method(class, prop_instance, fget.function, info.is_class_property);
        }
        if let Some(fset) = &info.fset {
            self.add_set_method(class, prop_instance, fset.function);
        }
        if let Some(fdel) = &info.fdel {
            self.add_del_method(class, prop_instance, fdel.function);
        }
    }

    /// Two-overload `__get__`. The instance-access overload comes first:
    /// a None-typed second parameter can also match singleton receiver
    /// types, and overload resolution is first-match.
    fn add_get_method(
        &mut self,
        class: ClassId,
        prop_instance: TypeId,
        getter: FunctionId,
        is_class_property: bool,
    ) {
        let record = self.ctx.types.function(getter).clone();
        let full_name = format!("{}.__get__", self.ctx.types.class(class).full_name);
        let receiver = record.params.first().and_then(|p| p.ty).unwrap_or(TypeId::OBJECT);

        let mut instance_access = FunctionType::new("__get__", &full_name);
        instance_access.params = vec![
            FunctionParam::simple("self", Some(prop_instance)),
            FunctionParam::simple("obj", Some(receiver)),
        ];
        instance_access.declared_return_type = record.declared_return_type;
        instance_access.flags =
            FunctionTypeFlags::SYNTHESIZED_METHOD | FunctionTypeFlags::OVERLOADED;
        instance_access.type_var_scope_id = record.type_var_scope_id;
        instance_access.docstring = record.docstring.clone();

        let mut class_access = FunctionType::new("__get__", &full_name);
        class_access.params = vec![
            FunctionParam::simple("self", Some(prop_instance)),
            FunctionParam::simple("obj", Some(TypeId::NONE)),
        ];
        class_access.declared_return_type = Some(if is_class_property {
            record.declared_return_type.unwrap_or(TypeId::UNKNOWN)
        } else {
            prop_instance
        });
        class_access.flags = FunctionTypeFlags::SYNTHESIZED_METHOD | FunctionTypeFlags::OVERLOADED;
        class_access.type_var_scope_id = record.type_var_scope_id;
        class_access.docstring = record.docstring;

        let instance_id = self.ctx.types.add_function(instance_access);
        let class_id = self.ctx.types.add_function(class_access);
        let ty = self.ctx.types.overloaded_type(vec![instance_id, class_id]);
        self.insert_descriptor_member(class, "__get__", ty);
    }

    /// Single-signature `__set__`. The instance parameter admits `None` so
    /// class-level access type-checks; the accessor's type-variable scope
    /// is adopted so its type variables remain solvable.
    fn add_set_method(&mut self, class: ClassId, prop_instance: TypeId, setter: FunctionId) {
        let record = self.ctx.types.function(setter).clone();
        let full_name = format!("{}.__set__", self.ctx.types.class(class).full_name);
        let receiver = record.params.first().and_then(|p| p.ty).unwrap_or(TypeId::OBJECT);
        let obj_type = self.ctx.types.union_type(vec![receiver, TypeId::NONE]);

        let mut method = FunctionType::new("__set__", &full_name);
        method.params = vec![
            FunctionParam::simple("self", Some(prop_instance)),
            FunctionParam::simple("obj", Some(obj_type)),
            FunctionParam::simple("value", record.params.get(1).and_then(|p| p.ty)),
        ];
        method.declared_return_type = Some(TypeId::NONE);
        method.flags = FunctionTypeFlags::SYNTHESIZED_METHOD;
        method.type_var_scope_id = record.type_var_scope_id;

        let id = self.ctx.types.add_function(method);
        let ty = self.ctx.types.function_type(id);
        self.insert_descriptor_member(class, "__set__", ty);
    }

    fn add_del_method(&mut self, class: ClassId, prop_instance: TypeId, deleter: FunctionId) {
        let record = self.ctx.types.function(deleter).clone();
        let full_name = format!("{}.__delete__", self.ctx.types.class(class).full_name);
        let receiver = record.params.first().and_then(|p| p.ty).unwrap_or(TypeId::OBJECT);
        let obj_type = self.ctx.types.union_type(vec![receiver, TypeId::NONE]);

        let mut method = FunctionType::new("__delete__", &full_name);
        method.params = vec![
            FunctionParam::simple("self", Some(prop_instance)),
            FunctionParam::simple("obj", Some(obj_type)),
        ];
        method.declared_return_type = Some(TypeId::NONE);
        method.flags = FunctionTypeFlags::SYNTHESIZED_METHOD;
        method.type_var_scope_id = record.type_var_scope_id;

        let id = self.ctx.types.add_function(method);
        let ty = self.ctx.types.function_type(id);
        self.insert_descriptor_member(class, "__delete__", ty);
    }

    fn insert_descriptor_member(&mut self, class: ClassId, name: &str, ty: TypeId) {
        let mut member = ClassMember::new(ty);
        member.excluded_from_protocol = true;
        self.ctx
            .types
            .class_mut(class)
            .members
            .insert(name.to_string(), member);
    }

    /// One accessor pair of `assign_property`: strip the synthesized
    /// static flag, rebind each function to its owning instance, and
    /// require mutual assignability.
    fn accessor_compatible(
        &mut self,
        dest: &AccessorInfo,
        src: &AccessorInfo,
        addenda: &mut Vec<String>,
    ) -> bool {
        let Some(dest_bound) = self.bind_accessor(dest) else {
            return false;
        };
        let Some(src_bound) = self.bind_accessor(src) else {
            return false;
        };
        self.ctx
            .evaluator
            .is_assignable(self.ctx.types, dest_bound, src_bound, Some(&mut *addenda))
            && self
                .ctx
                .evaluator
                .is_assignable(self.ctx.types, src_bound, dest_bound, Some(addenda))
    }

    fn bind_accessor(&mut self, accessor: &AccessorInfo) -> Option<TypeId> {
        let mut record = self.ctx.types.function(accessor.function).clone();
        record.flags.remove(FunctionTypeFlags::STATIC_METHOD);
        let stripped = self.ctx.types.add_function(record);
        let receiver = match accessor.declared_in {
            Some(class) => self.ctx.types.instance_type(class),
            None => TypeId::OBJECT,
        };
        self.ctx
            .evaluator
            .bind_method_to_receiver(self.ctx.types, receiver, stripped)
    }
}
