//! Property synthesis scenarios.

use pyz_checker::test_fixtures::Fixture;
use pyz_common::diagnostics::diagnostic_codes;
use pyz_parser::NodeIndex;
use pyz_solver::{FunctionId, FunctionTypeFlags, TypeData, TypeId, TypeStore};

fn get_overload_entries(types: &TypeStore, prop: TypeId) -> Vec<FunctionId> {
    let class = types.instance_class_of(prop).unwrap();
    let member = types.class(class).members.get("__get__").unwrap();
    types.overload_entries(member.ty).unwrap().to_vec()
}

fn set_method(types: &TypeStore, prop: TypeId) -> FunctionId {
    let class = types.instance_class_of(prop).unwrap();
    let member = types.class(class).members.get("__set__").unwrap();
    types.function_id_of(member.ty).unwrap()
}

#[test]
fn property_decorator_builds_descriptor_class() {
    let mut fx = Fixture::new();
    let marker = fx.property_class();
    let marker_ty = fx.types.class_type(marker);
    let owner = fx.plain_class("C", "m.C");
    let owner_instance = fx.types.instance_type(owner);
    let getter = fx.getter_record("x", owner, TypeId::INT);
    let getter_ty = fx.types.function_type(getter);
    let dec = fx.name_decorator("property", marker_ty);

    let mut checker = fx.checker();
    let prop = checker.apply_function_decorator(getter_ty, getter_ty, dec, NodeIndex::NONE);
    drop(checker);

    let class = fx.types.instance_class_of(prop).unwrap();
    let record = fx.types.class(class);
    assert!(record.is_property());
    let info = record.property.as_ref().unwrap();
    assert_eq!(info.fget.as_ref().unwrap().function, getter);
    assert!(info.fset.is_none());
    assert!(!info.is_asymmetric);
    assert!(!info.is_class_property);

    // The marker's plain members are copied; its descriptor entries are
    // replaced, and with no setter there is no __set__ at all.
    assert!(record.members.contains_key("fget"));
    assert!(!record.members.contains_key("__set__"));
    assert!(!record.members.contains_key("__delete__"));
    assert!(record.mro.contains(&fx.types.object_class()));

    // Instance-access overload first, class-access second.
    let entries = get_overload_entries(&fx.types, prop);
    assert_eq!(entries.len(), 2);
    let instance_access = fx.types.function(entries[0]);
    assert_eq!(instance_access.params[1].ty, Some(owner_instance));
    assert_eq!(instance_access.declared_return_type, Some(TypeId::INT));
    let class_access = fx.types.function(entries[1]);
    assert_eq!(class_access.params[1].ty, Some(TypeId::NONE));
    assert_eq!(class_access.declared_return_type, Some(prop));
    assert!(
        instance_access
            .flags
            .contains(FunctionTypeFlags::SYNTHESIZED_METHOD | FunctionTypeFlags::OVERLOADED)
    );
}

#[test]
fn classmethod_getter_makes_class_scoped_property() {
    let mut fx = Fixture::new();
    let marker = fx.property_class();
    let owner = fx.plain_class("C", "m.C");
    let getter = fx.getter_record("x", owner, TypeId::STR);
    fx.types.function_mut(getter).flags |= FunctionTypeFlags::CLASS_METHOD;

    let mut checker = fx.checker();
    let prop = checker.create_property(marker, getter, Some(owner));
    drop(checker);

    let class = fx.types.instance_class_of(prop).unwrap();
    let info = fx.types.class(class).property.as_ref().unwrap();
    assert!(info.is_class_property);

    // Class access returns the getter's type directly instead of the
    // property object.
    let entries = get_overload_entries(&fx.types, prop);
    let class_access = fx.types.function(entries[1]);
    assert_eq!(class_access.declared_return_type, Some(TypeId::STR));
}

#[test]
fn setter_clone_synthesizes_set_method() {
    let mut fx = Fixture::new();
    let marker = fx.property_class();
    let owner = fx.plain_class("C", "m.C");
    let owner_instance = fx.types.instance_type(owner);
    let getter = fx.getter_record("x", owner, TypeId::INT);
    let setter = fx.setter_record("x", owner, TypeId::INT);
    let error_node = fx.name("x");

    let mut checker = fx.checker();
    let prop = checker.create_property(marker, getter, Some(owner));
    let prop = checker.clone_property_with_setter(prop, setter, Some(owner), error_node);
    assert!(checker.diagnostics().is_empty());
    drop(checker);

    let class = fx.types.instance_class_of(prop).unwrap();
    let info = fx.types.class(class).property.as_ref().unwrap();
    assert_eq!(info.fset.as_ref().unwrap().function, setter);
    assert_eq!(info.fget.as_ref().unwrap().function, getter);
    assert!(!info.is_asymmetric);

    let expected_obj = fx
        .types
        .union_type(vec![owner_instance, TypeId::NONE]);
    let set_fn = fx.types.function(set_method(&fx.types, prop));
    assert_eq!(set_fn.params[1].ty, Some(expected_obj));
    assert_eq!(set_fn.params[2].ty, Some(TypeId::INT));
    assert_eq!(set_fn.declared_return_type, Some(TypeId::NONE));
}

#[test]
fn mismatched_setter_marks_asymmetric_and_warns() {
    let mut fx = Fixture::new();
    let marker = fx.property_class();
    let owner = fx.plain_class("C", "m.C");
    let getter = fx.getter_record("x", owner, TypeId::INT);
    // Accepts float where the getter returns int: assignable, not equal.
    let setter = fx.setter_record("x", owner, TypeId::FLOAT);
    let error_node = fx.name("x");

    let mut checker = fx.checker();
    let prop = checker.create_property(marker, getter, Some(owner));
    let prop = checker.clone_property_with_setter(prop, setter, Some(owner), error_node);
    let diagnostics = checker.take_diagnostics();
    drop(checker);

    let class = fx.types.instance_class_of(prop).unwrap();
    assert!(fx.types.class(class).property.as_ref().unwrap().is_asymmetric);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].code,
        diagnostic_codes::PROPERTY_SETTER_TYPE_MISMATCH
    );
}

#[test]
fn mismatch_warning_respects_option() {
    let mut fx = Fixture::new();
    fx.options.report_property_type_mismatch = false;
    let marker = fx.property_class();
    let owner = fx.plain_class("C", "m.C");
    let getter = fx.getter_record("x", owner, TypeId::INT);
    let setter = fx.setter_record("x", owner, TypeId::FLOAT);
    let error_node = fx.name("x");

    let mut checker = fx.checker();
    let prop = checker.create_property(marker, getter, Some(owner));
    let prop = checker.clone_property_with_setter(prop, setter, Some(owner), error_node);
    assert!(checker.diagnostics().is_empty());
    drop(checker);

    // Still asymmetric; only the report is suppressed.
    let class = fx.types.instance_class_of(prop).unwrap();
    assert!(fx.types.class(class).property.as_ref().unwrap().is_asymmetric);
}

#[test]
fn deleter_clone_regenerates_all_three_descriptors() {
    let mut fx = Fixture::new();
    let marker = fx.property_class();
    let owner = fx.plain_class("C", "m.C");
    let getter = fx.getter_record("x", owner, TypeId::INT);
    let setter = fx.setter_record("x", owner, TypeId::INT);
    let deleter = fx.getter_record("x", owner, TypeId::NONE);
    let error_node = fx.name("x");

    let mut checker = fx.checker();
    let prop = checker.create_property(marker, getter, Some(owner));
    let prop = checker.clone_property_with_setter(prop, setter, Some(owner), error_node);

    let before_get: Vec<_> = {
        let entries = get_overload_entries(checker.ctx.types, prop);
        entries
            .iter()
            .map(|&e| {
                let f = checker.ctx.types.function(e);
                (
                    f.params.iter().map(|p| p.ty).collect::<Vec<_>>(),
                    f.declared_return_type,
                )
            })
            .collect()
    };
    let before_set = {
        let f = checker.ctx.types.function(set_method(checker.ctx.types, prop));
        (
            f.params.iter().map(|p| p.ty).collect::<Vec<_>>(),
            f.declared_return_type,
        )
    };

    let cloned = checker.clone_property_with_deleter(prop, deleter, Some(owner), error_node);
    drop(checker);

    // __get__ and __set__ signatures are unchanged up to the new class's
    // own self type; __delete__ now exists and wraps the deleter.
    let class = fx.types.instance_class_of(cloned).unwrap();
    let info = fx.types.class(class).property.as_ref().unwrap();
    assert_eq!(info.fdel.as_ref().unwrap().function, deleter);
    assert_eq!(info.fget.as_ref().unwrap().function, getter);
    assert_eq!(info.fset.as_ref().unwrap().function, setter);

    let after_get: Vec<_> = get_overload_entries(&fx.types, cloned)
        .iter()
        .map(|&e| {
            let f = fx.types.function(e);
            (
                f.params.iter().map(|p| p.ty).collect::<Vec<_>>(),
                f.declared_return_type,
            )
        })
        .collect();
    // Position 0 of each signature is the property's own instance type,
    // which necessarily differs between the two synthesized classes;
    // everything from the receiver parameter on must match.
    assert_eq!(before_get.len(), after_get.len());
    for (before, after) in before_get.iter().zip(&after_get) {
        assert_eq!(before.0[1..], after.0[1..]);
        if before.1 != Some(prop) {
            assert_eq!(before.1, after.1);
        } else {
            assert_eq!(after.1, Some(cloned));
        }
    }
    let after_set = {
        let f = fx.types.function(set_method(&fx.types, cloned));
        (
            f.params.iter().map(|p| p.ty).collect::<Vec<_>>(),
            f.declared_return_type,
        )
    };
    assert_eq!(before_set.0[1..], after_set.0[1..]);
    assert_eq!(before_set.1, after_set.1);

    let delete_member = fx.types.class(class).members.get("__delete__").unwrap();
    assert!(matches!(
        fx.types.data(delete_member.ty),
        TypeData::Function(_)
    ));
}

#[test]
fn getter_redecoration_replaces_getter_and_regenerates() {
    let mut fx = Fixture::new();
    let marker = fx.property_class();
    let owner = fx.plain_class("C", "m.C");
    let owner_instance = fx.types.instance_type(owner);
    let getter = fx.getter_record("x", owner, TypeId::INT);
    let setter = fx.setter_record("x", owner, TypeId::INT);
    let replacement = fx.getter_record("x", owner, TypeId::INT);
    let replacement_ty = fx.types.function_type(replacement);
    let error_node = fx.name("x");

    let (prop, dec) = {
        let mut checker = fx.checker();
        let prop = checker.create_property(marker, getter, Some(owner));
        let prop = checker.clone_property_with_setter(prop, setter, Some(owner), error_node);
        drop(checker);
        let dec = fx.accessor_decorator("x", "getter", prop);
        (prop, dec)
    };

    let mut checker = fx.checker();
    let cloned = checker.apply_function_decorator(replacement_ty, replacement_ty, dec, NodeIndex::NONE);
    assert!(checker.diagnostics().is_empty());
    drop(checker);

    // A fresh property object carrying the new getter and the old setter.
    assert_ne!(cloned, prop);
    let class = fx.types.instance_class_of(cloned).unwrap();
    let info = fx.types.class(class).property.as_ref().unwrap();
    assert_eq!(info.fget.as_ref().unwrap().function, replacement);
    assert_eq!(info.fset.as_ref().unwrap().function, setter);
    assert!(!info.is_asymmetric);
    assert!(!info.is_class_property);

    // The descriptor triple is regenerated around the replacement.
    let expected_obj = fx.types.union_type(vec![owner_instance, TypeId::NONE]);
    let entries = get_overload_entries(&fx.types, cloned);
    assert_eq!(entries.len(), 2);
    let instance_access = fx.types.function(entries[0]);
    assert_eq!(instance_access.params[0].ty, Some(cloned));
    assert_eq!(instance_access.params[1].ty, Some(owner_instance));
    assert_eq!(instance_access.declared_return_type, Some(TypeId::INT));
    let set_fn = fx.types.function(set_method(&fx.types, cloned));
    assert_eq!(set_fn.params[1].ty, Some(expected_obj));
    assert_eq!(set_fn.params[2].ty, Some(TypeId::INT));
}

#[test]
fn setter_on_static_method_is_rejected() {
    let mut fx = Fixture::new();
    let marker = fx.property_class();
    let owner = fx.plain_class("C", "m.C");
    let getter = fx.getter_record("x", owner, TypeId::INT);
    let setter = fx.setter_record("x", owner, TypeId::INT);
    fx.types.function_mut(setter).flags |= FunctionTypeFlags::STATIC_METHOD;
    let setter_ty = fx.types.function_type(setter);

    let (prop, dec) = {
        let mut checker = fx.checker();
        let prop = checker.create_property(marker, getter, Some(owner));
        drop(checker);
        let dec = fx.accessor_decorator("x", "setter", prop);
        (prop, dec)
    };

    let mut checker = fx.checker();
    let result = checker.apply_function_decorator(setter_ty, setter_ty, dec, NodeIndex::NONE);
    assert_eq!(result, setter_ty);
    let diagnostics = checker.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, diagnostic_codes::SETTER_ON_STATIC_METHOD);
    drop(checker);

    // The property is untouched.
    let class = fx.types.instance_class_of(prop).unwrap();
    assert!(fx.types.class(class).property.as_ref().unwrap().fset.is_none());
}

#[test]
fn accessor_on_non_property_is_rejected() {
    let mut fx = Fixture::new();
    let f = fx.function_record("f", "m.f", vec![], None);
    let f_ty = fx.types.function_type(f);
    let dec = fx.accessor_decorator("x", "setter", TypeId::INT);

    let mut checker = fx.checker();
    let result = checker.apply_function_decorator(f_ty, f_ty, dec, NodeIndex::NONE);
    assert_eq!(result, f_ty);
    let diagnostics = checker.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].code,
        diagnostic_codes::ACCESSOR_ON_NON_PROPERTY
    );
}

#[test]
fn assign_property_requires_matching_accessors() {
    let mut fx = Fixture::new();
    let marker = fx.property_class();
    let owner = fx.plain_class("C", "m.C");
    let getter = fx.getter_record("x", owner, TypeId::INT);
    let setter = fx.setter_record("x", owner, TypeId::INT);
    let error_node = fx.name("x");

    let mut checker = fx.checker();
    let dest = checker.create_property(marker, getter, Some(owner));
    let dest = checker.clone_property_with_setter(dest, setter, Some(owner), error_node);
    // src has a getter but no setter.
    let src = checker.create_property(marker, getter, Some(owner));

    let mut addenda = Vec::new();
    assert!(!checker.assign_property(dest, src, &mut addenda));
    assert_eq!(addenda.len(), 1);
    assert!(addenda[0].contains("fset"));

    // A structurally identical property is accepted.
    let src_getter = checker.ctx.types.function(getter).clone();
    let src_getter = checker.ctx.types.add_function(src_getter);
    let src_setter = checker.ctx.types.function(setter).clone();
    let src_setter = checker.ctx.types.add_function(src_setter);
    let src = checker.create_property(marker, src_getter, Some(owner));
    let src = checker.clone_property_with_setter(src, src_setter, Some(owner), error_node);
    let mut addenda = Vec::new();
    assert!(checker.assign_property(dest, src, &mut addenda));
    assert!(addenda.is_empty());
}

#[test]
fn assign_property_accumulates_per_accessor_addenda() {
    let mut fx = Fixture::new();
    let marker = fx.property_class();
    let owner = fx.plain_class("C", "m.C");
    let dest_getter = fx.getter_record("x", owner, TypeId::INT);
    let dest_setter = fx.setter_record("x", owner, TypeId::INT);
    let src_getter = fx.getter_record("x", owner, TypeId::STR);
    let error_node = fx.name("x");

    let mut checker = fx.checker();
    let dest = checker.create_property(marker, dest_getter, Some(owner));
    let dest = checker.clone_property_with_setter(dest, dest_setter, Some(owner), error_node);
    let src = checker.create_property(marker, src_getter, Some(owner));

    let mut addenda = Vec::new();
    assert!(!checker.assign_property(dest, src, &mut addenda));
    // Incompatible getter and missing setter both reported.
    assert!(addenda.iter().any(|a| a.contains("fget")));
    assert!(addenda.iter().any(|a| a.contains("fset")));
}
