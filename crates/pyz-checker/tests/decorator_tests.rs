//! Decorator classification scenarios.

use pyz_checker::EvalFlags;
use pyz_checker::test_fixtures::Fixture;
use pyz_parser::NodeIndex;
use pyz_solver::{FunctionParam, FunctionTypeFlags, ParamCategory, TypeId};

#[test]
fn overload_marker_sets_flag_and_returns_input() {
    let mut fx = Fixture::new();
    let overload_ty = fx.marker_function("overload", "typing.overload");
    let f = fx.function_record("f", "test.f", vec![], Some(TypeId::INT));
    let f_ty = fx.types.function_type(f);
    let dec = fx.name_decorator("overload", overload_ty);

    let mut checker = fx.checker();
    let result = checker.apply_function_decorator(f_ty, f_ty, dec, NodeIndex::NONE);
    assert_eq!(result, f_ty);
    drop(checker);

    assert!(fx.types.function(f).is_overloaded());
}

#[test]
fn staticmethod_rewrites_flags_idempotently() {
    let mut fx = Fixture::new();
    let static_ty = fx.marker_class("staticmethod", "builtins.staticmethod");
    let class_ty = fx.marker_class("classmethod", "builtins.classmethod");
    let f = fx.function_record("f", "test.f", vec![], None);
    let f_ty = fx.types.function_type(f);
    let static_dec = fx.name_decorator("staticmethod", static_ty);
    let static_dec_again = fx.name_decorator("staticmethod", static_ty);
    let class_dec = fx.name_decorator("classmethod", class_ty);

    let mut checker = fx.checker();
    let result = checker.apply_function_decorator(f_ty, f_ty, static_dec, NodeIndex::NONE);
    assert_eq!(result, f_ty);
    checker.apply_function_decorator(f_ty, f_ty, static_dec_again, NodeIndex::NONE);
    drop(checker);
    assert!(fx.types.function(f).is_static_method());
    assert!(!fx.types.function(f).is_class_method());

    // Redecoration with classmethod clears the static bit first.
    let mut checker = fx.checker();
    checker.apply_function_decorator(f_ty, f_ty, class_dec, NodeIndex::NONE);
    drop(checker);
    assert!(fx.types.function(f).is_class_method());
    assert!(!fx.types.function(f).is_static_method());
}

#[test]
fn abstractmethod_and_final_mark_without_wrapping() {
    let mut fx = Fixture::new();
    let abstract_ty = fx.marker_function("abstractmethod", "abc.abstractmethod");
    let final_ty = fx.marker_function("final", "typing.final");
    let f = fx.function_record("f", "test.f", vec![], None);
    let f_ty = fx.types.function_type(f);
    let abstract_dec = fx.name_decorator("abstractmethod", abstract_ty);
    let final_dec = fx.name_decorator("final", final_ty);

    let mut checker = fx.checker();
    assert_eq!(
        checker.apply_function_decorator(f_ty, f_ty, abstract_dec, NodeIndex::NONE),
        f_ty
    );
    assert_eq!(
        checker.apply_function_decorator(f_ty, f_ty, final_dec, NodeIndex::NONE),
        f_ty
    );
    drop(checker);

    assert!(fx.types.function(f).is_abstract());
    assert!(fx.types.function(f).flags.contains(FunctionTypeFlags::FINAL));
}

#[test]
fn override_and_no_type_check_mark_without_wrapping() {
    let mut fx = Fixture::new();
    let override_ty = fx.marker_function("override", "typing.override");
    let no_check_ty = fx.marker_function("no_type_check", "typing.no_type_check");
    let f = fx.function_record("f", "test.f", vec![], None);
    let f_ty = fx.types.function_type(f);
    let override_dec = fx.name_decorator("override", override_ty);
    let no_check_dec = fx.name_decorator("no_type_check", no_check_ty);

    let mut checker = fx.checker();
    assert_eq!(
        checker.apply_function_decorator(f_ty, f_ty, override_dec, NodeIndex::NONE),
        f_ty
    );
    assert_eq!(
        checker.apply_function_decorator(f_ty, f_ty, no_check_dec, NodeIndex::NONE),
        f_ty
    );
    drop(checker);

    let flags = fx.types.function(f).flags;
    assert!(flags.contains(FunctionTypeFlags::OVERRIDDEN));
    assert!(flags.contains(FunctionTypeFlags::NO_TYPE_CHECK));
}

#[test]
fn passthrough_return_shape_preserves_identity() {
    let mut fx = Fixture::new();
    let f = fx.function_record("f", "test.f", vec![], Some(TypeId::INT));
    let f_ty = fx.types.function_type(f);

    // Decorator declared as returning an unannotated (*args, **kwargs)
    // callable.
    let wrapper = fx.function_record(
        "wrapper",
        "m.wrapper",
        vec![
            FunctionParam {
                name: Some("args".to_string()),
                category: ParamCategory::ArgsList,
                ty: None,
                has_default: false,
            },
            FunctionParam {
                name: Some("kwargs".to_string()),
                category: ParamCategory::KwargsDict,
                ty: None,
                has_default: false,
            },
        ],
        None,
    );
    let wrapper_ty = fx.types.function_type(wrapper);
    let deco = fx.function_record(
        "passthrough",
        "m.passthrough",
        vec![FunctionParam::simple("fn", None)],
        Some(wrapper_ty),
    );
    let deco_ty = fx.types.function_type(deco);
    let dec = fx.name_decorator("passthrough", deco_ty);

    let mut checker = fx.checker();
    let result = checker.apply_function_decorator(f_ty, f_ty, dec, NodeIndex::NONE);
    assert_eq!(result, f_ty);
}

#[test]
fn unannotated_decorator_with_unknown_result_preserves_identity() {
    let mut fx = Fixture::new();
    let f = fx.function_record("f", "test.f", vec![], Some(TypeId::INT));
    let f_ty = fx.types.function_type(f);

    let deco = fx.function_record(
        "wrap",
        "m.wrap",
        vec![FunctionParam::simple("fn", None)],
        None,
    );
    let deco_ty = fx.types.function_type(deco);
    // The call "succeeds" but produces a function with no declared return.
    let vague = fx.function_record("inner", "m.inner", vec![], None);
    let vague_ty = fx.types.function_type(vague);
    fx.evaluator.call_results.insert(deco_ty.0, vague_ty);
    let dec = fx.name_decorator("wrap", deco_ty);

    let mut checker = fx.checker();
    let result = checker.apply_function_decorator(f_ty, f_ty, dec, NodeIndex::NONE);
    assert_eq!(result, f_ty);
}

#[test]
fn annotated_decorator_uses_call_result() {
    let mut fx = Fixture::new();
    let f = fx.function_record("f", "test.f", vec![], Some(TypeId::INT));
    let f_ty = fx.types.function_type(f);

    let deco = fx.function_record(
        "to_str",
        "m.to_str",
        vec![FunctionParam::simple("fn", None)],
        Some(TypeId::STR),
    );
    let deco_ty = fx.types.function_type(deco);
    fx.evaluator.call_results.insert(deco_ty.0, TypeId::STR);
    let dec = fx.name_decorator("to_str", deco_ty);

    let mut checker = fx.checker();
    let result = checker.apply_function_decorator(f_ty, f_ty, dec, NodeIndex::NONE);
    assert_eq!(result, TypeId::STR);
}

#[test]
fn uncallable_decorator_degrades_to_unknown() {
    let mut fx = Fixture::new();
    let f = fx.function_record("f", "test.f", vec![], Some(TypeId::INT));
    let f_ty = fx.types.function_type(f);

    let deco = fx.function_record(
        "broken",
        "m.broken",
        vec![FunctionParam::simple("fn", Some(TypeId::STR))],
        Some(TypeId::INT),
    );
    let deco_ty = fx.types.function_type(deco);
    // No scripted call result: the call fails.
    let dec = fx.name_decorator("broken", deco_ty);

    let mut checker = fx.checker();
    let result = checker.apply_function_decorator(f_ty, f_ty, dec, NodeIndex::NONE);
    assert_eq!(result, TypeId::UNKNOWN);
}

#[test]
fn dataclass_transform_records_behaviors_on_function() {
    let mut fx = Fixture::new();
    let transform_ty = fx.marker_function("dataclass_transform", "typing.dataclass_transform");
    let f = fx.function_record("create_model", "m.create_model", vec![], None);
    let f_ty = fx.types.function_type(f);
    let arg = fx.keyword_argument("kw_only_default", "True");
    let dec = fx.call_decorator("dataclass_transform", vec![arg], transform_ty, TypeId::UNKNOWN);

    let mut checker = fx.checker();
    let result = checker.apply_function_decorator(f_ty, f_ty, dec, NodeIndex::NONE);
    assert_eq!(result, f_ty);
    drop(checker);

    let behaviors = fx.types.function(f).dataclass_behaviors.clone().unwrap();
    assert!(behaviors.kw_only_default);
    assert!(behaviors.eq_default);
    assert!(!behaviors.order_default);
}

#[test]
fn deprecated_decorator_records_message() {
    let mut fx = Fixture::new();
    let deprecated_ty = fx.marker_function("deprecated", "warnings.deprecated");
    let f = fx.function_record("old", "m.old", vec![], None);
    let f_ty = fx.types.function_type(f);
    let message = fx.string_argument("Use new() instead");
    let dec = fx.call_decorator("deprecated", vec![message], deprecated_ty, f_ty);

    let mut checker = fx.checker();
    let result = checker.apply_function_decorator(f_ty, f_ty, dec, NodeIndex::NONE);
    assert_eq!(result, f_ty);
    drop(checker);

    assert_eq!(
        fx.types.function(f).deprecation_message.as_deref(),
        Some("Use new() instead")
    );
}

#[test]
fn stub_file_decorator_allows_forward_references() {
    let mut fx = Fixture::new();
    let final_ty = fx.marker_function("final", "typing.final");
    let dec = fx.name_decorator("final", final_ty);
    let f_def = fx.function_def("f", vec![dec]);
    fx.attach_stub_module(vec![f_def]);
    let f = fx.function_record("f", "m.f", vec![], None);
    let f_ty = fx.types.function_type(f);

    let mut checker = fx.checker();
    let result = checker.apply_function_decorators(f_def, f_ty).unwrap();
    assert_eq!(result, f_ty);
    drop(checker);

    let expr = fx
        .arena
        .get(dec)
        .and_then(|n| fx.arena.get_decorator(n))
        .unwrap()
        .expression;
    let flags = fx.evaluator.expr_flags[&expr.0];
    assert!(flags.contains(EvalFlags::ALLOW_FORWARD_REFERENCES));
    // A bare decorator name is still evaluated as a call target.
    assert!(flags.contains(EvalFlags::CALLEE_ONLY));
}

#[test]
fn non_stub_file_decorator_evaluates_without_forward_references() {
    let mut fx = Fixture::new();
    let final_ty = fx.marker_function("final", "typing.final");
    let dec = fx.name_decorator("final", final_ty);
    let f_def = fx.function_def("f", vec![dec]);
    fx.attach_module(vec![f_def]);
    let f = fx.function_record("f", "m.f", vec![], None);
    let f_ty = fx.types.function_type(f);

    let mut checker = fx.checker();
    checker.apply_function_decorators(f_def, f_ty).unwrap();
    drop(checker);

    let expr = fx
        .arena
        .get(dec)
        .and_then(|n| fx.arena.get_decorator(n))
        .unwrap()
        .expression;
    let flags = fx.evaluator.expr_flags[&expr.0];
    assert!(!flags.contains(EvalFlags::ALLOW_FORWARD_REFERENCES));
}

#[test]
fn detached_node_defaults_to_non_stub() {
    let mut fx = Fixture::new();
    let node = fx.name("x");
    let checker = fx.checker();
    assert!(!checker.is_stub_file(node));
}

#[test]
fn class_markers_set_class_flags() {
    let mut fx = Fixture::new();
    let final_ty = fx.marker_function("final", "typing.final");
    let runtime_ty = fx.marker_function("runtime_checkable", "typing.runtime_checkable");
    let class = fx.plain_class("C", "m.C");
    let class_ty = fx.types.class_type(class);
    let final_dec = fx.name_decorator("final", final_ty);
    let runtime_dec = fx.name_decorator("runtime_checkable", runtime_ty);

    let mut checker = fx.checker();
    assert_eq!(
        checker.apply_class_decorator(class_ty, class_ty, final_dec),
        class_ty
    );
    assert_eq!(
        checker.apply_class_decorator(class_ty, class_ty, runtime_dec),
        class_ty
    );
    drop(checker);

    use pyz_solver::ClassTypeFlags;
    let flags = fx.types.class(class).flags;
    assert!(flags.contains(ClassTypeFlags::FINAL));
    assert!(flags.contains(ClassTypeFlags::RUNTIME_CHECKABLE));
}

#[test]
fn deprecated_class_decorator_records_message() {
    let mut fx = Fixture::new();
    let deprecated_ty = fx.marker_function("deprecated", "warnings.deprecated");
    let class = fx.plain_class("Old", "m.Old");
    let class_ty = fx.types.class_type(class);
    let message = fx.string_argument("Use New instead");
    let dec = fx.call_decorator("deprecated", vec![message], deprecated_ty, class_ty);

    let mut checker = fx.checker();
    let result = checker.apply_class_decorator(class_ty, class_ty, dec);
    assert_eq!(result, class_ty);
    drop(checker);

    assert_eq!(
        fx.types.class(class).deprecation_message.as_deref(),
        Some("Use New instead")
    );
}

#[test]
fn dataclass_call_decorator_records_order_behavior() {
    let mut fx = Fixture::new();
    let dataclass_ty = fx.marker_function("dataclass", "dataclasses.dataclass");
    let class = fx.plain_class("Point", "m.Point");
    let class_ty = fx.types.class_type(class);
    let arg = fx.keyword_argument("order", "True");
    let dec = fx.call_decorator("dataclass", vec![arg], dataclass_ty, TypeId::UNKNOWN);

    let mut checker = fx.checker();
    let result = checker.apply_class_decorator(class_ty, class_ty, dec);
    assert_eq!(result, class_ty);
    drop(checker);

    let behaviors = fx.types.class(class).dataclass_behaviors.clone().unwrap();
    assert!(behaviors.eq_default);
    assert!(behaviors.order_default);
}

#[test]
fn bare_dataclass_decorator_records_defaults() {
    let mut fx = Fixture::new();
    let dataclass_ty = fx.marker_function("dataclass", "dataclasses.dataclass");
    let class = fx.plain_class("Point", "m.Point");
    let class_ty = fx.types.class_type(class);
    let dec = fx.name_decorator("dataclass", dataclass_ty);

    let mut checker = fx.checker();
    let result = checker.apply_class_decorator(class_ty, class_ty, dec);
    assert_eq!(result, class_ty);
    drop(checker);

    let behaviors = fx.types.class(class).dataclass_behaviors.clone().unwrap();
    assert!(behaviors.eq_default);
    assert!(!behaviors.order_default);
}
