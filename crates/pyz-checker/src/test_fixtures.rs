//! Shared fixtures for checker tests: a scripted stand-in for the type
//! evaluator plus builders for the syntax, binder, and type-store state a
//! scenario needs. Not part of the public API.

use std::sync::Arc;

use pyz_binder::{AnalysisTable, DeclId, FileInfo, ScopeId, ScopeKind};
use pyz_parser::node::{FunctionData, ParameterCategory, ParameterData};
use pyz_parser::{NodeArena, NodeIndex, NodeList};
use pyz_solver::{
    ClassId, ClassMember, ClassType, ClassTypeFlags, FunctionId, FunctionParam, FunctionType,
    TypeId, TypeStore,
};
use rustc_hash::FxHashMap;

use crate::evaluator::{EvalFlags, TypeEvalProvider};
use crate::state::{BindResults, CheckerOptions, CheckerState};

/// Scripted evaluator: expression and declaration types are preset per
/// node, assignability follows a few fixed rules, and binding returns the
/// function unchanged. Forced declaration evaluations are recorded in
/// order so tests can assert on evaluation strategy.
pub struct FakeEvaluator {
    pub expr_types: FxHashMap<u32, TypeId>,
    pub decl_types: FxHashMap<u32, TypeId>,
    /// Call result per callee type.
    pub call_results: FxHashMap<u32, TypeId>,
    /// Extra (dest, src) pairs considered assignable.
    pub assignable_pairs: Vec<(TypeId, TypeId)>,
    pub evaluated_decls: Vec<DeclId>,
    /// Flags seen per evaluated expression node.
    pub expr_flags: FxHashMap<u32, EvalFlags>,
}

impl FakeEvaluator {
    pub fn new() -> FakeEvaluator {
        FakeEvaluator {
            expr_types: FxHashMap::default(),
            decl_types: FxHashMap::default(),
            call_results: FxHashMap::default(),
            assignable_pairs: Vec::new(),
            evaluated_decls: Vec::new(),
            expr_flags: FxHashMap::default(),
        }
    }
}

impl Default for FakeEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeEvalProvider for FakeEvaluator {
    fn evaluate_expression_type(
        &mut self,
        _types: &mut TypeStore,
        node: NodeIndex,
        flags: EvalFlags,
    ) -> TypeId {
        self.expr_flags.insert(node.0, flags);
        self.expr_types
            .get(&node.0)
            .copied()
            .unwrap_or(TypeId::UNKNOWN)
    }

    fn call_type(
        &mut self,
        _types: &mut TypeStore,
        callee: TypeId,
        _args: &[TypeId],
        _node: NodeIndex,
    ) -> Option<TypeId> {
        self.call_results.get(&callee.0).copied()
    }

    fn is_assignable(
        &mut self,
        types: &TypeStore,
        dest: TypeId,
        src: TypeId,
        addenda: Option<&mut Vec<String>>,
    ) -> bool {
        let ok = dest == src
            || dest == TypeId::OBJECT
            || dest == TypeId::ANY
            || (dest == TypeId::FLOAT && src == TypeId::INT)
            || functions_structurally_equal(types, dest, src)
            || self.assignable_pairs.contains(&(dest, src));
        if !ok && let Some(addenda) = addenda {
            addenda.push(format!(
                "'{}' is not assignable to '{}'",
                types.display(src),
                types.display(dest)
            ));
        }
        ok
    }

    fn bind_method_to_receiver(
        &mut self,
        types: &mut TypeStore,
        _receiver: TypeId,
        function: FunctionId,
    ) -> Option<TypeId> {
        Some(types.function_type(function))
    }

    fn evaluate_declaration_type(
        &mut self,
        _types: &mut TypeStore,
        decl: DeclId,
    ) -> Option<TypeId> {
        self.evaluated_decls.push(decl);
        self.decl_types.get(&decl.0).copied()
    }
}

/// Two function types with the same parameter shapes and return type.
/// Stands in for real signature subtyping, which the fake does not model.
fn functions_structurally_equal(types: &TypeStore, a: TypeId, b: TypeId) -> bool {
    let (Some(a), Some(b)) = (types.function_id_of(a), types.function_id_of(b)) else {
        return false;
    };
    let (a, b) = (types.function(a), types.function(b));
    a.declared_return_type == b.declared_return_type
        && a.params.len() == b.params.len()
        && a.params
            .iter()
            .zip(&b.params)
            .all(|(p, q)| p.ty == q.ty && p.category == q.category)
}

/// Owns every piece of state a checker borrows, with builders for the
/// common scenario shapes.
pub struct Fixture {
    pub arena: NodeArena,
    pub binder: BindResults,
    pub analysis: AnalysisTable,
    pub types: TypeStore,
    pub evaluator: FakeEvaluator,
    pub options: CheckerOptions,
    pos: u32,
}

impl Fixture {
    pub fn new() -> Fixture {
        Fixture {
            arena: NodeArena::new(),
            binder: BindResults::new(),
            analysis: AnalysisTable::new(),
            types: TypeStore::new(),
            evaluator: FakeEvaluator::new(),
            options: CheckerOptions::default(),
            pos: 0,
        }
    }

    pub fn checker(&mut self) -> CheckerState<'_> {
        CheckerState::new(
            &self.arena,
            &self.binder,
            &self.analysis,
            &mut self.types,
            &mut self.evaluator,
            self.options.clone(),
            "test.py",
        )
    }

    fn span(&mut self) -> (u32, u32) {
        let pos = self.pos;
        self.pos += 10;
        (pos, pos + 9)
    }

    // ========================================================================
    // Syntax builders
    // ========================================================================

    /// Wrap statements in a module root with file metadata and a module
    /// scope attached.
    pub fn attach_module(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        self.attach_module_with(statements, "test.py", false)
    }

    /// Like [`Fixture::attach_module`], but the module is a stub file.
    pub fn attach_stub_module(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        self.attach_module_with(statements, "test.pyi", true)
    }

    fn attach_module_with(
        &mut self,
        statements: Vec<NodeIndex>,
        file_name: &str,
        is_stub: bool,
    ) -> NodeIndex {
        let (pos, end) = self.span();
        let module = self.arena.add_module(NodeList::new(statements), pos, end);
        let scope = self.binder.scopes.alloc(ScopeKind::Module, module, None);
        self.analysis.set_scope(module, scope);
        self.analysis.set_file_info(
            module,
            Arc::new(FileInfo {
                file_name: file_name.to_string(),
                is_stub,
            }),
        );
        module
    }

    pub fn name(&mut self, text: &str) -> NodeIndex {
        let (pos, end) = self.span();
        self.arena.add_name(text, pos, end)
    }

    /// `@name`-style decorator whose expression evaluates to `ty`.
    pub fn name_decorator(&mut self, text: &str, ty: TypeId) -> NodeIndex {
        let expr = self.name(text);
        self.evaluator.expr_types.insert(expr.0, ty);
        let (pos, end) = self.span();
        self.arena.add_decorator(expr, pos, end)
    }

    /// `@left.member`-style decorator; the left expression evaluates to
    /// `left_ty`.
    pub fn accessor_decorator(&mut self, left: &str, member: &str, left_ty: TypeId) -> NodeIndex {
        let left_expr = self.name(left);
        self.evaluator.expr_types.insert(left_expr.0, left_ty);
        let member_name = self.name(member);
        let (pos, end) = self.span();
        let access = self.arena.add_member_access(left_expr, member_name, pos, end);
        let (pos, end) = self.span();
        self.arena.add_decorator(access, pos, end)
    }

    /// `@callee(args...)`-style decorator; the callee evaluates to
    /// `callee_ty` and the whole call to `result_ty`.
    pub fn call_decorator(
        &mut self,
        callee: &str,
        arguments: Vec<NodeIndex>,
        callee_ty: TypeId,
        result_ty: TypeId,
    ) -> NodeIndex {
        let callee_expr = self.name(callee);
        self.evaluator.expr_types.insert(callee_expr.0, callee_ty);
        let (pos, end) = self.span();
        let call = self
            .arena
            .add_call(callee_expr, NodeList::new(arguments), pos, end);
        self.evaluator.expr_types.insert(call.0, result_ty);
        let (pos, end) = self.span();
        self.arena.add_decorator(call, pos, end)
    }

    pub fn keyword_argument(&mut self, keyword: &str, value: &str) -> NodeIndex {
        let name = self.name(keyword);
        let value = self.name(value);
        let (pos, end) = self.span();
        self.arena.add_argument(name, value, pos, end)
    }

    pub fn string_argument(&mut self, text: &str) -> NodeIndex {
        let (pos, end) = self.span();
        let value = self.arena.add_string_literal(text, pos, end);
        let (pos, end) = self.span();
        self.arena.add_argument(NodeIndex::NONE, value, pos, end)
    }

    pub fn simple_parameter(&mut self, name: &str) -> NodeIndex {
        let name = self.name(name);
        let (pos, end) = self.span();
        self.arena.add_parameter(
            ParameterData {
                name,
                annotation: NodeIndex::NONE,
                default_value: NodeIndex::NONE,
                category: ParameterCategory::Simple,
            },
            pos,
            end,
        )
    }

    /// A `def` with the given decorators and an empty body.
    pub fn function_def(&mut self, name: &str, decorators: Vec<NodeIndex>) -> NodeIndex {
        let name = self.name(name);
        let (pos, end) = self.span();
        let suite = self.arena.add_suite(NodeList::default(), pos, end);
        let (pos, end) = self.span();
        self.arena.add_function(
            FunctionData {
                name,
                type_parameters: NodeIndex::NONE,
                decorators: NodeList::new(decorators),
                parameters: NodeList::default(),
                return_annotation: NodeIndex::NONE,
                suite,
                is_async: false,
            },
            pos,
            end,
        )
    }

    // ========================================================================
    // Type-store builders
    // ========================================================================

    /// Register a special-form marker declared as a class (e.g.
    /// `builtins.staticmethod`). Returns the class-object type.
    pub fn marker_class(&mut self, name: &str, full_name: &str) -> TypeId {
        let module = full_name.rsplit_once('.').map(|(m, _)| m).unwrap_or("");
        let class = self
            .types
            .add_class(ClassType::new(name, full_name, module));
        let object = self.types.object_class();
        self.types.class_mut(class).bases = vec![object];
        self.types.class_mut(class).mro = self.types.linearize_mro(class);
        self.types.class_type(class)
    }

    /// Register a special-form marker declared as a plain function (e.g.
    /// `typing.overload`). Returns the function type.
    pub fn marker_function(&mut self, name: &str, full_name: &str) -> TypeId {
        let function = self.types.add_function(FunctionType::new(name, full_name));
        self.types.function_type(function)
    }

    /// The `builtins.property` class, flagged as the property marker and
    /// carrying a member table with descriptor entries that synthesis must
    /// replace and an attribute it must copy.
    pub fn property_class(&mut self) -> ClassId {
        let class = self
            .types
            .add_class(ClassType::new("property", "builtins.property", "builtins"));
        let object = self.types.object_class();
        {
            let record = self.types.class_mut(class);
            record.flags |= ClassTypeFlags::BUILT_IN | ClassTypeFlags::PROPERTY_CLASS;
            record.bases = vec![object];
            record
                .members
                .insert("__get__".to_string(), ClassMember::new(TypeId::UNKNOWN));
            record
                .members
                .insert("__set__".to_string(), ClassMember::new(TypeId::UNKNOWN));
            record
                .members
                .insert("__delete__".to_string(), ClassMember::new(TypeId::UNKNOWN));
            record
                .members
                .insert("fget".to_string(), ClassMember::new(TypeId::OBJECT));
        }
        self.types.class_mut(class).mro = self.types.linearize_mro(class);
        class
    }

    /// A plain class registered with bases `[object]`. Returns its id.
    pub fn plain_class(&mut self, name: &str, full_name: &str) -> ClassId {
        let module = full_name.rsplit_once('.').map(|(m, _)| m).unwrap_or("");
        let class = self
            .types
            .add_class(ClassType::new(name, full_name, module));
        let object = self.types.object_class();
        self.types.class_mut(class).bases = vec![object];
        self.types.class_mut(class).mro = self.types.linearize_mro(class);
        class
    }

    /// A function record with simple named parameters.
    pub fn function_record(
        &mut self,
        name: &str,
        full_name: &str,
        params: Vec<FunctionParam>,
        declared_return_type: Option<TypeId>,
    ) -> FunctionId {
        let mut record = FunctionType::new(name, full_name);
        record.params = params;
        record.declared_return_type = declared_return_type;
        self.types.add_function(record)
    }

    /// A getter-shaped method `(self: instance) -> ret`.
    pub fn getter_record(&mut self, name: &str, owner: ClassId, ret: TypeId) -> FunctionId {
        let instance = self.types.instance_type(owner);
        self.function_record(
            name,
            &format!("test.{name}"),
            vec![FunctionParam::simple("self", Some(instance))],
            Some(ret),
        )
    }

    /// A setter-shaped method `(self: instance, value: value_ty) -> None`.
    pub fn setter_record(&mut self, name: &str, owner: ClassId, value_ty: TypeId) -> FunctionId {
        let instance = self.types.instance_type(owner);
        self.function_record(
            name,
            &format!("test.{name}"),
            vec![
                FunctionParam::simple("self", Some(instance)),
                FunctionParam::simple("value", Some(value_ty)),
            ],
            Some(TypeId::NONE),
        )
    }

    // ========================================================================
    // Binder builders
    // ========================================================================

    /// Declare `name` in `scope` with one function declaration per node,
    /// in order. Returns the declaration ids.
    pub fn declare_function_chain(
        &mut self,
        scope: ScopeId,
        name: &str,
        nodes: &[NodeIndex],
    ) -> Vec<DeclId> {
        let symbol = self
            .binder
            .symbols
            .alloc(name, pyz_binder::symbol_flags::FUNCTION);
        self.binder.scopes.declare(scope, name, symbol);
        let mut decls = Vec::new();
        for &node in nodes {
            let decl = self
                .binder
                .declarations
                .alloc(pyz_binder::DeclarationKind::Function, node);
            self.binder.symbols.add_declaration(symbol, decl);
            self.analysis.set_declaration(node, decl);
            decls.push(decl);
        }
        decls
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
