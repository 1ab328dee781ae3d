//! Mutable function and class records.

use indexmap::IndexMap;
use pyz_binder::DeclId;

use crate::flags::{ClassTypeFlags, FunctionTypeFlags};
use crate::store::TypeId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassId(pub u32);

/// Identifies the solving scope a set of type variables belongs to.
/// Synthesized descriptor methods adopt their accessor's scope so type
/// variables in the accessor's signature remain solvable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeVarScopeId(pub u32);

/// How a parameter binds its arguments.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParamCategory {
    Simple,
    ArgsList,
    KwargsDict,
}

#[derive(Clone, Debug)]
pub struct FunctionParam {
    pub name: Option<String>,
    pub category: ParamCategory,
    /// Declared type; `None` when the parameter is unannotated.
    pub ty: Option<TypeId>,
    pub has_default: bool,
}

impl FunctionParam {
    pub fn simple(name: &str, ty: Option<TypeId>) -> FunctionParam {
        FunctionParam {
            name: Some(name.to_string()),
            category: ParamCategory::Simple,
            ty,
            has_default: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FunctionType {
    pub name: String,
    pub full_name: String,
    pub params: Vec<FunctionParam>,
    pub declared_return_type: Option<TypeId>,
    pub flags: FunctionTypeFlags,
    pub decl: Option<DeclId>,
    pub deprecation_message: Option<String>,
    pub docstring: Option<String>,
    pub type_var_scope_id: Option<TypeVarScopeId>,
    /// Behavior descriptor recorded when this function is decorated with a
    /// `dataclass_transform` marker.
    pub dataclass_behaviors: Option<DataClassBehaviors>,
}

impl FunctionType {
    pub fn new(name: &str, full_name: &str) -> FunctionType {
        FunctionType {
            name: name.to_string(),
            full_name: full_name.to_string(),
            params: Vec::new(),
            declared_return_type: None,
            flags: FunctionTypeFlags::empty(),
            decl: None,
            deprecation_message: None,
            docstring: None,
            type_var_scope_id: None,
            dataclass_behaviors: None,
        }
    }

    pub fn is_static_method(&self) -> bool {
        self.flags.contains(FunctionTypeFlags::STATIC_METHOD)
    }

    pub fn is_class_method(&self) -> bool {
        self.flags.contains(FunctionTypeFlags::CLASS_METHOD)
    }

    pub fn is_overloaded(&self) -> bool {
        self.flags.contains(FunctionTypeFlags::OVERLOADED)
    }

    pub fn is_abstract(&self) -> bool {
        self.flags.contains(FunctionTypeFlags::ABSTRACT_METHOD)
    }
}

/// One member entry in a class's symbol table.
#[derive(Clone, Debug)]
pub struct ClassMember {
    pub ty: TypeId,
    pub decl: Option<DeclId>,
    /// Excluded from structural-protocol matching (dunder plumbing that
    /// should not participate in protocol comparisons).
    pub excluded_from_protocol: bool,
}

impl ClassMember {
    pub fn new(ty: TypeId) -> ClassMember {
        ClassMember {
            ty,
            decl: None,
            excluded_from_protocol: false,
        }
    }
}

/// Accessor slot of a property: the accessor function paired with the
/// class that declared it.
#[derive(Clone, Debug)]
pub struct AccessorInfo {
    pub function: FunctionId,
    pub declared_in: Option<ClassId>,
}

/// Property-specific state attached to a synthesized property class.
#[derive(Clone, Debug, Default)]
pub struct PropertyInfo {
    pub fget: Option<AccessorInfo>,
    pub fset: Option<AccessorInfo>,
    pub fdel: Option<AccessorInfo>,
    /// True when the setter's accepted value type differs from the
    /// getter's returned type.
    pub is_asymmetric: bool,
    /// True when the getter is a classmethod, making this a class-scoped
    /// property.
    pub is_class_property: bool,
}

/// Behavior parameters recorded from a `dataclass_transform` call.
#[derive(Clone, Debug, Default)]
pub struct DataClassBehaviors {
    pub eq_default: bool,
    pub order_default: bool,
    pub kw_only_default: bool,
    pub frozen_default: bool,
    pub field_specifiers: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct ClassType {
    pub name: String,
    pub full_name: String,
    pub module_name: String,
    pub flags: ClassTypeFlags,
    /// Ordered base-class list.
    pub bases: Vec<ClassId>,
    /// Linearized method-resolution order, starting with this class.
    pub mro: Vec<ClassId>,
    /// Member symbol table. Insertion order is preserved for display but
    /// carries no semantic weight.
    pub members: IndexMap<String, ClassMember>,
    pub declared_metaclass: Option<ClassId>,
    pub effective_metaclass: Option<ClassId>,
    pub deprecation_message: Option<String>,
    pub dataclass_behaviors: Option<DataClassBehaviors>,
    pub type_var_scope_id: Option<TypeVarScopeId>,
    /// Present only on property objects.
    pub property: Option<PropertyInfo>,
}

impl ClassType {
    pub fn new(name: &str, full_name: &str, module_name: &str) -> ClassType {
        ClassType {
            name: name.to_string(),
            full_name: full_name.to_string(),
            module_name: module_name.to_string(),
            flags: ClassTypeFlags::empty(),
            bases: Vec::new(),
            mro: Vec::new(),
            members: IndexMap::new(),
            declared_metaclass: None,
            effective_metaclass: None,
            deprecation_message: None,
            dataclass_behaviors: None,
            type_var_scope_id: None,
            property: None,
        }
    }

    pub fn is_property(&self) -> bool {
        self.property.is_some()
    }
}
