//! The interning type store.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::flags::ClassTypeFlags;
use crate::records::{ClassId, ClassMember, ClassType, FunctionId, FunctionType};

/// Interned type identifier. Equality of `TypeId`s is equality of types:
/// intrinsics are pre-registered, and class-object/instance/function types
/// are cached per record so the same record always yields the same id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const UNKNOWN: TypeId = TypeId(0);
    pub const ANY: TypeId = TypeId(1);
    pub const NEVER: TypeId = TypeId(2);
    pub const NONE: TypeId = TypeId(3);
    pub const BOOL: TypeId = TypeId(4);
    pub const INT: TypeId = TypeId(5);
    pub const FLOAT: TypeId = TypeId(6);
    pub const STR: TypeId = TypeId(7);
    /// The `builtins.object` class object.
    pub const OBJECT_CLASS: TypeId = TypeId(8);
    /// An instance of `builtins.object`.
    pub const OBJECT: TypeId = TypeId(9);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeData {
    Unknown,
    Any,
    Never,
    NoneType,
    Bool,
    Int,
    Float,
    Str,
    /// The class object itself (what the class name evaluates to).
    Class(ClassId),
    /// An instance of the class.
    Instance(ClassId),
    Function(FunctionId),
    /// Ordered overload entries; at most one is the implementation.
    Overloaded(Vec<FunctionId>),
    Union(Vec<TypeId>),
}

pub struct TypeStore {
    datas: Vec<TypeData>,
    functions: Vec<FunctionType>,
    classes: Vec<ClassType>,
    class_object_cache: FxHashMap<u32, TypeId>,
    instance_cache: FxHashMap<u32, TypeId>,
    function_cache: FxHashMap<u32, TypeId>,
    union_cache: FxHashMap<Vec<u32>, TypeId>,
    object_class: ClassId,
}

impl TypeStore {
    pub fn new() -> TypeStore {
        let mut store = TypeStore {
            datas: vec![
                TypeData::Unknown,
                TypeData::Any,
                TypeData::Never,
                TypeData::NoneType,
                TypeData::Bool,
                TypeData::Int,
                TypeData::Float,
                TypeData::Str,
            ],
            functions: Vec::new(),
            classes: Vec::new(),
            class_object_cache: FxHashMap::default(),
            instance_cache: FxHashMap::default(),
            function_cache: FxHashMap::default(),
            union_cache: FxHashMap::default(),
            object_class: ClassId(0),
        };

        let mut object = ClassType::new("object", "builtins.object", "builtins");
        object.flags |= ClassTypeFlags::BUILT_IN;
        let object_id = store.add_class(object);
        store.class_mut(object_id).mro = vec![object_id];
        store.object_class = object_id;

        let class_ty = store.class_type(object_id);
        let instance_ty = store.instance_type(object_id);
        debug_assert_eq!(class_ty, TypeId::OBJECT_CLASS);
        debug_assert_eq!(instance_ty, TypeId::OBJECT);

        store
    }

    pub fn object_class(&self) -> ClassId {
        self.object_class
    }

    fn intern(&mut self, data: TypeData) -> TypeId {
        let id = TypeId(self.datas.len() as u32);
        self.datas.push(data);
        id
    }

    pub fn data(&self, id: TypeId) -> &TypeData {
        &self.datas[id.0 as usize]
    }

    // ========================================================================
    // Record arenas
    // ========================================================================

    pub fn add_function(&mut self, function: FunctionType) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        trace!(function = %function.full_name, id = id.0, "adding function record");
        self.functions.push(function);
        id
    }

    pub fn function(&self, id: FunctionId) -> &FunctionType {
        &self.functions[id.0 as usize]
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut FunctionType {
        &mut self.functions[id.0 as usize]
    }

    pub fn add_class(&mut self, class: ClassType) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        trace!(class = %class.full_name, id = id.0, "adding class record");
        self.classes.push(class);
        id
    }

    pub fn class(&self, id: ClassId) -> &ClassType {
        &self.classes[id.0 as usize]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassType {
        &mut self.classes[id.0 as usize]
    }

    // ========================================================================
    // Type construction (cached)
    // ========================================================================

    /// The class-object type for a class record.
    pub fn class_type(&mut self, class: ClassId) -> TypeId {
        if let Some(&ty) = self.class_object_cache.get(&class.0) {
            return ty;
        }
        let ty = self.intern(TypeData::Class(class));
        self.class_object_cache.insert(class.0, ty);
        ty
    }

    /// The instance type for a class record. Cached, so two requests for
    /// the same class compare equal by `TypeId`.
    pub fn instance_type(&mut self, class: ClassId) -> TypeId {
        if let Some(&ty) = self.instance_cache.get(&class.0) {
            return ty;
        }
        let ty = self.intern(TypeData::Instance(class));
        self.instance_cache.insert(class.0, ty);
        ty
    }

    pub fn function_type(&mut self, function: FunctionId) -> TypeId {
        if let Some(&ty) = self.function_cache.get(&function.0) {
            return ty;
        }
        let ty = self.intern(TypeData::Function(function));
        self.function_cache.insert(function.0, ty);
        ty
    }

    /// An overload set. Not deduplicated: each accumulation produces its
    /// own set identity.
    pub fn overloaded_type(&mut self, entries: Vec<FunctionId>) -> TypeId {
        debug_assert!(entries.len() > 1, "single entries are returned unwrapped");
        self.intern(TypeData::Overloaded(entries))
    }

    /// A union in member order. Cached by member sequence, so repeated
    /// requests for the same union compare equal by `TypeId`.
    pub fn union_type(&mut self, mut members: Vec<TypeId>) -> TypeId {
        members.dedup();
        if members.len() == 1 {
            return members[0];
        }
        let key: Vec<u32> = members.iter().map(|t| t.0).collect();
        if let Some(&ty) = self.union_cache.get(&key) {
            return ty;
        }
        let ty = self.intern(TypeData::Union(members));
        self.union_cache.insert(key, ty);
        ty
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Exact type identity. Interning makes this an integer comparison;
    /// deliberately stricter than assignability.
    pub fn is_same_type(&self, a: TypeId, b: TypeId) -> bool {
        a == b
    }

    pub fn function_id_of(&self, ty: TypeId) -> Option<FunctionId> {
        match self.data(ty) {
            TypeData::Function(id) => Some(*id),
            _ => None,
        }
    }

    pub fn overload_entries(&self, ty: TypeId) -> Option<&[FunctionId]> {
        match self.data(ty) {
            TypeData::Overloaded(entries) => Some(entries),
            _ => None,
        }
    }

    /// The class id when `ty` is an instantiable class object (not a
    /// `type[C]`-style "this or any subclass" reference).
    pub fn instantiable_class_of(&self, ty: TypeId) -> Option<ClassId> {
        match self.data(ty) {
            TypeData::Class(id)
                if !self
                    .class(*id)
                    .flags
                    .contains(ClassTypeFlags::INCLUDE_SUBCLASSES) =>
            {
                Some(*id)
            }
            _ => None,
        }
    }

    pub fn instance_class_of(&self, ty: TypeId) -> Option<ClassId> {
        match self.data(ty) {
            TypeData::Instance(id) => Some(*id),
            _ => None,
        }
    }

    /// Whether a type is wholly or partially unknown. Used by the
    /// decorator identity heuristics: an unannotated decorator whose call
    /// result is partly unknown is assumed to return its input unchanged.
    pub fn is_partly_unknown(&self, ty: TypeId) -> bool {
        match self.data(ty) {
            TypeData::Unknown => true,
            TypeData::Union(members) => members.iter().any(|&m| self.is_partly_unknown(m)),
            TypeData::Function(id) => {
                let f = self.function(*id);
                f.declared_return_type.is_none_or(|r| self.is_partly_unknown(r))
            }
            TypeData::Overloaded(entries) => entries.iter().any(|&e| {
                let f = self.function(e);
                f.declared_return_type.is_none_or(|r| self.is_partly_unknown(r))
            }),
            _ => false,
        }
    }

    /// Linearize the MRO of a class from its ordered base list:
    /// first-occurrence dedup over self followed by the bases' MROs.
    pub fn linearize_mro(&self, class: ClassId) -> Vec<ClassId> {
        let mut mro = vec![class];
        for &base in &self.class(class).bases {
            let base_mro = if self.class(base).mro.is_empty() {
                vec![base]
            } else {
                self.class(base).mro.clone()
            };
            for entry in base_mro {
                if !mro.contains(&entry) {
                    mro.push(entry);
                }
            }
        }
        mro
    }

    /// Look up a member by name along a class's MRO. Returns the declaring
    /// class alongside the member. Falls back to the local table when the
    /// MRO has not been linearized.
    pub fn lookup_member(&self, class: ClassId, name: &str) -> Option<(ClassId, &ClassMember)> {
        let mro = &self.class(class).mro;
        if mro.is_empty() {
            return self.class(class).members.get(name).map(|m| (class, m));
        }
        for &entry in mro {
            if let Some(member) = self.class(entry).members.get(name) {
                return Some((entry, member));
            }
        }
        None
    }

    /// Short printable form for diagnostics.
    pub fn display(&self, ty: TypeId) -> String {
        match self.data(ty) {
            TypeData::Unknown => "Unknown".to_string(),
            TypeData::Any => "Any".to_string(),
            TypeData::Never => "Never".to_string(),
            TypeData::NoneType => "None".to_string(),
            TypeData::Bool => "bool".to_string(),
            TypeData::Int => "int".to_string(),
            TypeData::Float => "float".to_string(),
            TypeData::Str => "str".to_string(),
            TypeData::Class(id) => format!("type[{}]", self.class(*id).name),
            TypeData::Instance(id) => self.class(*id).name.clone(),
            TypeData::Function(id) => self.function(*id).name.clone(),
            TypeData::Overloaded(entries) => {
                let name = entries
                    .first()
                    .map(|&e| self.function(e).name.as_str())
                    .unwrap_or("<overloads>");
                format!("Overload[{name}]")
            }
            TypeData::Union(members) => {
                let parts: Vec<String> = members.iter().map(|&m| self.display(m)).collect();
                parts.join(" | ")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intrinsics_are_preregistered() {
        let store = TypeStore::new();
        assert_eq!(store.data(TypeId::INT), &TypeData::Int);
        assert_eq!(store.data(TypeId::NONE), &TypeData::NoneType);
        assert!(matches!(store.data(TypeId::OBJECT), TypeData::Instance(_)));
    }

    #[test]
    fn instance_types_are_interned_per_class() {
        let mut store = TypeStore::new();
        let class = store.add_class(ClassType::new("C", "mod.C", "mod"));
        let a = store.instance_type(class);
        let b = store.instance_type(class);
        assert_eq!(a, b);
        assert!(store.is_same_type(a, b));

        let other = store.add_class(ClassType::new("D", "mod.D", "mod"));
        assert_ne!(store.instance_type(other), a);
    }

    #[test]
    fn mro_linearization_dedups_first_occurrence() {
        let mut store = TypeStore::new();
        let object = store.object_class();
        let base = store.add_class(ClassType::new("B", "mod.B", "mod"));
        store.class_mut(base).bases = vec![object];
        store.class_mut(base).mro = store.linearize_mro(base);

        let derived = store.add_class(ClassType::new("C", "mod.C", "mod"));
        store.class_mut(derived).bases = vec![base, object];
        let mro = store.linearize_mro(derived);
        assert_eq!(mro, vec![derived, base, object]);
    }

    #[test]
    fn member_lookup_walks_mro() {
        let mut store = TypeStore::new();
        let base = store.add_class(ClassType::new("B", "mod.B", "mod"));
        store
            .class_mut(base)
            .members
            .insert("__lt__".to_string(), ClassMember::new(TypeId::BOOL));
        store.class_mut(base).mro = vec![base];

        let derived = store.add_class(ClassType::new("C", "mod.C", "mod"));
        store.class_mut(derived).bases = vec![base];
        store.class_mut(derived).mro = store.linearize_mro(derived);

        let (declaring, member) = store.lookup_member(derived, "__lt__").unwrap();
        assert_eq!(declaring, base);
        assert_eq!(member.ty, TypeId::BOOL);
        assert!(store.lookup_member(derived, "__gt__").is_none());
    }
}
