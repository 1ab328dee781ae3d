//! Type representation for the pyz checker.
//!
//! Types are interned in a [`TypeStore`] and addressed by [`TypeId`], so
//! type equality is an integer comparison. Function and class *records*
//! (signatures, member tables, flags) live in mutable arenas inside the
//! store; the checker's synthesis subsystems build new records and flip
//! flag bits on existing ones.

pub mod flags;
pub mod records;
pub mod store;

pub use flags::{ClassTypeFlags, FunctionTypeFlags};
pub use records::{
    AccessorInfo, ClassId, ClassMember, ClassType, DataClassBehaviors, FunctionId, FunctionParam,
    FunctionType, ParamCategory, PropertyInfo, TypeVarScopeId,
};
pub use store::{TypeData, TypeId, TypeStore};
