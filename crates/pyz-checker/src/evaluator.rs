//! The boundary to the full type evaluator.
//!
//! Decorator and property synthesis needs expression evaluation, call
//! evaluation, assignability, and method binding, but none of those are
//! implemented here. They are consumed through [`TypeEvalProvider`] so the
//! synthesis engine can be driven by the real evaluator in production and
//! by a scripted fake in tests.

use bitflags::bitflags;
use pyz_binder::DeclId;
use pyz_parser::NodeIndex;
use pyz_solver::{FunctionId, TypeId, TypeStore};

bitflags! {
    /// Evaluation-context flags passed through to the evaluator.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct EvalFlags: u32 {
        /// Names may refer to declarations that appear later in the file.
        /// Set when evaluating inside stub files.
        const ALLOW_FORWARD_REFERENCES = 1 << 0;
        /// Evaluate the expression as a call target rather than a value.
        /// A bare decorator name is implicitly invoked, so its type is
        /// resolved with call semantics even without parentheses.
        const CALLEE_ONLY = 1 << 1;
    }
}

/// Services the synthesis engine requires from the surrounding type
/// evaluator.
///
/// Implementations are expected to memoize: `evaluate_declaration_type`
/// in particular is called once per earlier declaration during overload
/// accumulation and must be cheap on repeat calls.
pub trait TypeEvalProvider {
    /// The type of an expression node.
    fn evaluate_expression_type(
        &mut self,
        types: &mut TypeStore,
        node: NodeIndex,
        flags: EvalFlags,
    ) -> TypeId;

    /// The result type of calling `callee` with the given argument types.
    /// `None` when the call cannot be evaluated (no matching signature,
    /// callee not callable).
    fn call_type(
        &mut self,
        types: &mut TypeStore,
        callee: TypeId,
        args: &[TypeId],
        node: NodeIndex,
    ) -> Option<TypeId>;

    /// Whether `src` is assignable to `dest`. On failure, human-readable
    /// detail lines are appended to `addenda` when provided.
    fn is_assignable(
        &mut self,
        types: &TypeStore,
        dest: TypeId,
        src: TypeId,
        addenda: Option<&mut Vec<String>>,
    ) -> bool;

    /// Bind a method to a receiver, producing the bound signature.
    /// `None` when binding fails.
    fn bind_method_to_receiver(
        &mut self,
        types: &mut TypeStore,
        receiver: TypeId,
        function: FunctionId,
    ) -> Option<TypeId>;

    /// Force evaluation of a declaration's type. Used to evaluate earlier
    /// overload entries in source order. `None` when the declaration has
    /// no evaluatable type.
    fn evaluate_declaration_type(&mut self, types: &mut TypeStore, decl: DeclId) -> Option<TypeId>;
}
