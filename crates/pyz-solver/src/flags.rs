//! Flag sets carried by function and class records.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct FunctionTypeFlags: u32 {
        /// Wrapped by `staticmethod` (explicitly or synthetically).
        const STATIC_METHOD = 1 << 0;
        /// Wrapped by `classmethod`.
        const CLASS_METHOD = 1 << 1;
        /// Decorated with `abstractmethod`.
        const ABSTRACT_METHOD = 1 << 2;
        /// Decorated with `typing.final`.
        const FINAL = 1 << 3;
        /// Decorated with `typing.override`.
        const OVERRIDDEN = 1 << 4;
        /// Decorated with `typing.overload`.
        const OVERLOADED = 1 << 5;
        /// Decorated with `typing.type_check_only`.
        const TYPE_CHECK_ONLY = 1 << 6;
        /// Decorated with `typing.no_type_check`; the body is not analyzed.
        const NO_TYPE_CHECK = 1 << 7;
        /// Created by the checker rather than declared in source.
        const SYNTHESIZED_METHOD = 1 << 8;
        /// `__init__` / `__new__`.
        const CONSTRUCTOR_METHOD = 1 << 9;
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct ClassTypeFlags: u32 {
        /// Declared in the builtins or typing stubs.
        const BUILT_IN = 1 << 0;
        /// `property` or a subclass of it; instances use the descriptor
        /// protocol synthesized by the checker.
        const PROPERTY_CLASS = 1 << 1;
        /// Decorated with `typing.final`.
        const FINAL = 1 << 2;
        /// Decorated with `typing.runtime_checkable`.
        const RUNTIME_CHECKABLE = 1 << 3;
        /// Decorated with `typing.type_check_only`.
        const TYPE_CHECK_ONLY = 1 << 4;
        /// The class object stands for "this class or any subclass"
        /// (`type[C]` rather than exactly `C`).
        const INCLUDE_SUBCLASSES = 1 << 5;
        /// Created by the checker rather than declared in source.
        const SYNTHESIZED = 1 << 6;
    }
}
