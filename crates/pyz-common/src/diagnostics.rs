//! Diagnostic types produced by the binder and checker.
//!
//! Diagnostics are always non-fatal: reporting one never aborts the
//! operation that produced it. Fatal conditions use
//! [`crate::errors::InternalError`] instead.

use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Information,
}

/// A single reported defect in user code, attached to a source range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

/// Secondary location or addendum attached to a diagnostic, e.g. the
/// per-accessor mismatch details accumulated by property compatibility
/// checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
}

impl Diagnostic {
    pub fn error(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            file: file.into(),
            start,
            length,
            message_text: message.into(),
            related_information: Vec::new(),
        }
    }

    pub fn warning(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Warning,
            ..Self::error(file, start, length, message, code)
        }
    }

    pub fn with_related(
        mut self,
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
    ) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            file: file.into(),
            start,
            length,
            message_text: message.into(),
        });
        self
    }
}

/// Substitute `{0}`, `{1}`, ... placeholders in a diagnostic message.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut out = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        out = out.replace(&format!("{{{i}}}"), arg);
    }
    out
}

pub mod diagnostic_codes {
    //! Stable numeric codes for checker diagnostics.

    pub const OVERLOAD_ABSTRACT_MISMATCH: u32 = 2801;
    pub const PROPERTY_SETTER_TYPE_MISMATCH: u32 = 2802;
    pub const SETTER_ON_STATIC_METHOD: u32 = 2803;
    pub const DELETER_ON_STATIC_METHOD: u32 = 2804;
    pub const ACCESSOR_ON_NON_PROPERTY: u32 = 2805;
    pub const TOTAL_ORDERING_MISSING_METHOD: u32 = 2806;
    pub const PROPERTY_MISSING_ACCESSOR: u32 = 2807;
    pub const PROPERTY_ACCESSOR_INCOMPATIBLE: u32 = 2808;
}

pub mod diagnostic_messages {
    //! Message templates matching `diagnostic_codes` entries.

    pub const OVERLOAD_ABSTRACT_MISMATCH: &str =
        "Overloaded implementations of '{0}' are inconsistent in their use of @abstractmethod.";
    pub const PROPERTY_SETTER_TYPE_MISMATCH: &str =
        "Declared return type of property getter '{0}' differs from the value type accepted by its setter.";
    pub const SETTER_ON_STATIC_METHOD: &str =
        "Property setter for '{0}' cannot be a static method.";
    pub const DELETER_ON_STATIC_METHOD: &str =
        "Property deleter for '{0}' cannot be a static method.";
    pub const ACCESSOR_ON_NON_PROPERTY: &str =
        "'{0}' accessor decorator can only be applied to a property.";
    pub const TOTAL_ORDERING_MISSING_METHOD: &str =
        "Class decorated with total_ordering must define at least one of '__lt__', '__le__', '__gt__' or '__ge__'.";
    pub const PROPERTY_MISSING_ACCESSOR: &str = "Property '{0}' has no '{1}' accessor.";
    pub const PROPERTY_ACCESSOR_INCOMPATIBLE: &str =
        "'{0}' accessor of property '{1}' is incompatible.";
}
