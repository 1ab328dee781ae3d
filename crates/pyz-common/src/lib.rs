//! Common types shared across the pyz workspace.

pub mod diagnostics;
pub mod errors;
pub mod limits;

pub use errors::InternalError;
