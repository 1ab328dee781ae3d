//! Declaration-surface synthesis.
//!
//! This crate turns raw declarations into their externally-visible typed
//! surface: it classifies and applies decorators, synthesizes property
//! objects and their descriptor protocol, accumulates `@overload` chains,
//! and fills in comparison methods for `@total_ordering` classes. It also
//! hosts the lexical-scope resolver and the flow-reachability queries the
//! rest of the checker leans on.
//!
//! Full type evaluation (expression inference, call evaluation,
//! assignability) lives behind the [`TypeEvalProvider`] trait; this crate
//! orchestrates it but never implements it.

pub mod decorators;
pub mod evaluator;
pub mod overloads;
pub mod properties;
pub mod reachability;
pub mod scope_resolver;
pub mod state;
pub mod total_ordering;

#[doc(hidden)]
pub mod test_fixtures;

pub use evaluator::{EvalFlags, TypeEvalProvider};
pub use scope_resolver::EvaluationScope;
pub use state::{BindResults, CheckerContext, CheckerOptions, CheckerState};
