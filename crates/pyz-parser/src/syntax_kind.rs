//! Node kind constants.
//!
//! Kinds are plain `u16` values (not an enum) so `Node` stays `Copy` and
//! kind checks compile to integer comparisons, matching the arena's
//! branch-heavy traversal code.

pub const UNKNOWN: u16 = 0;
pub const MODULE: u16 = 1;
pub const SUITE: u16 = 2;
pub const CLASS_DEF: u16 = 3;
pub const FUNCTION_DEF: u16 = 4;
pub const LAMBDA: u16 = 5;
pub const COMPREHENSION: u16 = 6;
pub const COMPREHENSION_FOR: u16 = 7;
pub const COMPREHENSION_IF: u16 = 8;
pub const PARAMETER: u16 = 9;
pub const TYPE_PARAMETER_LIST: u16 = 10;
pub const TYPE_PARAMETER: u16 = 11;
pub const DECORATOR: u16 = 12;
pub const CALL: u16 = 13;
pub const ARGUMENT: u16 = 14;
pub const MEMBER_ACCESS: u16 = 15;
pub const NAME: u16 = 16;
pub const NUMBER_LITERAL: u16 = 17;
pub const STRING_LITERAL: u16 = 18;
pub const ASSIGNMENT: u16 = 19;
pub const RETURN_STATEMENT: u16 = 20;
pub const PASS_STATEMENT: u16 = 21;
pub const EXPRESSION_STATEMENT: u16 = 22;
