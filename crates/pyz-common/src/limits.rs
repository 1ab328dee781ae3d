//! Hard limits protecting against pathological or corrupted inputs.

/// Upper bound on upward parent-pointer walks. A well-formed tree never
/// approaches this; hitting it indicates a parent-pointer cycle.
pub const MAX_TREE_WALK_ITERATIONS: u32 = 100_000;

/// Upper bound on the number of entries accumulated into one overload set.
pub const MAX_OVERLOAD_COUNT: usize = 512;
