//! Limits and tunables for the value model.
//!
//! Mirrors Lua 5.5's `llimits.h` for the constants that still apply
//! outside of a VM.

/// Maximum depth for __index / __newindex metamethod chains.
/// Prevents infinite loops in metamethod resolution.
/// Matches Lua 5.5's MAXTAGLOOP.
pub const MAXTAGLOOP: usize = 2000;

/// Number of statically typed slots in one MultiReturns layer.
/// Positions past this live in the rest continuation.
pub const MULTI_RETURNS_TYPED_ARITY: usize = 7;

#[derive(Debug, Clone)]
pub struct SafeOption {
    /// Maximum number of `__index` / `__newindex` hops before giving up
    pub max_tag_loop: usize,
}

impl Default for SafeOption {
    fn default() -> Self {
        Self {
            max_tag_loop: MAXTAGLOOP,
        }
    }
}
