//! Opaque handle to a host expression.

use std::fmt;

/// Opaque handle to a pre-compiled host expression.
///
/// Patterns embed host-language expressions (literal values, pin
/// expressions, constant guards) by id only. The `ExprArena` in
/// `trellis_eval` maps ids to thunks; this crate never evaluates anything.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    /// Create from a raw index.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        ExprId(raw)
    }

    /// Get the raw index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into the owning arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}
