//! Structural self-checks for the index arrays built by this crate.
//!
//! `validate_invariants` always runs the full O(n) check and reports the
//! first violation. `debug_assert_invariants` runs it only in debug builds or
//! with the `check-invariants` feature, and panics on failure; call it right
//! after a structure is built.

use crate::membership_error::MembershipError;

/// Validation hooks for index structures.
pub trait DebugInvariants {
    /// Check every invariant and return the first violation.
    fn validate_invariants(&self) -> Result<(), MembershipError>;

    /// Panic on a violation when invariant checking is compiled in.
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), std::any::type_name::<Self>());
    }
}

/// Run a fallible check and panic with `ctx` when it fails, but only when
/// invariant checking is compiled in.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $ctx:expr) => {
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!("[invariants] {}: {}", $ctx, e);
        }
    };
}
