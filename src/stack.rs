//! Stack growth for the recursive parser and interpreter.
//!
//! Deeply nested fragments recurse once per level in both the parser and the
//! tree walker. [`ensure_sufficient_stack`] moves the rest of the recursion
//! onto a fresh heap-allocated segment when the current stack runs low, so
//! nesting is bounded by the explicit limits rather than by the thread's
//! stack size.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
