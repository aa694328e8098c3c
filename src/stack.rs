//! Stack growth for the recursive parser and evaluator
//!
//! Deeply nested source or long chains of Lox calls recurse once per level on
//! the host stack. Entry points of that recursion run through
//! [`ensure_sufficient_stack`], which moves onto a freshly allocated segment
//! when the remaining stack gets low.

/// Grow when less than this is left.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Runs `f`, first growing the stack if fewer than [`RED_ZONE`] bytes remain.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// wasm manages its own stack
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
