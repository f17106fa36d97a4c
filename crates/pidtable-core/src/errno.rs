//! Error number definitions.
//!
//! The subset of `<errno.h>` codes this subsystem reports to its C-facing
//! callers, with thread-local errno storage.

use std::cell::Cell;

thread_local! {
    static ERRNO: Cell<i32> = const { Cell::new(0) };
}

/// No such process.
pub const ESRCH: i32 = 3;
/// Resource temporarily unavailable.
pub const EAGAIN: i32 = 11;
/// Out of memory.
pub const ENOMEM: i32 = 12;
/// Invalid argument.
pub const EINVAL: i32 = 22;
/// Resource deadlock would occur.
pub const EDEADLK: i32 = 35;

/// Returns the current thread-local errno value.
pub fn get_errno() -> i32 {
    ERRNO.get()
}

/// Sets the current thread-local errno value.
pub fn set_errno(value: i32) {
    ERRNO.set(value);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
