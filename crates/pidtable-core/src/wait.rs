//! Join flags and wait-status encoding.
//!
//! Implements the `WNOHANG`-style join flag, flag validators, and the
//! wait-status bit layout the exit path encodes results with.

use crate::limits::Pid;

/// `WNOHANG` — return immediately instead of blocking when the target has
/// not exited yet.
pub const WNOHANG: i32 = 1;

/// Mask of recognized join flag bits.
const JOIN_FLAGS_MASK: i32 = WNOHANG;

/// Returns true if `flags` contains only recognized join flags.
#[must_use]
pub const fn valid_join_flags(flags: i32) -> bool {
    (flags & !JOIN_FLAGS_MASK) == 0
}

/// Sanitize join flags by masking to recognized bits.
///
/// Unrecognized bits are ignored, not an error.
#[must_use]
pub const fn sanitize_join_flags(flags: i32) -> i32 {
    flags & JOIN_FLAGS_MASK
}

/// Result of a successful join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The target has exited; its id and final status.
    Exited { pid: Pid, status: i32 },
    /// Non-blocking join found the target still running.
    NotReady,
}

// ---------------------------------------------------------------------------
// Wait-status codec (low 7 bits = signal, exit code in bits 8..16)
// ---------------------------------------------------------------------------

/// Encode a normal exit with the given code.
#[must_use]
pub const fn encode_exit(code: i32) -> i32 {
    (code & 0xff) << 8
}

/// True if the status records a normal exit.
#[must_use]
pub const fn is_exit(status: i32) -> bool {
    (status & 0x7f) == 0
}

/// Exit code of a normal exit (valid only when `is_exit`).
#[must_use]
pub const fn exit_code(status: i32) -> i32 {
    (status >> 8) & 0xff
}

/// Encode termination by the given signal number.
#[must_use]
pub const fn encode_signal(sig: i32) -> i32 {
    sig & 0x7f
}

/// True if the status records termination by a signal.
#[must_use]
pub const fn is_signal(status: i32) -> bool {
    let low7 = status & 0x7f;
    low7 != 0 && low7 != 0x7f
}

/// Signal number that terminated the entity (valid only when `is_signal`).
#[must_use]
pub const fn signal_number(status: i32) -> i32 {
    status & 0x7f
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
