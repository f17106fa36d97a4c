//! Process-id space configuration.
//!
//! Defines the bounded id namespace the table manages: the sentinel id, the
//! reserved bootup id, the live id range, and the table capacity.

/// Process identifier type.
pub type Pid = i32;

/// Sentinel meaning "no id" / "no tracked parent".
pub const INVALID_PID: Pid = 0;

/// Reserved id of the first, parentless entity created at bootstrap.
pub const BOOTUP_PID: Pid = 1;

/// Smallest id the allocator may hand out.
pub const PID_MIN: Pid = 2;

/// Largest id the allocator may hand out.
pub const PID_MAX: Pid = 32767;

/// Table capacity: at most this many ids are live at once.
pub const PROCS_MAX: usize = 128;

/// Returns true if `pid` lies in the allocatable range `[PID_MIN, PID_MAX]`.
///
/// The sentinel and the bootup id are outside this range by construction.
#[must_use]
pub const fn pid_in_range(pid: Pid) -> bool {
    pid >= PID_MIN && pid <= PID_MAX
}

/// Table slot addressed by an id: `pid % PROCS_MAX`.
#[must_use]
pub const fn slot_of(pid: Pid) -> usize {
    (pid as usize) % PROCS_MAX
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
