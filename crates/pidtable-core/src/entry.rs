//! Per-entity identity and exit record.

use std::sync::Arc;

use parking_lot::Condvar;

use crate::limits::{INVALID_PID, Pid};

/// Recognizably bogus status an entry carries until exit records the real one.
pub(crate) const STATUS_UNSET: i32 = 0xbaad;

/// Identity, parent link, and exit state for one process id.
///
/// An entry whose parent link is [`INVALID_PID`] is orphaned: the parent has
/// detached, vanished, or never existed, and nobody will ever join it. Once
/// such an entry is also exited it may be reclaimed.
#[derive(Debug)]
pub(crate) struct PidEntry {
    /// Id of this entity. Assigned once, immutable.
    pub(crate) pid: Pid,
    /// Id of the recorded parent, or [`INVALID_PID`] when orphaned.
    pub(crate) ppid: Pid,
    /// Set exactly once by exit; monotonic.
    pub(crate) exited: bool,
    /// Valid only once `exited` is true.
    pub(crate) exit_status: i32,
    /// Set exactly once by detach; monotonic.
    pub(crate) detached: bool,
    /// Notification point for joiners, always used with the table lock.
    ///
    /// Held through an `Arc` so a joiner woken by exit keeps the condvar
    /// alive even if the entry is reclaimed before it reacquires the lock.
    pub(crate) exit_waiters: Arc<Condvar>,
}

impl PidEntry {
    pub(crate) fn new(pid: Pid, ppid: Pid) -> Self {
        assert!(pid != INVALID_PID, "entry created with the sentinel id");
        Self {
            pid,
            ppid,
            exited: false,
            exit_status: STATUS_UNSET,
            detached: false,
            exit_waiters: Arc::new(Condvar::new()),
        }
    }

    /// True once the entry may be destroyed: exited and orphaned.
    #[must_use]
    pub(crate) fn reclaimable(&self) -> bool {
        self.exited && self.ppid == INVALID_PID
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
