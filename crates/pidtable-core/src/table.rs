//! The pid table service.
//!
//! One owned object holds every entity record behind a single mutex; each
//! entity carries its own condvar, always used with that same mutex, to wake
//! joiners when the entity exits (monitor pattern: many condition points,
//! one lock).
//!
//! Lifecycle: an id is minted by [`PidTable::allocate`] before its thread is
//! spawned; the thread's termination path calls [`PidTable::exit`]; any
//! thread may call [`PidTable::join`] to collect a specific id's status; the
//! recorded parent may sever the relationship early with
//! [`PidTable::detach`]. An entry is destroyed only once it is both exited
//! and orphaned, from whichever of detach or exit establishes that state
//! last. [`PidTable::deallocate`] short-circuits the whole protocol for an
//! id whose thread never started running.

use std::sync::Arc;

use log::{debug, trace};
use parking_lot::Mutex;

use crate::entry::PidEntry;
use crate::error::PidError;
use crate::limits::{BOOTUP_PID, INVALID_PID, PID_MIN, PROCS_MAX, Pid, pid_in_range};
use crate::slots::SlotTable;
use crate::wait::{JoinOutcome, WNOHANG, sanitize_join_flags};

/// Status recorded for a reserved id whose thread never ran.
pub(crate) const STATUS_NEVER_RAN: i32 = 0xdead;

/// Process-id allocation and exit-status coordination.
pub struct PidTable {
    inner: Mutex<SlotTable>,
}

impl PidTable {
    /// Bootstrap an empty table holding only the reserved bootup entity,
    /// which has no parent and is never reclaimed.
    #[must_use]
    pub fn new() -> Self {
        let mut slots = SlotTable::new();
        slots.insert(PidEntry::new(BOOTUP_PID, INVALID_PID));
        debug!("pid table bootstrapped, capacity {PROCS_MAX}");
        Self {
            inner: Mutex::new(slots),
        }
    }

    /// Allocate a fresh id recording `parent` as its parent.
    ///
    /// Candidate ids are probed linearly from a rotating cursor; an id whose
    /// slot is occupied by a collision is skipped, never chained. Fails with
    /// `ResourceExhausted` when the table is at capacity and `OutOfMemory`
    /// when entity construction fails.
    pub fn allocate(&self, parent: Pid) -> Result<Pid, PidError> {
        assert!(
            parent != INVALID_PID,
            "allocation requires a caller with a valid pid"
        );

        let mut inner = self.inner.lock();

        if inner.live() == PROCS_MAX {
            return Err(PidError::ResourceExhausted);
        }

        // The exhaustion check above bounds this loop; the probe cap only
        // fires if the live count is corrupt.
        let mut probes = 0;
        while inner.slot_occupied(inner.cursor()) {
            assert!(probes < PROCS_MAX * 2 + 5, "pid table live count is corrupt");
            probes += 1;
            trace!("candidate pid {} collides, probing on", inner.cursor());
            inner.advance_cursor();
        }

        let pid = inner.cursor();
        inner.insert(PidEntry::new(pid, parent));
        inner.advance_cursor();

        debug!("allocated pid {pid}, parent {parent}");
        Ok(pid)
    }

    /// Reverse an allocation for an id whose thread never started running,
    /// for example after a failed spawn.
    ///
    /// The entry is force-marked exited with a recognizable sentinel status,
    /// orphaned, and reclaimed immediately; the normal exit path can never
    /// run for it. `caller` must be the recorded parent and the entry must
    /// not have exited; violating either is a fatal contract breach.
    pub fn deallocate(&self, caller: Pid, pid: Pid) {
        assert!(pid_in_range(pid), "deallocate of out-of-range pid {pid}");

        let mut inner = self.inner.lock();

        let entry = inner
            .get_mut(pid)
            .unwrap_or_else(|| panic!("deallocate of absent pid {pid}"));
        assert!(!entry.exited, "deallocate of exited pid {pid}");
        assert_eq!(entry.ppid, caller, "deallocate by a non-parent");

        entry.exit_status = STATUS_NEVER_RAN;
        entry.exited = true;
        entry.ppid = INVALID_PID;
        inner.remove(pid);

        debug!("deallocated never-run pid {pid}");
    }

    /// Disavow interest in `child`'s exit status so it can be reclaimed as
    /// soon as it exits. Only the recorded parent may detach.
    ///
    /// Fails with `InvalidArgument` for a reserved or below-range id, an
    /// already-orphaned child, or a caller that is not the recorded parent,
    /// and with `NotFound` when no live entry carries the id. If the child
    /// has already exited it is reclaimed as part of this call.
    pub fn detach(&self, caller: Pid, child: Pid) -> Result<(), PidError> {
        let mut inner = self.inner.lock();

        if child == INVALID_PID || child == BOOTUP_PID || child < PID_MIN {
            return Err(PidError::InvalidArgument);
        }

        let Some(entry) = inner.get_mut(child) else {
            return Err(PidError::NotFound);
        };
        if entry.ppid == INVALID_PID {
            // Already detached; not repeatable.
            return Err(PidError::InvalidArgument);
        }
        if entry.ppid != caller {
            return Err(PidError::InvalidArgument);
        }

        entry.ppid = INVALID_PID;
        entry.detached = true;
        let exited = entry.exited;
        if exited {
            inner.remove(child);
        }

        debug!("pid {child} detached by {caller}, exited {exited}");
        Ok(())
    }

    /// Record the calling entity's exit.
    ///
    /// Sets the final status, optionally detaches every live child, wakes
    /// every joiner blocked on this id, and reclaims the entry at once if it
    /// was already detached. Must be called exactly once, by the entity
    /// itself; a missing entry or a second exit is a fatal contract breach.
    ///
    /// The child pass is best-effort: candidates are snapshotted under the
    /// lock, then detached one by one without it, so children created or
    /// reparented concurrently are not guaranteed to be covered.
    pub fn exit(&self, caller: Pid, status: i32, detach_children: bool) {
        let mut inner = self.inner.lock();

        let me = inner
            .get_mut(caller)
            .unwrap_or_else(|| panic!("exit by pid {caller} with no live entry"));
        assert!(!me.exited, "double exit of pid {caller}");
        me.exited = true;
        me.exit_status = status;

        let children = if detach_children {
            inner.children_of(caller)
        } else {
            Vec::new()
        };
        drop(inner);

        for child in children {
            // A child that slipped out of the snapshot fails the detach
            // ladder; that is fine.
            let _ = self.detach(caller, child);
        }

        let mut inner = self.inner.lock();
        let me = inner
            .get_mut(caller)
            .unwrap_or_else(|| panic!("exited pid {caller} reclaimed before notification"));
        let waiters = Arc::clone(&me.exit_waiters);

        debug!("pid {caller} exited, status {status:#x}");
        waiters.notify_all();

        if me.detached {
            me.ppid = INVALID_PID;
            inner.remove(caller);
        }
    }

    /// Retrieve `target`'s exit status, blocking until it exits unless the
    /// `WNOHANG` flag asks for an immediate [`JoinOutcome::NotReady`].
    ///
    /// Fails with `InvalidArgument` for a reserved or out-of-range id and
    /// for a detached target, `NotFound` when no live entry carries the id,
    /// and `Deadlock` when `target` is the caller itself. Joining leaves the
    /// entry in place; reclamation stays with the detach/exit pair.
    pub fn join(&self, caller: Pid, target: Pid, flags: i32) -> Result<JoinOutcome, PidError> {
        let flags = sanitize_join_flags(flags);
        let mut inner = self.inner.lock();

        if target == INVALID_PID || target == BOOTUP_PID || !pid_in_range(target) {
            return Err(PidError::InvalidArgument);
        }

        let Some(entry) = inner.get(target) else {
            return Err(PidError::NotFound);
        };
        if entry.ppid == INVALID_PID {
            // Detached entities are not joinable by contract.
            return Err(PidError::InvalidArgument);
        }
        if target == caller {
            return Err(PidError::Deadlock);
        }

        if !entry.exited {
            if flags & WNOHANG != 0 {
                return Ok(JoinOutcome::NotReady);
            }
            let waiters = Arc::clone(&entry.exit_waiters);
            trace!("pid {caller} waiting for pid {target}");
            // parking_lot condvars do not wake spuriously; one wait per
            // broadcast is enough.
            waiters.wait(&mut inner);
        }

        // Re-look the target up: in the window between the exit broadcast
        // and reacquiring the lock here, the parent may have detached it and
        // triggered reclamation.
        match inner.get(target) {
            Some(entry) if entry.exited => Ok(JoinOutcome::Exited {
                pid: target,
                status: entry.exit_status,
            }),
            _ => Err(PidError::NotFound),
        }
    }

    /// Reports whether `target`'s recorded parent is `candidate_parent`.
    ///
    /// Read-only; an absent, reserved, or out-of-range target reports false.
    pub fn is_parent_of(&self, target: Pid, candidate_parent: Pid) -> bool {
        if target != BOOTUP_PID && !pid_in_range(target) {
            return false;
        }
        let inner = self.inner.lock();
        inner
            .get(target)
            .is_some_and(|entry| entry.ppid == candidate_parent)
    }
}

impl Default for PidTable {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
