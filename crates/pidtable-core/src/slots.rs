//! Fixed-capacity slot storage for pid entries.
//!
//! A deliberately simple hash table: one slot per `pid % PROCS_MAX`, at most
//! one entry per slot, no chaining. A candidate id that collides with a live
//! entry is simply not used by the allocator. This is the state guarded by
//! the table mutex; every method here requires the caller to hold it.

use crate::entry::PidEntry;
use crate::limits::{INVALID_PID, PID_MAX, PID_MIN, PROCS_MAX, Pid, slot_of};

/// Slot array, live-entry count, and the allocator's rotating cursor.
#[derive(Debug)]
pub(crate) struct SlotTable {
    slots: Vec<Option<PidEntry>>,
    /// Number of live entries; maintained by insert/remove.
    live: usize,
    /// Next candidate id for allocation; wraps within `[PID_MIN, PID_MAX]`.
    next_pid: Pid,
}

impl SlotTable {
    pub(crate) fn new() -> Self {
        let mut slots = Vec::with_capacity(PROCS_MAX);
        slots.resize_with(PROCS_MAX, || None);
        Self {
            slots,
            live: 0,
            next_pid: PID_MIN,
        }
    }

    /// Look an entry up by id.
    ///
    /// Returns `None` for an empty slot and for a slot whose occupant has a
    /// different id, so a stale or foreign id is never mistaken for a live
    /// entry that happens to share its slot.
    pub(crate) fn get(&self, pid: Pid) -> Option<&PidEntry> {
        assert!(pid >= 0, "lookup of negative pid {pid}");
        assert!(pid != INVALID_PID, "lookup of the sentinel id");
        self.slots[slot_of(pid)].as_ref().filter(|e| e.pid == pid)
    }

    pub(crate) fn get_mut(&mut self, pid: Pid) -> Option<&mut PidEntry> {
        assert!(pid >= 0, "lookup of negative pid {pid}");
        assert!(pid != INVALID_PID, "lookup of the sentinel id");
        self.slots[slot_of(pid)].as_mut().filter(|e| e.pid == pid)
    }

    /// Store a new entry. The target slot must be empty.
    pub(crate) fn insert(&mut self, entry: PidEntry) {
        let slot = slot_of(entry.pid);
        assert!(
            self.slots[slot].is_none(),
            "pid {} hashes to occupied slot {slot}",
            entry.pid
        );
        self.slots[slot] = Some(entry);
        self.live += 1;
    }

    /// Remove and destroy the entry for `pid`, freeing its slot and its
    /// notification handle. The entry must be exited and orphaned.
    pub(crate) fn remove(&mut self, pid: Pid) {
        let slot = slot_of(pid);
        let entry = self.slots[slot]
            .as_ref()
            .unwrap_or_else(|| panic!("remove of empty slot {slot}"));
        assert_eq!(entry.pid, pid, "remove of pid {pid} found a foreign entry");
        assert!(
            entry.reclaimable(),
            "remove of pid {pid} before it exited and was orphaned"
        );
        self.slots[slot] = None;
        self.live -= 1;
    }

    /// True if the slot `pid` hashes to holds any entry at all.
    pub(crate) fn slot_occupied(&self, pid: Pid) -> bool {
        self.slots[slot_of(pid)].is_some()
    }

    pub(crate) fn live(&self) -> usize {
        self.live
    }

    pub(crate) fn cursor(&self) -> Pid {
        self.next_pid
    }

    /// Advance the candidate cursor, wrapping within the valid id range.
    pub(crate) fn advance_cursor(&mut self) {
        self.next_pid += 1;
        if self.next_pid > PID_MAX {
            self.next_pid = PID_MIN;
        }
    }

    /// Ids of every live entry whose recorded parent is `parent`.
    pub(crate) fn children_of(&self, parent: Pid) -> Vec<Pid> {
        self.slots
            .iter()
            .flatten()
            .filter(|e| e.ppid == parent)
            .map(|e| e.pid)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
