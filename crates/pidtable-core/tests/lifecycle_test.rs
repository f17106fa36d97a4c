//! Multi-threaded lifecycle tests: blocking join, broadcast wakeup, and
//! concurrent allocation against one shared table.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use pidtable_core::limits::pid_in_range;
use pidtable_core::{BOOTUP_PID, JoinOutcome, Pid, PidTable, WNOHANG};

#[test]
fn blocking_join_suspends_until_exit() {
    let table = Arc::new(PidTable::new());
    let child = table.allocate(BOOTUP_PID).unwrap();
    let joiner_pid = table.allocate(BOOTUP_PID).unwrap();

    let returned = Arc::new(AtomicBool::new(false));
    let barrier = Arc::new(Barrier::new(2));

    let joiner = {
        let table = Arc::clone(&table);
        let returned = Arc::clone(&returned);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            let outcome = table.join(joiner_pid, child, 0);
            returned.store(true, Ordering::Release);
            outcome
        })
    };

    barrier.wait();
    thread::sleep(Duration::from_millis(50));
    assert!(
        !returned.load(Ordering::Acquire),
        "join returned before the target exited"
    );

    table.exit(child, 0x2a00, false);

    let outcome = joiner.join().unwrap();
    assert_eq!(
        outcome,
        Ok(JoinOutcome::Exited {
            pid: child,
            status: 0x2a00
        })
    );
}

#[test]
fn exit_wakes_every_blocked_joiner() {
    const JOINERS: usize = 3;

    let table = Arc::new(PidTable::new());
    let child = table.allocate(BOOTUP_PID).unwrap();
    let barrier = Arc::new(Barrier::new(JOINERS + 1));

    let joiners: Vec<_> = (0..JOINERS)
        .map(|_| {
            let caller = table.allocate(BOOTUP_PID).unwrap();
            let table = Arc::clone(&table);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                table.join(caller, child, 0)
            })
        })
        .collect();

    barrier.wait();
    thread::sleep(Duration::from_millis(50));
    table.exit(child, 0x0700, false);

    for joiner in joiners {
        assert_eq!(
            joiner.join().unwrap(),
            Ok(JoinOutcome::Exited {
                pid: child,
                status: 0x0700
            })
        );
    }
}

#[test]
fn nonblocking_join_returns_immediately() {
    let table = Arc::new(PidTable::new());
    let child = table.allocate(BOOTUP_PID).unwrap();

    // If WNOHANG blocked, this join handle would never resolve.
    let handle = {
        let table = Arc::clone(&table);
        thread::spawn(move || table.join(BOOTUP_PID, child, WNOHANG))
    };
    assert_eq!(handle.join().unwrap(), Ok(JoinOutcome::NotReady));
}

#[test]
fn concurrent_allocation_yields_distinct_ids() {
    const THREADS: usize = 4;
    const PER_THREAD: usize = 16;

    let table = Arc::new(PidTable::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let table = Arc::clone(&table);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..PER_THREAD)
                    .map(|_| table.allocate(BOOTUP_PID).unwrap())
                    .collect::<Vec<Pid>>()
            })
        })
        .collect();

    let mut all: Vec<Pid> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    assert_eq!(all.len(), THREADS * PER_THREAD);
    assert!(all.iter().copied().all(pid_in_range));

    all.sort_unstable();
    all.dedup();
    assert_eq!(all.len(), THREADS * PER_THREAD, "an id was handed out twice");
}

#[test]
fn joiner_of_a_cascade_detached_child_gets_no_status() {
    let table = Arc::new(PidTable::new());
    let parent = table.allocate(BOOTUP_PID).unwrap();
    let child = table.allocate(parent).unwrap();
    let watcher = table.allocate(BOOTUP_PID).unwrap();
    let barrier = Arc::new(Barrier::new(2));

    let joiner = {
        let table = Arc::clone(&table);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            table.join(watcher, child, 0)
        })
    };

    barrier.wait();
    thread::sleep(Duration::from_millis(50));

    // The parent's exit orphans the child; the child's own exit then
    // reclaims it on the spot, before the woken joiner gets the lock back.
    table.exit(parent, 0, true);
    table.exit(child, 9, false);

    let res = joiner.join().unwrap();
    assert!(
        res.is_err(),
        "a reclaimed target must not deliver a status, got {res:?}"
    );
    // The child's entry really is gone.
    assert_eq!(
        table.join(BOOTUP_PID, child, 0),
        Err(pidtable_core::PidError::NotFound)
    );
}
