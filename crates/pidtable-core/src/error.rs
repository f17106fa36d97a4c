//! Error taxonomy for the pid table.
//!
//! Every recoverable failure an operation can report is one of these kinds;
//! internal invariant violations are not errors and abort instead.

use thiserror::Error;

use crate::errno;

/// Caller-visible failures of the pid table operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PidError {
    /// Malformed, reserved, or out-of-range id, or an already-detached target.
    #[error("invalid argument")]
    InvalidArgument,
    /// No live entity carries the requested id.
    #[error("no such process")]
    NotFound,
    /// The caller attempted to join itself.
    #[error("resource deadlock would occur")]
    Deadlock,
    /// The table is at capacity; no id can be allocated.
    #[error("process table is full")]
    ResourceExhausted,
    /// Entity allocation failed under memory pressure.
    #[error("out of memory")]
    OutOfMemory,
}

impl PidError {
    /// The classic errno code for this error.
    #[must_use]
    pub const fn errno(self) -> i32 {
        match self {
            PidError::InvalidArgument => errno::EINVAL,
            PidError::NotFound => errno::ESRCH,
            PidError::Deadlock => errno::EDEADLK,
            PidError::ResourceExhausted => errno::EAGAIN,
            PidError::OutOfMemory => errno::ENOMEM,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_mapping_matches_contract() {
        assert_eq!(PidError::InvalidArgument.errno(), errno::EINVAL);
        assert_eq!(PidError::NotFound.errno(), errno::ESRCH);
        assert_eq!(PidError::Deadlock.errno(), errno::EDEADLK);
        assert_eq!(PidError::ResourceExhausted.errno(), errno::EAGAIN);
        assert_eq!(PidError::OutOfMemory.errno(), errno::ENOMEM);
    }

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(PidError::NotFound.to_string(), "no such process");
        assert_eq!(PidError::ResourceExhausted.to_string(), "process table is full");
    }
}
