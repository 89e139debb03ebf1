//! Mutation gate — serializes inserts and removes.
//!
//! The gate tracks two flags, `writing` and `deleting`, behind a single
//! mutex. A mutating operation waits until neither flag is set, raises its
//! own flag, and gets back a [`MutationGuard`]. Dropping the guard lowers the
//! flag and wakes every waiter, so release happens on every exit path of the
//! operation, including an early `?` return or a panic.
//!
//! The gate does not protect memory; the record map has its own lock. What it
//! provides is a "turn": the existence check and the mutation it decides run
//! inside one turn, so no other insert or remove can slip in between them.

use std::fmt;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

/// Which kind of mutation holds the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// An insert is in flight
    Writing,
    /// A remove is in flight
    Deleting,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Writing => f.write_str("writing"),
            Mutation::Deleting => f.write_str("deleting"),
        }
    }
}

#[derive(Debug, Default)]
struct Flags {
    writing: bool,
    deleting: bool,
}

impl Flags {
    fn busy(&self) -> bool {
        self.writing || self.deleting
    }

    fn set(&mut self, mutation: Mutation, value: bool) {
        match mutation {
            Mutation::Writing => self.writing = value,
            Mutation::Deleting => self.deleting = value,
        }
    }
}

/// Wait-until-idle, claim, release-and-wake-all exclusion.
#[derive(Debug, Default)]
pub struct MutationGate {
    flags: Mutex<Flags>,
    idle: Condvar,
}

impl MutationGate {
    /// Create an idle gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until no mutation is in flight, then claim the gate.
    ///
    /// There is no timeout: a caller waits until the current holder drops
    /// its guard.
    pub fn claim(&self, mutation: Mutation) -> MutationGuard<'_> {
        let mut flags = self.flags.lock();
        while flags.busy() {
            self.idle.wait(&mut flags);
        }
        flags.set(mutation, true);
        debug!(%mutation, "gate claimed");
        MutationGuard { gate: self, mutation }
    }

    /// Block until no mutation is in flight, without claiming.
    pub fn wait_idle(&self) {
        let mut flags = self.flags.lock();
        while flags.busy() {
            self.idle.wait(&mut flags);
        }
    }

    /// Block until no mutation is in flight, then run `read` with the flags
    /// lock held. No claim can start until `read` returns, so `read` must not
    /// claim the gate itself.
    pub fn while_idle<R>(&self, read: impl FnOnce() -> R) -> R {
        let mut flags = self.flags.lock();
        while flags.busy() {
            self.idle.wait(&mut flags);
        }
        let out = read();
        drop(flags);
        out
    }

    /// The mutation currently holding the gate, if any.
    pub fn current(&self) -> Option<Mutation> {
        let flags = self.flags.lock();
        if flags.writing {
            Some(Mutation::Writing)
        } else if flags.deleting {
            Some(Mutation::Deleting)
        } else {
            None
        }
    }

    /// True when no mutation holds the gate.
    pub fn is_idle(&self) -> bool {
        !self.flags.lock().busy()
    }

    fn release(&self, mutation: Mutation) {
        {
            let mut flags = self.flags.lock();
            flags.set(mutation, false);
        }
        self.idle.notify_all();
        debug!(%mutation, "gate released");
    }
}

/// Proof that the holder owns the current turn. Releases on drop.
#[must_use = "the gate is released as soon as the guard is dropped"]
pub struct MutationGuard<'a> {
    gate: &'a MutationGate,
    mutation: Mutation,
}

impl MutationGuard<'_> {
    /// The mutation this guard was claimed for.
    pub fn mutation(&self) -> Mutation {
        self.mutation
    }
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.gate.release(self.mutation);
    }
}
