//! A synthetic [`ProcessSystem`] for tests: a fixed process table, a scripted
//! resident size for the current process, and a log of terminate calls.

use crate::system::ProcessSystem;
use crate::types::{ProcError, ProcessRecord, TrimOutcome};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;

#[derive(Debug)]
pub struct FixtureSystem {
    records: Vec<ProcessRecord>,
    alive: RefCell<HashSet<u32>>,
    denied: HashSet<u32>,
    supported: bool,
    before_unreadable: bool,
    self_before: u64,
    self_after: u64,
    trimmed: Cell<bool>,
    trim_failure: RefCell<Option<ProcError>>,
    snapshots: Cell<usize>,
    terminated: RefCell<Vec<u32>>,
}

impl FixtureSystem {
    pub fn new(records: Vec<ProcessRecord>) -> Self {
        let alive = records.iter().map(|r| r.pid).collect();
        Self {
            records,
            alive: RefCell::new(alive),
            denied: HashSet::new(),
            supported: true,
            before_unreadable: false,
            self_before: 0,
            self_after: 0,
            trimmed: Cell::new(false),
            trim_failure: RefCell::new(None),
            snapshots: Cell::new(0),
            terminated: RefCell::new(Vec::new()),
        }
    }

    /// A platform where nothing is available.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(Vec::new())
        }
    }

    /// Resident size reported before and after the trim request.
    pub fn with_self_resident(mut self, before: u64, after: u64) -> Self {
        self.self_before = before;
        self.self_after = after;
        self
    }

    /// Fail the resident size read taken before the trim request.
    pub fn with_unreadable_before(mut self) -> Self {
        self.before_unreadable = true;
        self
    }

    pub fn with_trim_failure(self, error: ProcError) -> Self {
        *self.trim_failure.borrow_mut() = Some(error);
        self
    }

    /// Make terminate fail with a permission error for `pid`.
    pub fn deny(mut self, pid: u32) -> Self {
        self.denied.insert(pid);
        self
    }

    /// Number of times the process table was enumerated.
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.get()
    }

    /// Every pid passed to terminate, in call order.
    pub fn terminated(&self) -> Vec<u32> {
        self.terminated.borrow().clone()
    }
}

impl ProcessSystem for FixtureSystem {
    fn current_resident_bytes(&self) -> Result<u64, ProcError> {
        if !self.supported {
            return Err(ProcError::Unsupported("reading resident memory"));
        }
        if self.before_unreadable && !self.trimmed.get() {
            return Err(ProcError::PermissionDenied(std::process::id()));
        }
        Ok(if self.trimmed.get() {
            self.self_after
        } else {
            self.self_before
        })
    }

    fn release_memory(&self) -> TrimOutcome {
        if !self.supported {
            return TrimOutcome::Unsupported("fixture without trim");
        }
        if let Some(error) = self.trim_failure.borrow_mut().take() {
            return TrimOutcome::Failed(error);
        }
        self.trimmed.set(true);
        TrimOutcome::Requested {
            released: self.self_after < self.self_before,
        }
    }

    fn snapshot(&self) -> Result<Vec<ProcessRecord>, ProcError> {
        self.snapshots.set(self.snapshots.get() + 1);
        if !self.supported {
            return Err(ProcError::Unsupported("process listing"));
        }
        Ok(self.records.clone())
    }

    fn terminate(&self, pid: u32) -> Result<(), ProcError> {
        self.terminated.borrow_mut().push(pid);
        if !self.supported {
            return Err(ProcError::Unsupported("process termination"));
        }
        if self.denied.contains(&pid) {
            return Err(ProcError::PermissionDenied(pid));
        }
        if self.alive.borrow_mut().remove(&pid) {
            Ok(())
        } else {
            Err(ProcError::NotFound(pid))
        }
    }
}
