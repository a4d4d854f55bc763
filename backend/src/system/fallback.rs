//! Platforms without a process listing backend (macOS, the BSDs, ...).
//!
//! Enumeration and trimming degrade to `Unsupported`. Unix targets can still
//! signal a pid the user already knows.

use super::ProcessSystem;
use crate::types::{ProcError, ProcessRecord, TrimOutcome};

#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackSystem;

impl FallbackSystem {
    pub fn new() -> Self {
        FallbackSystem
    }
}

impl ProcessSystem for FallbackSystem {
    fn current_resident_bytes(&self) -> Result<u64, ProcError> {
        Err(ProcError::Unsupported("reading resident memory"))
    }

    fn release_memory(&self) -> TrimOutcome {
        TrimOutcome::Unsupported("no portable trim on this platform")
    }

    fn snapshot(&self) -> Result<Vec<ProcessRecord>, ProcError> {
        Err(ProcError::Unsupported("process listing"))
    }

    #[cfg(unix)]
    fn terminate(&self, pid: u32) -> Result<(), ProcError> {
        super::send_sigterm(pid)
    }

    #[cfg(not(unix))]
    fn terminate(&self, _pid: u32) -> Result<(), ProcError> {
        Err(ProcError::Unsupported("process termination"))
    }
}
