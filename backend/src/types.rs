//! Data types and error definitions for process memory management.

use thiserror::Error;

const KB: u64 = 1024;
const MB: u64 = 1024 * 1024;

/// Snapshot of one process taken during an enumeration.
///
/// The resident size is whatever the OS reported at sampling time and may
/// already be stale when the caller acts on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: u32,
    /// Best-effort executable name, empty when it could not be read.
    pub name: String,
    pub resident_bytes: u64,
}

impl ProcessRecord {
    pub fn new(pid: u32, name: impl Into<String>, resident_bytes: u64) -> Self {
        Self {
            pid,
            name: name.into(),
            resident_bytes,
        }
    }

    /// Resident size in whole megabytes, truncated.
    pub fn resident_mb(&self) -> u64 {
        self.resident_bytes / MB
    }
}

/// What happened to the request asking the OS to take pages back.
#[derive(Debug)]
pub enum TrimOutcome {
    /// The request was issued. `released` is the platform's own answer to
    /// whether anything was given back, which is advisory at best.
    Requested { released: bool },
    /// No trim mechanism exists on this platform or allocator.
    Unsupported(&'static str),
    /// The request was issued and the OS rejected it.
    Failed(ProcError),
}

/// Resident size of the current process around a trim request.
#[derive(Debug)]
pub struct TrimResult {
    pub before_bytes: u64,
    pub after_bytes: u64,
    pub outcome: TrimOutcome,
}

impl TrimResult {
    pub fn before_kb(&self) -> u64 {
        self.before_bytes / KB
    }

    pub fn after_kb(&self) -> u64 {
        self.after_bytes / KB
    }

    pub fn released_bytes(&self) -> u64 {
        self.before_bytes.saturating_sub(self.after_bytes)
    }
}

/// Errors that can occur during process management.
#[derive(Error, Debug)]
pub enum ProcError {
    #[error("Permission denied for PID {0}")]
    PermissionDenied(u32),
    #[error("Process {0} not found")]
    NotFound(u32),
    #[error("PID {0} cannot be addressed on this platform")]
    InvalidPid(u32),
    #[error("Failed to send signal to PID {0}: {1}")]
    SignalError(u32, String),
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
    #[error("{call} failed, error={code}")]
    Os { call: &'static str, code: u32 },
    #[error("Procfs error: {0}")]
    ProcfsError(String),
}

impl ProcError {
    /// Failures caused by the target process exiting under our feet.
    pub fn is_race(&self) -> bool {
        matches!(self, ProcError::NotFound(_))
    }
}

#[cfg(target_os = "linux")]
impl From<procfs::ProcError> for ProcError {
    fn from(err: procfs::ProcError) -> Self {
        ProcError::ProcfsError(err.to_string())
    }
}
