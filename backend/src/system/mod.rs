//! The OS capability interface and its per-platform implementations.
//!
//! Exactly one implementation is compiled in for the target OS and exposed as
//! [`NativeSystem`]. Nothing outside this module branches on platform.

use crate::types::{ProcError, ProcessRecord, TrimOutcome};

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxSystem as NativeSystem;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use self::windows::WindowsSystem as NativeSystem;

#[cfg(not(any(target_os = "linux", windows)))]
mod fallback;
#[cfg(not(any(target_os = "linux", windows)))]
pub use fallback::FallbackSystem as NativeSystem;

/// Everything the tool needs from the operating system.
///
/// Implementations must release any OS handle they acquire before returning,
/// on every path.
pub trait ProcessSystem {
    /// Resident size of the calling process, in bytes.
    fn current_resident_bytes(&self) -> Result<u64, ProcError>;

    /// Ask the OS to take back physical pages this process no longer needs.
    fn release_memory(&self) -> TrimOutcome;

    /// Every process visible to the caller, unfiltered, in OS order.
    ///
    /// Processes whose resident size cannot be read are left out; an
    /// unreadable name yields an empty string.
    fn snapshot(&self) -> Result<Vec<ProcessRecord>, ProcError>;

    /// Request termination of `pid` with the platform's standard mechanism.
    fn terminate(&self, pid: u32) -> Result<(), ProcError>;
}

impl<S: ProcessSystem + ?Sized> ProcessSystem for &S {
    fn current_resident_bytes(&self) -> Result<u64, ProcError> {
        (**self).current_resident_bytes()
    }

    fn release_memory(&self) -> TrimOutcome {
        (**self).release_memory()
    }

    fn snapshot(&self) -> Result<Vec<ProcessRecord>, ProcError> {
        (**self).snapshot()
    }

    fn terminate(&self, pid: u32) -> Result<(), ProcError> {
        (**self).terminate(pid)
    }
}

/// Convert a pid to the signed form Unix signal calls take.
///
/// pid 0 and anything that would wrap negative address process groups
/// rather than a single process, so they are refused.
#[cfg(unix)]
pub(crate) fn unix_pid(pid: u32) -> Result<nix::unistd::Pid, ProcError> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Ok(nix::unistd::Pid::from_raw(raw)),
        _ => Err(ProcError::InvalidPid(pid)),
    }
}

/// Send SIGTERM to a single process.
#[cfg(unix)]
pub(crate) fn send_sigterm(pid: u32) -> Result<(), ProcError> {
    use nix::errno::Errno;
    use nix::sys::signal::{self, Signal};

    let target = unix_pid(pid)?;
    signal::kill(target, Signal::SIGTERM).map_err(|e| match e {
        Errno::ESRCH => ProcError::NotFound(pid),
        Errno::EPERM => ProcError::PermissionDenied(pid),
        other => ProcError::SignalError(pid, other.to_string()),
    })
}
