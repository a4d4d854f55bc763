//! Process termination.
//!
//! Unix sends SIGTERM, so the target may catch it and clean up. Windows has
//! no graceful equivalent for arbitrary processes and calls
//! `TerminateProcess` with exit code 1, which gives the target no chance to
//! clean up. Either way the OS tears the process down asynchronously.

use crate::system::ProcessSystem;
use log::{debug, info};

/// Ask the OS to terminate `pid`.
///
/// Returns `true` only if the request was accepted. Every failure, whether
/// the process is gone, access is denied, or the platform refuses, yields
/// `false`; the cause goes to the log.
pub fn terminate<S: ProcessSystem>(system: &S, pid: u32) -> bool {
    match system.terminate(pid) {
        Ok(()) => {
            debug!("termination of PID {} accepted", pid);
            true
        }
        Err(e) if e.is_race() => {
            debug!("PID {} exited before it could be terminated", pid);
            false
        }
        Err(e) => {
            info!("could not terminate PID {}: {}", pid, e);
            false
        }
    }
}
