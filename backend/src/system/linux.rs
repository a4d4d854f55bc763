//! Linux implementation on top of `/proc`.

use super::{send_sigterm, ProcessSystem};
use crate::types::{ProcError, ProcessRecord, TrimOutcome};
use log::debug;
use procfs::process::Process;

/// Reads `/proc` through `procfs`, trims with glibc's `malloc_trim` and
/// terminates with SIGTERM.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxSystem;

impl LinuxSystem {
    pub fn new() -> Self {
        LinuxSystem
    }
}

fn page_size() -> u64 {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        4096
    }
}

fn resident_bytes(process: &Process, page_size: u64) -> Result<u64, ProcError> {
    let statm = process.statm()?;
    Ok(statm.resident.saturating_mul(page_size))
}

impl ProcessSystem for LinuxSystem {
    fn current_resident_bytes(&self) -> Result<u64, ProcError> {
        let me = Process::myself()?;
        resident_bytes(&me, page_size())
    }

    #[cfg(target_env = "gnu")]
    fn release_memory(&self) -> TrimOutcome {
        // SAFETY: malloc_trim only walks glibc's own arenas.
        let result = unsafe { libc::malloc_trim(0) };
        debug!("malloc_trim returned {}", result);
        TrimOutcome::Requested {
            released: result != 0,
        }
    }

    #[cfg(not(target_env = "gnu"))]
    fn release_memory(&self) -> TrimOutcome {
        TrimOutcome::Unsupported("malloc_trim (glibc only)")
    }

    fn snapshot(&self) -> Result<Vec<ProcessRecord>, ProcError> {
        let page_size = page_size();
        let mut records = Vec::new();

        let all_procs = procfs::process::all_processes()
            .map_err(|e| ProcError::ProcfsError(format!("Failed to read /proc: {}", e)))?;

        for proc_result in all_procs {
            let process = match proc_result {
                Ok(process) => process,
                Err(e) => {
                    debug!("skipping /proc entry: {}", e);
                    continue;
                }
            };
            let pid = process.pid() as u32;

            let resident = match resident_bytes(&process, page_size) {
                Ok(bytes) => bytes,
                Err(e) => {
                    debug!("skipping PID {}: {}", pid, e);
                    continue;
                }
            };
            let name = process.stat().map(|stat| stat.comm).unwrap_or_default();

            records.push(ProcessRecord::new(pid, name, resident));
        }

        Ok(records)
    }

    fn terminate(&self, pid: u32) -> Result<(), ProcError> {
        send_sigterm(pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_a_power_of_two() {
        assert!(page_size().is_power_of_two());
    }

    #[test]
    fn snapshot_contains_the_current_process() {
        let system = LinuxSystem::new();
        let me = std::process::id();
        let records = system.snapshot().unwrap();
        let own = records.iter().find(|r| r.pid == me).unwrap();
        assert!(own.resident_bytes > 0);
        assert!(!own.name.is_empty());
    }

    #[test]
    fn current_resident_size_is_readable() {
        assert!(LinuxSystem::new().current_resident_bytes().unwrap() > 0);
    }

    #[test]
    fn release_memory_does_not_fail() {
        assert!(!matches!(
            LinuxSystem::new().release_memory(),
            TrimOutcome::Failed(_)
        ));
    }
}
