//! Windows implementation on top of toolhelp snapshots and psapi.

use super::ProcessSystem;
use crate::types::{ProcError, ProcessRecord, TrimOutcome};
use log::debug;
use std::mem;
use std::ptr;

use winapi::shared::minwindef::{DWORD, FALSE};
use winapi::shared::winerror::{ERROR_ACCESS_DENIED, ERROR_INVALID_PARAMETER};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::handleapi::{CloseHandle, INVALID_HANDLE_VALUE};
use winapi::um::processthreadsapi::{GetCurrentProcess, OpenProcess, TerminateProcess};
use winapi::um::psapi::{GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS};
use winapi::um::tlhelp32::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};
use winapi::um::winbase::SetProcessWorkingSetSize;
use winapi::um::winnt::{HANDLE, PROCESS_QUERY_INFORMATION, PROCESS_TERMINATE, PROCESS_VM_READ};

/// Owns a kernel handle and closes it on drop.
struct OwnedHandle(HANDLE);

impl OwnedHandle {
    fn open(access: DWORD, pid: u32) -> Result<Self, ProcError> {
        // SAFETY: OpenProcess takes plain values and returns null on failure.
        let handle = unsafe { OpenProcess(access, FALSE, pid) };
        if handle.is_null() {
            Err(last_error_for(pid, "OpenProcess"))
        } else {
            Ok(OwnedHandle(handle))
        }
    }

    fn raw(&self) -> HANDLE {
        self.0
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.0);
        }
    }
}

fn last_error_for(pid: u32, call: &'static str) -> ProcError {
    // SAFETY: reads thread-local error state.
    let code = unsafe { GetLastError() };
    match code {
        ERROR_ACCESS_DENIED => ProcError::PermissionDenied(pid),
        ERROR_INVALID_PARAMETER => ProcError::NotFound(pid),
        code => ProcError::Os { call, code },
    }
}

fn working_set(handle: HANDLE) -> Option<u64> {
    unsafe {
        let mut counters: PROCESS_MEMORY_COUNTERS = mem::zeroed();
        let size = mem::size_of::<PROCESS_MEMORY_COUNTERS>() as DWORD;
        if GetProcessMemoryInfo(handle, &mut counters, size) != 0 {
            Some(counters.WorkingSetSize as u64)
        } else {
            None
        }
    }
}

fn exe_name(entry: &PROCESSENTRY32W) -> String {
    let len = entry
        .szExeFile
        .iter()
        .position(|&c| c == 0)
        .unwrap_or(entry.szExeFile.len());
    String::from_utf16_lossy(&entry.szExeFile[..len])
}

/// Toolhelp for enumeration, psapi for working sets, `TerminateProcess`
/// for termination.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsSystem;

impl WindowsSystem {
    pub fn new() -> Self {
        WindowsSystem
    }
}

impl ProcessSystem for WindowsSystem {
    fn current_resident_bytes(&self) -> Result<u64, ProcError> {
        // The pseudo-handle from GetCurrentProcess needs no closing.
        let handle = unsafe { GetCurrentProcess() };
        working_set(handle).ok_or_else(|| last_error_for(std::process::id(), "GetProcessMemoryInfo"))
    }

    fn release_memory(&self) -> TrimOutcome {
        // Passing (SIZE_T)-1 for both bounds asks Windows to trim the working set.
        let ok = unsafe { SetProcessWorkingSetSize(GetCurrentProcess(), usize::MAX, usize::MAX) };
        if ok != 0 {
            TrimOutcome::Requested { released: true }
        } else {
            let code = unsafe { GetLastError() };
            TrimOutcome::Failed(ProcError::Os {
                call: "SetProcessWorkingSetSize",
                code,
            })
        }
    }

    fn snapshot(&self) -> Result<Vec<ProcessRecord>, ProcError> {
        let raw = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) };
        if raw == INVALID_HANDLE_VALUE {
            let code = unsafe { GetLastError() };
            return Err(ProcError::Os {
                call: "CreateToolhelp32Snapshot",
                code,
            });
        }
        let snapshot = OwnedHandle(raw);

        let mut records = Vec::new();
        let mut entry: PROCESSENTRY32W = unsafe { mem::zeroed() };
        entry.dwSize = mem::size_of::<PROCESSENTRY32W>() as DWORD;

        let mut more = unsafe { Process32FirstW(snapshot.raw(), &mut entry) } != 0;
        while more {
            let pid = entry.th32ProcessID;
            match OwnedHandle::open(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, pid) {
                Ok(process) => match working_set(process.raw()) {
                    Some(bytes) => records.push(ProcessRecord::new(pid, exe_name(&entry), bytes)),
                    None => debug!("skipping PID {}: working set unreadable", pid),
                },
                Err(e) => debug!("skipping PID {}: {}", pid, e),
            }
            more = unsafe { Process32NextW(snapshot.raw(), &mut entry) } != 0;
        }

        Ok(records)
    }

    fn terminate(&self, pid: u32) -> Result<(), ProcError> {
        if pid == 0 {
            return Err(ProcError::InvalidPid(pid));
        }
        let process = OwnedHandle::open(PROCESS_TERMINATE, pid)?;
        let ok = unsafe { TerminateProcess(process.raw(), 1) };
        if ok != 0 {
            Ok(())
        } else {
            Err(last_error_for(pid, "TerminateProcess"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_contains_the_current_process() {
        let me = std::process::id();
        let records = WindowsSystem::new().snapshot().unwrap();
        assert!(records.iter().any(|r| r.pid == me && r.resident_bytes > 0));
    }

    #[test]
    fn exe_name_stops_at_nul() {
        let mut entry: PROCESSENTRY32W = unsafe { mem::zeroed() };
        for (slot, unit) in entry.szExeFile.iter_mut().zip("app.exe".encode_utf16()) {
            *slot = unit;
        }
        assert_eq!(exe_name(&entry), "app.exe");
    }
}
