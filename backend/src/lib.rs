//! UI-agnostic process memory library for Windows and Linux.
//!
//! Provides functions for trimming the current process's memory, listing
//! processes above a resident memory threshold, and terminating processes.
//! Uses `procfs`, `nix` and `libc` on Linux and `winapi` on Windows.

mod memory_trim;
mod process_kill;
mod process_list;
mod system;
mod types;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use memory_trim::trim_current_process;
pub use process_kill::terminate;
pub use process_list::{filter_at_or_above, list_processes_at_or_above, threshold_bytes};
pub use system::{NativeSystem, ProcessSystem};
pub use types::{ProcError, ProcessRecord, TrimOutcome, TrimResult};
