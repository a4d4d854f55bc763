//! Listing processes at or above a resident memory threshold.

use crate::system::ProcessSystem;
use crate::types::ProcessRecord;
use log::{debug, info};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Threshold in bytes for a threshold in megabytes, saturating on overflow.
pub fn threshold_bytes(threshold_mb: u64) -> u64 {
    threshold_mb.saturating_mul(BYTES_PER_MB)
}

/// Keep the records whose resident size is at least `threshold_mb` MB.
pub fn filter_at_or_above(records: Vec<ProcessRecord>, threshold_mb: u64) -> Vec<ProcessRecord> {
    let min_bytes = threshold_bytes(threshold_mb);
    records
        .into_iter()
        .filter(|record| record.resident_bytes >= min_bytes)
        .collect()
}

/// Enumerate every visible process, then keep those using at least
/// `threshold_mb` MB of resident memory.
///
/// Order follows the OS enumeration. When listing is unavailable the result
/// is empty; the reason only goes to the log.
pub fn list_processes_at_or_above<S: ProcessSystem>(
    system: &S,
    threshold_mb: u64,
) -> Vec<ProcessRecord> {
    let all = match system.snapshot() {
        Ok(all) => all,
        Err(e) => {
            info!("process listing unavailable: {}", e);
            return Vec::new();
        }
    };

    let total = all.len();
    let matching = filter_at_or_above(all, threshold_mb);
    debug!(
        "{} of {} processes at or above {} MB",
        matching.len(),
        total,
        threshold_mb
    );
    matching
}
