//! Console text for trim results and process listings.

use backend::{ProcessRecord, TrimOutcome, TrimResult};
use std::io::{self, Write};

pub const MENU: &str = "\nMenu:\n \
1) Free memory of the current process\n \
2) List processes using memory (and optionally terminate them)\n \
3) Free memory and handle processes (1+2)\n \
4) Exit\n";

pub fn usage(program: &str) -> String {
    format!(
        "Usage:\n  {program} trim\n  {program} list <thresholdMB> [--kill]\n  {program} alt\n"
    )
}

/// Before/after sizes go to `out`; a rejected trim request goes to `err`.
pub fn write_trim(out: &mut impl Write, err: &mut impl Write, result: &TrimResult) -> io::Result<()> {
    writeln!(out, "Before trim: {} KB", result.before_kb())?;
    match &result.outcome {
        TrimOutcome::Requested { released } => writeln!(
            out,
            "Trim requested, memory {}returned to the OS",
            if *released { "" } else { "not " }
        )?,
        TrimOutcome::Unsupported(reason) => writeln!(out, "Trim not available: {}", reason)?,
        TrimOutcome::Failed(e) => writeln!(err, "Trim request failed: {}", e)?,
    }
    writeln!(out, "After  trim: {} KB", result.after_kb())?;
    writeln!(out, "Released:    {} KB", result.released_bytes() / 1024)
}

pub fn write_record(out: &mut impl Write, record: &ProcessRecord) -> io::Result<()> {
    writeln!(
        out,
        "PID={} name={} rssMB={}",
        record.pid,
        record.name,
        record.resident_mb()
    )
}

pub fn write_kill_outcome(out: &mut impl Write, pid: u32, accepted: bool) -> io::Result<()> {
    writeln!(
        out,
        "  Attempting to terminate PID {} ... {}",
        pid,
        if accepted { "OK" } else { "FAILED" }
    )
}

pub fn write_none_found(out: &mut impl Write, threshold_mb: u64) -> io::Result<()> {
    writeln!(out, "No processes found using >= {} MB", threshold_mb)
}

pub fn write_summary(out: &mut impl Write, records: &[ProcessRecord]) -> io::Result<()> {
    let total_bytes: u64 = records.iter().map(|r| r.resident_bytes).sum();
    writeln!(
        out,
        "{} process(es), {} MB resident in total",
        records.len(),
        total_bytes / (1024 * 1024)
    )
}
