//! Releasing the current process's memory back to the OS.

use crate::system::ProcessSystem;
use crate::types::{TrimOutcome, TrimResult};
use log::{debug, info};

/// Sample resident size, ask the OS to trim, sample again.
///
/// Never fails. A failed or unsupported request is logged and carried in
/// [`TrimResult::outcome`]. When the first sample cannot be read both samples
/// are 0 and the second read is skipped; when only the second fails it
/// repeats the first. Either way `after <= before` holds for missing data.
pub fn trim_current_process<S: ProcessSystem>(system: &S) -> TrimResult {
    let before = system.current_resident_bytes();
    if let Err(e) = &before {
        info!("could not read resident size before trim: {}", e);
    }

    let outcome = system.release_memory();
    match &outcome {
        TrimOutcome::Requested { released } => {
            debug!("trim requested, released={}", released)
        }
        TrimOutcome::Unsupported(reason) => info!("trim unavailable: {}", reason),
        // Reported by the caller.
        TrimOutcome::Failed(e) => debug!("trim request failed: {}", e),
    }

    let (before_bytes, after_bytes) = match before {
        Ok(before_bytes) => {
            let after_bytes = system.current_resident_bytes().unwrap_or_else(|e| {
                info!("could not read resident size after trim: {}", e);
                before_bytes
            });
            (before_bytes, after_bytes)
        }
        Err(_) => (0, 0),
    };

    TrimResult {
        before_bytes,
        after_bytes,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FixtureSystem;
    use crate::types::ProcError;

    #[test]
    fn reports_both_samples() {
        let system = FixtureSystem::new(Vec::new()).with_self_resident(8 << 20, 6 << 20);
        let result = trim_current_process(&system);
        assert_eq!(result.before_bytes, 8 << 20);
        assert_eq!(result.after_bytes, 6 << 20);
        assert_eq!(result.released_bytes(), 2 << 20);
        assert!(matches!(
            result.outcome,
            TrimOutcome::Requested { released: true }
        ));
    }

    #[test]
    fn unsupported_platform_degrades_to_no_op() {
        let system = FixtureSystem::unsupported();
        let result = trim_current_process(&system);
        assert_eq!(result.before_bytes, 0);
        assert_eq!(result.after_bytes, 0);
        assert!(matches!(result.outcome, TrimOutcome::Unsupported(_)));
    }

    #[test]
    fn failed_request_still_returns_samples() {
        let system = FixtureSystem::new(Vec::new())
            .with_self_resident(4 << 20, 4 << 20)
            .with_trim_failure(ProcError::Os {
                call: "SetProcessWorkingSetSize",
                code: 5,
            });
        let result = trim_current_process(&system);
        assert_eq!(result.before_bytes, result.after_bytes);
        assert!(matches!(result.outcome, TrimOutcome::Failed(_)));
    }

    #[test]
    fn unreadable_first_sample_skips_the_second() {
        let system = FixtureSystem::new(Vec::new())
            .with_self_resident(8 << 20, 6 << 20)
            .with_unreadable_before();
        let result = trim_current_process(&system);
        assert_eq!(result.before_bytes, 0);
        assert_eq!(result.after_bytes, 0);
        assert!(result.after_bytes <= result.before_bytes);
        assert!(matches!(
            result.outcome,
            TrimOutcome::Requested { released: true }
        ));
    }

    #[test]
    fn native_trim_does_not_grow_much() {
        let system = crate::system::NativeSystem::new();
        let result = trim_current_process(&system);
        // Allow a little slack for the allocator and the sampling itself.
        assert!(result.after_bytes <= result.before_bytes + (4 << 20));
    }
}
