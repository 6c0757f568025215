//! Stage arithmetic for wall-clock-paced sessions.

/// 1-based stage whose window contains `elapsed_ms`.
///
/// The result may exceed the trial count; callers treat that as "every
/// window has lapsed". A zero-length window is rejected at configuration
/// time, so it is mapped to stage 1 here rather than dividing by zero.
pub fn stage_at(elapsed_ms: u64, window_ms: u64) -> usize {
    if window_ms == 0 {
        return 1;
    }
    usize::try_from(elapsed_ms / window_ms)
        .unwrap_or(usize::MAX)
        .saturating_add(1)
}

/// Elapsed time at which the window of a 1-based `stage` lapses.
pub fn stage_deadline(stage: usize, window_ms: u64) -> u64 {
    (stage as u64).saturating_mul(window_ms)
}

/// Hard upper bound on the length of a timed session.
pub fn session_bound_ms(trials: usize, window_ms: u64) -> u64 {
    (trials as u64).saturating_mul(window_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_boundaries() {
        assert_eq!(stage_at(0, 10_000), 1);
        assert_eq!(stage_at(9_999, 10_000), 1);
        assert_eq!(stage_at(10_000, 10_000), 2);
        assert_eq!(stage_at(59_999, 10_000), 6);
        assert_eq!(stage_at(60_000, 10_000), 7);
    }

    #[test]
    fn deadline_is_where_the_next_stage_begins() {
        for stage in 1..=6 {
            let deadline = stage_deadline(stage, 10_000);
            assert_eq!(stage_at(deadline - 1, 10_000), stage);
            assert_eq!(stage_at(deadline, 10_000), stage + 1);
        }
    }

    #[test]
    fn far_future_saturates_instead_of_wrapping() {
        assert_eq!(stage_at(u64::MAX, 1), usize::MAX);
        assert!(stage_at(u64::MAX, 10_000) > 6);
    }

    #[test]
    fn bound_is_trials_times_window() {
        assert_eq!(session_bound_ms(6, 10_000), 60_000);
        assert_eq!(session_bound_ms(0, 10_000), 0);
    }
}
