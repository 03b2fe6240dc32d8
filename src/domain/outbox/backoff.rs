//! Retry backoff schedule.
//!
//! A fixed step table, not a computed exponential:
//!
//! | attempt | delay  |
//! |---------|--------|
//! | 1       | 15s    |
//! | 2       | 60s    |
//! | 3       | 5min   |
//! | 4       | 15min  |
//! | 5       | 1h     |
//! | >= 6    | 6h     |

use crate::domain::foundation::Timestamp;

/// Seconds to wait before the given attempt may run.
///
/// `attempt` is the 1-based number of the failure being recorded, i.e.
/// `attempts + 1` for a row that has already failed `attempts` times.
pub fn backoff_secs(attempt: u32) -> u64 {
    match attempt {
        0 | 1 => 15,
        2 => 60,
        3 => 5 * 60,
        4 => 15 * 60,
        5 => 60 * 60,
        _ => 6 * 60 * 60,
    }
}

/// Next eligible time for a row that has failed `attempts` times before this failure.
pub fn next_retry_at(now: Timestamp, attempts: u32) -> Timestamp {
    now.plus_secs(backoff_secs(attempts.saturating_add(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn schedule_matches_table() {
        assert_eq!(backoff_secs(1), 15);
        assert_eq!(backoff_secs(2), 60);
        assert_eq!(backoff_secs(3), 300);
        assert_eq!(backoff_secs(4), 900);
        assert_eq!(backoff_secs(5), 3600);
        assert_eq!(backoff_secs(6), 21600);
        assert_eq!(backoff_secs(50), 21600);
    }

    #[test]
    fn zero_is_treated_as_first_attempt() {
        assert_eq!(backoff_secs(0), 15);
    }

    #[test]
    fn next_retry_uses_attempts_plus_one() {
        let now = Timestamp::now();
        assert_eq!(next_retry_at(now, 0), now.plus_secs(15));
        assert_eq!(next_retry_at(now, 2), now.plus_secs(300));
        assert_eq!(next_retry_at(now, u32::MAX), now.plus_secs(21600));
    }

    proptest! {
        #[test]
        fn schedule_is_monotonic_and_capped(a in 0u32..1000, b in 0u32..1000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(backoff_secs(lo) <= backoff_secs(hi));
            prop_assert!(backoff_secs(hi) <= 21600);
        }
    }
}
