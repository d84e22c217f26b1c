//! Exponential backoff with optional jitter.

use rand::Rng;
use std::time::Duration;

/// Delay before retry number `retry` (1-based): `base_ms * 2^(retry - 1)`, capped at `max_ms`.
///
/// `jitter_percent` adds up to that percentage of the capped delay on top; 0 keeps
/// the sequence exact.
pub fn calculate_backoff(retry: u32, base_ms: u64, max_ms: u64, jitter_percent: u8) -> Duration {
    if retry == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(retry - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    let jitter_range = capped_delay.saturating_mul(u64::from(jitter_percent)) / 100;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay.saturating_add(jitter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_without_jitter() {
        let delays: Vec<u128> = (1..=3)
            .map(|retry| calculate_backoff(retry, 500, 30_000, 0).as_millis())
            .collect();
        assert_eq!(delays, vec![500, 1000, 2000]);
    }

    #[test]
    fn test_backoff_is_capped() {
        assert_eq!(calculate_backoff(10, 100, 1000, 0), Duration::from_millis(1000));
        assert_eq!(calculate_backoff(64, 100, 1000, 0), Duration::from_millis(1000));
    }

    #[test]
    fn test_backoff_jitter_stays_in_range() {
        for _ in 0..50 {
            let delay = calculate_backoff(2, 100, 2000, 10).as_millis();
            assert!((200..220).contains(&delay), "delay {delay} out of range");
        }
    }

    #[test]
    fn test_huge_cap_with_jitter_saturates() {
        let delay = calculate_backoff(64, u64::MAX / 2, u64::MAX, 100);
        assert!(delay >= Duration::from_millis(u64::MAX / 2));
        assert!(delay <= Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_zeroth_retry_has_no_delay() {
        assert_eq!(calculate_backoff(0, 500, 2000, 10), Duration::ZERO);
    }
}
