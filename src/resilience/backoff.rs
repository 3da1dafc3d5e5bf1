//! Exponential backoff with optional jitter.

use rand::Rng;
use std::time::Duration;

use crate::resilience::retries::RetryPolicy;

/// Delay to wait after failed attempt number `attempt` (0-based).
///
/// `base_delay × backoff_multiplier^attempt`, capped at `max_delay`.
/// Pure: no clock, no randomness.
pub fn backoff_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    let exponent = attempt.min(i32::MAX as u32) as i32;
    let factor = policy.backoff_multiplier.powi(exponent);
    let nanos = policy.base_delay.as_nanos() as f64 * factor;

    if !nanos.is_finite() || nanos >= policy.max_delay.as_nanos() as f64 {
        return policy.max_delay;
    }
    if nanos <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(nanos.round() as u64)
}

/// Add up to `ratio × delay` of random jitter.
pub fn apply_jitter(delay: Duration, ratio: f64) -> Duration {
    if ratio <= 0.0 || delay.is_zero() {
        return delay;
    }
    let jitter_range = (delay.as_millis() as f64 * ratio.min(1.0)) as u64;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };
    delay + Duration::from_millis(jitter)
}
