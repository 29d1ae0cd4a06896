//! Adaptive cadence: how long to wait before the next live inference
//!
//! Each delay is derived fresh from the configured base interval; the
//! previous delay is never fed back in.

/// Fastest adaptive cadence (ms)
pub const MIN_DELAY_MS: u64 = 700;

/// Slowest adaptive cadence (ms)
pub const MAX_DELAY_MS: u64 = 3800;

/// At or above this confidence the signal is stable: slow down
pub const HIGH_CONFIDENCE: f64 = 0.8;

/// Below this confidence the signal is noisy: speed up
pub const STEADY_CONFIDENCE: f64 = 0.6;

const SLOW_DOWN_MS: u64 = 700;
const SPEED_UP_MS: u64 = 500;

/// Delay before the next inference
///
/// With `adaptive` off this is `base_interval_ms` unchanged. With it on,
/// the result always lies in `[MIN_DELAY_MS, MAX_DELAY_MS]`. A NaN
/// confidence counts as low.
pub fn next_delay(confidence: f64, base_interval_ms: u64, adaptive: bool) -> u64 {
    if !adaptive {
        return base_interval_ms;
    }

    let delay = if confidence >= HIGH_CONFIDENCE {
        base_interval_ms.saturating_add(SLOW_DOWN_MS)
    } else if confidence >= STEADY_CONFIDENCE {
        base_interval_ms
    } else {
        base_interval_ms.saturating_sub(SPEED_UP_MS)
    };

    delay.clamp(MIN_DELAY_MS, MAX_DELAY_MS)
}
