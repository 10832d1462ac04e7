//! Tick-based timing for media positions
//!
//! All positions and durations handled by the engine are `i64` ticks at
//! 28,224,000 Hz. The rate divides evenly into every common audio sample
//! rate and into the frame durations of common video rates (24, 25, 30,
//! 50, 60 fps), so frame steps and block boundaries stay exact.
//!
//! # Conversion Flow
//!
//! ```text
//! Container / decoder (seconds, f64)
//!     ↓
//! seconds_to_ticks() → Engine state (i64 ticks)
//!     ↓
//! ticks_to_ms() → Diagnostics / UI (i64 ms)
//! ```
//!
//! # Precision and Overflow
//!
//! - i64::MAX ticks = ~10.36 years of media
//! - Millisecond conversions use truncating division
//! - Seconds conversions round to the nearest tick
//! - Negative values are valid (relative offsets, estimates before zero)
//!
//! # Examples
//!
//! ```rust
//! use playstate_common::timing::*;
//!
//! let ticks = ms_to_ticks(40); // one frame at 25 fps
//! assert_eq!(ticks, 1_128_960);
//! assert_eq!(seconds_to_ticks(1.0 / 25.0), ticks);
//! assert_eq!(ticks_to_ms(ticks), 40);
//! ```

/// Tick rate: 28,224,000 Hz
pub const TICK_RATE: i64 = 28_224_000;

/// Ticks per millisecond: 28,224
///
/// - `ticks = milliseconds × TICKS_PER_MS`
/// - `milliseconds = ticks ÷ TICKS_PER_MS` (truncating division)
pub const TICKS_PER_MS: i64 = 28_224;

/// Convert milliseconds to ticks
///
/// Lossless: every millisecond value lands exactly on a tick boundary.
///
/// ```rust
/// use playstate_common::timing::ms_to_ticks;
///
/// assert_eq!(ms_to_ticks(0), 0);
/// assert_eq!(ms_to_ticks(1), 28_224);
/// assert_eq!(ms_to_ticks(1000), 28_224_000);
/// assert_eq!(ms_to_ticks(-1000), -28_224_000);
/// ```
pub fn ms_to_ticks(milliseconds: i64) -> i64 {
    milliseconds * TICKS_PER_MS
}

/// Convert ticks to milliseconds using truncating division
///
/// ```rust
/// use playstate_common::timing::ticks_to_ms;
///
/// assert_eq!(ticks_to_ms(28_224), 1);
/// assert_eq!(ticks_to_ms(28_223), 0);
/// assert_eq!(ticks_to_ms(28_225), 1);
/// ```
pub fn ticks_to_ms(ticks: i64) -> i64 {
    ticks / TICKS_PER_MS
}

/// Convert fractional seconds to ticks, rounding to the nearest tick
///
/// Non-finite input converts to 0.
pub fn seconds_to_ticks(seconds: f64) -> i64 {
    if !seconds.is_finite() {
        return 0;
    }
    (seconds * TICK_RATE as f64).round() as i64
}

/// Convert ticks to fractional seconds
pub fn ticks_to_seconds(ticks: i64) -> f64 {
    ticks as f64 / TICK_RATE as f64
}
