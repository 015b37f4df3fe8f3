//! Time base conversions.
//!
//! Every timestamp that leaves this crate is in microseconds. Conversions go
//! through `av_rescale_q` so no precision is lost to floating point.

use ffmpeg_next::{Rational, Rescale, ffi::AV_NOPTS_VALUE};

/// The fixed microsecond time base (1/1,000,000).
pub const MICROSECONDS: Rational = ffmpeg_next::util::mathematics::rescale::TIME_BASE;

/// Rescales a timestamp expressed in `time_base` ticks to microseconds.
pub fn to_micros(ts: i64, time_base: Rational) -> i64 {
    ts.rescale(time_base, MICROSECONDS)
}

/// Rescales a microsecond timestamp to `time_base` ticks.
pub fn from_micros(us: i64, time_base: Rational) -> i64 {
    us.rescale(MICROSECONDS, time_base)
}

/// Returns `None` for FFmpeg's "no timestamp" marker.
pub fn valid(ts: i64) -> Option<i64> {
    if ts == AV_NOPTS_VALUE as i64 { None } else { Some(ts) }
}

/// Codec time base for a frame rate, keeping three decimals of precision so
/// that rates like 29.97 survive: `1000 / round(fps * 1000)`.
pub fn codec_time_base(fps: f64) -> Rational {
    Rational::new(1000, (fps * 1000.0).round() as i32)
}
