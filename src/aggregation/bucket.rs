//! 12-hour bucket alignment
//!
//! Buckets are half-open windows `[t, t + 12h)` aligned to the Unix epoch, so
//! their boundaries fall on 00:00 and 12:00 UTC every day.

/// Width of one bucket in seconds
pub const BUCKET_SECONDS: i64 = 12 * 3_600;

/// Start of the bucket containing `epoch_seconds`
#[must_use]
pub const fn bucket_start(epoch_seconds: i64) -> i64 {
    epoch_seconds.div_euclid(BUCKET_SECONDS) * BUCKET_SECONDS
}
