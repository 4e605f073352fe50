//! Timestamp utilities
//!
//! Session time accounting works on wall-clock milliseconds so that a
//! suspended or delayed caller still charges all elapsed real time.
//! Every time-sensitive operation takes `now_ms` explicitly; these helpers
//! supply it in production code while tests inject their own values.

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Get current wall-clock time as milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
