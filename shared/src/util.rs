//! Small helpers shared across the workspace.

/// Current UTC timestamp in milliseconds, used for log correlation and
/// cheap "when did this happen" fields that don't need full `DateTime`
/// precision on the wire.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
