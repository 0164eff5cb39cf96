/// Format of ranking timestamps, e.g. `2026-10-19 14:03:27`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Returns the current local time as a human-readable timestamp.
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
