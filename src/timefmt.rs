use chrono::{Local, NaiveDateTime, TimeZone};

/// Format the date input box expects (local time, no seconds).
pub const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

const INPUT_FORMAT_SECS: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a local `YYYY-MM-DDTHH:MM[:SS]` string to epoch milliseconds.
///
/// Returns None for anything that is not a valid instant: garbage input,
/// local times that do not exist (DST gaps), and non-positive epoch values.
/// Callers treat None as "ignore the action", never as an error to surface.
pub fn parse_local_datetime(s: &str) -> Option<i64> {
    let s = s.trim();
    let naive = NaiveDateTime::parse_from_str(s, INPUT_FORMAT_SECS)
        .or_else(|_| NaiveDateTime::parse_from_str(s, INPUT_FORMAT))
        .ok()?;

    let ms = Local
        .from_local_datetime(&naive)
        .earliest()?
        .timestamp_millis();

    (ms > 0).then_some(ms)
}

/// Human-readable label for the counter screen, e.g. "Since Feb 26, 2026 18:30".
pub fn since_label(start_ms: i64) -> String {
    match Local.timestamp_millis_opt(start_ms).earliest() {
        Some(dt) => format!("Since {}", dt.format("%b %-d, %Y %H:%M")),
        None => String::from("Since the beginning"),
    }
}

/// Render an instant back into the input-box format (used to prefill the
/// setup screen).
pub fn to_input_string(ms: i64) -> Option<String> {
    Local
        .timestamp_millis_opt(ms)
        .earliest()
        .map(|dt| dt.format(INPUT_FORMAT).to_string())
}

/// Current local time in the input-box format.
pub fn now_input_string() -> String {
    Local::now().format(INPUT_FORMAT).to_string()
}
