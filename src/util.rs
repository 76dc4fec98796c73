use chrono::{Duration, Local, NaiveDate, Utc};

/// Fresh random identifier for a new row.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current instant as RFC 3339, the format of every `created_at`/`updated_at`.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Local calendar date as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// The date `days` before `from`, as `YYYY-MM-DD`.
pub fn date_days_before(from: NaiveDate, days: u32) -> String {
    (from - Duration::days(i64::from(days)))
        .format("%Y-%m-%d")
        .to_string()
}

/// Start of the lookback window ending today.
pub fn lookback_start(days: u32) -> String {
    date_days_before(Local::now().date_naive(), days)
}

/// Parse a `YYYY-MM-DD` date, rejecting anything else.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Trimmed, non-empty text or `None`.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Collapse internal whitespace and trim.
///
/// Example: "  Asha   K " → "Asha K"
pub fn clean_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}
