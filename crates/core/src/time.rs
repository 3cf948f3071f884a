use chrono::{DateTime, Utc};

/// Today at 00:00:00 UTC. Used as the lower bound for subscribers whose theme
/// has never been notified, so a fresh subscription does not replay the whole
/// backlog.
pub fn today_midnight_utc() -> DateTime<Utc> {
    Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time")
        .and_utc()
}
