use chrono::{DateTime, Duration, Utc};

/// Staleness window for the online verdict. An account whose last activity is
/// this old (or older) reads as offline.
pub const ONLINE_WINDOW_SECS: i64 = 5 * 60;

/// Online iff the last activity is strictly inside the window; exactly
/// `ONLINE_WINDOW_SECS` of staleness is offline. An account that never
/// reported activity is offline.
pub fn is_online(last_active: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_active {
        Some(last) => now.signed_duration_since(last) < Duration::seconds(ONLINE_WINDOW_SECS),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(rfc3339: &str) -> DateTime<Utc> {
        rfc3339.parse().unwrap()
    }

    #[test]
    fn never_active_is_offline() {
        assert!(!is_online(None, t("2026-08-05T12:00:00Z")));
    }

    #[test]
    fn activity_inside_window_is_online() {
        let now = t("2026-08-05T12:05:00Z");
        assert!(is_online(Some(t("2026-08-05T12:04:59Z")), now));
        assert!(is_online(Some(t("2026-08-05T12:00:01Z")), now));
        assert!(is_online(Some(now), now));
    }

    #[test]
    fn window_boundary_is_offline() {
        let now = t("2026-08-05T12:05:00Z");
        assert!(!is_online(Some(t("2026-08-05T12:00:00Z")), now));
    }

    #[test]
    fn stale_activity_is_offline() {
        let now = t("2026-08-05T12:00:00Z");
        assert!(!is_online(Some(t("2026-08-05T10:59:00Z")), now));
        assert!(!is_online(Some(t("2026-08-04T12:00:00Z")), now));
    }
}
