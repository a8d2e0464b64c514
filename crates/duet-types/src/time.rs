use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a stored timestamp column. Rows written by this service are RFC 3339;
/// SQLite's own datetime() produces "YYYY-MM-DD HH:MM:SS" without a timezone,
/// which is taken as naive UTC.
pub fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339() {
        let parsed = parse_utc("2026-08-05T09:30:00+00:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-08-05T09:30:00+00:00");
    }

    #[test]
    fn parses_sqlite_naive_format_as_utc() {
        let parsed = parse_utc("2026-08-05 09:30:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-08-05T09:30:00+00:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_utc("yesterdayish").is_none());
        assert!(parse_utc("").is_none());
    }
}
