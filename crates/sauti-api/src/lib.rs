pub mod auth;
pub mod chat;
pub mod chatbot;
pub mod config;
pub mod incidents;
pub mod middleware;
pub mod routes;
pub mod sos;
pub mod token;
pub mod users;
pub mod voice;

use tracing::warn;

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
/// Parse as naive UTC and convert; fall back to RFC 3339 for values that
/// carry a timezone.
pub(crate) fn parse_timestamp(raw: &str) -> chrono::DateTime<chrono::Utc> {
    raw.parse::<chrono::DateTime<chrono::Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}': {}", raw, e);
            chrono::DateTime::default()
        })
}

/// Strip anything that could escape the upload directory or confuse a
/// filesystem; keeps extension dots. Falls back to `default` when nothing
/// usable is left.
pub(crate) fn sanitize_filename(name: &str, default: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(['.', '_']).is_empty() {
        default.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_timestamp, sanitize_filename};

    #[test]
    fn parses_sqlite_datetime_format() {
        let ts = parse_timestamp("2026-08-30 12:34:56");
        assert_eq!(ts.to_rfc3339(), "2026-08-30T12:34:56+00:00");
    }

    #[test]
    fn parses_rfc3339() {
        let ts = parse_timestamp("2026-08-30T12:34:56Z");
        assert_eq!(ts.to_rfc3339(), "2026-08-30T12:34:56+00:00");
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(
            sanitize_filename("../../etc/passwd", "attachment"),
            ".._.._etc_passwd"
        );
        assert_eq!(sanitize_filename("photo 1.jpg", "attachment"), "photo_1.jpg");
        assert_eq!(sanitize_filename("///", "attachment"), "attachment");
    }
}
