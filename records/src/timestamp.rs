//! RFC 3339 timestamp helpers. Records carry timestamps as strings; these
//! helpers are the only place that parses or produces them.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Current UTC time formatted as RFC 3339.
#[must_use]
pub fn now() -> String {
    format(OffsetDateTime::now_utc())
}

#[must_use]
pub fn format(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_default()
}

/// Parse an RFC 3339 timestamp. Returns `None` for anything malformed.
#[must_use]
pub fn parse(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_round_trips_through_parse() {
        let stamp = now();
        assert!(parse(&stamp).is_some(), "unparseable: {stamp}");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse("yesterday").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn parse_orders_chronologically() {
        let a = parse("2023-05-15T10:30:00Z").unwrap();
        let b = parse("2023-05-16T09:15:00Z").unwrap();
        assert!(a < b);
    }
}
