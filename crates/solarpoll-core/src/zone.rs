// Time-zone resolution for the site's local timestamps.

use chrono_tz::Tz;
use tracing::warn;

/// Resolve an IANA zone name, falling back to UTC.
///
/// An empty name means UTC. An unknown name also yields UTC but logs a
/// warning: every timestamp from that collector is then shifted by the
/// site's real offset.
pub fn resolve_zone(name: &str) -> Tz {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Tz::UTC;
    }
    trimmed.parse::<Tz>().unwrap_or_else(|_| {
        warn!(
            time_zone = trimmed,
            "unknown time zone, falling back to UTC; timestamps may be shifted"
        );
        Tz::UTC
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_zone_resolves() {
        assert_eq!(resolve_zone("Europe/Prague"), Tz::Europe__Prague);
        assert_eq!(resolve_zone("MST"), Tz::MST);
    }

    #[test]
    fn empty_name_is_utc() {
        assert_eq!(resolve_zone(""), Tz::UTC);
        assert_eq!(resolve_zone("   "), Tz::UTC);
    }

    #[test]
    fn unknown_name_falls_back_to_utc() {
        assert_eq!(resolve_zone("Mars/Olympus_Mons"), Tz::UTC);
    }
}
