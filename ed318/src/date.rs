//! Formatage des dates en horodatages ISO-8601 UTC

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::ZoneError;

/// Format de sortie des horodatages (`2025-01-30T00:00:00Z`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Heure appliquée à une date sans heure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultTime {
    /// 00:00:00
    #[default]
    StartOfDay,
    /// 23:59:59
    EndOfDay,
}

impl DefaultTime {
    fn clock(self) -> &'static str {
        match self {
            DefaultTime::StartOfDay => "00:00:00",
            DefaultTime::EndOfDay => "23:59:59",
        }
    }
}

/// Parse une date calendaire `YYYY-MM-DD`
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ZoneError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ZoneError::format(field, value))
}

/// Formate une date avec l'heure par défaut
pub fn format_naive(date: NaiveDate, default_time: DefaultTime) -> String {
    format!("{}T{}Z", date.format("%Y-%m-%d"), default_time.clock())
}

/// Formate une date optionnelle.
///
/// Une date absente (ou vide) donne `None`: le champ doit alors être omis,
/// jamais émis comme horodatage vide.
///
/// # Errors
///
/// Retourne [`ZoneError::Format`] si la date n'est pas une date calendaire valide.
pub fn format_date(
    field: &str,
    date: Option<&str>,
    default_time: DefaultTime,
) -> Result<Option<String>, ZoneError> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => Ok(Some(format_naive(parse_date(field, d)?, default_time))),
        None => Ok(None),
    }
}

/// Normalise une cellule horodatage.
///
/// Une date seule passe par [`format_naive`]; un horodatage complet
/// (RFC 3339, `YYYY-MM-DD HH:MM:SS` ou `YYYY-MM-DDTHH:MM:SS`) est ramené en UTC.
pub fn normalize_timestamp(
    field: &str,
    value: &str,
    default_time: DefaultTime,
) -> Result<String, ZoneError> {
    let trimmed = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(format_naive(date, default_time));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string());
    }

    // Horodatage sans fuseau: considéré comme UTC
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return Ok(dt.format(TIMESTAMP_FORMAT).to_string());
        }
    }

    Err(ZoneError::format(field, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_start_of_day() {
        let formatted = format_date("issued", Some("2025-01-30"), DefaultTime::StartOfDay).unwrap();
        assert_eq!(formatted.as_deref(), Some("2025-01-30T00:00:00Z"));
    }

    #[test]
    fn test_format_date_end_of_day() {
        let formatted = format_date("validTo", Some("2025-03-01"), DefaultTime::EndOfDay).unwrap();
        assert_eq!(formatted.as_deref(), Some("2025-03-01T23:59:59Z"));
    }

    #[test]
    fn test_format_date_absent() {
        assert_eq!(format_date("validTo", None, DefaultTime::EndOfDay).unwrap(), None);
        assert_eq!(format_date("validTo", Some("  "), DefaultTime::EndOfDay).unwrap(), None);
    }

    #[test]
    fn test_format_date_invalid() {
        let err = format_date("issued", Some("2025-13-40"), DefaultTime::StartOfDay).unwrap_err();
        assert!(matches!(err, ZoneError::Format { ref field, .. } if field == "issued"));
    }

    #[test]
    fn test_normalize_timestamp() {
        assert_eq!(
            normalize_timestamp("endDateTime", "2025-06-01", DefaultTime::EndOfDay).unwrap(),
            "2025-06-01T23:59:59Z"
        );
        assert_eq!(
            normalize_timestamp("startDateTime", "2025-06-01T08:30:00+02:00", DefaultTime::StartOfDay)
                .unwrap(),
            "2025-06-01T06:30:00Z"
        );
        assert_eq!(
            normalize_timestamp("startDateTime", "2025-06-01 08:30:00", DefaultTime::StartOfDay)
                .unwrap(),
            "2025-06-01T08:30:00Z"
        );
        assert!(normalize_timestamp("startDateTime", "tomorrow", DefaultTime::StartOfDay).is_err());
    }
}
