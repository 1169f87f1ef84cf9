//! Bloc `limitedApplicability`

use serde::Serialize;
use serde_json::Value;

use crate::date::{normalize_timestamp, DefaultTime};
use crate::types::{present, ZoneRecord};
use crate::ZoneError;

/// Période d'applicabilité d'une zone
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Value>,
}

impl TimeWindow {
    /// Construit la période si au moins un des trois champs est présent.
    ///
    /// # Errors
    ///
    /// - [`ZoneError::Format`] pour un horodatage illisible
    /// - [`ZoneError::ScheduleFormat`] pour un horaire illisible
    pub fn from_record(record: &ZoneRecord) -> Result<Option<Self>, ZoneError> {
        let start = present(&record.start_date_time);
        let end = present(&record.end_date_time);
        let schedule = present(&record.schedule);

        if start.is_none() && end.is_none() && schedule.is_none() {
            return Ok(None);
        }

        Ok(Some(Self {
            start_date_time: start
                .map(|s| normalize_timestamp("startDateTime", s, DefaultTime::StartOfDay))
                .transpose()?,
            end_date_time: end
                .map(|e| normalize_timestamp("endDateTime", e, DefaultTime::EndOfDay))
                .transpose()?,
            schedule: schedule.map(parse_schedule).transpose()?,
        }))
    }
}

/// Parse un horaire sérialisé en JSON.
///
/// Seuls une liste ou un objet sont acceptés.
pub fn parse_schedule(text: &str) -> Result<Value, ZoneError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ZoneError::ScheduleFormat {
        value: text.to_string(),
        reason: e.to_string(),
    })?;

    match value {
        Value::Array(_) | Value::Object(_) => Ok(value),
        _ => Err(ZoneError::ScheduleFormat {
            value: text.to_string(),
            reason: "expected a JSON array or object".to_string(),
        }),
    }
}
