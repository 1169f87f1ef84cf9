//! Assemblage d'une zone en Feature GeoJSON

use serde::Serialize;

use crate::authority::Authority;
use crate::date::{normalize_timestamp, DefaultTime};
use crate::geometry::{normalize, RawGeometry, ZoneGeometry, ZoneLayer};
use crate::language::{language_list, LocalizedText, TextKey};
use crate::time_window::TimeWindow;
use crate::types::{present, CellValue, RunConfig, ZoneRecord};
use crate::ZoneError;

/// Une zone publiée
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneFeature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: ZoneGeometry,
    pub properties: ZoneProperties,
}

/// Propriétés d'une zone
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneProperties {
    pub identifier: String,
    pub country: String,
    pub name: Option<Vec<LocalizedText>>,
    pub variant: String,
    pub reason: Vec<String>,
    #[serde(rename = "type")]
    pub zone_type: String,
    pub zone_authority: Vec<Authority>,
    #[serde(flatten)]
    pub dronechart: Option<DronechartLimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restriction_conditions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_reason_info: Option<Vec<LocalizedText>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regulation_exemption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Vec<LocalizedText>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_properties: Option<ExtendedProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limited_applicability: Option<Vec<TimeWindow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSource>,
}

/// Limites verticales à plat, pour Dronechart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DronechartLimits {
    pub upper: Option<CellValue>,
    pub upper_uom: String,
    pub lower: Option<CellValue>,
    pub lower_uom: String,
}

impl DronechartLimits {
    pub fn from_layer(layer: &ZoneLayer) -> Self {
        Self {
            upper: layer.upper.clone(),
            upper_uom: unit_label(layer.uom.as_deref(), layer.upper_reference.as_deref()),
            lower: layer.lower.clone(),
            lower_uom: unit_label(layer.uom.as_deref(), layer.lower_reference.as_deref()),
        }
    }
}

/// `"{uom} {reference}"`, en omettant les parties absentes
fn unit_label(uom: Option<&str>, reference: Option<&str>) -> String {
    [uom, reference]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedProperties {
    pub text: String,
}

/// Origine des données d'une zone
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub creation_date_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub originator: Option<String>,
}

impl DataSource {
    /// `None` si la ligne n'a pas de `creationDateTime`
    pub fn from_record(record: &ZoneRecord) -> Result<Option<Self>, ZoneError> {
        let Some(created) = present(&record.creation_date_time) else {
            return Ok(None);
        };

        Ok(Some(Self {
            creation_date_time: normalize_timestamp(
                "creationDateTime",
                created,
                DefaultTime::StartOfDay,
            )?,
            update_date_time: present(&record.update_date_time)
                .map(|u| normalize_timestamp("updateDateTime", u, DefaultTime::StartOfDay))
                .transpose()?,
            originator: present(&record.originator).map(str::to_string),
        }))
    }
}

/// Assemble la Feature d'une ligne.
///
/// `row` est l'index de la ligne dans le tableau, pour les messages d'erreur.
///
/// # Errors
///
/// Retourne [`ZoneError::MissingRequiredField`] si `identifier`, `country`,
/// `variant` ou `type` manque, ou l'erreur de la géométrie, de la période
/// ou de la source de données.
pub fn assemble(
    record: &ZoneRecord,
    raw: &RawGeometry,
    config: &RunConfig,
    row: usize,
) -> Result<ZoneFeature, ZoneError> {
    let required = |value: &Option<String>, field: &'static str| {
        present(value)
            .map(str::to_string)
            .ok_or(ZoneError::MissingRequiredField { row, field })
    };

    let identifier = required(&record.identifier, "identifier")?;
    let country = required(&record.country, "country")?;
    let variant = required(&record.variant, "variant")?;
    let zone_type = required(&record.zone_type, "type")?;

    let geometry = normalize(raw, record)?;
    let time_window = TimeWindow::from_record(record)?;
    let data_source = if config.include_data_source {
        DataSource::from_record(record)?
    } else {
        None
    };

    let properties = ZoneProperties {
        identifier,
        country,
        name: language_list(present(&record.name_en), present(&record.name_se), TextKey::Text),
        variant,
        reason: record.reasons(),
        zone_type,
        zone_authority: vec![Authority::from_record(record)],
        dronechart: config
            .dronechart
            .then(|| DronechartLimits::from_layer(&geometry.layer)),
        restriction_conditions: present(&record.restriction_conditions_en).map(str::to_string),
        other_reason_info: language_list(
            present(&record.other_reason_info_en),
            present(&record.other_reason_info_se),
            TextKey::Text,
        ),
        regulation_exemption: present(&record.regulation_exemption).map(str::to_string),
        message: language_list(
            present(&record.message_en),
            present(&record.message_se),
            TextKey::Text,
        ),
        extended_properties: present(&record.extended_properties).map(|text| {
            ExtendedProperties {
                text: text.to_string(),
            }
        }),
        limited_applicability: time_window.map(|w| vec![w]),
        data_source,
    };

    Ok(ZoneFeature {
        kind: "Feature",
        geometry,
        properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn config(dronechart: bool) -> RunConfig {
        RunConfig {
            title: "Test".into(),
            provider: "LFV".into(),
            issued: NaiveDate::from_ymd_opt(2025, 1, 30).unwrap(),
            valid_from: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            valid_to: None,
            description: None,
            technical_limitations: String::new(),
            dronechart,
            include_data_source: false,
        }
    }

    fn record() -> ZoneRecord {
        ZoneRecord {
            identifier: Some("Z1".into()),
            country: Some("SWE".into()),
            name_en: Some("Karlsborg".into()),
            variant: Some("COMMON".into()),
            reason: Some("Military, Other".into()),
            zone_type: Some("USPACE".into()),
            geometry: Some("POINT(11.5 58.3)".into()),
            radius: Some(CellValue::Integer(500)),
            upper: Some(CellValue::Integer(100)),
            upper_ref: Some("AGL".into()),
            lower: Some(CellValue::Integer(0)),
            lower_ref: Some("AGL".into()),
            uom: Some("m".into()),
            authority_name_se: Some("Försvarsmakten".into()),
            ..Default::default()
        }
    }

    fn build(record: &ZoneRecord, config: &RunConfig) -> Result<ZoneFeature, ZoneError> {
        let raw = RawGeometry::from_cell(record.geometry.as_deref().unwrap())?;
        assemble(record, &raw, config, 0)
    }

    #[test]
    fn test_point_feature() {
        let feature = build(&record(), &config(false)).unwrap();
        let value = serde_json::to_value(&feature).unwrap();

        assert_eq!(value["type"], json!("Feature"));
        assert_eq!(value["geometry"]["type"], json!("Point"));
        assert_eq!(value["geometry"]["extent"], json!({"subType": "Circle", "radius": 500}));
        assert_eq!(value["properties"]["reason"], json!(["Military", "Other"]));
        assert_eq!(value["properties"]["name"], json!([{"text": "Karlsborg", "lang": "en-GB"}]));
        assert_eq!(
            value["properties"]["zoneAuthority"],
            json!([{"name": [{"name": "Försvarsmakten", "lang": "se-SE"}]}])
        );

        let properties = value["properties"].as_object().unwrap();
        for absent in [
            "upper",
            "upperUom",
            "restrictionConditions",
            "otherReasonInfo",
            "message",
            "extendedProperties",
            "limitedApplicability",
            "dataSource",
        ] {
            assert!(!properties.contains_key(absent), "{} should be absent", absent);
        }
    }

    #[test]
    fn test_dronechart_fields() {
        let plain = serde_json::to_value(build(&record(), &config(false)).unwrap()).unwrap();
        let chart = serde_json::to_value(build(&record(), &config(true)).unwrap()).unwrap();

        assert_eq!(chart["properties"]["upper"], json!(100));
        assert_eq!(chart["properties"]["upperUom"], json!("m AGL"));
        assert_eq!(chart["properties"]["lower"], json!(0));
        assert_eq!(chart["properties"]["lowerUom"], json!("m AGL"));
        assert_eq!(chart["geometry"], plain["geometry"]);

        let extra: Vec<&String> = chart["properties"]
            .as_object()
            .unwrap()
            .keys()
            .filter(|k| !plain["properties"].as_object().unwrap().contains_key(*k))
            .collect();
        assert_eq!(extra.len(), 4);
    }

    #[test]
    fn test_optional_properties() {
        let mut record = record();
        record.restriction_conditions_en = Some("Permit required".into());
        record.other_reason_info_se = Some("Skjutfält".into());
        record.regulation_exemption = Some("YES".into());
        record.message_en = Some("Contact before flight".into());
        record.message_se = Some("Kontakta före flygning".into());
        record.extended_properties = Some("NOTAM".into());
        record.start_date_time = Some("2025-06-01".into());
        record.creation_date_time = Some("2025-01-02".into());

        let mut config = config(false);
        config.include_data_source = true;
        let value = serde_json::to_value(build(&record, &config).unwrap()).unwrap();
        let properties = &value["properties"];

        assert_eq!(properties["restrictionConditions"], json!("Permit required"));
        assert_eq!(properties["otherReasonInfo"], json!([{"text": "Skjutfält", "lang": "se-SE"}]));
        assert_eq!(properties["regulationExemption"], json!("YES"));
        assert_eq!(properties["message"].as_array().unwrap().len(), 2);
        assert_eq!(properties["extendedProperties"], json!({"text": "NOTAM"}));
        assert_eq!(
            properties["limitedApplicability"],
            json!([{"startDateTime": "2025-06-01T00:00:00Z"}])
        );
        assert_eq!(
            properties["dataSource"],
            json!({"creationDateTime": "2025-01-02T00:00:00Z"})
        );
    }

    #[test]
    fn test_missing_country() {
        let mut record = record();
        record.country = None;
        let err = build(&record, &config(false)).unwrap_err();
        assert!(matches!(err, ZoneError::MissingRequiredField { field: "country", .. }));
    }

    #[test]
    fn test_unit_label() {
        assert_eq!(unit_label(Some("ft"), Some("AMSL")), "ft AMSL");
        assert_eq!(unit_label(None, Some("AGL")), "AGL");
        assert_eq!(unit_label(None, None), "");
    }
}
