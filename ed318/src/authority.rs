//! Bloc `zoneAuthority`

use serde::Serialize;

use crate::language::{language_list, LocalizedText, TextKey};
use crate::types::{present, ZoneRecord};

/// Autorité responsable d'une zone
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Authority {
    /// Toujours émis, `null` si aucune langue n'est renseignée
    pub name: Option<Vec<LocalizedText>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "siteURL", skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<Vec<LocalizedText>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<LocalizedText>>,
}

impl Authority {
    /// Construit l'autorité depuis les colonnes `authority*` d'une ligne.
    ///
    /// `contactName` et `service` ne sont publiés qu'en suédois.
    pub fn from_record(record: &ZoneRecord) -> Self {
        Self {
            name: language_list(
                present(&record.authority_name_en),
                present(&record.authority_name_se),
                TextKey::Name,
            ),
            purpose: scalar(&record.authority_purpose),
            email: scalar(&record.authority_email),
            site_url: scalar(&record.authority_site_url),
            phone: scalar(&record.authority_phone),
            interval_before: scalar(&record.authority_interval_before),
            contact_name: present(&record.authority_contact_name).map(LocalizedText::swedish),
            service: present(&record.service).map(LocalizedText::swedish),
        }
    }
}

/// Valeur scalaire présente; une liste sérialisée (`[...]`) est écartée
fn scalar(value: &Option<String>) -> Option<String> {
    present(value)
        .filter(|v| !(v.starts_with('[') && v.ends_with(']')))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_authority() {
        let record = ZoneRecord {
            authority_name_en: Some("Swedish Armed Forces".into()),
            authority_name_se: Some("Försvarsmakten".into()),
            authority_purpose: Some("AUTHORIZATION".into()),
            authority_email: Some("exp-hkv@mil.se".into()),
            authority_site_url: Some("https://www.forsvarsmakten.se".into()),
            authority_phone: Some("+46 8 788 75 00".into()),
            authority_interval_before: Some("P3D".into()),
            authority_contact_name: Some("Högkvarteret".into()),
            service: Some("Tillståndsenheten".into()),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(Authority::from_record(&record)).unwrap(),
            json!({
                "name": [
                    {"name": "Swedish Armed Forces", "lang": "en-GB"},
                    {"name": "Försvarsmakten", "lang": "se-SE"}
                ],
                "purpose": "AUTHORIZATION",
                "email": "exp-hkv@mil.se",
                "siteURL": "https://www.forsvarsmakten.se",
                "phone": "+46 8 788 75 00",
                "intervalBefore": "P3D",
                "contactName": [{"text": "Högkvarteret", "lang": "se-SE"}],
                "service": [{"text": "Tillståndsenheten", "lang": "se-SE"}]
            })
        );
    }

    #[test]
    fn test_minimal_authority_keeps_name() {
        let value = serde_json::to_value(Authority::from_record(&ZoneRecord::default())).unwrap();
        assert_eq!(value, json!({"name": null}));
    }

    #[test]
    fn test_list_placeholder_is_skipped() {
        let record = ZoneRecord {
            authority_email: Some("[]".into()),
            authority_phone: Some("['a', 'b']".into()),
            authority_purpose: Some("INFORMATION".into()),
            ..Default::default()
        };
        let authority = Authority::from_record(&record);
        assert_eq!(authority.email, None);
        assert_eq!(authority.phone, None);
        assert_eq!(authority.purpose.as_deref(), Some("INFORMATION"));
    }
}
