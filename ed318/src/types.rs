//! Types de données pour le crate ed318

use std::fmt;

use chrono::NaiveDate;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// Une ligne du tableau des zones.
///
/// Les noms de champs serde sont les en-têtes de colonnes du tableau source.
/// Toutes les colonnes sont optionnelles à la lecture: l'absence d'une colonne
/// obligatoire est détectée à l'assemblage.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoneRecord {
    pub identifier: Option<String>,
    pub country: Option<String>,
    pub name_en: Option<String>,
    pub name_se: Option<String>,
    pub variant: Option<String>,
    /// Catégories séparées par des virgules
    pub reason: Option<String>,
    #[serde(rename = "type")]
    pub zone_type: Option<String>,

    /// WKT, géométrie GeoJSON sérialisée, ou absente (à résoudre)
    pub geometry: Option<String>,
    pub radius: Option<CellValue>,

    // Limites verticales
    pub upper: Option<CellValue>,
    #[serde(rename = "upperRef")]
    pub upper_ref: Option<String>,
    pub lower: Option<CellValue>,
    #[serde(rename = "lowerRef")]
    pub lower_ref: Option<String>,
    pub uom: Option<String>,

    // Autorité
    #[serde(rename = "authorityName_en", alias = "authority_name")]
    pub authority_name_en: Option<String>,
    #[serde(rename = "authorityName_se")]
    pub authority_name_se: Option<String>,
    pub authority_purpose: Option<String>,
    pub authority_email: Option<String>,
    #[serde(rename = "authority_siteURL")]
    pub authority_site_url: Option<String>,
    pub authority_phone: Option<String>,
    #[serde(rename = "authority_intervalBefore")]
    pub authority_interval_before: Option<String>,
    #[serde(rename = "authority_contactName")]
    pub authority_contact_name: Option<String>,
    pub service: Option<String>,

    // Applicabilité
    #[serde(rename = "startDateTime")]
    pub start_date_time: Option<String>,
    #[serde(rename = "endDateTime")]
    pub end_date_time: Option<String>,
    /// Horaire sérialisé en JSON
    pub schedule: Option<String>,

    // Source des données
    #[serde(rename = "creationDateTime")]
    pub creation_date_time: Option<String>,
    #[serde(rename = "updateDateTime")]
    pub update_date_time: Option<String>,
    pub originator: Option<String>,

    // Textes optionnels
    #[serde(rename = "restrictionConditions_en")]
    pub restriction_conditions_en: Option<String>,
    #[serde(rename = "otherReasonInfo_en")]
    pub other_reason_info_en: Option<String>,
    #[serde(rename = "otherReasonInfo_se")]
    pub other_reason_info_se: Option<String>,
    #[serde(rename = "regulationExemption")]
    pub regulation_exemption: Option<String>,
    pub message_en: Option<String>,
    pub message_se: Option<String>,
    #[serde(rename = "extendedProperties")]
    pub extended_properties: Option<String>,
}

impl ZoneRecord {
    /// Identifiant de la zone, s'il est renseigné
    pub fn id(&self) -> Option<&str> {
        present(&self.identifier)
    }

    /// La ligne porte-t-elle sa propre géométrie ?
    pub fn has_geometry(&self) -> bool {
        present(&self.geometry).is_some()
    }

    /// Catégories de la zone, nettoyées
    pub fn reasons(&self) -> Vec<String> {
        present(&self.reason)
            .map(|r| {
                r.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Valeur d'une cellule texte non vide (après trim)
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Valeur scalaire d'une cellule numérique.
///
/// Les entiers restent des entiers dans la sortie JSON (`100`, pas `100.0`),
/// le reste est conservé tel quel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Interprète le texte brut d'une cellule
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return CellValue::Float(f);
            }
        }
        // Virgule décimale (exports tableur suédois), sauf `1,500` qui reste ambigu
        // avec un séparateur de milliers
        if let Some((_, fraction)) = trimmed.split_once(',') {
            let thousands = fraction.len() == 3 && fraction.bytes().all(|b| b.is_ascii_digit());
            if !trimmed.contains('.') && !thousands {
                if let Ok(f) = trimmed.replacen(',', ".", 1).parse::<f64>() {
                    if f.is_finite() {
                        return CellValue::Float(f);
                    }
                }
            }
        }
        CellValue::Text(trimmed.to_string())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CellVisitor;

        impl<'de> Visitor<'de> for CellVisitor {
            type Value = CellValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or a string")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<CellValue, E> {
                Ok(CellValue::Text(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<CellValue, E> {
                Ok(CellValue::Integer(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<CellValue, E> {
                Ok(i64::try_from(v)
                    .map(CellValue::Integer)
                    .unwrap_or(CellValue::Float(v as f64)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<CellValue, E> {
                Ok(CellValue::Float(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CellValue, E> {
                Ok(CellValue::parse(v))
            }
        }

        deserializer.deserialize_any(CellVisitor)
    }
}

/// Paramètres d'une conversion, fixés pour toute l'exécution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Titre du document
    pub title: String,
    /// Fournisseur des données (texte libre)
    pub provider: String,
    pub issued: NaiveDate,
    pub valid_from: NaiveDate,
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technical_limitations: String,
    /// Ajoute les limites verticales à plat pour Dronechart
    #[serde(default)]
    pub dronechart: bool,
    /// Ajoute le bloc `dataSource` aux propriétés
    #[serde(default)]
    pub include_data_source: bool,
}
