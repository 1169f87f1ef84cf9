//! Document final (FeatureCollection)

use serde::Serialize;

use crate::date::{format_naive, DefaultTime};
use crate::feature::ZoneFeature;
use crate::language::LocalizedText;
use crate::types::RunConfig;

/// Métadonnées du document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub provider: Vec<LocalizedText>,
    pub issued: String,
    pub valid_from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<String>,
    pub technical_limitations: Vec<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<LocalizedText>>,
}

impl Metadata {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            provider: LocalizedText::english(config.provider.as_str()),
            issued: format_naive(config.issued, DefaultTime::StartOfDay),
            valid_from: format_naive(config.valid_from, DefaultTime::StartOfDay),
            valid_to: config
                .valid_to
                .map(|d| format_naive(d, DefaultTime::StartOfDay)),
            technical_limitations: LocalizedText::english(config.technical_limitations.as_str()),
            description: config
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(LocalizedText::english),
        }
    }
}

/// Document ED-318 complet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    pub metadata: Metadata,
    pub features: Vec<ZoneFeature>,
}

impl FeatureCollection {
    /// Construit le document à partir des zones assemblées, dans leur ordre
    pub fn new(config: &RunConfig, features: Vec<ZoneFeature>) -> Self {
        Self {
            kind: "FeatureCollection",
            title: config.title.clone(),
            metadata: Metadata::from_config(config),
            features,
        }
    }
}
