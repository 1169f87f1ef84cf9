//! Client WFS: géométries des zones par identifiant
//!
//! Une requête `GetFeature` par couche, avec un filtre OGC d'égalité sur
//! l'attribut portant le nom de zone (un `<Or>` quand il y a plusieurs
//! identifiants). La réponse GeoJSON est indexée par ce même attribut.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use ed318::{GeometryService, ZoneError};
use serde_json::Value;
use tracing::debug;

use crate::config::WfsConfig;

/// Client du service WFS
#[derive(Debug, Clone)]
pub struct WfsClient {
    client: reqwest::Client,
    url: String,
    area_attribute: String,
}

impl WfsClient {
    pub fn new(config: &WfsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: config.url.clone(),
            area_attribute: config.area_attribute.clone(),
        })
    }
}

impl GeometryService for WfsClient {
    async fn fetch(
        &self,
        layer: &str,
        identifiers: &[String],
    ) -> Result<HashMap<String, geojson::Geometry>, ZoneError> {
        let filter = build_filter(&self.area_attribute, identifiers);
        debug!(layer = layer, url = %self.url, ids = identifiers.len(), "WFS GetFeature");

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("service", "WFS"),
                ("version", "1.0.0"),
                ("request", "GetFeature"),
                ("typeName", layer),
                ("outputFormat", "application/json"),
                ("filter", filter.as_str()),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ZoneError::resolution(layer, e))?;

        let collection: geojson::FeatureCollection = response
            .json()
            .await
            .map_err(|e| ZoneError::resolution(layer, e))?;

        Ok(index_features(collection, &self.area_attribute))
    }
}

/// Filtre OGC `<Filter>` sur l'attribut de zone
pub fn build_filter(attribute: &str, identifiers: &[String]) -> String {
    let clauses: String = identifiers
        .iter()
        .map(|id| {
            format!(
                "<PropertyIsEqualTo><PropertyName>{}</PropertyName><Literal>{}</Literal></PropertyIsEqualTo>",
                escape_xml(attribute),
                escape_xml(id)
            )
        })
        .collect();

    if identifiers.len() > 1 {
        format!("<Filter><Or>{}</Or></Filter>", clauses)
    } else {
        format!("<Filter>{}</Filter>", clauses)
    }
}

/// Indexe les géométries de la réponse par valeur de l'attribut de zone
pub fn index_features(
    collection: geojson::FeatureCollection,
    attribute: &str,
) -> HashMap<String, geojson::Geometry> {
    collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let key = match feature.properties.as_ref()?.get(attribute)? {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            Some((key, feature.geometry?))
        })
        .collect()
}

/// Échappe une chaîne pour XML
fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            c => result.push(c),
        }
    }
    result
}
