//! # ed318
//!
//! Conversion de tableaux de zones géographiques UAS vers un document
//! GeoJSON au format ED-318.
//!
//! ## Features
//!
//! - Géométries WKT (Point, Polygon) ou GeoJSON déjà structurées
//! - Orientation anti-horaire systématique des polygones
//! - Résolution des géométries manquantes via un service externe (WFS)
//! - Textes bilingues (anglais / suédois), autorité, périodes d'applicabilité
//! - Variante Dronechart (limites verticales à plat)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ed318::{convert, resolve, missing_geometry_ids};
//!
//! let missing = missing_geometry_ids(&records);
//! let resolution = resolve(&wfs, &layers, &missing).await;
//! let conversion = convert(&records, &resolution.resolved, &config)?;
//!
//! println!("{} zones", conversion.collection.features.len());
//! ```

pub mod authority;
pub mod collection;
pub mod date;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod language;
pub mod resolver;
pub mod time_window;
pub mod types;

pub use collection::FeatureCollection;
pub use error::ZoneError;
pub use feature::ZoneFeature;
pub use resolver::{missing_geometry_ids, resolve, GeometryService, Resolution, DEFAULT_LAYERS};
pub use types::{CellValue, RunConfig, ZoneRecord};

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::geometry::RawGeometry;

/// Résultat d'une conversion réussie
#[derive(Debug)]
pub struct Conversion {
    /// Le document produit
    pub collection: FeatureCollection,
    /// Lignes écartées faute d'identifiant ou de géométrie
    pub skipped: Vec<ZoneError>,
}

enum RowOutcome {
    Converted(ZoneFeature),
    Skipped(ZoneError),
    Failed(ZoneError),
}

/// Convertit toutes les lignes en un document ED-318.
///
/// `resolved` fournit les géométries des lignes qui n'en ont pas (voir [`resolve`]).
/// Une ligne sans identifiant ou sans géométrie est écartée; elle figure dans
/// [`Conversion::skipped`]. Les lignes sont numérotées à partir de 1.
///
/// # Errors
///
/// Retourne [`ZoneError::Rows`] avec l'erreur de chaque ligne en échec
/// (date, géométrie, horaire, champ obligatoire). Aucun document partiel
/// n'est produit.
pub fn convert(
    records: &[ZoneRecord],
    resolved: &HashMap<String, geojson::Geometry>,
    config: &RunConfig,
) -> Result<Conversion, ZoneError> {
    let outcomes: Vec<RowOutcome> = records
        .par_iter()
        .enumerate()
        .map(|(index, record)| convert_row(record, index + 1, resolved, config))
        .collect();

    let mut features = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();
    let mut failures = Vec::new();

    for outcome in outcomes {
        match outcome {
            RowOutcome::Converted(feature) => features.push(feature),
            RowOutcome::Skipped(e) => {
                warn!(error = %e, "Zone skipped");
                skipped.push(e);
            }
            RowOutcome::Failed(e) => failures.push(e),
        }
    }

    if !failures.is_empty() {
        return Err(ZoneError::Rows(failures));
    }

    info!(
        features = features.len(),
        skipped = skipped.len(),
        "Zones converted"
    );

    Ok(Conversion {
        collection: FeatureCollection::new(config, features),
        skipped,
    })
}

fn convert_row(
    record: &ZoneRecord,
    row: usize,
    resolved: &HashMap<String, geojson::Geometry>,
    config: &RunConfig,
) -> RowOutcome {
    let Some(identifier) = record.id() else {
        return RowOutcome::Skipped(ZoneError::MissingRequiredField {
            row,
            field: "identifier",
        });
    };

    let raw = match record.geometry.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
        Some(text) => match RawGeometry::from_cell(text) {
            Ok(raw) => raw,
            Err(e) => return RowOutcome::Failed(ZoneError::row(identifier, e)),
        },
        None => match resolved.get(identifier) {
            Some(geometry) => match RawGeometry::from_geojson(geometry) {
                Ok(raw) => raw,
                Err(e) => return RowOutcome::Failed(ZoneError::row(identifier, e)),
            },
            None => {
                return RowOutcome::Skipped(ZoneError::row(
                    identifier,
                    ZoneError::MissingRequiredField {
                        row,
                        field: "geometry",
                    },
                ))
            }
        },
    };

    match feature::assemble(record, &raw, config, row) {
        Ok(feature) => RowOutcome::Converted(feature),
        Err(e) => RowOutcome::Failed(ZoneError::row(identifier, e)),
    }
}
