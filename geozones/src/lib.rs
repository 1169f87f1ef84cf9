//! # geozones
//!
//! Conversion d'un tableau de zones géographiques UAS en document GeoJSON ED-318.
//!
//! ## Features
//!
//! - Lecture de tableaux délimités (CSV, séparateur et encodage configurables)
//!   ou de classeurs tableur (xlsx, xls, ods)
//! - Résolution des géométries manquantes via le WFS de LFV
//! - Variante Dronechart
//! - Rapport de conversion (console ou JSON)
//!
//! ## Usage CLI
//!
//! ```bash
//! # Conversion avec le preset LFV
//! geozones --input ./zones.csv
//!
//! # Variante Dronechart, sans appel au WFS
//! geozones --input ./zones.csv --dronechart --offline --output ./zones_dronechart.json
//!
//! # Recherche de géométries par identifiant
//! geozones lookup "ESSA CTR" "ES R01"
//! ```

pub mod config;
pub mod export;
pub mod input;
pub mod report;
pub mod wfs;

pub use config::{Settings, WfsConfig};
pub use input::{read_records, TableOptions};
pub use report::{ConversionReport, ConversionStatus};
pub use wfs::WfsClient;
