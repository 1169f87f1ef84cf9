//! Modules d'export (GeoJSON ED-318)

pub mod geojson;

pub use self::geojson::{default_output_name, write_collection};
