//! Normalisation des géométries de zones
//!
//! Une géométrie arrive soit en WKT (colonne `geometry` du tableau), soit déjà
//! structurée en GeoJSON (cellule JSON ou résultat du service WFS).
//! Le WKT est converti via `geozero` puis typé; le GeoJSON est repris tel quel.
//! Dans tous les cas la couche verticale (`layer`) est attachée à l'objet.

use geo::orient::{Direction, Orient};
use geo::Geometry;
use geozero::wkt::Wkt;
use geozero::ToGeo;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::{present, CellValue, ZoneRecord};
use crate::ZoneError;

/// Limites verticales d'une zone, portées par sa géométrie
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneLayer {
    pub upper: Option<CellValue>,
    pub upper_reference: Option<String>,
    pub lower: Option<CellValue>,
    pub lower_reference: Option<String>,
    pub uom: Option<String>,
}

impl ZoneLayer {
    pub fn from_record(record: &ZoneRecord) -> Self {
        Self {
            upper: record.upper.clone(),
            upper_reference: present(&record.upper_ref).map(str::to_string),
            lower: record.lower.clone(),
            lower_reference: present(&record.lower_ref).map(str::to_string),
            uom: present(&record.uom).map(str::to_string),
        }
    }
}

/// Géométrie brute, avant normalisation
#[derive(Debug, Clone, PartialEq)]
pub enum RawGeometry {
    /// Well-known text
    Wkt(String),
    /// Objet GeoJSON déjà structuré
    Structured(Map<String, Value>),
}

impl RawGeometry {
    /// Interprète une cellule `geometry`: un objet JSON est structuré, le reste est du WKT
    pub fn from_cell(text: &str) -> Result<Self, ZoneError> {
        let trimmed = text.trim();
        if trimmed.starts_with('{') {
            match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Object(object)) => Ok(RawGeometry::Structured(object)),
                Ok(_) => Err(ZoneError::invalid_geometry(trimmed, "expected a JSON object")),
                Err(e) => Err(ZoneError::invalid_geometry(trimmed, e)),
            }
        } else {
            Ok(RawGeometry::Wkt(trimmed.to_string()))
        }
    }

    /// Reprend une géométrie renvoyée par le service de géométries
    pub fn from_geojson(geometry: &geojson::Geometry) -> Result<Self, ZoneError> {
        match serde_json::to_value(geometry) {
            // Une coordonnée NaN ou infinie est sérialisée en `null`
            Ok(Value::Object(object)) if has_null_coordinate(&object) => {
                let value = Value::Object(object).to_string();
                Err(ZoneError::invalid_geometry(value, "non-finite coordinate"))
            }
            Ok(Value::Object(object)) => Ok(RawGeometry::Structured(object)),
            Ok(other) => Err(ZoneError::invalid_geometry(
                other.to_string(),
                "expected a GeoJSON object",
            )),
            Err(e) => Err(ZoneError::invalid_geometry("geometry", e)),
        }
    }
}

fn has_null_coordinate(object: &Map<String, Value>) -> bool {
    fn walk(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Array(items) => items.iter().any(walk),
            _ => false,
        }
    }

    let members = object
        .get("geometries")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|g| g.get("coordinates"));
    object.get("coordinates").into_iter().chain(members).any(walk)
}

/// Forme normalisée d'une zone
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Cercle: centre et rayon
    Point {
        coordinates: [f64; 2],
        radius: Option<CellValue>,
    },
    /// Anneau extérieur, orienté dans le sens anti-horaire
    Polygon { exterior: Vec<[f64; 2]> },
    /// GeoJSON repris tel quel
    Structured(Map<String, Value>),
}

/// Géométrie de sortie: forme + couche verticale
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneGeometry {
    pub shape: Shape,
    pub layer: ZoneLayer,
}

impl ZoneGeometry {
    /// Type GeoJSON de la géométrie
    pub fn geometry_type(&self) -> &str {
        match &self.shape {
            Shape::Point { .. } => "Point",
            Shape::Polygon { .. } => "Polygon",
            Shape::Structured(object) => object.get("type").and_then(Value::as_str).unwrap_or(""),
        }
    }
}

#[derive(Serialize)]
struct Extent<'a> {
    #[serde(rename = "subType")]
    sub_type: &'static str,
    radius: &'a Option<CellValue>,
}

impl Serialize for ZoneGeometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match &self.shape {
            Shape::Point {
                coordinates,
                radius,
            } => {
                map.serialize_entry("type", "Point")?;
                map.serialize_entry("coordinates", coordinates)?;
                map.serialize_entry("layer", &self.layer)?;
                map.serialize_entry(
                    "extent",
                    &Extent {
                        sub_type: "Circle",
                        radius,
                    },
                )?;
            }
            Shape::Polygon { exterior } => {
                map.serialize_entry("type", "Polygon")?;
                map.serialize_entry("coordinates", &[exterior])?;
                map.serialize_entry("layer", &self.layer)?;
            }
            Shape::Structured(object) => {
                for (key, value) in object.iter().filter(|(k, _)| k.as_str() != "layer") {
                    map.serialize_entry(key, value)?;
                }
                map.serialize_entry("layer", &self.layer)?;
            }
        }
        map.end()
    }
}

/// Normalise la géométrie d'une ligne et y attache la couche verticale.
///
/// # Errors
///
/// - [`ZoneError::InvalidGeometry`] si le WKT est illisible
/// - [`ZoneError::UnsupportedGeometry`] pour tout type WKT autre que Point et Polygon
pub fn normalize(raw: &RawGeometry, record: &ZoneRecord) -> Result<ZoneGeometry, ZoneError> {
    let shape = match raw {
        RawGeometry::Wkt(text) => {
            let geometry = Wkt(text.as_str())
                .to_geo()
                .map_err(|e| ZoneError::invalid_geometry(text.as_str(), e))?;
            shape_from_geo(geometry, record)?
        }
        RawGeometry::Structured(object) => Shape::Structured(object.clone()),
    };

    Ok(ZoneGeometry {
        shape,
        layer: ZoneLayer::from_record(record),
    })
}

fn shape_from_geo(geometry: Geometry, record: &ZoneRecord) -> Result<Shape, ZoneError> {
    match geometry {
        Geometry::Point(point) => Ok(Shape::Point {
            coordinates: [point.x(), point.y()],
            radius: record.radius.clone(),
        }),
        Geometry::Polygon(polygon) => {
            // Trous ignorés: seul l'anneau extérieur est publié
            let oriented = polygon.orient(Direction::Default);
            Ok(Shape::Polygon {
                exterior: oriented.exterior().coords().map(|c| [c.x, c.y]).collect(),
            })
        }
        other => Err(ZoneError::UnsupportedGeometry(
            geometry_type_name(&other).to_string(),
        )),
    }
}

fn geometry_type_name(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
