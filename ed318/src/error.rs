//! Types d'erreurs pour le crate ed318

use thiserror::Error;

/// Erreurs pouvant survenir lors de la conversion des zones
#[derive(Debug, Error)]
pub enum ZoneError {
    /// Date illisible (attendu: YYYY-MM-DD ou un horodatage complet)
    #[error("Invalid date in {field}: '{value}'")]
    Format { field: String, value: String },

    /// Type de géométrie non géré (seuls Point et Polygon le sont)
    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometry(String),

    /// Géométrie WKT ou JSON illisible
    #[error("Invalid geometry '{value}': {reason}")]
    InvalidGeometry { value: String, reason: String },

    /// Horaire (schedule) illisible ou de forme inattendue
    #[error("Invalid schedule '{value}': {reason}")]
    ScheduleFormat { value: String, reason: String },

    /// Échec d'un appel au service de géométries
    #[error("Geometry lookup failed for layer {layer}: {reason}")]
    Resolution { layer: String, reason: String },

    /// Champ obligatoire absent
    #[error("Row {row}: missing required field '{field}'")]
    MissingRequiredField { row: usize, field: &'static str },

    /// Erreur attachée à une zone précise
    #[error("Zone {identifier}: {source}")]
    Row {
        identifier: String,
        #[source]
        source: Box<ZoneError>,
    },

    /// Plusieurs zones en échec
    #[error("{} zone(s) could not be converted", .0.len())]
    Rows(Vec<ZoneError>),
}

impl ZoneError {
    /// Crée une erreur de format de date avec contexte
    pub fn format(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Format {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Crée une erreur de géométrie illisible
    pub fn invalid_geometry(value: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidGeometry {
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Crée une erreur de service de géométries
    pub fn resolution(layer: impl Into<String>, reason: impl ToString) -> Self {
        Self::Resolution {
            layer: layer.into(),
            reason: reason.to_string(),
        }
    }

    /// Rattache l'erreur à l'identifiant de la zone
    pub fn row(identifier: impl Into<String>, source: ZoneError) -> Self {
        Self::Row {
            identifier: identifier.into(),
            source: Box::new(source),
        }
    }

    /// Identifiant de la zone concernée, si connu
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Row { identifier, .. } => Some(identifier),
            _ => None,
        }
    }
}
