//! Résolution des géométries manquantes auprès d'un service externe
//!
//! Les couches sont interrogées dans un ordre de priorité fixe. Chaque couche
//! reçoit une seule requête groupée avec les identifiants encore en attente;
//! un identifiant trouvé n'est plus jamais redemandé.

use std::collections::{HashMap, HashSet};
use std::future::Future;

use tracing::{debug, info, warn};

use crate::types::ZoneRecord;
use crate::ZoneError;

/// Couches interrogées par défaut, par ordre de priorité
pub const DEFAULT_LAYERS: [&str; 5] = ["RSTA", "DNGA", "CTR", "ATZ", "TIZ"];

/// Service de géométries (WFS ou équivalent)
pub trait GeometryService {
    /// Recherche les identifiants dans une couche.
    ///
    /// Retourne les géométries trouvées, indexées par identifiant.
    fn fetch(
        &self,
        layer: &str,
        identifiers: &[String],
    ) -> impl Future<Output = Result<HashMap<String, geojson::Geometry>, ZoneError>>;
}

/// Résultat d'une résolution
#[derive(Debug, Default)]
pub struct Resolution {
    /// Géométries trouvées
    pub resolved: HashMap<String, geojson::Geometry>,
    /// Identifiants introuvables dans toutes les couches
    pub unresolved: Vec<String>,
    /// Échecs d'appel (non fatals)
    pub errors: Vec<ZoneError>,
}

/// Identifiants des lignes sans géométrie, sans doublon, dans l'ordre du tableau
pub fn missing_geometry_ids(records: &[ZoneRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| !r.has_geometry())
        .filter_map(ZoneRecord::id)
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Résout les identifiants couche par couche.
///
/// Un appel en échec est journalisé et conservé dans [`Resolution::errors`];
/// les identifiants concernés restent en attente pour les couches suivantes.
pub async fn resolve<S: GeometryService>(
    service: &S,
    layers: &[String],
    identifiers: &[String],
) -> Resolution {
    let mut seen = HashSet::new();
    let mut pending: Vec<String> = identifiers
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect();
    let mut resolved = HashMap::new();
    let mut errors = Vec::new();

    for layer in layers {
        if pending.is_empty() {
            break;
        }

        debug!(layer = %layer, pending = pending.len(), "Querying geometry service");

        match service.fetch(layer, &pending).await {
            Ok(mut found) => {
                let (hits, misses): (Vec<String>, Vec<String>) =
                    pending.into_iter().partition(|id| found.contains_key(id));

                for id in hits {
                    if let Some(geometry) = found.remove(&id) {
                        resolved.insert(id, geometry);
                    }
                }

                info!(
                    layer = %layer,
                    resolved = resolved.len(),
                    remaining = misses.len(),
                    "Layer processed"
                );
                pending = misses;
            }
            Err(e) => {
                warn!(layer = %layer, error = %e, "Geometry lookup failed");
                errors.push(e);
            }
        }
    }

    if !pending.is_empty() {
        warn!(count = pending.len(), ids = ?pending, "Unresolved geometries");
    }

    Resolution {
        resolved,
        unresolved: pending,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Service en mémoire qui enregistre les requêtes reçues
    struct FakeService {
        layers: HashMap<&'static str, Vec<&'static str>>,
        failing: Option<&'static str>,
        calls: RefCell<Vec<(String, Vec<String>)>>,
    }

    impl FakeService {
        fn new(layers: &[(&'static str, Vec<&'static str>)]) -> Self {
            Self {
                layers: layers.iter().cloned().collect(),
                failing: None,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl GeometryService for FakeService {
        async fn fetch(
            &self,
            layer: &str,
            identifiers: &[String],
        ) -> Result<HashMap<String, geojson::Geometry>, ZoneError> {
            self.calls
                .borrow_mut()
                .push((layer.to_string(), identifiers.to_vec()));

            if self.failing == Some(layer) {
                return Err(ZoneError::resolution(layer, "connection refused"));
            }

            let known = self.layers.get(layer).cloned().unwrap_or_default();
            Ok(known
                .into_iter()
                .map(|id| {
                    (
                        id.to_string(),
                        geojson::Geometry::new(geojson::Value::Point(vec![18.0, 59.0])),
                    )
                })
                .collect())
        }
    }

    fn layers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_resolved_ids_are_not_queried_again() {
        let service = FakeService::new(&[("RSTA", vec!["A", "EXTRA"]), ("CTR", vec!["A", "B"])]);
        let result = resolve(&service, &layers(&["RSTA", "CTR", "ATZ"]), &ids(&["A", "B", "C"])).await;

        let calls = service.calls.borrow();
        assert_eq!(calls[0], ("RSTA".to_string(), ids(&["A", "B", "C"])));
        assert_eq!(calls[1], ("CTR".to_string(), ids(&["B", "C"])));
        assert_eq!(calls[2], ("ATZ".to_string(), ids(&["C"])));

        assert_eq!(result.resolved.len(), 2);
        assert!(!result.resolved.contains_key("EXTRA"));
        assert_eq!(result.unresolved, ids(&["C"]));
    }

    #[tokio::test]
    async fn test_stops_when_everything_is_resolved() {
        let service = FakeService::new(&[("RSTA", vec!["A", "B"])]);
        let result = resolve(&service, &layers(&["RSTA", "DNGA"]), &ids(&["A", "B", "A"])).await;

        assert_eq!(service.calls.borrow().len(), 1);
        assert_eq!(service.calls.borrow()[0].1, ids(&["A", "B"]));
        assert!(result.unresolved.is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_not_fatal() {
        let mut service = FakeService::new(&[("RSTA", vec!["A"]), ("CTR", vec!["B"])]);
        service.failing = Some("DNGA");
        let result = resolve(&service, &layers(&["RSTA", "DNGA", "CTR"]), &ids(&["A", "B"])).await;

        assert_eq!(result.errors.len(), 1);
        assert!(matches!(result.errors[0], ZoneError::Resolution { ref layer, .. } if layer == "DNGA"));
        assert!(result.resolved.contains_key("A"));
        assert!(result.resolved.contains_key("B"));
        assert!(result.unresolved.is_empty());
    }

    #[tokio::test]
    async fn test_nothing_to_resolve() {
        let service = FakeService::new(&[]);
        let result = resolve(&service, &layers(&DEFAULT_LAYERS), &[]).await;
        assert!(service.calls.borrow().is_empty());
        assert!(result.resolved.is_empty());
    }

    #[test]
    fn test_missing_geometry_ids() {
        let records = vec![
            ZoneRecord {
                identifier: Some("A".into()),
                geometry: Some("POINT(1 2)".into()),
                ..Default::default()
            },
            ZoneRecord {
                identifier: Some("B".into()),
                ..Default::default()
            },
            ZoneRecord {
                identifier: Some("B".into()),
                ..Default::default()
            },
            ZoneRecord::default(),
        ];
        assert_eq!(missing_geometry_ids(&records), ids(&["B"]));
    }
}
