//! Configuration du système

use serde::{Deserialize, Serialize};
use std::path::Path;

use anyhow::{Context, Result};
use ed318::{RunConfig, DEFAULT_LAYERS};

/// Configuration principale
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Métadonnées et options du document produit
    pub run: RunConfig,

    /// Service de géométries
    #[serde(default)]
    pub wfs: WfsConfig,
}

/// Configuration du service WFS
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WfsConfig {
    /// URL du service
    #[serde(default = "default_url")]
    pub url: String,

    /// Couches interrogées, par ordre de priorité
    #[serde(default = "default_layers")]
    pub layers: Vec<String>,

    /// Attribut portant l'identifiant de zone
    #[serde(default = "default_area_attribute")]
    pub area_attribute: String,

    /// Délai maximal d'une requête (secondes)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    "https://daim.lfv.se/geoserver/wfs".to_string()
}

fn default_layers() -> Vec<String> {
    DEFAULT_LAYERS.iter().map(|l| l.to_string()).collect()
}

fn default_area_attribute() -> String {
    "NAMEOFAREA".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for WfsConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            layers: default_layers(),
            area_attribute: default_area_attribute(),
            timeout_secs: default_timeout(),
        }
    }
}

impl WfsConfig {
    /// Applique les surcharges des variables d'environnement
    /// (`GEOZONES_WFS_URL`, `GEOZONES_WFS_TIMEOUT`)
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("GEOZONES_WFS_URL") {
            if !url.trim().is_empty() {
                self.url = url.trim().to_string();
            }
        }
        if let Some(timeout) = var("GEOZONES_WFS_TIMEOUT").and_then(|t| t.trim().parse().ok()) {
            self.timeout_secs = timeout;
        }
    }
}

impl Settings {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "lfv" => Self::load_embedded(include_str!("presets/lfv.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: lfv", preset),
        }
    }

    /// Preset embarqué ou chemin vers un fichier JSON
    pub fn load_spec(spec: &str) -> Result<Self> {
        let path = Path::new(spec);
        if path.extension().is_some() || path.exists() {
            Self::load(path)
        } else {
            Self::from_preset(spec)
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lfv_preset() {
        let settings = Settings::from_preset("lfv").unwrap();
        assert_eq!(
            settings.run.provider,
            "Luftfartsverket, 601 79 Norrköping, utm@lfv.se"
        );
        assert_eq!(settings.run.valid_to, None);
        assert!(!settings.run.dronechart);
        assert_eq!(settings.wfs, WfsConfig::default());
    }

    #[test]
    fn test_unknown_preset() {
        assert!(Settings::from_preset("nope").is_err());
    }

    #[test]
    fn test_load_file_with_defaults() {
        let path = std::env::temp_dir().join("geozones_test_config.json");
        std::fs::write(
            &path,
            r#"{"run": {"title": "T", "provider": "P", "issued": "2025-02-01", "valid_from": "2025-02-15", "valid_to": "2025-12-31"}}"#,
        )
        .unwrap();

        let settings = Settings::load_spec(path.to_str().unwrap()).unwrap();
        assert_eq!(settings.run.title, "T");
        assert_eq!(settings.run.valid_to.unwrap().to_string(), "2025-12-31");
        assert_eq!(settings.run.technical_limitations, "");
        assert_eq!(settings.wfs.layers, vec!["RSTA", "DNGA", "CTR", "ATZ", "TIZ"]);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_wfs_env_overrides() {
        let mut wfs = WfsConfig::default();
        wfs.apply_vars(|name| match name {
            "GEOZONES_WFS_URL" => Some(" http://localhost:8080/geoserver/wfs ".to_string()),
            "GEOZONES_WFS_TIMEOUT" => Some("15".to_string()),
            _ => None,
        });
        assert_eq!(wfs.url, "http://localhost:8080/geoserver/wfs");
        assert_eq!(wfs.timeout_secs, 15);
        assert_eq!(wfs.layers, WfsConfig::default().layers);
    }

    #[test]
    fn test_wfs_env_ignores_blank_and_invalid() {
        let mut wfs = WfsConfig::default();
        wfs.apply_vars(|name| match name {
            "GEOZONES_WFS_URL" => Some("  ".to_string()),
            "GEOZONES_WFS_TIMEOUT" => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(wfs, WfsConfig::default());
    }
}
