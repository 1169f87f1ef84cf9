//! Rapport de conversion
//!
//! Collecte les résultats d'une conversion (résolution des géométries,
//! lignes écartées, erreurs) et les affiche ou les sauvegarde en JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use ed318::{Resolution, ZoneError};
use serde::Serialize;

/// Statut global de la conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConversionStatus {
    /// Toutes les zones publiées
    Success,
    /// Document produit, mais des zones ont été écartées
    PartialSuccess,
    /// Aucun document produit
    Failed,
}

/// Une zone écartée ou en erreur
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    /// Identifiant de la zone (optionnel)
    pub identifier: Option<String>,
    /// Message d'erreur
    pub message: String,
}

impl From<&ZoneError> for ReportEntry {
    fn from(error: &ZoneError) -> Self {
        let message = match error {
            ZoneError::Row { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        Self {
            identifier: error.identifier().map(str::to_string),
            message,
        }
    }
}

/// Rapport complet de conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    /// Tableau source
    pub input: String,
    /// Durée de la conversion
    pub duration_secs: f64,
    /// Statut global
    pub status: ConversionStatus,

    /// Nombre de lignes lues
    pub rows_read: usize,
    /// Nombre de zones sans géométrie dans le tableau
    pub rows_missing_geometry: usize,
    /// Nombre de géométries obtenues du service
    pub geometries_resolved: usize,
    /// Nombre de zones publiées
    pub features_written: usize,

    /// Identifiants introuvables dans le service
    pub unresolved: Vec<String>,
    /// Appels au service en échec
    pub resolution_errors: Vec<String>,
    /// Lignes écartées (identifiant ou géométrie manquant)
    pub skipped: Vec<ReportEntry>,
    /// Lignes en erreur
    pub errors: Vec<ReportEntry>,
}

impl ConversionReport {
    /// Crée un nouveau rapport pour un tableau
    pub fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
            duration_secs: 0.0,
            status: ConversionStatus::Success,
            rows_read: 0,
            rows_missing_geometry: 0,
            geometries_resolved: 0,
            features_written: 0,
            unresolved: Vec::new(),
            resolution_errors: Vec::new(),
            skipped: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Enregistre le résultat de la résolution des géométries
    pub fn record_resolution(&mut self, resolution: &Resolution) {
        self.geometries_resolved = resolution.resolved.len();
        self.unresolved = resolution.unresolved.clone();
        self.resolution_errors = resolution.errors.iter().map(ToString::to_string).collect();
    }

    /// Enregistre une ligne écartée
    pub fn record_skipped(&mut self, error: &ZoneError) {
        self.skipped.push(error.into());
    }

    /// Enregistre l'échec de la conversion
    pub fn record_failure(&mut self, error: &ZoneError) {
        match error {
            ZoneError::Rows(failures) => self.errors.extend(failures.iter().map(ReportEntry::from)),
            other => self.errors.push(other.into()),
        }
    }

    /// Définit la durée de la conversion
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        let degraded = !self.skipped.is_empty()
            || !self.unresolved.is_empty()
            || !self.resolution_errors.is_empty();

        self.status = if !self.errors.is_empty() {
            ConversionStatus::Failed
        } else if degraded {
            ConversionStatus::PartialSuccess
        } else {
            ConversionStatus::Success
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("CONVERSION REPORT - {}", self.input);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!("Rows: {} read, {} without geometry", self.rows_read, self.rows_missing_geometry);
        println!(
            "Geometries: {} resolved, {} unresolved",
            self.geometries_resolved,
            self.unresolved.len()
        );
        println!(
            "Zones: {} written, {} skipped",
            self.features_written,
            self.skipped.len()
        );

        if !self.unresolved.is_empty() {
            println!("\n--- UNRESOLVED ({}) ---", self.unresolved.len());
            for id in self.unresolved.iter().take(20) {
                println!("  {}", id);
            }
            if self.unresolved.len() > 20 {
                println!("  ... and {} more", self.unresolved.len() - 20);
            }
        }

        if !self.resolution_errors.is_empty() {
            println!("\n--- LOOKUP ERRORS ({}) ---", self.resolution_errors.len());
            for e in &self.resolution_errors {
                println!("  {}", e);
            }
        }

        for (title, entries) in [("SKIPPED", &self.skipped), ("ERRORS", &self.errors)] {
            if entries.is_empty() {
                continue;
            }
            println!("\n--- {} ({}) ---", title, entries.len());
            for e in entries.iter().take(20) {
                match &e.identifier {
                    Some(id) => println!("  [{}] {}", id, e.message),
                    None => println!("  {}", e.message),
                }
            }
            if entries.len() > 20 {
                println!("  ... and {} more", entries.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} zones written, {} skipped, {} errors",
            self.input,
            self.features_written,
            self.skipped.len(),
            self.errors.len()
        )
    }
}
