//! Écriture du document ED-318 (JSON indenté, UTF-8)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use ed318::FeatureCollection;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Nom de fichier par défaut selon la variante
pub fn default_output_name(dronechart: bool) -> &'static str {
    if dronechart {
        "zones_dronechart.json"
    } else {
        "uas_zones_ED318.json"
    }
}

/// Écrit le document dans un fichier
pub fn write_collection(collection: &FeatureCollection, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    write_pretty(&mut writer, collection)?;
    writer.flush()?;

    Ok(())
}

/// Sérialise avec une indentation de 4 espaces; les caractères non ASCII sont conservés
fn write_pretty<W: Write>(writer: &mut W, collection: &FeatureCollection) -> Result<()> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(writer, formatter);
    collection
        .serialize(&mut serializer)
        .context("Failed to serialize GeoJSON")
}
