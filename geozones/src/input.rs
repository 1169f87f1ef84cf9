//! Lecture du tableau des zones (texte délimité ou classeur tableur)

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use ed318::ZoneRecord;
use encoding_rs::Encoding;
use serde_json::{Map, Number, Value};
use tracing::{debug, info};

/// Colonnes numériques: les nombres natifs du classeur y restent des nombres
const NUMERIC_COLUMNS: &[&str] = &["radius", "upper", "lower"];

/// Format du tableau, d'après l'extension du fichier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// CSV et variantes (séparateur et encodage configurables)
    Delimited,
    /// Classeur xlsx, xlsm, xlsb, xls ou ods (première feuille)
    Workbook,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => TableFormat::Workbook,
            _ => TableFormat::Delimited,
        }
    }
}

/// Options de lecture du tableau
#[derive(Debug, Clone, Copy)]
pub struct TableOptions {
    /// Séparateur de colonnes
    pub delimiter: u8,
    /// Encodage du fichier
    pub encoding: &'static Encoding,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            encoding: encoding_rs::UTF_8,
        }
    }
}

/// Résout un nom d'encodage (`utf-8`, `windows-1252`, `latin1`, ...)
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| anyhow::anyhow!("Unsupported encoding: {}", label))
}

/// Lit un fichier tableau (le lecteur est choisi d'après l'extension)
pub fn read_records(path: &Path, options: &TableOptions) -> Result<Vec<ZoneRecord>> {
    let format = TableFormat::from_path(path);
    let records = match format {
        TableFormat::Workbook => read_workbook(path)?,
        TableFormat::Delimited => {
            let data =
                std::fs::read(path).context(format!("Failed to read table: {}", path.display()))?;
            let text = decode_with_encoding(&data, options.encoding);

            parse_records(&text, options)
                .with_context(|| format!("Failed to parse table: {}", path.display()))?
        }
    };

    info!(path = %path.display(), format = ?format, rows = records.len(), "Table loaded");
    Ok(records)
}

/// Lit la première feuille d'un classeur
pub fn read_workbook(path: &Path) -> Result<Vec<ZoneRecord>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let range = workbook
        .worksheet_range_at(0)
        .context("Workbook has no sheet")?
        .with_context(|| format!("Failed to read first sheet: {}", path.display()))?;

    records_from_range(&range)
        .with_context(|| format!("Failed to parse workbook: {}", path.display()))
}

/// Convertit une feuille (ligne d'en-tête puis une zone par ligne)
pub fn records_from_range(range: &Range<Data>) -> Result<Vec<ZoneRecord>> {
    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .context("Missing header row")?
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();
    debug!(columns = ?headers, "Workbook columns");

    rows.enumerate()
        .filter(|(_, row)| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|(index, row)| {
            let object: Map<String, Value> = headers
                .iter()
                .zip(row)
                .filter(|(header, _)| !header.is_empty())
                .filter_map(|(header, cell)| Some((header.clone(), cell_value(header, cell)?)))
                .collect();

            serde_json::from_value(Value::Object(object))
                .with_context(|| format!("Invalid row {}", index + 1))
        })
        .collect()
}

/// Valeur JSON d'une cellule typée (`None` pour une cellule vide)
fn cell_value(header: &str, cell: &Data) -> Option<Value> {
    let numeric = NUMERIC_COLUMNS.contains(&header);
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| Value::String(trimmed.to_string()))
        }
        Data::Int(i) if numeric => Some(Value::from(*i)),
        Data::Int(i) => Some(Value::String(i.to_string())),
        Data::Float(f) => number_value(*f, numeric),
        Data::Bool(b) => Some(Value::String(b.to_string())),
        Data::DateTime(dt) if dt.is_datetime() => {
            let datetime = dt.as_datetime()?;
            // Date seule quand l'heure est minuit
            let text = if datetime.date().and_hms_opt(0, 0, 0) == Some(datetime) {
                datetime.format("%Y-%m-%d").to_string()
            } else {
                datetime.format("%Y-%m-%dT%H:%M:%S").to_string()
            };
            Some(Value::String(text))
        }
        Data::DateTime(dt) => number_value(dt.as_f64(), numeric),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
    }
}

/// Les tableurs stockent les entiers en flottants: `100.0` redevient `100`
fn number_value(f: f64, numeric: bool) -> Option<Value> {
    let integral = f.is_finite() && f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0;
    match (integral, numeric) {
        (true, true) => Some(Value::from(f as i64)),
        (true, false) => Some(Value::String((f as i64).to_string())),
        (false, true) => Number::from_f64(f).map(Value::Number),
        (false, false) => f.is_finite().then(|| Value::String(f.to_string())),
    }
}

/// Parse le contenu texte d'un tableau avec ligne d'en-tête
pub fn parse_records(text: &str, options: &TableOptions) -> Result<Vec<ZoneRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers().context("Missing header row")?.clone();
    debug!(columns = ?headers.iter().collect::<Vec<_>>(), "Table columns");

    reader
        .deserialize::<ZoneRecord>()
        .enumerate()
        .map(|(index, row)| row.with_context(|| format!("Invalid row {}", index + 1)))
        .collect()
}

/// Décode les bytes avec l'encodage choisi (un BOM éventuel est prioritaire et retiré)
fn decode_with_encoding(data: &[u8], encoding: &'static Encoding) -> String {
    let (decoded, _, _) = encoding.decode(data);
    decoded.into_owned()
}
