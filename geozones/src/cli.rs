//! Définition et implémentation des commandes CLI
//!
//! - `convert`: tableau → GeoJSON ED-318 (commande par défaut)
//! - `lookup`: identifiants → géométries du WFS

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use ed318::date::parse_date;
use ed318::{convert, missing_geometry_ids, resolve, Resolution};
use tracing::{info, warn};

use geozones::config::Settings;
use geozones::export::{default_output_name, write_collection};
use geozones::input::{encoding_for_label, read_records, TableOptions};
use geozones::report::ConversionReport;
use geozones::wfs::WfsClient;

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a zone table to an ED-318 GeoJSON document
    Convert(ConvertArgs),

    /// Look up zone geometries in the WFS service
    Lookup {
        /// Zone identifiers (value of the area attribute)
        #[arg(required = true)]
        ids: Vec<String>,

        /// Config preset name (lfv) or path to a JSON config
        #[arg(long, default_value = "lfv")]
        config: String,

        /// WFS endpoint override
        #[arg(long)]
        wfs_url: Option<String>,

        /// Layers to query, in priority order (comma-separated)
        #[arg(long, value_delimiter = ',')]
        layers: Vec<String>,
    },
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Path to the zone table (CSV, or xlsx/xls/ods workbook)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (défaut : uas_zones_ED318.json ou zones_dronechart.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config preset name (lfv) or path to a JSON config
    #[arg(long, default_value = "lfv")]
    pub config: String,

    /// Document title
    #[arg(long)]
    pub title: Option<String>,

    /// Data provider
    #[arg(long)]
    pub provider: Option<String>,

    /// Issue date (YYYY-MM-DD)
    #[arg(long)]
    pub issued: Option<String>,

    /// Start of validity (YYYY-MM-DD)
    #[arg(long)]
    pub valid_from: Option<String>,

    /// End of validity (YYYY-MM-DD)
    #[arg(long)]
    pub valid_to: Option<String>,

    /// Document description
    #[arg(long)]
    pub description: Option<String>,

    /// Technical limitations text
    #[arg(long)]
    pub technical_limitations: Option<String>,

    /// Add flat vertical limits for Dronechart
    #[arg(long)]
    pub dronechart: bool,

    /// Add the dataSource block to each zone
    #[arg(long)]
    pub data_source: bool,

    /// Column delimiter (delimited text only)
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Table encoding (utf-8, windows-1252, ...; delimited text only)
    #[arg(long, default_value = "utf-8")]
    pub encoding: String,

    /// WFS endpoint override
    #[arg(long)]
    pub wfs_url: Option<String>,

    /// Layers to query, in priority order (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub layers: Vec<String>,

    /// Do not query the WFS (zones without geometry are skipped)
    #[arg(long)]
    pub offline: bool,

    /// Save the conversion report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Exécute la commande convert
pub async fn cmd_convert(args: &ConvertArgs, quiet: bool) -> Result<ConversionReport> {
    let started_at = Instant::now();
    let settings = load_settings(&args.config, args.wfs_url.clone(), &args.layers)?;
    let run = apply_run_overrides(settings.run, args)?;

    let options = TableOptions {
        delimiter: delimiter_byte(args.delimiter)?,
        encoding: encoding_for_label(&args.encoding)?,
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_output_name(run.dronechart)));

    println!("=== Conversion ED-318 ===");
    println!("Input: {}", args.input.display());
    println!("Output: {}", output.display());
    println!("Config: {}", args.config);
    println!("Dronechart: {}", run.dronechart);
    println!("WFS: {}", if args.offline { "offline" } else { settings.wfs.url.as_str() });

    let mut report = ConversionReport::new(&args.input.display().to_string());

    let records = read_records(&args.input, &options)?;
    report.rows_read = records.len();

    let missing = missing_geometry_ids(&records);
    report.rows_missing_geometry = missing.len();

    let resolution = if missing.is_empty() {
        Resolution::default()
    } else if args.offline {
        warn!(count = missing.len(), "Offline mode: zones without geometry will be skipped");
        Resolution {
            unresolved: missing,
            ..Default::default()
        }
    } else {
        let client = WfsClient::new(&settings.wfs)?;
        resolve(&client, &settings.wfs.layers, &missing).await
    };
    report.record_resolution(&resolution);

    let conversion = match convert(&records, &resolution.resolved, &run) {
        Ok(conversion) => conversion,
        Err(e) => {
            report.record_failure(&e);
            report.set_duration(started_at.elapsed());
            report.finalize();
            finish_report(&report, args.report.as_deref(), quiet)?;
            return Err(e).context("Conversion failed, no document written");
        }
    };

    for skipped in &conversion.skipped {
        report.record_skipped(skipped);
    }

    write_collection(&conversion.collection, &output)?;
    report.features_written = conversion.collection.features.len();
    info!(output = %output.display(), zones = report.features_written, "Document written");

    report.set_duration(started_at.elapsed());
    report.finalize();
    finish_report(&report, args.report.as_deref(), quiet)?;

    println!("{}", report.summary());
    Ok(report)
}

/// Exécute la commande lookup
pub async fn cmd_lookup(
    ids: &[String],
    config_spec: &str,
    wfs_url: Option<String>,
    layers: Vec<String>,
) -> Result<()> {
    let settings = load_settings(config_spec, wfs_url, &layers)?;
    let client = WfsClient::new(&settings.wfs)?;

    let resolution = resolve(&client, &settings.wfs.layers, ids).await;

    // BTreeMap: sortie triée par identifiant
    let resolved: BTreeMap<_, _> = resolution.resolved.into_iter().collect();
    let output = serde_json::json!({
        "resolved": resolved,
        "unresolved": resolution.unresolved,
        "errors": resolution.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// Charge la configuration (preset ou fichier) et applique env + surcharges WFS
fn load_settings(spec: &str, wfs_url: Option<String>, layers: &[String]) -> Result<Settings> {
    let mut settings =
        Settings::load_spec(spec).with_context(|| format!("Failed to load config: {}", spec))?;

    settings.wfs.apply_env();
    if let Some(url) = wfs_url {
        settings.wfs.url = url;
    }
    let layers: Vec<String> = layers
        .iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    if !layers.is_empty() {
        settings.wfs.layers = layers;
    }

    Ok(settings)
}

/// Surcharge les métadonnées du preset avec les arguments CLI
fn apply_run_overrides(mut run: ed318::RunConfig, args: &ConvertArgs) -> Result<ed318::RunConfig> {
    if let Some(title) = &args.title {
        run.title = title.clone();
    }
    if let Some(provider) = &args.provider {
        run.provider = provider.clone();
    }
    if let Some(issued) = &args.issued {
        run.issued = parse_date("issued", issued)?;
    }
    if let Some(valid_from) = &args.valid_from {
        run.valid_from = parse_date("validFrom", valid_from)?;
    }
    if let Some(valid_to) = &args.valid_to {
        run.valid_to = Some(parse_date("validTo", valid_to)?);
    }
    if let Some(description) = &args.description {
        run.description = Some(description.clone());
    }
    if let Some(limitations) = &args.technical_limitations {
        run.technical_limitations = limitations.clone();
    }
    run.dronechart |= args.dronechart;
    run.include_data_source |= args.data_source;

    if let Some(valid_to) = run.valid_to {
        if valid_to < run.valid_from {
            anyhow::bail!(
                "validTo ({}) is before validFrom ({})",
                valid_to,
                run.valid_from
            );
        }
    }

    Ok(run)
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        anyhow::bail!("Delimiter must be an ASCII character, got '{}'", delimiter)
    }
}

fn finish_report(report: &ConversionReport, path: Option<&Path>, quiet: bool) -> Result<()> {
    if !quiet {
        report.display();
    }
    if let Some(path) = path {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to save report: {}", path.display()))?;
        info!(path = %path.display(), "Report saved");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use ed318::ZoneError;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ConvertArgs,
    }

    fn convert_args(extra: &[&str]) -> ConvertArgs {
        let argv = ["geozones", "--input", "zones.csv"]
            .into_iter()
            .chain(extra.iter().copied());
        TestCli::try_parse_from(argv).unwrap().args
    }

    fn lfv_run() -> ed318::RunConfig {
        Settings::from_preset("lfv").unwrap().run
    }

    #[test]
    fn test_run_overrides() {
        let args = convert_args(&[
            "--title",
            "Test zones",
            "--issued",
            "2025-02-01",
            "--valid-to",
            "2025-12-31",
            "--description",
            "Test",
            "--dronechart",
        ]);
        let run = apply_run_overrides(lfv_run(), &args).unwrap();

        assert_eq!(run.title, "Test zones");
        assert_eq!(run.issued.to_string(), "2025-02-01");
        assert_eq!(run.valid_from, lfv_run().valid_from);
        assert_eq!(run.valid_to.unwrap().to_string(), "2025-12-31");
        assert_eq!(run.description.as_deref(), Some("Test"));
        assert!(run.dronechart);
        assert!(!run.include_data_source);
    }

    #[test]
    fn test_run_overrides_without_flags_keep_preset() {
        let run = apply_run_overrides(lfv_run(), &convert_args(&[])).unwrap();
        assert_eq!(run, lfv_run());
    }

    #[test]
    fn test_valid_to_before_valid_from() {
        let args = convert_args(&["--valid-from", "2025-03-01", "--valid-to", "2025-02-28"]);
        let err = apply_run_overrides(lfv_run(), &args).unwrap_err();
        assert!(err.to_string().contains("is before validFrom"));

        let same_day = convert_args(&["--valid-from", "2025-03-01", "--valid-to", "2025-03-01"]);
        assert!(apply_run_overrides(lfv_run(), &same_day).is_ok());
    }

    #[test]
    fn test_invalid_issued_date() {
        let args = convert_args(&["--issued", "01/02/2025"]);
        let err = apply_run_overrides(lfv_run(), &args).unwrap_err();

        match err.downcast_ref::<ZoneError>() {
            Some(ZoneError::Format { field, value }) => {
                assert_eq!(field, "issued");
                assert_eq!(value, "01/02/2025");
            }
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_settings_layer_override() {
        let layers = vec![" CTR".to_string(), String::new(), "ATZ ".to_string(), " ".to_string()];
        let settings =
            load_settings("lfv", Some("http://localhost:8080/wfs".to_string()), &layers).unwrap();

        assert_eq!(settings.wfs.layers, vec!["CTR", "ATZ"]);
        assert_eq!(settings.wfs.url, "http://localhost:8080/wfs");
    }

    #[test]
    fn test_load_settings_blank_layers_keep_config() {
        let settings = load_settings("lfv", None, &[" ".to_string()]).unwrap();
        assert_eq!(settings.wfs.layers, vec!["RSTA", "DNGA", "CTR", "ATZ", "TIZ"]);
    }

    #[test]
    fn test_load_settings_unknown_preset() {
        let err = load_settings("nope", None, &[]).unwrap_err();
        assert!(err.to_string().contains("Failed to load config: nope"));
    }

    #[test]
    fn test_delimiter_byte() {
        assert_eq!(delimiter_byte(';').unwrap(), b';');
        assert_eq!(delimiter_byte('\t').unwrap(), b'\t');
        assert!(delimiter_byte('§').is_err());
    }

    #[test]
    fn test_delimiter_argument() {
        let args = convert_args(&["--delimiter", ";", "--layers", "CTR,ATZ"]);
        assert_eq!(args.delimiter, ';');
        assert_eq!(args.layers, vec!["CTR", "ATZ"]);
        assert_eq!(args.encoding, "utf-8");
        assert_eq!(args.config, "lfv");
    }
}
