//! Point d'entrée CLI pour geozones

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::{Commands, ConvertArgs};

/// Convertir un tableau de zones UAS en GeoJSON ED-318
#[derive(Parser)]
#[command(name = "geozones")]
#[command(author, version)]
#[command(about = "Convertir un tableau de zones UAS en document GeoJSON ED-318")]
#[command(long_about = "Convertit un tableau de zones géographiques UAS (CSV ou classeur xlsx/ods) en FeatureCollection ED-318.\n\nLes zones sans géométrie sont recherchées dans le WFS de LFV. Utilisez 'lookup' pour interroger le WFS directement.")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Sous-commande (défaut: convert)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments de conversion (commande par défaut)
    #[command(flatten)]
    convert: Option<ConvertArgs>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args, cli.quiet).await?,
        Some(Commands::Lookup {
            ids,
            config,
            wfs_url,
            layers,
        }) => {
            info!(ids = ids.len(), "Lookup in WFS");
            cli::cmd_lookup(&ids, &config, wfs_url, layers).await?;
        }
        None => {
            // Commande par défaut: convert
            let args = cli
                .convert
                .context("Conversion arguments required (--input)")?;
            run_convert(args, cli.quiet).await?;
        }
    }

    Ok(())
}

async fn run_convert(args: ConvertArgs, quiet: bool) -> Result<()> {
    info!(input = %args.input.display(), "Converting zone table");
    cli::cmd_convert(&args, quiet).await?;
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
