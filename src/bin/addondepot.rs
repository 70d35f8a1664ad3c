use addondepot_core::registry::{home_widgets_of, settings_widgets_of};
use addondepot_core::{AddonStore, AddonsConfig, ScanEntry};
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// Inspect the addons installed on this device.
#[derive(Parser, Debug)]
#[command(name = "addondepot")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Addons root (defaults to $ADDONDEPOT_ADDONS_ROOT, then the platform data dir)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Every bundle, including the ones that failed to load
    List,
    /// Addons with a home screen widget
    HomeWidgets,
    /// Every settings page, addressed by addon and placement index
    SettingsPages,
}

#[derive(Serialize)]
struct Report<T> {
    generated_at: String,
    root: PathBuf,
    entries: T,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")?;

    let cli = Cli::parse();
    let config = AddonsConfig::resolve(cli.root.as_deref())?;
    let root = config.root.clone();
    let store = AddonStore::new(config);

    let entries = store.scan_all().await?;
    let failed = entries.iter().filter(|e| e.error().is_some()).count();
    tracing::info!(total = entries.len(), failed, "Scanned {:?}", root);

    let output = match cli.command {
        Commands::List => {
            let records: Vec<_> = entries.iter().map(ScanEntry::to_record).collect();
            render(root, records, cli.pretty)?
        }
        Commands::HomeWidgets => render(root, home_widgets_of(entries), cli.pretty)?,
        Commands::SettingsPages => render(root, settings_widgets_of(entries), cli.pretty)?,
    };

    println!("{output}");
    Ok(())
}

fn render<T: Serialize>(root: PathBuf, entries: T, pretty: bool) -> anyhow::Result<String> {
    let report = Report {
        generated_at: chrono::Local::now().to_rfc3339(),
        root,
        entries,
    };

    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}
