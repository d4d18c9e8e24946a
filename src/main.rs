mod app;
mod dataset;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use docgraph::EngineConfig;
use tracing_subscriber::EnvFilter;

use crate::dataset::DatasetSource;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON file with `documents` and optional `links` arrays.
    #[arg(required_unless_present = "dump_config")]
    dataset: Option<PathBuf>,

    /// Extra link fetches to merge in; may be repeated.
    #[arg(long = "links")]
    extra_links: Vec<PathBuf>,

    /// Engine tuning as JSON; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    max_documents: Option<usize>,

    /// Print the effective engine config as JSON and exit.
    #[arg(long)]
    dump_config: bool,
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            EngineConfig::from_json_str(&raw)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    if args.max_documents.is_some() {
        config.max_documents = args.max_documents;
        config.validate().context("invalid --max-documents")?;
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docgraph=info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let source = DatasetSource {
        dataset: args
            .dataset
            .clone()
            .ok_or_else(|| anyhow!("no dataset given"))?,
        extra_links: args.extra_links.clone(),
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "docgraph",
        options,
        Box::new(move |cc| Ok(Box::new(app::DocGraphApp::new(cc, source, config)))),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}
