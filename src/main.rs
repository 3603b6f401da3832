use anyhow::Result;
use character_portraits::app::App;
use character_portraits::image::{ImageService, PortraitExporter};
use character_portraits::models::Config;
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "character-portraits")]
#[command(about = "Generate portraits of book characters")]
struct CliArgs {
    /// Book title; with --character, runs once without prompting.
    #[arg(long, requires = "character")]
    book: Option<String>,

    /// Character name; with --book, runs once without prompting.
    #[arg(long, requires = "book")]
    character: Option<String>,

    /// Override PORTRAIT_BATCH_SIZE.
    #[arg(long, value_parser = parse_batch_size)]
    batch_size: Option<u32>,

    /// Directory for exported PNGs (default: output/<date>_<session>).
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Do not write portraits to disk.
    #[arg(long, conflicts_with = "output_dir")]
    no_export: bool,
}

fn parse_batch_size(input: &str) -> std::result::Result<u32, String> {
    match input.parse::<u32>() {
        Ok(0) | Err(_) => Err(format!(
            "Invalid batch size '{}'. Expected a positive integer",
            input
        )),
        Ok(value) => Ok(value),
    }
}

fn default_output_dir() -> PathBuf {
    let date = Local::now().format("%Y-%m-%d").to_string();
    PathBuf::from("output").join(format!("{}_{}", date, Uuid::new_v4()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "character_portraits=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(batch_size) = args.batch_size {
        config.params.batch_size = batch_size;
    }

    let exporter: Option<Box<dyn ImageService>> = if args.no_export {
        None
    } else {
        let dir = args.output_dir.clone().unwrap_or_else(default_output_dir);
        info!("Portraits will be saved under {}", dir.display());
        Some(Box::new(PortraitExporter::new(&dir)?))
    };

    let mut app = App::from_config(&config, exporter)?;

    match (args.book, args.character) {
        (Some(book), Some(character)) => {
            let screen = app.run_once(&book, &character).await?;
            print!("{}", screen);
            for path in app.exported() {
                println!("  saved {}", path.display());
            }
            if app.has_failed() {
                std::process::exit(1);
            }
        }
        _ => app.run_interactive().await?,
    }

    Ok(())
}
