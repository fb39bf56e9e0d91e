use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use catalogue::{CatalogueGenerator, Config, DocumentRequest, FILE_NAME, HttpFetcher};
use chrono::Local;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalogue")]
#[command(about = "Render a product catalogue PDF from a JSON request")]
struct Cli {
    /// JSON file holding products, category names and settings
    input: PathBuf,

    /// Output PDF file
    #[arg(short, long, default_value = FILE_NAME)]
    output: PathBuf,

    /// TOML config file (built-in defaults if missing)
    #[arg(short, long, default_value = "catalogue.toml")]
    config: PathBuf,

    /// Print the generated Typst source instead of writing a PDF
    #[arg(long)]
    typst: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let json = match fs::read_to_string(&cli.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading {}: {}", cli.input.display(), e);
            std::process::exit(1);
        }
    };

    let request: DocumentRequest = match serde_json::from_str(&json) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error parsing {}: {}", cli.input.display(), e);
            std::process::exit(1);
        }
    };

    if request.products.is_empty() {
        eprintln!("No products found in {}", cli.input.display());
        std::process::exit(1);
    }
    if request.categories.is_empty() {
        warn!("No category names in {}, every category shows as N/A", cli.input.display());
    }

    let fetcher = match HttpFetcher::new() {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("Error creating HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let generator = CatalogueGenerator::new(Config::load(&cli.config), Arc::new(fetcher));

    if cli.typst {
        match generator.render_source(&request, Local::now().naive_local()) {
            Ok(source) => println!("{}", source),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let document = match generator.generate(&request) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = document.write_to(&cli.output) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    println!(
        "Created {} ({} pages)",
        cli.output.display(),
        document.page_count
    );
}
