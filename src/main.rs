//! Jelajah CLI - destination photo resolution for Indonesian travel spots

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "jelajah")]
#[command(version)]
#[command(about = "Resolve a display photo for any destination name")]
#[command(long_about = r#"
Jelajah finds a photo for a destination by walking a chain of sources:
  • the local photo cache
  • the place-photo proxy (Places search, re-hosted)
  • Wikipedia page thumbnails (Indonesian, then English)
  • a curated table of well-known destinations
  • a per-category default image

Example usage:
  jelajah init
  jelajah resolve "Pantai Kuta" --category pantai
  jelajah warm destinations.txt
  jelajah serve --port 8787
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "human")]
    format: OutputMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter jelajah.toml and create the database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Resolve a photo for one destination
    Resolve {
        /// Destination name
        name: String,

        /// Category hint (e.g. pantai, gunung, candi)
        #[arg(long)]
        category: Option<String>,

        /// Maximum photo width in pixels
        #[arg(short = 'w', long)]
        max_width: Option<u32>,
    },

    /// Resolve every destination listed in a file, one per line
    ///
    /// Lines may carry a category after a `|`, e.g. `Pantai Kuta | pantai`.
    Warm {
        /// File with one destination per line
        file: PathBuf,

        /// Category hint for lines that do not carry one
        #[arg(long)]
        category: Option<String>,
    },

    /// Inspect or edit the photo cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Check a URL against the cache URL policy
    CheckUrl {
        url: String,
    },

    /// Start the HTTP server
    Serve {
        /// Port to listen on (defaults to the config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Show the cached row for a destination
    Show { name: String },

    /// List cached rows, most recently updated first
    List {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Row counts per source
    Stats,

    /// Insert or replace a row by hand
    Put {
        name: String,
        url: String,

        #[arg(long, default_value = "curated")]
        source: String,

        #[arg(long)]
        place_id: Option<String>,

        #[arg(long)]
        attribution: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(&self) -> bool {
        matches!(self, OutputMode::Human)
    }
}

/// JSON envelope for machine output
pub fn emit_success(mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    if mode.is_human() {
        return Ok(());
    }
    let envelope = serde_json::json!({
        "ok": true,
        "command": command,
        "data": data,
    });
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn emit_error(mode: OutputMode, error: &anyhow::Error) {
    if mode.is_human() {
        jelajah::ui::error(&format!("{:#}", error));
        return;
    }
    let envelope = serde_json::json!({
        "ok": false,
        "error": format!("{:#}", error),
    });
    match serde_json::to_string_pretty(&envelope) {
        Ok(text) => println!("{}", text),
        Err(_) => eprintln!("{:#}", error),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("JELAJAH_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mode = cli.format;
    if let Err(e) = run(cli).await {
        emit_error(mode, &e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mode = cli.format;
    let load_config = || -> anyhow::Result<jelajah::config::JelajahConfig> {
        let mut config = jelajah::config::resolve_config(cli.config.as_deref())?;
        if let Some(database) = &cli.database {
            config.database = Some(database.to_string_lossy().to_string());
        }
        Ok(config)
    };

    match cli.command {
        Commands::Init { force } => {
            commands::run_init(mode, cli.config.as_deref(), cli.database.as_deref(), force)
        }
        Commands::Resolve {
            name,
            category,
            max_width,
        } => commands::run_resolve(mode, load_config()?, &name, category, max_width).await,
        Commands::Warm { file, category } => commands::run_warm(mode, load_config()?, &file, category).await,
        Commands::Cache { action } => commands::run_cache(mode, &load_config()?, action),
        Commands::CheckUrl { url } => commands::run_check_url(mode, &load_config()?, &url),
        Commands::Serve { port } => {
            let config = load_config()?;
            let port = port.unwrap_or_else(|| config.port());
            jelajah::server::start_server(port, config).await
        }
    }
}
